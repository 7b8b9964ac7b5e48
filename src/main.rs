//! Natours 백엔드 메인 애플리케이션
//!
//! 문서 저장소를 연결하고 서비스를 조립한 뒤 Actix-web HTTP 서버를 구동합니다.

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header;
use actix_web::{App, HttpServer, middleware, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};

use natours_backend::config::{AuthSettings, CorsConfig, Environment, RateLimitConfig, ServerConfig};
use natours_backend::core::state::AppState;
use natours_backend::db::connect_store;
use natours_backend::middlewares::{json_config, path_config, query_config};
use natours_backend::routes::{configure_api_routes, configure_site_routes};
use natours_backend::services::email::mailer_from_env;
use natours_backend::services::payments::StripeGateway;

#[actix_web::main]
async fn main() -> io::Result<()> {
    load_env_file();
    init_logging();

    info!("🚀 Natours 서비스 시작중... ({:?})", Environment::current());

    let store = connect_store().await.map_err(|e| {
        error!("❌ 데이터베이스 연결 실패: {}", e);
        io::Error::other(e.to_string())
    })?;

    if let Err(e) = AppState::create_indexes(&store).await {
        error!("❌ 인덱스 생성 실패: {}", e);
        return Err(io::Error::other(e.to_string()));
    }

    let state = AppState::new(
        store,
        mailer_from_env(),
        Arc::new(StripeGateway::from_env()),
        AuthSettings::from_env(),
        ServerConfig::public_dir(),
    );

    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");

    start_http_server(state).await
}

async fn start_http_server(state: AppState) -> io::Result<()> {
    let bind_address = format!("{}:{}", ServerConfig::host(), ServerConfig::port());

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);

    let rate_limit = RateLimitConfig::from_env();
    let governor_conf = GovernorConfigBuilder::default()
        .seconds_per_request(rate_limit.replenish_seconds)
        .burst_size(rate_limit.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| io::Error::other("요청 제한 설정이 올바르지 않습니다"))?;

    info!(
        "🛡️ Rate Limiting 활성화 (/api): {}초마다 1개 회복, 버스트 {}개",
        rate_limit.replenish_seconds, rate_limit.burst_size
    );

    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .wrap(configure_cors())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .service(
                web::scope("/api")
                    .wrap(Governor::new(&governor_conf))
                    .configure(configure_api_routes),
            )
            .configure(configure_site_routes)
    })
    .bind(bind_address)?
    .workers(ServerConfig::workers())
    .run()
    .await
}

/// `PROFILE`에 따라 `.env.prod` / `.env.dev`, 그 외에는 `.env`
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_default();

    let loaded = match profile.as_str() {
        "prod" => dotenv::from_filename(".env.prod").map(|_| ".env.prod"),
        "dev" => dotenv::from_filename(".env.dev").map(|_| ".env.dev"),
        _ => dotenv().map(|_| ".env"),
    };

    // 로거 초기화 전이라 결과는 eprintln으로 남김
    match loaded {
        Ok(file) => eprintln!("{} 파일 로드 됨", file),
        Err(e) => eprintln!("환경 파일 로드 실패 (환경 변수만 사용): {}", e),
    }
}

/// `RUST_LOG` 기반 로깅 (기본값 `info,actix_web=debug`)
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

/// `CORS_ALLOWED_ORIGINS`가 비어 있으면 요청 Origin을 그대로 허용 (쿠키 전송 가능)
fn configure_cors() -> Cors {
    let origins = CorsConfig::allowed_origins();

    let cors = if origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(3600)
}
