//! 라우트 설정 모듈
//!
//! API는 `/api` 스코프 아래([`configure_api_routes`]), 화면/정적 파일/헬스체크는 루트
//! ([`configure_site_routes`])에 등록합니다. 요청 제한은 `main`에서 `/api` 스코프에만 겁니다.
//! 인증 수준은 각 핸들러의 `wrap` 속성이 정하므로 스코프에는 인증 미들웨어를 걸지 않습니다.
//!
//! 같은 스코프 안에서 고정 경로(`/top-5-cheap`, `/me` 등)는 `/{id}`보다 먼저 등록해야
//! ID로 잘못 매칭되지 않습니다.
//!
//! ```rust,ignore
//! let app = App::new()
//!     .app_data(web::Data::new(state))
//!     .service(web::scope("/api").wrap(Governor::new(&conf)).configure(configure_api_routes))
//!     .configure(configure_site_routes);
//! ```

use std::path::Path;

use actix_files::Files;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::config::ServerConfig;
use crate::core::errors::AppError;
use crate::handlers;

/// `/api` 스코프 내부 (`/v1/...`)
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    configure_tour_routes(cfg);
    configure_user_routes(cfg);
    configure_review_routes(cfg);
    configure_booking_routes(cfg);
}

/// 헬스체크, 화면, 정적 파일, 404
pub fn configure_site_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);
    configure_view_routes(cfg);
    configure_static_files(cfg, &ServerConfig::public_dir());
    cfg.default_service(web::route().to(not_found));
}

/// `/api/v1/tours` (+ 중첩 리뷰 `/{tour_id}/reviews`)
fn configure_tour_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/tours")
            .service(handlers::tours::top_five_cheap)
            .service(handlers::tours::tour_stats)
            .service(handlers::tours::monthly_plan)
            .service(handlers::tours::tours_within)
            .service(handlers::tours::distances)
            .service(handlers::tours::get_all_tours)
            .service(handlers::tours::create_tour)
            .service(handlers::reviews::get_tour_reviews)
            .service(handlers::reviews::create_tour_review)
            .service(handlers::tours::upload_tour_images)
            .service(handlers::tours::get_tour)
            .service(handlers::tours::update_tour)
            .service(handlers::tours::delete_tour),
    );
}

/// `/api/v1/users` (인증 + 본인 + 관리자)
fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/users")
            .service(handlers::auth::signup)
            .service(handlers::auth::login)
            .service(handlers::auth::logout)
            .service(handlers::auth::forgot_password)
            .service(handlers::auth::reset_password)
            .service(handlers::auth::update_password)
            .service(handlers::users::get_me)
            .service(handlers::users::update_me)
            .service(handlers::users::update_me_with_photo)
            .service(handlers::users::delete_me)
            .service(handlers::users::get_all_users)
            .service(handlers::users::create_user)
            .service(handlers::users::get_user)
            .service(handlers::users::update_user)
            .service(handlers::users::delete_user),
    );
}

fn configure_review_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/reviews")
            .service(handlers::reviews::get_all_reviews)
            .service(handlers::reviews::create_review)
            .service(handlers::reviews::get_review)
            .service(handlers::reviews::update_review)
            .service(handlers::reviews::delete_review),
    );
}

fn configure_booking_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/bookings")
            .service(handlers::bookings::checkout_session)
            .service(handlers::bookings::get_all_bookings)
            .service(handlers::bookings::create_booking)
            .service(handlers::bookings::get_booking)
            .service(handlers::bookings::update_booking)
            .service(handlers::bookings::delete_booking),
    );
}

/// 서버 렌더링 화면
fn configure_view_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(handlers::views::overview)
        .service(handlers::views::tour_page)
        .service(handlers::views::login)
        .service(handlers::views::account_page)
        .service(handlers::views::my_tours)
        .service(handlers::views::submit_user_data);
}

/// `public/` 아래 정적 파일 (`/css`, `/js`, `/img`)
pub fn configure_static_files(cfg: &mut web::ServiceConfig, public_dir: &Path) {
    for dir in ["css", "js", "img"] {
        cfg.service(Files::new(&format!("/{}", dir), public_dir.join(dir)));
    }
}

/// 등록되지 않은 경로
async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(format!("Cannot find URL {} on this server !", req.path())))
}

/// 서비스 상태를 확인하는 헬스체크 엔드포인트
///
/// ```bash
/// curl http://localhost:8080/health
/// ```
#[actix_web::get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "natours_backend",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests;
