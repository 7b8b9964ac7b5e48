//! 실행 환경, 서버, 저장소, 트래픽 제어 설정
//!
//! 모든 값은 환경 변수에서 읽으며, 값이 없거나 파싱에 실패하면 기본값을 사용합니다.
//! `main`에서 `.env.{profile}` 파일을 먼저 로드한 뒤 호출됩니다.

use std::env;
use std::path::PathBuf;

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// `ENVIRONMENT` (없으면 `NODE_ENV`) 값으로 현재 환경을 판별합니다.
    pub fn current() -> Self {
        let raw = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| env::var("NODE_ENV").unwrap_or_else(|_| "production".to_string()));
        Self::from_str(&raw)
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// 비밀번호 해싱 설정
pub struct PasswordConfig;

impl PasswordConfig {
    /// bcrypt cost
    ///
    /// `BCRYPT_COST`가 4~15 범위면 그 값을, 아니면 환경별 기본값을 사용합니다.
    pub fn bcrypt_cost() -> u32 {
        if let Ok(cost_str) = env::var("BCRYPT_COST") {
            if let Ok(cost) = cost_str.parse::<u32>() {
                if (4..=15).contains(&cost) {
                    return cost;
                }
            }
        }

        Self::bcrypt_cost_for_env(&Environment::current())
    }

    pub fn bcrypt_cost_for_env(env: &Environment) -> u32 {
        match env {
            Environment::Development => 4,
            Environment::Test => 4,
            Environment::Staging => 10,
            Environment::Production => 12,
        }
    }
}

/// HTTP 서버 설정
pub struct ServerConfig;

impl ServerConfig {
    pub fn port() -> u16 {
        env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080)
    }

    pub fn host() -> String {
        env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
    }

    pub fn workers() -> usize {
        env::var("WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4)
    }

    /// 정적 파일(css, js, img) 루트 디렉터리
    pub fn public_dir() -> PathBuf {
        PathBuf::from(env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()))
    }
}

/// 문서 저장소 종류
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    MongoDb,
    /// 프로세스 메모리 (로컬 데모, 테스트)
    Memory,
}

/// 데이터베이스 설정
pub struct StorageConfig;

impl StorageConfig {
    pub fn backend() -> StorageBackend {
        match env::var("DATABASE_BACKEND")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "memory" | "in-memory" => StorageBackend::Memory,
            _ => StorageBackend::MongoDb,
        }
    }

    pub fn mongodb_uri() -> String {
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
    }

    pub fn database_name() -> String {
        env::var("DATABASE_NAME").unwrap_or_else(|_| "natours_dev".to_string())
    }
}

/// IP 단위 요청 제한 설정
///
/// 기본값(36초마다 1개 회복, 버스트 100)은 IP당 시간당 약 100요청입니다.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub replenish_seconds: u64,
    pub burst_size: u32,
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let replenish_seconds = env::var("RATE_LIMIT_REPLENISH_SECONDS")
            .unwrap_or_else(|_| "36".to_string())
            .parse::<u64>()
            .unwrap_or_else(|e| {
                log::error!("RATE_LIMIT_REPLENISH_SECONDS 파싱 실패: {}. 기본값 36 사용", e);
                36
            });

        let burst_size = env::var("RATE_LIMIT_BURST_SIZE")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u32>()
            .unwrap_or_else(|e| {
                log::error!("RATE_LIMIT_BURST_SIZE 파싱 실패: {}. 기본값 100 사용", e);
                100
            });

        Self {
            replenish_seconds,
            burst_size,
        }
    }
}

/// CORS 설정
pub struct CorsConfig;

impl CorsConfig {
    /// 쉼표로 구분된 `CORS_ALLOWED_ORIGINS`
    ///
    /// 비어 있으면 요청 Origin을 그대로 허용합니다 (쿠키 전송을 위해 `*` 대신).
    pub fn allowed_origins() -> Vec<String> {
        env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
