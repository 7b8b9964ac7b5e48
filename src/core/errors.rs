//! # Application Error Handling
//!
//! 서비스 전체에서 사용하는 단일 에러 분류 체계입니다.
//!
//! ## 에러 분류
//!
//! | 분류 | 변형 | HTTP 상태 | 응답 `status` |
//! |------|------|-----------|---------------|
//! | 운영 에러 | `ValidationError` | 400 | `fail` |
//! | 운영 에러 | `AuthenticationError` | 401 | `fail` |
//! | 운영 에러 | `AuthorizationError` | 403 | `fail` |
//! | 운영 에러 | `NotFound` | 404 | `fail` |
//! | 프로그래밍/인프라 에러 | `DatabaseError`, `ExternalServiceError`, `InternalError` | 500 | `error` |
//!
//! 운영 에러는 메시지를 그대로 클라이언트에 전달합니다. 500 계열 에러는
//! `log::error!`로 기록하고, 개발 환경이 아니면 일반 메시지로 대체합니다.
//!
//! 모든 핸들러는 `Result<HttpResponse, AppError>`를 반환하므로, 실패한 요청은
//! 전부 [`ResponseError`](actix_web::ResponseError) 구현 하나로 모입니다.
//!
//! ```rust,ignore
//! use crate::core::errors::AppError;
//!
//! async fn get_tour(id: &str) -> Result<Tour, AppError> {
//!     repo.find_by_id(id)
//!         .await?
//!         .ok_or_else(|| AppError::NotFound("No document found with that ID".to_string()))
//! }
//! ```

use actix_web::ResponseError;
use actix_web::http::StatusCode;
use thiserror::Error;

use crate::config::Environment;

/// 5xx 응답에서 내부 정보를 숨길 때 사용하는 메시지
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong!";

/// 애플리케이션 전역 에러 타입
#[derive(Error, Debug)]
pub enum AppError {
    /// 데이터베이스 연결/쿼리 에러
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 입력값 검증 실패, 잘못된 ID, 중복 키
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 토큰 누락/만료, 잘못된 자격 증명
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// 역할 부족
    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// 결제, 메일 등 외부 서비스 호출 실패
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 접두어 없이 원본 메시지만 반환
    pub fn message(&self) -> &str {
        match self {
            AppError::DatabaseError(msg)
            | AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::AuthenticationError(msg)
            | AppError::AuthorizationError(msg)
            | AppError::ExternalServiceError(msg)
            | AppError::InternalError(msg) => msg,
        }
    }

    /// 운영 에러(예상 가능한 4xx) 여부
    pub fn is_operational(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// 클라이언트에 노출할 메시지
    ///
    /// 운영 에러는 원본 메시지를, 프로그래밍 에러는 개발 환경에서만 원본을 노출합니다.
    pub fn public_message(&self, environment: &Environment) -> String {
        if self.is_operational() || *environment == Environment::Development {
            self.message().to_string()
        } else {
            GENERIC_ERROR_MESSAGE.to_string()
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationError(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let status = self.status_code();

        if !self.is_operational() {
            log::error!("💥 {}", self);
        }

        let body_status = if self.is_operational() { "fail" } else { "error" };

        actix_web::HttpResponse::build(status).json(serde_json::json!({
            "status": body_status,
            "message": self.public_message(&Environment::current()),
        }))
    }
}

/// Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 에러에 컨텍스트를 추가하는 확장 트레이트
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> AppResult<T>;

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        AppError::InternalError(format!("BSON 직렬화 실패: {}", e))
    }
}

impl From<mongodb::bson::de::Error> for AppError {
    fn from(e: mongodb::bson::de::Error) -> Self {
        AppError::DatabaseError(format!("BSON 역직렬화 실패: {}", e))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::ValidationError(format_validation_errors(&e))
    }
}

/// `validator` 에러를 "Invalid input data. a. b" 형태의 한 줄 메시지로 변환
pub fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(msg) => msg.to_string(),
                None => format!("Invalid value for {}", field),
            })
        })
        .collect();

    messages.sort();

    if messages.is_empty() {
        return "Invalid input data.".to_string();
    }
    format!("Invalid input data. {}", messages.join(". "))
}
