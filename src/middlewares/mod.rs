//! 미들웨어 모듈
//!
//! ### 1. 인증 미들웨어 (AuthMiddleware)
//! - `Authorization: Bearer` 헤더 또는 `jwt` 쿠키의 세션 토큰 검증
//! - 현재 사용자를 request extension에 저장
//! - 필수/선택 인증 모드, 역할 제한
//!
//! ### 2. 본문 정리 (SanitizedJson)
//! - NoSQL 연산자 키 제거, HTML 이스케이프
//! - JSON/Query/Path 추출 실패를 400으로 변환
//!
//! ## 핸들러 단위 적용
//! ```rust,ignore
//! #[delete("/{id}", wrap = "AuthMiddleware::required_with_roles(vec![Role::User, Role::Admin])")]
//! pub async fn delete_review(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
//!     factory::delete_one(&state.reviews, &id).await
//! }
//! ```

pub mod auth_middleware;
mod auth_inner;
pub mod sanitize;

pub use auth_inner::{FORBIDDEN_MESSAGE, extract_token};
pub use auth_middleware::AuthMiddleware;
pub use sanitize::{SanitizedJson, json_config, path_config, query_config};
