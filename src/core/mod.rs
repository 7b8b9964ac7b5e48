//! # Core Module
//!
//! - [`errors`]: 단일 에러 분류 체계 [`AppError`](errors::AppError)와 HTTP 응답 변환
//! - [`state`]: 서비스들을 묶은 [`AppState`](state::AppState)
//!
//! 핸들러는 `web::Data<AppState>`로 서비스를 받고 `Result<HttpResponse, AppError>`를 반환합니다.
//!
//! ```rust,ignore
//! async fn get_tour(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
//!     let tour = state.tours.get(&path).await?;
//!     Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": { "data": tour } })))
//! }
//! ```

pub mod errors;
pub mod state;
