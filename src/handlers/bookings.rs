//! # 예약 핸들러
//!
//! 결제 세션 생성은 로그인 사용자 누구나, 예약 CRUD는 `admin`, `lead-guide`만 가능합니다.

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use serde_json::json;

use crate::core::errors::AppError;
use crate::core::state::AppState;
use crate::domain::entities::users::user::Role;
use crate::domain::models::auth::AuthenticatedUser;
use crate::handlers::{base_url, factory};
use crate::middlewares::{AuthMiddleware, SanitizedJson};

#[get("/checkout-session/{tour_id}", wrap = "AuthMiddleware::required()")]
pub async fn checkout_session(
    req: HttpRequest,
    state: web::Data<AppState>,
    tour_id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let session = state.bookings.checkout(&tour_id, &user.user, &base_url(&req)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "session": session,
    })))
}

#[get("", wrap = "AuthMiddleware::required_with_roles(vec![Role::Admin, Role::LeadGuide])")]
pub async fn get_all_bookings(
    state: web::Data<AppState>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    factory::get_all(&state.bookings, &query, vec![]).await
}

#[post("", wrap = "AuthMiddleware::required_with_roles(vec![Role::Admin, Role::LeadGuide])")]
pub async fn create_booking(state: web::Data<AppState>, body: SanitizedJson) -> Result<HttpResponse, AppError> {
    factory::create_one(&state.bookings, body.into_inner()).await
}

#[get("/{id}", wrap = "AuthMiddleware::required_with_roles(vec![Role::Admin, Role::LeadGuide])")]
pub async fn get_booking(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::get_one(&state.bookings, &id).await
}

#[patch("/{id}", wrap = "AuthMiddleware::required_with_roles(vec![Role::Admin, Role::LeadGuide])")]
pub async fn update_booking(
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: SanitizedJson,
) -> Result<HttpResponse, AppError> {
    factory::update_one(&state.bookings, &id, body.into_inner()).await
}

#[delete("/{id}", wrap = "AuthMiddleware::required_with_roles(vec![Role::Admin, Role::LeadGuide])")]
pub async fn delete_booking(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::delete_one(&state.bookings, &id).await
}
