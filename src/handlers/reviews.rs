//! # 리뷰 핸들러
//!
//! 모든 경로가 로그인을 요구합니다. `/api/v1/tours/{tour_id}/reviews` 중첩 경로는
//! 해당 투어로 범위를 좁히고, 작성 시 `tour`를 경로에서 채웁니다.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde_json::Value;

use crate::core::errors::AppError;
use crate::core::state::AppState;
use crate::db::Condition;
use crate::domain::entities::users::user::Role;
use crate::domain::models::auth::AuthenticatedUser;
use crate::handlers::factory;
use crate::middlewares::{AuthMiddleware, SanitizedJson};
use crate::repositories::parse_object_id;

/// 본문에 없으면 `tour`는 경로에서, `user`는 세션에서 채움
fn with_refs(mut body: Value, tour_id: Option<&str>, user: &AuthenticatedUser) -> Value {
    if let Value::Object(map) = &mut body {
        if let Some(tour_id) = tour_id {
            map.entry("tour").or_insert_with(|| Value::String(tour_id.to_string()));
        }
        map.entry("user").or_insert_with(|| Value::String(user.user_id()));
    }
    body
}

#[get("", wrap = "AuthMiddleware::required()")]
pub async fn get_all_reviews(
    state: web::Data<AppState>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    factory::get_all(&state.reviews, &query, vec![]).await
}

#[post("", wrap = "AuthMiddleware::required_with_role(Role::User)")]
pub async fn create_review(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: SanitizedJson,
) -> Result<HttpResponse, AppError> {
    factory::create_one(&state.reviews, with_refs(body.into_inner(), None, &user)).await
}

#[get("/{id}", wrap = "AuthMiddleware::required()")]
pub async fn get_review(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::get_one(&state.reviews, &id).await
}

#[patch("/{id}", wrap = "AuthMiddleware::required_with_roles(vec![Role::User, Role::Admin])")]
pub async fn update_review(
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: SanitizedJson,
) -> Result<HttpResponse, AppError> {
    factory::update_one(&state.reviews, &id, body.into_inner()).await
}

#[delete("/{id}", wrap = "AuthMiddleware::required_with_roles(vec![Role::User, Role::Admin])")]
pub async fn delete_review(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::delete_one(&state.reviews, &id).await
}

/// `GET /api/v1/tours/{tour_id}/reviews`
#[get("/{tour_id}/reviews", wrap = "AuthMiddleware::required()")]
pub async fn get_tour_reviews(
    state: web::Data<AppState>,
    tour_id: web::Path<String>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let tour = parse_object_id(&tour_id)?;
    factory::get_all(&state.reviews, &query, vec![Condition::eq("tour", tour)]).await
}

/// `POST /api/v1/tours/{tour_id}/reviews`
#[post("/{tour_id}/reviews", wrap = "AuthMiddleware::required_with_role(Role::User)")]
pub async fn create_tour_review(
    state: web::Data<AppState>,
    tour_id: web::Path<String>,
    user: AuthenticatedUser,
    body: SanitizedJson,
) -> Result<HttpResponse, AppError> {
    factory::create_one(&state.reviews, with_refs(body.into_inner(), Some(&tour_id), &user)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::users::user::User;
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    #[test]
    fn test_refs_fill_only_missing_fields() {
        let mut user = User::new("Ann Lee".into(), "ann@example.com".into(), "hash".into());
        user.id = Some(ObjectId::new());
        let user = AuthenticatedUser::new(user);

        let body = with_refs(json!({ "review": "Great" }), Some("t1"), &user);
        assert_eq!(body["tour"], "t1");
        assert_eq!(body["user"], user.user_id());

        let body = with_refs(json!({ "tour": "t2", "user": "u2" }), Some("t1"), &user);
        assert_eq!(body["tour"], "t2");
        assert_eq!(body["user"], "u2");
    }
}
