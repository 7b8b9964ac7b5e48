//! # 사용자 핸들러
//!
//! | 메서드 | 경로 | 권한 | 설명 |
//! |--------|------|------|------|
//! | `GET` | `/me` | 로그인 | 내 정보 |
//! | `PATCH` | `/update-me` | 로그인 | 이름/이메일 (JSON) 또는 사진 포함 (multipart) |
//! | `DELETE` | `/delete-me` | 로그인 | 탈퇴 (204) |
//! | `GET` | `` | admin | 목록 |
//! | `POST` | `` | admin | 지원하지 않음, `/signup` 사용 |
//! | `GET`/`PATCH`/`DELETE` | `/{id}` | admin | 단건 조회/수정/삭제 |

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde_json::json;
use validator::Validate;

use crate::core::errors::AppError;
use crate::core::state::AppState;
use crate::domain::dto::users::{UpdateMeRequest, UserResponse};
use crate::domain::entities::users::user::Role;
use crate::domain::models::auth::AuthenticatedUser;
use crate::handlers::factory;
use crate::middlewares::{AuthMiddleware, SanitizedJson};
use crate::services::users::SIGNUP_ONLY_MESSAGE;
use crate::utils::multipart::{self, UploadLimits};

fn updated_user_response(user: crate::domain::entities::users::user::User) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "success",
        "data": { "user": UserResponse::from(user) },
    }))
}

#[get("/me", wrap = "AuthMiddleware::required()")]
pub async fn get_me(state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    factory::get_one(&state.users, &user.user_id()).await
}

/// JSON 본문으로 이름/이메일 수정
#[patch("/update-me", guard = "crate::handlers::is_json", wrap = "AuthMiddleware::required()")]
pub async fn update_me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: SanitizedJson,
) -> Result<HttpResponse, AppError> {
    let request: UpdateMeRequest = body.parse()?;
    request.validate()?;

    let updated = state.users.update_me(&user.user, request, None).await?;
    Ok(updated_user_response(updated))
}

/// multipart 폼으로 수정. `photo` 파일이 있으면 500x500으로 저장
#[patch("/update-me", guard = "crate::handlers::is_multipart", wrap = "AuthMiddleware::required()")]
pub async fn update_me_with_photo(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let form = multipart::collect(payload, UploadLimits::USER_PHOTO).await?;

    let request = UpdateMeRequest {
        name: form.text("name").map(str::to_string),
        email: form.text("email").map(str::to_string),
        password: form.text("password").map(str::to_string),
        password_confirm: form.text("passwordConfirm").map(str::to_string),
    }
    .escaped();
    if request.touches_password() {
        return Err(AppError::ValidationError(
            crate::services::users::PASSWORD_ROUTE_MESSAGE.to_string(),
        ));
    }
    request.validate()?;

    let photo = match form.files_named("photo").next() {
        Some(file) => Some(state.images.save_user_photo(&user.user_id(), file.data.clone()).await?),
        None => None,
    };

    let updated = state.users.update_me(&user.user, request, photo).await?;
    Ok(updated_user_response(updated))
}

#[delete("/delete-me", wrap = "AuthMiddleware::required()")]
pub async fn delete_me(state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    state.users.delete_me(&user.user).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("", wrap = "AuthMiddleware::required_with_role(Role::Admin)")]
pub async fn get_all_users(
    state: web::Data<AppState>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    factory::get_all(&state.users, &query, vec![]).await
}

#[post("", wrap = "AuthMiddleware::required_with_role(Role::Admin)")]
pub async fn create_user() -> Result<HttpResponse, AppError> {
    Err(AppError::InternalError(SIGNUP_ONLY_MESSAGE.to_string()))
}

#[get("/{id}", wrap = "AuthMiddleware::required_with_role(Role::Admin)")]
pub async fn get_user(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::get_one(&state.users, &id).await
}

#[patch("/{id}", wrap = "AuthMiddleware::required_with_role(Role::Admin)")]
pub async fn update_user(
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: SanitizedJson,
) -> Result<HttpResponse, AppError> {
    factory::update_one(&state.users, &id, body.into_inner()).await
}

#[delete("/{id}", wrap = "AuthMiddleware::required_with_role(Role::Admin)")]
pub async fn delete_user(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::delete_one(&state.users, &id).await
}
