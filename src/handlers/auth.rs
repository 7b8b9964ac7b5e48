//! # 인증 핸들러
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | `POST` | `/api/v1/users/signup` | 가입, 토큰 발급 (201) |
//! | `POST` | `/api/v1/users/login` | 로그인, 토큰 발급 |
//! | `GET` | `/api/v1/users/logout` | 세션 쿠키 덮어쓰기 |
//! | `POST` | `/api/v1/users/forgot-password` | 재설정 메일 발송 |
//! | `PATCH` | `/api/v1/users/reset-password/{token}` | 재설정 토큰으로 비밀번호 지정 |
//! | `PATCH` | `/api/v1/users/update-password` | 비밀번호 변경 (로그인 필요) |
//!
//! 토큰을 발급하는 응답은 모두 `{status, token, user}` 본문과 HTTP-only `jwt` 쿠키를 함께 보냅니다.

use actix_web::{HttpRequest, HttpResponse, get, http::StatusCode, patch, post, web};
use serde_json::json;
use validator::Validate;

use crate::core::errors::AppError;
use crate::core::state::AppState;
use crate::domain::dto::users::{
    ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest, UpdatePasswordRequest, UserResponse,
};
use crate::domain::models::auth::AuthenticatedUser;
use crate::handlers::base_url;
use crate::middlewares::{AuthMiddleware, SanitizedJson};
use crate::services::auth::Session;

/// 토큰 발급 응답 (본문 + 쿠키)
fn send_token(state: &AppState, session: Session, status: StatusCode) -> HttpResponse {
    let cookie = state.auth.tokens().session_cookie(session.token.clone());
    HttpResponse::build(status).cookie(cookie).json(json!({
        "status": "success",
        "token": session.token,
        "user": UserResponse::from(session.user),
    }))
}

#[post("/signup")]
pub async fn signup(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: SanitizedJson,
) -> Result<HttpResponse, AppError> {
    let request: SignupRequest = body.parse()?;
    request.validate()?;

    let session = state.auth.signup(request, &base_url(&req)).await?;
    Ok(send_token(&state, session, StatusCode::CREATED))
}

#[post("/login")]
pub async fn login(state: web::Data<AppState>, body: SanitizedJson) -> Result<HttpResponse, AppError> {
    let request: LoginRequest = body.parse()?;
    let (email, password) = request
        .credentials()
        .ok_or_else(|| AppError::ValidationError("Please provide Email and Password".to_string()))?;

    let session = state.auth.login(email, password).await?;
    Ok(send_token(&state, session, StatusCode::OK))
}

#[get("/logout")]
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(state.auth.tokens().logout_cookie())
        .json(json!({ "status": "success" }))
}

#[post("/forgot-password")]
pub async fn forgot_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: SanitizedJson,
) -> Result<HttpResponse, AppError> {
    let request: ForgotPasswordRequest = body.parse()?;
    request.validate()?;

    state.auth.forgot_password(&request.email, &base_url(&req)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Token sent to email!",
    })))
}

#[patch("/reset-password/{token}")]
pub async fn reset_password(
    state: web::Data<AppState>,
    token: web::Path<String>,
    body: SanitizedJson,
) -> Result<HttpResponse, AppError> {
    let request: ResetPasswordRequest = body.parse()?;
    request.validate()?;

    let session = state.auth.reset_password(&token, request).await?;
    Ok(send_token(&state, session, StatusCode::OK))
}

#[patch("/update-password", wrap = "AuthMiddleware::required()")]
pub async fn update_password(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: SanitizedJson,
) -> Result<HttpResponse, AppError> {
    let request: UpdatePasswordRequest = body.parse()?;
    request.validate()?;

    let session = state.auth.update_password(&user.user, request).await?;
    Ok(send_token(&state, session, StatusCode::OK))
}
