//! 세션 JWT 발급/검증과 세션 쿠키
//!
//! HS256 서명 토큰에 사용자 ID와 발급 시각(`iat`)을 담습니다.
//! 토큰은 응답 본문과 HTTP-only `jwt` 쿠키로 함께 전달됩니다.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};

use crate::config::AuthSettings;
use crate::core::errors::{AppError, AppResult, ErrorContext};
use crate::domain::entities::users::user::User;
use crate::domain::models::token::TokenClaims;

/// 세션 쿠키 이름
pub const SESSION_COOKIE: &str = "jwt";

/// 로그아웃 시 쿠키에 덮어쓰는 값
pub const LOGGED_OUT: &str = "logged-out";

/// JWT 토큰 관리 서비스
#[derive(Clone)]
pub struct TokenService {
    settings: AuthSettings,
}

impl TokenService {
    pub fn new(settings: AuthSettings) -> Self {
        Self { settings }
    }

    /// 사용자 세션 토큰 발급
    ///
    /// # Errors
    ///
    /// * `AppError::InternalError` - 저장되지 않은(ID 없는) 사용자, 서명 실패
    pub fn sign(&self, user: &User) -> AppResult<String> {
        let id = user
            .id
            .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?;

        let now = Utc::now();
        let claims = TokenClaims {
            id: id.to_hex(),
            iat: now.timestamp(),
            exp: (now + self.settings.jwt_expires_in).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.jwt_secret.as_bytes()),
        )
        .context("JWT 토큰 생성 실패")
    }

    /// 서명과 만료를 검증하고 클레임 반환
    pub fn verify(&self, token: &str) -> AppResult<TokenClaims> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.settings.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                AppError::AuthenticationError("Your token has expired! Please log in again.".to_string())
            }
            _ => AppError::AuthenticationError("Invalid token. Please log in again!".to_string()),
        })
    }

    /// `Authorization: Bearer <token>` 헤더에서 토큰 추출
    pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
        auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// 로그인 세션 쿠키
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .secure(self.settings.secure_cookies)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::days(self.settings.cookie_expires_in_days))
            .finish()
    }

    /// 세션 쿠키를 `logged-out`으로 덮어쓰는 10초짜리 쿠키
    pub fn logout_cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, LOGGED_OUT)
            .path("/")
            .http_only(true)
            .secure(self.settings.secure_cookies)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(10))
            .finish()
    }
}
