//! 회원가입, 로그인, 세션 검증, 비밀번호 재설정/변경
//!
//! 비밀번호 해시/검증은 bcrypt로 blocking 스레드 풀에서 실행합니다.
//! 세션 토큰 발급/검증은 [`TokenService`]에 위임합니다.

use std::sync::Arc;

use actix_web::web;

use crate::config::AuthSettings;
use crate::core::errors::{AppError, AppResult};
use crate::domain::dto::users::{ResetPasswordRequest, SignupRequest, UpdatePasswordRequest};
use crate::domain::entities::users::user::User;
use crate::repositories::UserRepository;
use crate::services::auth::TokenService;
use crate::services::email::{Email, Mailer};

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login in order to get access !!!";
pub const INCORRECT_CREDENTIALS_MESSAGE: &str = "Email or Password are Incorrect";

/// 토큰 발급 결과
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    tokens: TokenService,
    mailer: Arc<dyn Mailer>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: UserRepository, mailer: Arc<dyn Mailer>, settings: AuthSettings) -> Self {
        Self {
            users,
            bcrypt_cost: settings.bcrypt_cost,
            tokens: TokenService::new(settings),
            mailer,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    fn issue(&self, user: User) -> AppResult<Session> {
        let token = self.tokens.sign(&user)?;
        Ok(Session { user, token })
    }

    /// 회원가입
    ///
    /// 역할은 항상 `user`입니다. 환영 메일 실패는 기록만 하고 가입은 성공시킵니다.
    pub async fn signup(&self, request: SignupRequest, base_url: &str) -> AppResult<Session> {
        let password_hash = hash_password(request.password, self.bcrypt_cost).await?;
        let user = self
            .users
            .insert(User::new(request.name.trim().to_string(), request.email.trim().to_string(), password_hash))
            .await?;

        log::info!("👤 회원가입: {}", user.email);

        let welcome = Email::welcome(&user, &format!("{}/me", base_url))?;
        if let Err(e) = self.mailer.send(welcome).await {
            log::warn!("⚠️ 환영 메일 전송 실패 ({}): {}", user.email, e);
        }

        self.issue(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let Some(user) = self.users.find_by_email(email).await? else {
            log::warn!("🔒 로그인 실패 (없는 계정): {}", email);
            return Err(AppError::AuthenticationError(INCORRECT_CREDENTIALS_MESSAGE.to_string()));
        };

        if !verify_password(password.to_string(), user.password.clone()).await? {
            log::warn!("🔒 로그인 실패 (비밀번호 불일치): {}", user.email);
            return Err(AppError::AuthenticationError(INCORRECT_CREDENTIALS_MESSAGE.to_string()));
        }

        log::info!("🔓 로그인: {}", user.email);
        self.issue(user)
    }

    /// 토큰 검증 후 현재 사용자 조회
    ///
    /// 서명/만료, 사용자 존재 여부, 토큰 발급 이후 비밀번호 변경 여부를 차례로 확인합니다.
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.tokens.verify(token)?;

        let user = match self.users.find_by_id(&claims.id).await {
            Ok(Some(user)) => user,
            Ok(None) | Err(AppError::ValidationError(_)) => {
                return Err(AppError::AuthenticationError(
                    "Token does not belong to the current User".to_string(),
                ));
            }
            Err(e) => return Err(e),
        };

        if user.changed_password_after(claims.iat) {
            return Err(AppError::AuthenticationError("Password has been Modified".to_string()));
        }

        Ok(user)
    }

    /// 재설정 토큰을 만들어 메일로 보냄
    ///
    /// 전송에 실패하면 저장한 토큰을 지우고 500을 반환합니다.
    pub async fn forgot_password(&self, email: &str, base_url: &str) -> AppResult<()> {
        let mut user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("No user found of same email".to_string()))?;

        let reset_token = user.create_password_reset_token();
        self.users.save(&user).await?;

        let reset_url = format!("{}/api/v1/users/reset-password/{}", base_url, reset_token);
        let sent = match Email::password_reset(&user, &reset_url) {
            Ok(email) => self.mailer.send(email).await,
            Err(e) => Err(e),
        };

        if let Err(e) = sent {
            log::error!("📧 재설정 메일 전송 실패 ({}): {}", user.email, e);
            user.clear_password_reset();
            self.users.save(&user).await?;
            return Err(AppError::ExternalServiceError(
                "There was a error sending Email. Please try again Later".to_string(),
            ));
        }

        log::info!("📧 재설정 토큰 발송: {}", user.email);
        Ok(())
    }

    /// 재설정 토큰으로 새 비밀번호 지정. 토큰은 한 번만 사용할 수 있습니다.
    pub async fn reset_password(&self, token: &str, request: ResetPasswordRequest) -> AppResult<Session> {
        let mut user = self
            .users
            .find_by_reset_token(token)
            .await?
            .ok_or_else(|| AppError::ValidationError("User not Found or Token Expired".to_string()))?;

        let password_hash = hash_password(request.password, self.bcrypt_cost).await?;
        user.set_password(password_hash);
        user.clear_password_reset();
        self.users.save(&user).await?;

        log::info!("🔑 비밀번호 재설정: {}", user.email);
        self.issue(user)
    }

    /// 로그인 사용자의 비밀번호 변경
    pub async fn update_password(&self, current: &User, request: UpdatePasswordRequest) -> AppResult<Session> {
        let mut user = self
            .users
            .find_by_object_id(current.id.ok_or_else(|| AppError::AuthenticationError(LOGIN_REQUIRED_MESSAGE.to_string()))?)
            .await?
            .ok_or_else(|| AppError::AuthenticationError("Token does not belong to the current User".to_string()))?;

        if !verify_password(request.current_password, user.password.clone()).await? {
            return Err(AppError::ValidationError("Current password is not Correct".to_string()));
        }

        let password_hash = hash_password(request.password, self.bcrypt_cost).await?;
        user.set_password(password_hash);
        self.users.save(&user).await?;

        log::info!("🔑 비밀번호 변경: {}", user.email);
        self.issue(user)
    }
}

async fn hash_password(password: String, cost: u32) -> AppResult<String> {
    web::block(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::InternalError(format!("해시 작업 실행 실패: {}", e)))?
        .map_err(|e| AppError::InternalError(format!("비밀번호 해싱 실패: {}", e)))
}

async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    web::block(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::InternalError(format!("검증 작업 실행 실패: {}", e)))?
        .map_err(|e| AppError::InternalError(format!("비밀번호 검증 실패: {}", e)))
}
