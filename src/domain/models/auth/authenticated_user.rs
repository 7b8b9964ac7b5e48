use std::future::{Ready, ready};

use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};

use crate::core::errors::AppError;
use crate::domain::entities::users::user::{Role, User};

/// 인증 미들웨어가 Request Extensions에 넣어두는 현재 사용자
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

impl AuthenticatedUser {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> String {
        self.user.id.map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AppError::AuthenticationError(
                "Please login in order to get access !!!".to_string(),
            )
            .into())),
        }
    }
}

/// 선택적 인증 사용자 (화면 렌더링용)
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl OptionalUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref().map(|auth| &auth.user)
    }
}

impl FromRequest for OptionalUser {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        ready(Ok(OptionalUser(user)))
    }
}
