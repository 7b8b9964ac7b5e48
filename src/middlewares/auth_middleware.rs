//! JWT 인증 미들웨어
//!
//! 요청의 세션 토큰을 검증하고 현재 사용자를 Request Extensions에 넣습니다.
//!
//! - `required()`: 토큰이 없거나 유효하지 않으면 401
//! - `optional()`: 실패해도 통과. 화면 템플릿용 사용자 정보만 붙임
//! - `required_with_roles(..)`: 인증 후 역할이 목록에 없으면 403

use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::{
    Error, Result,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
};

use crate::domain::entities::users::user::Role;
use crate::domain::models::auth::{AuthMode, RequiredRole};
use crate::middlewares::auth_inner::AuthMiddlewareService;

/// JWT 인증 미들웨어
pub struct AuthMiddleware {
    mode: AuthMode,
    required_role: Option<RequiredRole>,
}

impl AuthMiddleware {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            required_role: None,
        }
    }

    pub fn new_with_role(mode: AuthMode, required_role: RequiredRole) -> Self {
        Self {
            mode,
            required_role: Some(required_role),
        }
    }

    pub fn required() -> Self {
        Self::new(AuthMode::Required)
    }

    pub fn optional() -> Self {
        Self::new(AuthMode::Optional)
    }

    pub fn required_with_role(role: Role) -> Self {
        Self::new_with_role(AuthMode::Required, RequiredRole::Single(role))
    }

    /// 나열된 역할 중 하나 요구
    pub fn required_with_roles(roles: Vec<Role>) -> Self {
        Self::new_with_role(AuthMode::Required, RequiredRole::Any(roles))
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            mode: self.mode.clone(),
            required_role: self.required_role.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::users::user::User;
    use crate::domain::models::auth::AuthenticatedUser;

    fn user_with(role: Role) -> AuthenticatedUser {
        let mut user = User::new("Ann Lee".into(), "ann@example.com".into(), "hash".into());
        user.role = role;
        AuthenticatedUser::new(user)
    }

    #[test]
    fn test_required_role_single() {
        let required = RequiredRole::Single(Role::Admin);
        assert!(required.is_satisfied(Role::Admin));
        assert!(!required.is_satisfied(Role::User));
    }

    #[test]
    fn test_required_role_any() {
        let required = RequiredRole::Any(vec![Role::Admin, Role::LeadGuide]);
        assert!(required.is_satisfied(Role::Admin));
        assert!(required.is_satisfied(Role::LeadGuide));
        assert!(!required.is_satisfied(Role::Guide));
        assert!(!required.is_satisfied(Role::User));
    }

    #[test]
    fn test_authenticated_user_against_role_set() {
        let staff = RequiredRole::Any(vec![Role::Admin, Role::LeadGuide]);

        let admin = user_with(Role::Admin);
        assert!(staff.is_satisfied(admin.role()));

        let guide = user_with(Role::Guide);
        assert!(!staff.is_satisfied(guide.role()));
        assert_eq!(guide.user_id(), "");
    }
}
