//! AuthMiddleware 인증 로직의 핵심적인 기능
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, forward_ready};
use actix_web::{Error, HttpMessage, web};
use futures_util::future::LocalBoxFuture;

use crate::core::errors::AppError;
use crate::core::state::AppState;
use crate::domain::models::auth::{AuthMode, AuthenticatedUser, RequiredRole};
use crate::services::auth::{LOGGED_OUT, LOGIN_REQUIRED_MESSAGE, SESSION_COOKIE, TokenService};

pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action!";

/// 실제 인증 로직을 수행하는 서비스
pub struct AuthMiddlewareService<S> {
    pub service: Rc<S>,
    pub mode: AuthMode,
    pub required_role: Option<RequiredRole>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let mode = self.mode.clone();
        let required_role = self.required_role.clone();

        Box::pin(async move {
            let auth_result = authenticate_request(&req).await;

            match (&mode, auth_result) {
                (AuthMode::Required, Err(err)) => {
                    log::warn!("🔒 인증 실패: {} {} - {}", req.method(), req.path(), err.message());
                    return Ok(reject(req, err));
                }
                (AuthMode::Required, Ok(user)) => {
                    if let Some(required) = &required_role {
                        if !required.is_satisfied(user.role()) {
                            log::warn!(
                                "⛔ 권한 부족: 사용자 {} ({}), 필요 권한: {:?}",
                                user.user_id(),
                                user.role().as_str(),
                                required
                            );
                            return Ok(reject(req, AppError::AuthorizationError(FORBIDDEN_MESSAGE.to_string())));
                        }
                    }

                    log::debug!("인증 성공: 사용자 {}", user.user_id());
                    req.extensions_mut().insert(user);
                }
                (AuthMode::Optional, Ok(user)) => {
                    log::debug!("선택적 인증 성공: 사용자 {}", user.user_id());
                    req.extensions_mut().insert(user);
                }
                (AuthMode::Optional, Err(_)) => {
                    log::debug!("선택적 인증: 로그인하지 않은 요청");
                }
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    let (req, _) = req.into_parts();
    ServiceResponse::from_err(err, req).map_into_right_body()
}

/// `Authorization: Bearer` 헤더, 없으면 `jwt` 쿠키에서 토큰을 꺼냅니다.
pub fn extract_token(req: &ServiceRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(TokenService::extract_bearer_token)
        .map(str::to_string);

    from_header.or_else(|| {
        req.cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty() && value != LOGGED_OUT)
    })
}

/// 요청의 토큰을 검증하고 현재 사용자를 조회
async fn authenticate_request(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::InternalError("AppState가 등록되지 않았습니다".to_string()))?;

    let token = extract_token(req).ok_or_else(|| AppError::AuthenticationError(LOGIN_REQUIRED_MESSAGE.to_string()))?;

    let user = state.auth.authenticate(&token).await?;
    Ok(AuthenticatedUser::new(user))
}
