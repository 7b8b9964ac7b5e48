//! # HTTP Request Handlers Module
//!
//! 리소스별 핸들러 모음입니다. 핸들러는 추출기로 입력을 받고, 서비스 호출 결과를
//! JSON 봉투(`{ status, data }`)로 감싸 반환합니다. 실패는 전부 [`AppError`]로 모입니다.
//!
//! ```text
//! Client ──▶ Handlers (이 모듈) ──▶ Services ──▶ Repositories ──▶ DocumentStore
//! ```
//!
//! 인증/권한은 각 핸들러의 `wrap = "AuthMiddleware::..."` 속성으로 지정합니다.
//! 같은 경로를 JSON과 multipart로 나눠 받는 경우 [`is_json`], [`is_multipart`] 가드를 씁니다.
//!
//! [`AppError`]: crate::core::errors::AppError

pub mod auth;
pub mod bookings;
pub mod factory;
pub mod reviews;
pub mod tours;
pub mod users;
pub mod views;

use actix_web::HttpRequest;
use actix_web::guard::GuardContext;
use actix_web::http::header;

/// 메일/결제 링크에 쓰는 요청 기준 주소 (`https://host:port`)
pub fn base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

fn content_type<'a>(ctx: &'a GuardContext<'_>) -> Option<&'a str> {
    ctx.head()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}

/// multipart 폼 요청
pub fn is_multipart(ctx: &GuardContext) -> bool {
    content_type(ctx).is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// multipart가 아닌 요청. 본문 형식 검사는 JSON 추출기가 맡음
pub fn is_json(ctx: &GuardContext) -> bool {
    !is_multipart(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::guard::{Guard, fn_guard};
    use actix_web::test::TestRequest;

    #[test]
    fn test_content_type_guards() {
        let multipart = TestRequest::default()
            .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=xyz"))
            .to_srv_request();
        let json = TestRequest::default()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .to_srv_request();

        assert!(fn_guard(is_multipart).check(&multipart.guard_ctx()));
        assert!(!fn_guard(is_json).check(&multipart.guard_ctx()));
        assert!(fn_guard(is_json).check(&json.guard_ctx()));
    }

    #[test]
    fn test_base_url_uses_host_header() {
        let req = TestRequest::default()
            .insert_header((header::HOST, "natours.example.com"))
            .to_http_request();
        assert_eq!(base_url(&req), "http://natours.example.com");
    }
}
