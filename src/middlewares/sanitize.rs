//! 요청 본문 정리와 추출기 설정
//!
//! - [`SanitizedJson`]: `$`로 시작하거나 `.`이 들어간 키를 제거하고(NoSQL 연산자 주입),
//!   문자열 값의 `<`, `>`를 이스케이프한 JSON 본문
//! - [`json_config`], [`query_config`], [`path_config`]: 본문 크기 제한(10 KiB)과
//!   추출 실패를 400 [`AppError`]로 바꾸는 설정

use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use serde_json::{Map, Value};

use crate::core::errors::AppError;
use crate::utils::string_utils::escape_html;

/// JSON 본문 최대 크기
pub const JSON_BODY_LIMIT: usize = 10 * 1024;

/// 정리된 JSON 본문
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedJson(pub Value);

impl SanitizedJson {
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// 정리한 뒤 DTO로 역직렬화
    pub fn parse<T: serde::de::DeserializeOwned>(self) -> Result<T, AppError> {
        serde_json::from_value(self.0).map_err(|e| AppError::ValidationError(format!("Invalid input data. {}", e)))
    }
}

impl FromRequest for SanitizedJson {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let json = web::Json::<Value>::from_request(req, payload);
        Box::pin(async move {
            let web::Json(value) = json.await?;
            Ok(SanitizedJson(sanitize_value(value)))
        })
    }
}

/// 연산자 키 제거 + 문자열 HTML 이스케이프 (재귀)
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| !is_operator_key(key))
                .map(|(key, value)| (key, sanitize_value(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::String(s) => Value::String(escape_html(&s)),
        other => other,
    }
}

fn is_operator_key(key: &str) -> bool {
    key.starts_with('$') || key.contains('.')
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req| AppError::ValidationError(format!("Invalid JSON body: {}", err)).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(format!("Invalid query string: {}", err)).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(format!("Invalid path parameter: {}", err)).into())
}
