//! # 공통 CRUD 핸들러
//!
//! [`CrudResource`]를 구현한 서비스 하나로 목록/단건/생성/수정/삭제 응답을 만듭니다.
//! 리소스별 핸들러는 경로 파라미터와 범위 조건만 정해서 이 함수들을 호출합니다.
//!
//! | 동작 | 상태 | 본문 |
//! |------|------|------|
//! | 목록 | 200 | `{status, results, data: {data: [...]}}` |
//! | 단건/수정 | 200 | `{status, data: {data}}` |
//! | 생성 | 201 | `{status, data: {data}}` |
//! | 삭제 | 204 | 없음 |

use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::{Value, json};

use crate::core::errors::AppError;
use crate::db::Condition;
use crate::domain::models::query::ApiFeatures;
use crate::services::crud::CrudResource;

/// `{status: "success", data: {data}}`
pub fn data_envelope(data: impl Serialize) -> Value {
    json!({
        "status": "success",
        "data": { "data": data },
    })
}

/// `{status: "success", results, data: {data: [...]}}`
pub fn list_envelope<T: Serialize>(rows: &[T]) -> Value {
    json!({
        "status": "success",
        "results": rows.len(),
        "data": { "data": rows },
    })
}

pub async fn get_all<R: CrudResource>(
    resource: &R,
    query: &[(String, String)],
    scope: Vec<Condition>,
) -> Result<HttpResponse, AppError> {
    let features = ApiFeatures::parse(query)?;
    let rows = resource.list(&features, scope).await?;
    Ok(HttpResponse::Ok().json(list_envelope(&rows)))
}

pub async fn get_one<R: CrudResource>(resource: &R, id: &str) -> Result<HttpResponse, AppError> {
    let doc = resource.get(id).await?;
    Ok(HttpResponse::Ok().json(data_envelope(doc)))
}

pub async fn create_one<R: CrudResource>(resource: &R, body: Value) -> Result<HttpResponse, AppError> {
    let doc = resource.create(body).await?;
    Ok(HttpResponse::Created().json(data_envelope(doc)))
}

pub async fn update_one<R: CrudResource>(resource: &R, id: &str, patch: Value) -> Result<HttpResponse, AppError> {
    let doc = resource.update(id, patch).await?;
    Ok(HttpResponse::Ok().json(data_envelope(doc)))
}

pub async fn delete_one<R: CrudResource>(resource: &R, id: &str) -> Result<HttpResponse, AppError> {
    resource.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
