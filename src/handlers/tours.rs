//! # 투어 핸들러
//!
//! 목록/단건/통계/위치 조회는 공개, 작성/수정/삭제는 `admin`, `lead-guide`,
//! 월별 일정은 여기에 `guide`까지 허용합니다.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde_json::json;

use crate::core::errors::AppError;
use crate::core::state::AppState;
use crate::domain::entities::users::user::Role;
use crate::handlers::factory;
use crate::middlewares::{AuthMiddleware, SanitizedJson};
use crate::services::tours::TOP_FIVE_CHEAP_QUERY;
use crate::utils::geo::{DistanceUnit, LatLng};
use crate::utils::multipart::{self, UploadLimits};
use crate::utils::string_utils::escape_html;

/// `images` 필드 최대 파일 수
const MAX_TOUR_IMAGES: usize = 3;

#[get("")]
pub async fn get_all_tours(
    state: web::Data<AppState>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    factory::get_all(&state.tours, &query, vec![]).await
}

/// 평점 높고 저렴한 5개
#[get("/top-5-cheap")]
pub async fn top_five_cheap(
    state: web::Data<AppState>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let mut pairs = query.into_inner();
    pairs.extend(TOP_FIVE_CHEAP_QUERY.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    factory::get_all(&state.tours, &pairs, vec![]).await
}

#[get("/tour-stats")]
pub async fn tour_stats(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let stats = state.tours.stats().await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": stats,
    })))
}

#[get(
    "/monthly-plan/{year}",
    wrap = "AuthMiddleware::required_with_roles(vec![Role::Admin, Role::LeadGuide, Role::Guide])"
)]
pub async fn monthly_plan(state: web::Data<AppState>, year: web::Path<i32>) -> Result<HttpResponse, AppError> {
    let plan = state.tours.monthly_plan(year.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "length": plan.len(),
        "data": plan,
    })))
}

#[get("/tours-within/{distance}/center/{latlng}/unit/{unit}")]
pub async fn tours_within(
    state: web::Data<AppState>,
    path: web::Path<(f64, String, String)>,
) -> Result<HttpResponse, AppError> {
    let (distance, latlng, unit) = path.into_inner();
    let center = LatLng::parse(&latlng)?;

    let tours = state.tours.within(distance, center, DistanceUnit::parse(&unit)).await?;
    Ok(HttpResponse::Ok().json(factory::list_envelope(&tours)))
}

#[get("/distances/{latlng}/unit/{unit}")]
pub async fn distances(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (latlng, unit) = path.into_inner();
    let center = LatLng::parse(&latlng)?;

    let rows = state.tours.distances(center, DistanceUnit::parse(&unit)).await?;
    Ok(HttpResponse::Ok().json(factory::list_envelope(&rows)))
}

#[post("", wrap = "AuthMiddleware::required_with_roles(vec![Role::Admin, Role::LeadGuide])")]
pub async fn create_tour(state: web::Data<AppState>, body: SanitizedJson) -> Result<HttpResponse, AppError> {
    factory::create_one(&state.tours, body.into_inner()).await
}

#[get("/{id}")]
pub async fn get_tour(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::get_one(&state.tours, &id).await
}

#[patch("/{id}", wrap = "AuthMiddleware::required_with_roles(vec![Role::Admin, Role::LeadGuide])")]
pub async fn update_tour(
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: SanitizedJson,
) -> Result<HttpResponse, AppError> {
    factory::update_one(&state.tours, &id, body.into_inner()).await
}

#[delete("/{id}", wrap = "AuthMiddleware::required_with_roles(vec![Role::Admin, Role::LeadGuide])")]
pub async fn delete_tour(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::delete_one(&state.tours, &id).await
}

/// 표지(`imageCover`, 1개)와 사진(`images`, 최대 3개) 업로드
///
/// 폼의 다른 텍스트 필드도 같은 수정으로 함께 적용됩니다.
#[patch("/{id}/images", wrap = "AuthMiddleware::required_with_roles(vec![Role::Admin, Role::LeadGuide])")]
pub async fn upload_tour_images(
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let tour = state.tours.find_entity(&id).await?;
    let form = multipart::collect(payload, UploadLimits::TOUR_IMAGES).await?;

    let covers: Vec<Vec<u8>> = form.files_named("imageCover").map(|file| file.data.clone()).collect();
    let images: Vec<Vec<u8>> = form.files_named("images").map(|file| file.data.clone()).collect();
    if covers.len() > 1 || images.len() > MAX_TOUR_IMAGES {
        return Err(AppError::ValidationError(format!(
            "Too many files: at most 1 imageCover and {} images",
            MAX_TOUR_IMAGES
        )));
    }

    let saved = state
        .images
        .save_tour_images(&tour.id.map(|id| id.to_hex()).unwrap_or_default(), covers.into_iter().next(), images)
        .await?;

    let fields = form
        .fields
        .iter()
        .map(|(key, value)| (key.clone(), escape_html(value)))
        .filter(|(key, _)| !key.starts_with('$') && !key.contains('.'))
        .collect();

    let updated = state.tours.update_with_images(&id, saved, fields).await?;
    Ok(HttpResponse::Ok().json(factory::data_envelope(updated)))
}
