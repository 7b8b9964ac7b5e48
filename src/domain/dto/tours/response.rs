//! 투어 응답과 집계 결과

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::dto::reviews::ReviewResponse;
use crate::domain::dto::to_utc;
use crate::domain::dto::users::UserResponse;
use crate::domain::entities::tours::tour::{Difficulty, Location, Tour};

/// 투어 응답
///
/// `createdAt`, `secretTour`는 노출하지 않고, `durationWeeks`를 추가합니다.
/// `guides`는 사용자 정보로 채워진 상태이며, `reviews`는 단건 조회에서만 채웁니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub duration: u32,
    pub duration_weeks: f64,
    pub max_group_size: u32,
    pub difficulty: Difficulty,
    pub rating_average: f64,
    pub rating_quantity: u32,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_discount: Option<f64>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_cover: Option<String>,
    pub images: Vec<String>,
    pub start_dates: Vec<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_location: Option<Location>,
    pub locations: Vec<Location>,
    pub guides: Vec<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<ReviewResponse>>,
}

impl TourResponse {
    pub fn new(tour: Tour, guides: Vec<UserResponse>) -> Self {
        let duration_weeks = tour.duration_weeks();
        Self {
            id: tour.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: tour.name,
            slug: tour.slug,
            duration: tour.duration,
            duration_weeks,
            max_group_size: tour.max_group_size,
            difficulty: tour.difficulty,
            rating_average: tour.rating_average,
            rating_quantity: tour.rating_quantity,
            price: tour.price,
            price_discount: tour.price_discount,
            summary: tour.summary,
            description: tour.description,
            image_cover: tour.image_cover,
            images: tour.images,
            start_dates: tour.start_dates.into_iter().map(to_utc).collect(),
            start_location: tour.start_location,
            locations: tour.locations,
            guides,
            reviews: None,
        }
    }

    pub fn with_reviews(mut self, reviews: Vec<ReviewResponse>) -> Self {
        self.reviews = Some(reviews);
        self
    }
}

/// 난이도별 통계 (`/tour-stats`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourStats {
    /// 대문자 난이도 (`EASY`, `MEDIUM`, `DIFFICULT`)
    #[serde(rename = "_id")]
    pub difficulty: String,
    pub num_tours: u32,
    pub num_rating: u32,
    pub avg_rating: f64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// 월별 출발 일정 (`/monthly-plan/{year}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPlan {
    pub month: u32,
    pub num_tour_starts: u32,
    pub name_tours_starts: Vec<String>,
}

/// 기준점으로부터의 거리 (`/distances/...`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourDistance {
    pub id: String,
    pub name: String,
    pub distance: f64,
}
