use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::db::{Condition, IndexKind, IndexSpec};
use crate::domain::entities::Entity;

pub const DEFAULT_RATING_AVERAGE: f64 = 4.8;

/// 투어 난이도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Difficult => "difficult",
        }
    }
}

/// GeoJSON Point + 부가 정보
///
/// `coordinates`는 GeoJSON 순서 그대로 `[경도, 위도]`입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type", default = "point_type")]
    pub kind: String,

    pub coordinates: Vec<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 일정 중 몇째 날 방문지인지 (`locations`에만 사용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

fn point_type() -> String {
    "Point".to_string()
}

impl Location {
    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.first().copied()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.get(1).copied()
    }
}

/// 투어 엔티티
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,

    /// 저장할 때마다 `name`에서 다시 계산
    #[serde(default)]
    pub slug: String,

    pub duration: u32,

    pub max_group_size: u32,

    pub difficulty: Difficulty,

    #[serde(default = "default_rating_average")]
    pub rating_average: f64,

    #[serde(default)]
    pub rating_quantity: u32,

    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_discount: Option<f64>,

    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_cover: Option<String>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,

    #[serde(default)]
    pub start_dates: Vec<DateTime>,

    #[serde(default)]
    pub secret_tour: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<Location>,

    #[serde(default)]
    pub locations: Vec<Location>,

    /// 가이드 사용자 참조
    #[serde(default)]
    pub guides: Vec<ObjectId>,
}

fn default_rating_average() -> f64 {
    DEFAULT_RATING_AVERAGE
}

impl Tour {
    pub fn duration_weeks(&self) -> f64 {
        self.duration as f64 / 7.0
    }
}

impl Entity for Tour {
    const COLLECTION: &'static str = "tours";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn indexes() -> Vec<IndexSpec> {
        vec![
            IndexSpec::unique("name_unique", &["name"]),
            IndexSpec::plain(
                "price_rating",
                &[("price", IndexKind::Ascending), ("ratingAverage", IndexKind::Descending)],
            ),
            IndexSpec::plain("slug", &[("slug", IndexKind::Ascending)]),
            IndexSpec::plain("start_location_2dsphere", &[("startLocation", IndexKind::Sphere2d)]),
        ]
    }

    /// 비공개 투어는 목록, 상세, 집계 어디에도 노출하지 않습니다.
    fn default_conditions() -> Vec<Condition> {
        vec![Condition::ne("secretTour", true)]
    }
}
