//! 투어 생성/수정 입력

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::errors::AppResult;
use crate::domain::dto::{to_bson_datetime, to_utc};
use crate::domain::entities::tours::tour::{DEFAULT_RATING_AVERAGE, Difficulty, Location, Tour};
use crate::repositories::parse_object_id;
use crate::utils::string_utils::slugify;

/// 투어 입력
///
/// 생성 시에는 본문 그대로, 수정 시에는 현재 값 위에 부분 패치를 합친 결과로 만들어집니다.
/// 어느 쪽이든 전체가 다시 검증되므로 할인가 규칙은 수정에도 적용됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_price_discount"))]
pub struct TourInput {
    #[validate(custom(function = "validate_tour_name"))]
    pub name: String,

    #[validate(range(min = 1, message = "A Tour must have Duration"))]
    pub duration: u32,

    #[validate(range(min = 1, message = "A Tour must have Group size"))]
    pub max_group_size: u32,

    pub difficulty: Difficulty,

    #[serde(default = "default_rating_average")]
    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1.0 and 5.0"))]
    pub rating_average: f64,

    #[serde(default)]
    pub rating_quantity: u32,

    #[validate(range(exclusive_min = 0.0, message = "Tour must have Price"))]
    pub price: f64,

    #[serde(default)]
    pub price_discount: Option<f64>,

    #[validate(custom(function = "validate_summary"))]
    pub summary: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image_cover: Option<String>,

    #[serde(default)]
    #[validate(length(max = 3, message = "A Tour can have at most 3 images"))]
    pub images: Vec<String>,

    #[serde(default)]
    pub start_dates: Vec<DateTime<Utc>>,

    #[serde(default)]
    pub secret_tour: bool,

    #[serde(default)]
    #[validate(custom(function = "validate_point"))]
    pub start_location: Option<Location>,

    #[serde(default)]
    #[validate(custom(function = "validate_points"))]
    pub locations: Vec<Location>,

    /// 가이드 사용자 ID (hex)
    #[serde(default)]
    pub guides: Vec<String>,
}

fn default_rating_average() -> f64 {
    DEFAULT_RATING_AVERAGE
}

impl From<&Tour> for TourInput {
    fn from(tour: &Tour) -> Self {
        Self {
            name: tour.name.clone(),
            duration: tour.duration,
            max_group_size: tour.max_group_size,
            difficulty: tour.difficulty,
            rating_average: tour.rating_average,
            rating_quantity: tour.rating_quantity,
            price: tour.price,
            price_discount: tour.price_discount,
            summary: tour.summary.clone(),
            description: tour.description.clone(),
            image_cover: tour.image_cover.clone(),
            images: tour.images.clone(),
            start_dates: tour.start_dates.iter().copied().map(to_utc).collect(),
            secret_tour: tour.secret_tour,
            start_location: tour.start_location.clone(),
            locations: tour.locations.clone(),
            guides: tour.guides.iter().map(|id| id.to_hex()).collect(),
        }
    }
}

impl TourInput {
    /// 엔티티로 변환합니다. `existing`이 있으면 ID와 생성 시각을 유지합니다.
    ///
    /// slug는 항상 현재 이름에서 다시 계산됩니다.
    pub fn into_tour(self, existing: Option<&Tour>) -> AppResult<Tour> {
        let guides = self
            .guides
            .iter()
            .map(|id| parse_object_id(id))
            .collect::<AppResult<Vec<_>>>()?;
        let name = self.name.trim().to_string();

        Ok(Tour {
            id: existing.and_then(|tour| tour.id),
            slug: slugify(&name),
            name,
            duration: self.duration,
            max_group_size: self.max_group_size,
            difficulty: self.difficulty,
            rating_average: self.rating_average,
            rating_quantity: self.rating_quantity,
            price: self.price,
            price_discount: self.price_discount,
            summary: self.summary.trim().to_string(),
            description: self.description.map(|d| d.trim().to_string()),
            image_cover: self.image_cover,
            images: self.images,
            created_at: existing
                .map(|tour| tour.created_at)
                .unwrap_or_else(mongodb::bson::DateTime::now),
            start_dates: self.start_dates.into_iter().map(to_bson_datetime).collect(),
            secret_tour: self.secret_tour,
            start_location: self.start_location,
            locations: self.locations,
            guides,
        })
    }
}

fn validate_tour_name(name: &str) -> Result<(), ValidationError> {
    let length = name.trim().chars().count();
    if length < 10 {
        return Err(ValidationError::new("name_too_short")
            .with_message("Minimum length of Tour name should be 10 character".into()));
    }
    if length > 40 {
        return Err(ValidationError::new("name_too_long")
            .with_message("Maximum length of Tour name should be 40 character".into()));
    }
    Ok(())
}

fn validate_summary(summary: &str) -> Result<(), ValidationError> {
    if summary.trim().is_empty() {
        return Err(ValidationError::new("summary_required").with_message("A Tour must have a Summary".into()));
    }
    Ok(())
}

fn validate_point(location: &Location) -> Result<(), ValidationError> {
    if location.kind != "Point" {
        return Err(ValidationError::new("location_type").with_message("Location type must be Point".into()));
    }
    match (location.longitude(), location.latitude()) {
        (Some(lng), Some(lat)) if location.coordinates.len() == 2
            && (-180.0..=180.0).contains(&lng)
            && (-90.0..=90.0).contains(&lat) =>
        {
            Ok(())
        }
        _ => Err(ValidationError::new("location_coordinates")
            .with_message("Location coordinates must be [longitude, latitude]".into())),
    }
}

fn validate_points(locations: &Vec<Location>) -> Result<(), ValidationError> {
    locations.iter().try_for_each(validate_point)
}

/// 할인가는 정가보다 낮아야 합니다.
fn validate_price_discount(input: &TourInput) -> Result<(), ValidationError> {
    if let Some(discount) = input.price_discount {
        if discount >= input.price {
            return Err(ValidationError::new("price_discount")
                .with_message(format!("Discount Price ({}) has to be less than Price", discount).into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(body: serde_json::Value) -> TourInput {
        serde_json::from_value(body).unwrap()
    }

    fn base() -> serde_json::Value {
        json!({
            "name": "The Forest Hiker",
            "duration": 5,
            "maxGroupSize": 25,
            "difficulty": "easy",
            "price": 397,
            "summary": "Breathtaking hike through the Canadian Banff National Park",
        })
    }

    #[test]
    fn test_valid_tour_input() {
        let tour = input(base());
        assert!(tour.validate().is_ok());
        assert_eq!(tour.rating_average, DEFAULT_RATING_AVERAGE);
    }

    #[test]
    fn test_discount_must_be_below_price() {
        let mut body = base();
        body["priceDiscount"] = json!(397);
        let err = input(body).validate().unwrap_err();
        let message = crate::core::errors::format_validation_errors(&err);
        assert!(message.contains("Discount Price (397) has to be less than Price"));

        let mut body = base();
        body["priceDiscount"] = json!(500);
        assert!(input(body).validate().is_err());

        let mut body = base();
        body["priceDiscount"] = json!(100);
        assert!(input(body).validate().is_ok());
    }

    #[test]
    fn test_into_tour_derives_slug_and_keeps_identity() {
        let mut body = base();
        body["guides"] = json!(["5c8a22c62f8fb814b56fa18b"]);
        let tour = input(body.clone()).into_tour(None).unwrap();
        assert_eq!(tour.slug, "the-forest-hiker");
        assert_eq!(tour.guides.len(), 1);
        assert!(tour.id.is_none());

        let mut existing = tour.clone();
        existing.id = Some(mongodb::bson::oid::ObjectId::new());
        body["name"] = json!("The Forest Hiker Deluxe");
        let updated = input(body).into_tour(Some(&existing)).unwrap();
        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.created_at, existing.created_at);
        assert_eq!(updated.slug, "the-forest-hiker-deluxe");
    }

    #[test]
    fn test_into_tour_rejects_malformed_guide_id() {
        let mut body = base();
        body["guides"] = json!(["not-an-id"]);
        assert!(input(body).into_tour(None).is_err());
    }

    #[test]
    fn test_name_length_bounds() {
        let mut body = base();
        body["name"] = json!("Short");
        assert!(input(body).validate().is_err());

        let mut body = base();
        body["name"] = json!("A tour name that is far too long to be accepted");
        assert!(input(body).validate().is_err());
    }

    #[test]
    fn test_rating_and_price_ranges() {
        let mut body = base();
        body["ratingAverage"] = json!(5.5);
        assert!(input(body).validate().is_err());

        let mut body = base();
        body["price"] = json!(0);
        assert!(input(body).validate().is_err());
    }

    #[test]
    fn test_unknown_difficulty_is_rejected_by_deserialization() {
        let mut body = base();
        body["difficulty"] = json!("extreme");
        assert!(serde_json::from_value::<TourInput>(body).is_err());
    }

    #[test]
    fn test_start_location_must_be_point() {
        let mut body = base();
        body["startLocation"] = json!({ "type": "Point", "coordinates": [-115.57, 51.17] });
        assert!(input(body).validate().is_ok());

        let mut body = base();
        body["startLocation"] = json!({ "type": "Point", "coordinates": [200.0, 51.17] });
        assert!(input(body).validate().is_err());
    }
}
