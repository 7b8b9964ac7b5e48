use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::reviews::review::Review;
use crate::repositories::parse_object_id;

/// 리뷰 생성/수정 입력
///
/// 중첩 경로(`/tours/{tourId}/reviews`)에서는 `tour`, 로그인 사용자로 `user`가 채워지므로
/// 본문에서는 선택입니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewInput {
    #[validate(custom(function = "validate_review_text"))]
    pub review: String,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1.0 and 5.0"))]
    pub rating: f64,

    #[serde(default)]
    pub tour: Option<String>,

    #[serde(default)]
    pub user: Option<String>,
}

impl From<&Review> for ReviewInput {
    fn from(review: &Review) -> Self {
        Self {
            review: review.review.clone(),
            rating: review.rating,
            tour: Some(review.tour.to_hex()),
            user: Some(review.user.to_hex()),
        }
    }
}

impl ReviewInput {
    pub fn into_review(self, existing: Option<&Review>) -> AppResult<Review> {
        let tour = self
            .tour
            .as_deref()
            .ok_or_else(|| AppError::ValidationError("Review must belong to a tour".to_string()))
            .and_then(parse_object_id)?;
        let user = self
            .user
            .as_deref()
            .ok_or_else(|| AppError::ValidationError("Review must belong to a user".to_string()))
            .and_then(parse_object_id)?;

        Ok(Review {
            id: existing.and_then(|review| review.id),
            review: self.review.trim().to_string(),
            rating: self.rating,
            created_at: existing
                .map(|review| review.created_at)
                .unwrap_or_else(mongodb::bson::DateTime::now),
            tour,
            user,
        })
    }
}

fn validate_review_text(review: &str) -> Result<(), ValidationError> {
    if review.trim().is_empty() {
        return Err(ValidationError::new("review_required").with_message("Review can not be empty!".into()));
    }
    Ok(())
}
