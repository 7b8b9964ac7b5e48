use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::dto::to_utc;
use crate::domain::dto::users::UserSummary;
use crate::domain::entities::reviews::review::Review;

/// 리뷰 응답. 작성자는 이름과 사진으로 채워집니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub review: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub tour: String,
    /// 작성자가 비활성화되었으면 `null`
    pub user: Option<UserSummary>,
}

impl ReviewResponse {
    pub fn new(review: Review, user: Option<UserSummary>) -> Self {
        Self {
            id: review.id.map(|id| id.to_hex()).unwrap_or_default(),
            review: review.review,
            rating: review.rating,
            created_at: to_utc(review.created_at),
            tour: review.tour.to_hex(),
            user,
        }
    }
}
