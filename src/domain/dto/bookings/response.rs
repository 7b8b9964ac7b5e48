use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::dto::to_utc;
use crate::domain::dto::users::UserSummary;
use crate::domain::entities::bookings::booking::Booking;
use crate::domain::entities::tours::tour::Tour;

/// 예약에 붙는 투어 요약
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourSummary {
    pub id: String,
    pub name: String,
}

impl From<&Tour> for TourSummary {
    fn from(tour: &Tour) -> Self {
        Self {
            id: tour.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: tour.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,
    pub tour: Option<TourSummary>,
    pub user: Option<UserSummary>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub paid: bool,
}

impl BookingResponse {
    pub fn new(booking: Booking, tour: Option<TourSummary>, user: Option<UserSummary>) -> Self {
        Self {
            id: booking.id.map(|id| id.to_hex()).unwrap_or_default(),
            tour,
            user,
            price: booking.price,
            created_at: to_utc(booking.created_at),
            paid: booking.paid,
        }
    }
}

/// 결제사 체크아웃 세션
///
/// 클라이언트는 `url`(또는 `id`)로 결제 페이지로 이동합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
}
