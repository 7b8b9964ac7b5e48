use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::errors::AppResult;
use crate::domain::entities::bookings::booking::Booking;
use crate::repositories::parse_object_id;

/// 관리자용 예약 생성/수정 입력
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingInput {
    pub tour: String,

    pub user: String,

    #[validate(range(exclusive_min = 0.0, message = "Booking must have a price"))]
    pub price: f64,

    #[serde(default = "default_paid")]
    pub paid: bool,
}

fn default_paid() -> bool {
    true
}

impl From<&Booking> for BookingInput {
    fn from(booking: &Booking) -> Self {
        Self {
            tour: booking.tour.to_hex(),
            user: booking.user.to_hex(),
            price: booking.price,
            paid: booking.paid,
        }
    }
}

impl BookingInput {
    pub fn into_booking(self, existing: Option<&Booking>) -> AppResult<Booking> {
        let mut booking = Booking::new(parse_object_id(&self.tour)?, parse_object_id(&self.user)?, self.price);
        booking.paid = self.paid;
        if let Some(existing) = existing {
            booking.id = existing.id;
            booking.created_at = existing.created_at;
        }
        Ok(booking)
    }
}

/// 결제 완료 후 `/`로 돌아올 때의 쿼리 (`?tour=..&user=..&price=..`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingReturnQuery {
    pub tour: Option<String>,
    pub user: Option<String>,
    pub price: Option<String>,
}

impl BookingReturnQuery {
    /// 세 값이 모두 있을 때만 `(tour, user, price)`
    pub fn parts(&self) -> Option<(&str, &str, &str)> {
        Some((self.tour.as_deref()?, self.user.as_deref()?, self.price.as_deref()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_query_requires_all_parts() {
        let query = BookingReturnQuery {
            tour: Some("t".into()),
            user: Some("u".into()),
            price: None,
        };
        assert!(query.parts().is_none());

        let query = BookingReturnQuery {
            price: Some("497".into()),
            ..query
        };
        assert_eq!(query.parts(), Some(("t", "u", "497")));
    }

    #[test]
    fn test_price_must_be_positive() {
        let input = BookingInput {
            tour: mongodb::bson::oid::ObjectId::new().to_hex(),
            user: mongodb::bson::oid::ObjectId::new().to_hex(),
            price: 0.0,
            paid: true,
        };
        assert!(input.validate().is_err());
    }
}
