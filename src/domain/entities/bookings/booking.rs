use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::db::{IndexKind, IndexSpec};
use crate::domain::entities::Entity;

/// 예약: 사용자, 투어, 결제 금액
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub tour: ObjectId,

    pub user: ObjectId,

    pub price: f64,

    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,

    #[serde(default = "default_paid")]
    pub paid: bool,
}

fn default_paid() -> bool {
    true
}

impl Booking {
    pub fn new(tour: ObjectId, user: ObjectId, price: f64) -> Self {
        Self {
            id: None,
            tour,
            user,
            price,
            created_at: DateTime::now(),
            paid: true,
        }
    }
}

impl Entity for Booking {
    const COLLECTION: &'static str = "bookings";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn indexes() -> Vec<IndexSpec> {
        vec![IndexSpec::plain("user", &[("user", IndexKind::Ascending)])]
    }
}
