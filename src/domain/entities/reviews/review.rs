use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::db::IndexSpec;
use crate::domain::entities::Entity;

/// 투어 리뷰
///
/// 사용자 한 명은 투어 하나에 리뷰를 하나만 남길 수 있습니다 (`tour` + `user` 유니크).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub review: String,

    pub rating: f64,

    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,

    pub tour: ObjectId,

    pub user: ObjectId,
}

impl Entity for Review {
    const COLLECTION: &'static str = "reviews";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn indexes() -> Vec<IndexSpec> {
        vec![IndexSpec::unique("tour_user_unique", &["tour", "user"])]
    }
}
