//! # Domain Entities Module
//!
//! 저장소에 그대로 저장되는 문서 타입입니다. 필드 이름은 camelCase로 저장됩니다.
//!
//! | 엔티티 | 컬렉션 | 기본 조회 조건 |
//! |--------|--------|----------------|
//! | [`User`](users::user::User) | `users` | `active != false` |
//! | [`Tour`](tours::tour::Tour) | `tours` | `secretTour != true` |
//! | [`Review`](reviews::review::Review) | `reviews` | - |
//! | [`Booking`](bookings::booking::Booking) | `bookings` | - |
//!
//! 엔티티는 응답으로 직접 직렬화하지 않습니다. 응답은 항상 `dto::*::response` 타입을 거칩니다.

pub mod users;
pub mod tours;
pub mod reviews;
pub mod bookings;

use mongodb::bson::oid::ObjectId;
use serde::{Serialize, de::DeserializeOwned};

use crate::db::{Condition, IndexSpec};

/// 컬렉션에 저장되는 문서 타입
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Option<ObjectId>;

    fn set_id(&mut self, id: ObjectId);

    /// 시작 시 생성할 인덱스
    fn indexes() -> Vec<IndexSpec> {
        Vec::new()
    }

    /// 모든 조회에 자동으로 붙는 조건
    fn default_conditions() -> Vec<Condition> {
        Vec::new()
    }

    fn id_string(&self) -> String {
        self.id().map(|id| id.to_hex()).unwrap_or_default()
    }
}
