//! # Data Transfer Objects (DTO) Module
//!
//! 요청 본문(`request`)과 응답 본문(`response`) 타입입니다.
//!
//! - 요청 DTO는 `validator::Validate`로 검증하고, 엔티티로 변환될 때 정규화(trim, 소문자 등)됩니다.
//! - 응답 DTO는 엔티티에서 `From`/생성자로 만들어지며 비밀번호 해시 같은 내부 필드를 갖지 않습니다.
//! - JSON 필드 이름은 camelCase입니다.

pub mod users;
pub mod tours;
pub mod reviews;
pub mod bookings;

use chrono::{DateTime, Utc};

/// BSON 시각을 응답용 chrono 시각으로 변환
pub fn to_utc(value: mongodb::bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

/// 응답용 chrono 시각을 BSON 시각으로 변환
pub fn to_bson_datetime(value: DateTime<Utc>) -> mongodb::bson::DateTime {
    mongodb::bson::DateTime::from_millis(value.timestamp_millis())
}
