use std::str::FromStr;

use chrono::{Duration, Utc};
use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::db::{Condition, IndexSpec};
use crate::domain::entities::Entity;

/// 재설정 토큰 유효 시간 (분)
pub const PASSWORD_RESET_TTL_MINUTES: i64 = 10;

pub const DEFAULT_PHOTO: &str = "default.jpg";

/// 사용자 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Role {
    #[default]
    User,
    Guide,
    LeadGuide,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Guide => "guide",
            Role::LeadGuide => "lead-guide",
            Role::Admin => "admin",
        }
    }

}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "guide" => Ok(Role::Guide),
            "lead-guide" => Ok(Role::LeadGuide),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unsupported role: {}", s)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 사용자 엔티티
///
/// `password`는 bcrypt 해시입니다. 해시, 재설정 토큰, `active` 플래그는
/// [`UserResponse`](crate::domain::dto::users::response::UserResponse)로 변환할 때 제거됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,

    pub email: String,

    #[serde(default = "default_photo")]
    pub photo: String,

    #[serde(default)]
    pub role: Role,

    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<DateTime>,

    /// sha256(hex) 된 재설정 토큰
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_reset_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_reset_expires: Option<DateTime>,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_photo() -> String {
    DEFAULT_PHOTO.to_string()
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: None,
            name,
            email: email.to_lowercase(),
            photo: default_photo(),
            role: Role::User,
            password: password_hash,
            password_changed_at: None,
            password_reset_token: None,
            password_reset_expires: None,
            active: true,
        }
    }

    /// 이메일 인사말에 쓰는 이름 첫 단어
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    /// 비밀번호 교체
    ///
    /// 변경 시각을 1초 앞당겨 기록합니다. 같은 초에 발급되는 새 토큰의 `iat`이
    /// 변경 시각보다 앞서는 것으로 판정되지 않게 하기 위함입니다.
    pub fn set_password(&mut self, password_hash: String) {
        self.password = password_hash;
        let changed_at = Utc::now() - Duration::seconds(1);
        self.password_changed_at = Some(DateTime::from_millis(changed_at.timestamp_millis()));
    }

    /// 토큰 발급(`iat`, 초) 이후에 비밀번호가 바뀌었는지
    pub fn changed_password_after(&self, issued_at: i64) -> bool {
        match self.password_changed_at {
            Some(changed_at) => changed_at.timestamp_millis() / 1000 > issued_at,
            None => false,
        }
    }

    /// 재설정 토큰 생성
    ///
    /// 평문 토큰(32바이트 hex)을 반환하고, 엔티티에는 해시와 만료 시각만 남깁니다.
    pub fn create_password_reset_token(&mut self) -> String {
        let raw: [u8; 32] = rand::random();
        let reset_token = hex::encode(raw);

        let expires = Utc::now() + Duration::minutes(PASSWORD_RESET_TTL_MINUTES);
        self.password_reset_token = Some(hash_reset_token(&reset_token));
        self.password_reset_expires = Some(DateTime::from_millis(expires.timestamp_millis()));

        reset_token
    }

    pub fn clear_password_reset(&mut self) {
        self.password_reset_token = None;
        self.password_reset_expires = None;
    }
}

/// 재설정 토큰 해시 (sha256, hex)
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn indexes() -> Vec<IndexSpec> {
        vec![IndexSpec::unique("email_unique", &["email"])]
    }

    /// 탈퇴(비활성화)한 사용자는 어떤 조회에도 나타나지 않습니다.
    fn default_conditions() -> Vec<Condition> {
        vec![Condition::ne("active", false)]
    }
}
