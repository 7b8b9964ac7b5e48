//! 계정 정보 수정 요청

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::auth_request::validate_user_name;
use crate::domain::entities::users::user::{DEFAULT_PHOTO, Role, User};
use crate::utils::string_utils::escape_html;

/// 본인 정보 수정 (`/update-me`, 계정 화면 폼)
///
/// 비밀번호 필드는 받기만 하고 서비스에서 거부합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    #[validate(custom(function = "validate_user_name"))]
    #[serde(default)]
    pub name: Option<String>,

    #[validate(email(message = "Please provide a valid email"))]
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(default, skip_serializing)]
    pub password_confirm: Option<String>,
}

impl UpdateMeRequest {
    /// 폼/multipart 입력의 `<`, `>` 이스케이프. JSON 본문은 `SanitizedJson`이 처리
    pub fn escaped(self) -> Self {
        Self {
            name: self.name.as_deref().map(escape_html),
            email: self.email.as_deref().map(escape_html),
            ..self
        }
    }

    pub fn touches_password(&self) -> bool {
        self.password.is_some() || self.password_confirm.is_some()
    }
}

/// 관리자용 사용자 수정 입력
///
/// 비밀번호는 이 경로로 바꿀 수 없습니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserAdminInput {
    #[validate(custom(function = "validate_user_name"))]
    pub name: String,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[serde(default)]
    pub role: Role,

    #[serde(default = "default_photo")]
    pub photo: String,
}

fn default_photo() -> String {
    DEFAULT_PHOTO.to_string()
}

impl From<&User> for UserAdminInput {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            photo: user.photo.clone(),
        }
    }
}
