//! 회원가입, 로그인, 비밀번호 관련 요청

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// 회원가입 요청
///
/// 본문에 `role`이 있어도 무시됩니다. 가입 계정은 항상 `user` 역할입니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_signup_passwords"))]
pub struct SignupRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub name: String,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,

    pub password_confirm: String,
}

/// 로그인 요청
///
/// 필드 누락은 역직렬화 에러가 아니라 400 `Please provide Email and Password`로 처리하기 위해
/// `Option`으로 받습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    /// 비어 있지 않은 (email, password) 쌍
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let email = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((email, password))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
}

/// 재설정 토큰으로 새 비밀번호 지정
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_reset_passwords"))]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,

    pub password_confirm: String,
}

/// 로그인 사용자의 비밀번호 변경
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_passwords"))]
pub struct UpdatePasswordRequest {
    pub current_password: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,

    pub password_confirm: String,
}

fn passwords_match(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::new("passwords_mismatch")
            .with_message("Passwords are not the same!".into()));
    }
    Ok(())
}

fn validate_signup_passwords(req: &SignupRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

fn validate_reset_passwords(req: &ResetPasswordRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

fn validate_update_passwords(req: &UpdatePasswordRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

pub(crate) fn validate_user_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name_required").with_message("Please tell us your name!".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            name: "Laura Wilson".into(),
            email: "laura@example.com".into(),
            password: password.into(),
            password_confirm: confirm.into(),
        }
    }

    #[test]
    fn test_signup_validation() {
        assert!(signup("pass1234", "pass1234").validate().is_ok());
        assert!(signup("short", "short").validate().is_err());
        assert!(signup("pass1234", "pass12345").validate().is_err());

        let mut bad_email = signup("pass1234", "pass1234");
        bad_email.email = "not-an-email".into();
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_signup_accepts_camel_case_body() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"name":"Ann","email":"ann@example.com","password":"pass1234","passwordConfirm":"pass1234","role":"admin"}"#,
        )
        .unwrap();
        assert_eq!(req.password_confirm, "pass1234");
    }

    #[test]
    fn test_login_credentials() {
        let full = LoginRequest {
            email: Some("ann@example.com".into()),
            password: Some("pass1234".into()),
        };
        assert_eq!(full.credentials(), Some(("ann@example.com", "pass1234")));

        let missing = LoginRequest {
            email: Some("ann@example.com".into()),
            password: None,
        };
        assert!(missing.credentials().is_none());
        assert!(LoginRequest::default().credentials().is_none());
    }
}
