//! 메일 본문 렌더링 (askama)
//!
//! 각 메일은 HTML과 텍스트 템플릿을 한 쌍으로 가집니다.

use askama::Template;

use super::mailer::Email;
use crate::core::errors::{AppResult, ErrorContext};
use crate::domain::entities::users::user::User;

pub const WELCOME_SUBJECT: &str = "Welcome to the Natours Family!";
pub const PASSWORD_RESET_SUBJECT: &str = "Password Reset!";

#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeHtml<'a> {
    subject: &'a str,
    first_name: &'a str,
    url: &'a str,
}

#[derive(Template)]
#[template(path = "email/welcome.txt")]
struct WelcomeText<'a> {
    first_name: &'a str,
    url: &'a str,
}

#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    subject: &'a str,
    first_name: &'a str,
    url: &'a str,
}

#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetText<'a> {
    first_name: &'a str,
    url: &'a str,
}

fn render(template: &impl Template) -> AppResult<String> {
    template.render().context("메일 템플릿 렌더링 실패")
}

impl Email {
    /// 가입 환영 메일. `url`은 계정 페이지 주소
    pub fn welcome(user: &User, url: &str) -> AppResult<Self> {
        let first_name = user.first_name();
        Ok(Self {
            to: user.email.clone(),
            subject: WELCOME_SUBJECT.to_string(),
            html: render(&WelcomeHtml {
                subject: WELCOME_SUBJECT,
                first_name,
                url,
            })?,
            text: render(&WelcomeText { first_name, url })?,
        })
    }

    /// 비밀번호 재설정 메일. `url`은 평문 토큰이 포함된 재설정 주소
    pub fn password_reset(user: &User, url: &str) -> AppResult<Self> {
        let first_name = user.first_name();
        Ok(Self {
            to: user.email.clone(),
            subject: PASSWORD_RESET_SUBJECT.to_string(),
            html: render(&PasswordResetHtml {
                subject: PASSWORD_RESET_SUBJECT,
                first_name,
                url,
            })?,
            text: render(&PasswordResetText { first_name, url })?,
        })
    }
}
