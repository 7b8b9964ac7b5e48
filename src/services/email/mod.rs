//! 트랜잭션 메일 (가입 환영, 비밀번호 재설정)

pub mod mailer;
pub mod templates;

pub use mailer::{Email, Mailer, SendGridMailer, SmtpMailer, mailer_from_env};
