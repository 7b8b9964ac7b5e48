//! 메일 전송 어댑터
//!
//! 개발 환경은 SMTP(Mailtrap 등), 운영 환경은 SendGrid HTTP API를 사용합니다.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::json;

use crate::config::{EmailConfig, Environment};
use crate::core::errors::{AppError, AppResult};

/// 보낼 메일 한 통
#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> AppResult<()>;
}

/// 환경에 맞는 메일러 선택
///
/// 운영 환경이고 `SENDGRID_API_KEY`가 있으면 SendGrid, 아니면 SMTP
pub fn mailer_from_env() -> Arc<dyn Mailer> {
    match EmailConfig::sendgrid_api_key() {
        Some(api_key) if Environment::current().is_production() => {
            log::info!("📧 SendGrid 메일러 사용");
            Arc::new(SendGridMailer::new(api_key, EmailConfig::from_address()))
        }
        _ => {
            log::info!("📧 SMTP 메일러 사용: {}:{}", EmailConfig::smtp_host(), EmailConfig::smtp_port());
            Arc::new(SmtpMailer::from_env())
        }
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn from_env() -> Self {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(EmailConfig::smtp_host())
            .port(EmailConfig::smtp_port());

        if let (Some(username), Some(password)) = (EmailConfig::smtp_username(), EmailConfig::smtp_password()) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Self {
            transport: builder.build(),
            from: EmailConfig::from_address(),
        }
    }
}

fn parse_mailbox(address: &str) -> AppResult<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| AppError::ExternalServiceError(format!("잘못된 메일 주소 {}: {}", address, e)))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: Email) -> AppResult<()> {
        let message = Message::builder()
            .from(parse_mailbox(&self.from)?)
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(email.text, email.html))
            .map_err(|e| AppError::ExternalServiceError(format!("메일 생성 실패: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("SMTP 전송 실패: {}", e)))?;

        log::debug!("SMTP 메일 전송 완료: {}", email.to);
        Ok(())
    }
}

const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

pub struct SendGridMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl SendGridMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
        }
    }

    fn payload(&self, email: &Email) -> serde_json::Value {
        let from = match self.from.parse::<Mailbox>() {
            Ok(mailbox) => json!({ "email": mailbox.email.to_string(), "name": mailbox.name }),
            Err(_) => json!({ "email": self.from }),
        };

        json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": from,
            "subject": email.subject,
            "content": [
                { "type": "text/plain", "value": email.text },
                { "type": "text/html", "value": email.html },
            ],
        })
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: Email) -> AppResult<()> {
        let response = self
            .client
            .post(SENDGRID_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&self.payload(&email))
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("SendGrid 요청 실패: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError(format!("SendGrid 응답 {}: {}", status, body)));
        }

        log::debug!("SendGrid 메일 전송 완료: {}", email.to);
        Ok(())
    }
}
