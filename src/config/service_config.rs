//! 외부 서비스(메일, 결제) 설정

use std::env;

/// 메일 발송 설정
///
/// 운영 환경에서 `SENDGRID_API_KEY`가 있으면 SendGrid API를, 그 외에는 SMTP를 사용합니다.
pub struct EmailConfig;

impl EmailConfig {
    /// 발신 주소 (`Natours <hello@natours.io>` 형태 가능)
    pub fn from_address() -> String {
        env::var("EMAIL_FROM").unwrap_or_else(|_| "Natours <hello@natours.io>".to_string())
    }

    pub fn smtp_host() -> String {
        env::var("EMAIL_HOST").unwrap_or_else(|_| "localhost".to_string())
    }

    pub fn smtp_port() -> u16 {
        env::var("EMAIL_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2525)
    }

    pub fn smtp_username() -> Option<String> {
        env::var("EMAIL_USERNAME").ok().filter(|v| !v.is_empty())
    }

    pub fn smtp_password() -> Option<String> {
        env::var("EMAIL_PASSWORD").ok().filter(|v| !v.is_empty())
    }

    pub fn sendgrid_api_key() -> Option<String> {
        env::var("SENDGRID_API_KEY").ok().filter(|v| !v.is_empty())
    }
}

/// Stripe 설정
pub struct StripeConfig;

impl StripeConfig {
    pub fn secret_key() -> String {
        env::var("STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            log::warn!("STRIPE_SECRET_KEY not set, checkout sessions will fail");
            String::new()
        })
    }

    pub fn api_base() -> String {
        env::var("STRIPE_API_BASE").unwrap_or_else(|_| "https://api.stripe.com".to_string())
    }
}
