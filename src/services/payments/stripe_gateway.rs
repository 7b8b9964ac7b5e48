//! Stripe Checkout 세션 생성
//!
//! SDK 없이 `POST /v1/checkout/sessions`를 form-encoded 본문으로 호출합니다.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::StripeConfig;
use crate::core::errors::{AppError, AppResult};
use crate::domain::dto::bookings::CheckoutSession;

/// 결제 페이지를 만들 때 필요한 정보
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub tour_id: String,
    pub tour_name: String,
    pub tour_slug: String,
    pub tour_summary: String,
    pub price: f64,
    pub user_id: String,
    pub customer_email: String,
    /// `http://host:port` 형태, 끝에 `/` 없음
    pub base_url: String,
}

impl CheckoutRequest {
    /// 결제 성공 후 돌아올 주소. 예약은 이 쿼리로 만들어집니다.
    pub fn success_url(&self) -> String {
        format!(
            "{}/?tour={}&user={}&price={}",
            self.base_url,
            urlencoding::encode(&self.tour_id),
            urlencoding::encode(&self.user_id),
            self.price
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/tour/{}", self.base_url, urlencoding::encode(&self.tour_slug))
    }

    /// 최소 화폐 단위(센트)
    pub fn unit_amount(&self) -> i64 {
        (self.price * 100.0).round() as i64
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("payment_method_types[0]", "card".to_string()),
            ("mode", "payment".to_string()),
            ("success_url", self.success_url()),
            ("cancel_url", self.cancel_url()),
            ("customer_email", self.customer_email.clone()),
            ("client_reference_id", self.tour_id.clone()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            ("line_items[0][price_data][unit_amount]", self.unit_amount().to_string()),
            ("line_items[0][price_data][product_data][name]", format!("{} Tour", self.tour_name)),
            ("line_items[0][price_data][product_data][description]", self.tour_summary.clone()),
            ("line_items[0][quantity]", "1".to_string()),
        ]
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession>;
}

pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: String,
}

impl StripeGateway {
    pub fn new(secret_key: String, api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(StripeConfig::secret_key(), StripeConfig::api_base())
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession> {
        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&request.form())
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Stripe 요청 실패: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(AppError::ExternalServiceError(format!("Stripe 응답 {}: {}", status, message)));
        }

        let session = response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Stripe 응답 파싱 실패: {}", e)))?;

        log::info!("💳 체크아웃 세션 생성: {} (tour {})", session.id, request.tour_id);
        Ok(session)
    }
}
