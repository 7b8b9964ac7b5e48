//! 테스트 공용 픽스처: 기록용 메일러, 가짜 결제사, 메모리 저장소 기반 앱

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Error, web};
use async_trait::async_trait;
use chrono::Duration;
use serde_json::{Value, json};

use crate::config::AuthSettings;
use crate::core::errors::{AppError, AppResult};
use crate::core::state::AppState;
use crate::db::{DocumentStore, MemoryStore};
use crate::domain::dto::bookings::CheckoutSession;
use crate::domain::entities::users::user::{Role, User};
use crate::middlewares::{json_config, path_config, query_config};
use crate::repositories::UserRepository;
use crate::routes::{configure_api_routes, configure_site_routes};
use crate::services::email::{Email, Mailer};
use crate::services::payments::{CheckoutRequest, PaymentGateway};

pub const TEST_PASSWORD: &str = "pass1234";

pub fn test_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
        jwt_expires_in: Duration::days(90),
        cookie_expires_in_days: 90,
        secure_cookies: false,
        bcrypt_cost: 4,
    }
}

/// 보낸 메일을 기억하는 메일러. `fail_next` 뒤 한 번은 실패
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
    fail_next: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> AppResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::ExternalServiceError("smtp unavailable".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}

/// 요청을 기록하고 `cs_test_` 세션을 돌려주는 결제사
#[derive(Default)]
pub struct FakePaymentGateway {
    last: Mutex<Option<CheckoutRequest>>,
}

impl FakePaymentGateway {
    pub fn last_request(&self) -> Option<CheckoutRequest> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession> {
        if let Ok(mut last) = self.last.lock() {
            *last = Some(request.clone());
        }
        Ok(CheckoutSession {
            id: format!("cs_test_{}", request.tour_id),
            url: Some(format!("https://checkout.stripe.test/pay/{}", request.tour_id)),
            customer_email: Some(request.customer_email.clone()),
            client_reference_id: Some(request.tour_id.clone()),
            amount_total: Some(request.unit_amount()),
        })
    }
}

/// 메모리 저장소 위에 조립한 애플리케이션 상태
pub struct TestContext {
    pub state: AppState,
    pub store: Arc<dyn DocumentStore>,
    pub mailer: Arc<RecordingMailer>,
    pub payments: Arc<FakePaymentGateway>,
}

impl TestContext {
    pub async fn new() -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        AppState::create_indexes(&store).await.unwrap();

        let mailer = Arc::new(RecordingMailer::default());
        let payments = Arc::new(FakePaymentGateway::default());
        let public_dir = std::env::temp_dir().join(format!("natours-test-{}", mongodb::bson::oid::ObjectId::new()));

        let state = AppState::new(
            store.clone(),
            mailer.clone(),
            payments.clone(),
            test_settings(),
            public_dir,
        );

        Self {
            state,
            store,
            mailer,
            payments,
        }
    }

    /// `main`과 같은 라우트 구성 (요청 제한 제외)
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<ServiceRequest, Config = (), Response = ServiceResponse, Error = Error, InitError = ()> + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .service(web::scope("/api").configure(configure_api_routes))
            .configure(configure_site_routes)
    }

    /// 가입 후 역할을 지정한 사용자와 세션 토큰
    pub async fn seed_user(&self, name: &str, email: &str, role: Role) -> (User, String) {
        let request = crate::domain::dto::users::SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            password_confirm: TEST_PASSWORD.to_string(),
        };
        let session = self.state.auth.signup(request, "http://localhost").await.unwrap();

        let mut user = session.user;
        if user.role != role {
            user.role = role;
            UserRepository::new(self.store.clone()).save(&user).await.unwrap();
        }
        (user, session.token)
    }
}

/// 유효한 투어 생성 본문
pub fn tour_body(name: &str, price: f64) -> Value {
    json!({
        "name": name,
        "duration": 5,
        "maxGroupSize": 25,
        "difficulty": "easy",
        "price": price,
        "summary": "Breathtaking hike through the Canadian Banff National Park",
        "startDates": ["2021-04-25T09:00:00Z", "2021-07-20T09:00:00Z"],
        "startLocation": {
            "type": "Point",
            "coordinates": [-115.570154, 51.178456],
            "description": "Banff, CAN",
        },
    })
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
