//! 애플리케이션 상태
//!
//! 서비스 인스턴스를 시작 시 한 번 조립해 `web::Data<AppState>`로 모든 워커가 공유합니다.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AuthSettings;
use crate::core::errors::AppResult;
use crate::db::DocumentStore;
use crate::domain::entities::bookings::booking::Booking;
use crate::domain::entities::reviews::review::Review;
use crate::domain::entities::tours::tour::Tour;
use crate::repositories::{Repository, UserRepository};
use crate::services::auth::AuthService;
use crate::services::bookings::BookingService;
use crate::services::email::Mailer;
use crate::services::images::ImageService;
use crate::services::payments::PaymentGateway;
use crate::services::reviews::ReviewService;
use crate::services::tours::TourService;
use crate::services::users::UserService;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub tours: TourService,
    pub reviews: ReviewService,
    pub bookings: BookingService,
    pub images: ImageService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        mailer: Arc<dyn Mailer>,
        payments: Arc<dyn PaymentGateway>,
        settings: AuthSettings,
        public_dir: PathBuf,
    ) -> Self {
        let users = UserRepository::new(store.clone());
        let tours = Repository::<Tour>::new(store.clone());
        let reviews = Repository::<Review>::new(store.clone());
        let bookings = Repository::<Booking>::new(store);

        let review_service = ReviewService::new(reviews, tours.clone(), users.clone());

        Self {
            auth: AuthService::new(users.clone(), mailer, settings),
            users: UserService::new(users.clone()),
            tours: TourService::new(tours.clone(), users.clone(), review_service.clone()),
            reviews: review_service,
            bookings: BookingService::new(bookings, tours, users, payments),
            images: ImageService::new(public_dir),
        }
    }

    /// 모든 컬렉션의 인덱스 생성 (유니크 제약 포함)
    pub async fn create_indexes(store: &Arc<dyn DocumentStore>) -> AppResult<()> {
        UserRepository::new(store.clone()).create_indexes().await?;
        Repository::<Tour>::new(store.clone()).create_indexes().await?;
        Repository::<Review>::new(store.clone()).create_indexes().await?;
        Repository::<Booking>::new(store.clone()).create_indexes().await?;

        log::info!("✅ 인덱스 준비 완료");
        Ok(())
    }
}
