//! 예약과 결제 세션
//!
//! 결제 완료 후 돌아오는 `/?tour=&user=&price=` 쿼리로 예약을 만듭니다.
//! 결제 제공자의 웹훅 검증 없이 쿼리만 믿는 방식이라 운영용 결제 확인으로는 안전하지 않습니다.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::core::errors::{AppError, AppResult};
use crate::db::{Condition, DocumentQuery};
use crate::domain::dto::bookings::{BookingInput, BookingResponse, BookingReturnQuery, CheckoutSession, TourSummary};
use crate::domain::dto::users::UserSummary;
use crate::domain::entities::Entity;
use crate::domain::entities::bookings::booking::Booking;
use crate::domain::entities::tours::tour::Tour;
use crate::domain::entities::users::user::User;
use crate::repositories::{Repository, UserRepository};
use crate::services::crud::CrudResource;
use crate::services::payments::{CheckoutRequest, PaymentGateway};

#[derive(Clone)]
pub struct BookingService {
    bookings: Repository<Booking>,
    tours: Repository<Tour>,
    users: UserRepository,
    payments: Arc<dyn PaymentGateway>,
}

impl BookingService {
    pub fn new(
        bookings: Repository<Booking>,
        tours: Repository<Tour>,
        users: UserRepository,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            bookings,
            tours,
            users,
            payments,
        }
    }

    /// 투어 결제 세션 생성
    pub async fn checkout(&self, tour_id: &str, user: &User, base_url: &str) -> AppResult<CheckoutSession> {
        let tour = self
            .tours
            .find_by_id(tour_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No tour found with that ID".to_string()))?;

        let request = CheckoutRequest {
            tour_id: tour.id_string(),
            tour_name: tour.name.clone(),
            tour_slug: tour.slug.clone(),
            tour_summary: tour.summary.clone(),
            price: tour.price,
            user_id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            customer_email: user.email.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        };

        let session = self.payments.create_checkout_session(&request).await?;
        log::info!("💳 결제 세션 생성: {} ({} / {})", session.id, tour.name, user.email);
        Ok(session)
    }

    /// 결제 후 돌아온 쿼리로 예약 생성. 세 값이 다 없으면 `None`
    pub async fn create_from_return(&self, query: &BookingReturnQuery) -> AppResult<Option<Booking>> {
        let Some((tour, user, price)) = query.parts() else {
            return Ok(None);
        };

        let price: f64 = price
            .trim()
            .parse()
            .map_err(|_| AppError::ValidationError(format!("Invalid price: {}", price)))?;

        let input = BookingInput {
            tour: tour.to_string(),
            user: user.to_string(),
            price,
            paid: true,
        };
        validator::Validate::validate(&input)?;

        let booking = self.bookings.insert(input.into_booking(None)?).await?;
        log::info!("🧾 예약 생성: tour={} user={} price={}", tour, user, price);
        Ok(Some(booking))
    }

    /// 사용자가 예약한 투어 ID (중복 제거)
    pub async fn booked_tour_ids(&self, user: &User) -> AppResult<Vec<ObjectId>> {
        let Some(user_id) = user.id else {
            return Ok(Vec::new());
        };

        let mut ids: Vec<ObjectId> = self
            .bookings
            .find(DocumentQuery::new().filter(Condition::eq("user", user_id)))
            .await?
            .into_iter()
            .map(|booking| booking.tour)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[async_trait]
impl CrudResource for BookingService {
    type Entity = Booking;
    type Input = BookingInput;
    type Output = BookingResponse;

    fn repository(&self) -> &Repository<Booking> {
        &self.bookings
    }

    fn build(&self, input: BookingInput, existing: Option<&Booking>) -> AppResult<Booking> {
        input.into_booking(existing)
    }

    /// 투어 이름과 사용자 요약을 채움
    async fn present_many(&self, bookings: Vec<Booking>) -> AppResult<Vec<BookingResponse>> {
        let mut tour_ids: Vec<ObjectId> = bookings.iter().map(|booking| booking.tour).collect();
        tour_ids.sort();
        tour_ids.dedup();
        let mut user_ids: Vec<ObjectId> = bookings.iter().map(|booking| booking.user).collect();
        user_ids.sort();
        user_ids.dedup();

        let tours: HashMap<ObjectId, TourSummary> = self
            .tours
            .find_by_ids(&tour_ids)
            .await?
            .iter()
            .filter_map(|tour| tour.id.map(|id| (id, TourSummary::from(tour))))
            .collect();
        let users: HashMap<ObjectId, UserSummary> = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .iter()
            .filter_map(|user| user.id.map(|id| (id, UserSummary::from(user))))
            .collect();

        Ok(bookings
            .into_iter()
            .map(|booking| {
                let tour = tours.get(&booking.tour).cloned();
                let user = users.get(&booking.user).cloned();
                BookingResponse::new(booking, tour, user)
            })
            .collect())
    }
}
