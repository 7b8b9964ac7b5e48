//! 리뷰 관리와 투어 평점 집계
//!
//! 리뷰가 생성/수정/삭제될 때마다 해당 투어의 `ratingQuantity`, `ratingAverage`를 다시 계산합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};

use crate::core::errors::AppResult;
use crate::db::{Condition, DocumentQuery, SortKey};
use crate::domain::dto::reviews::{ReviewInput, ReviewResponse};
use crate::domain::dto::users::UserSummary;
use crate::domain::entities::reviews::review::Review;
use crate::domain::entities::tours::tour::{DEFAULT_RATING_AVERAGE, Tour};
use crate::repositories::{Repository, UserRepository};
use crate::services::crud::CrudResource;

#[derive(Clone)]
pub struct ReviewService {
    reviews: Repository<Review>,
    tours: Repository<Tour>,
    users: UserRepository,
}

impl ReviewService {
    pub fn new(reviews: Repository<Review>, tours: Repository<Tour>, users: UserRepository) -> Self {
        Self { reviews, tours, users }
    }

    /// 투어 상세 화면/응답에 붙는 리뷰 목록 (최신순)
    pub async fn reviews_for_tour(&self, tour_id: ObjectId) -> AppResult<Vec<ReviewResponse>> {
        let reviews = self
            .reviews
            .find(
                DocumentQuery::new()
                    .filter(Condition::eq("tour", tour_id))
                    .sort_by(SortKey::desc("createdAt")),
            )
            .await?;
        self.present_many(reviews).await
    }

    /// 투어의 리뷰 수와 평균 평점을 다시 계산해 두 필드만 갱신
    ///
    /// 리뷰가 하나도 없으면 기본값(0, 4.8)으로 돌아갑니다.
    pub async fn recalculate_tour_rating(&self, tour_id: ObjectId) -> AppResult<()> {
        let reviews = self
            .reviews
            .find(DocumentQuery::new().filter(Condition::eq("tour", tour_id)))
            .await?;

        let (quantity, average) = rating_summary(&reviews);
        let fields = doc! {
            "ratingQuantity": i64::from(quantity),
            "ratingAverage": average,
        };
        if !self.tours.set_fields(tour_id, fields).await? {
            log::debug!("평점 재계산 대상 투어 없음: {}", tour_id);
            return Ok(());
        }

        log::info!("⭐ 투어 평점 갱신: {} ({}개, 평균 {})", tour_id, quantity, average);
        Ok(())
    }
}

/// (리뷰 수, 소수 첫째 자리로 반올림한 평균)
pub fn rating_summary(reviews: &[Review]) -> (u32, f64) {
    if reviews.is_empty() {
        return (0, DEFAULT_RATING_AVERAGE);
    }
    let sum: f64 = reviews.iter().map(|review| review.rating).sum();
    let average = sum / reviews.len() as f64;
    (reviews.len() as u32, (average * 10.0).round() / 10.0)
}

#[async_trait]
impl CrudResource for ReviewService {
    type Entity = Review;
    type Input = ReviewInput;
    type Output = ReviewResponse;

    fn repository(&self) -> &Repository<Review> {
        &self.reviews
    }

    fn build(&self, input: ReviewInput, existing: Option<&Review>) -> AppResult<Review> {
        input.into_review(existing)
    }

    async fn present_many(&self, reviews: Vec<Review>) -> AppResult<Vec<ReviewResponse>> {
        let mut author_ids: Vec<ObjectId> = reviews.iter().map(|review| review.user).collect();
        author_ids.sort();
        author_ids.dedup();

        let authors: HashMap<ObjectId, UserSummary> = self
            .users
            .find_by_ids(&author_ids)
            .await?
            .iter()
            .filter_map(|user| user.id.map(|id| (id, UserSummary::from(user))))
            .collect();

        Ok(reviews
            .into_iter()
            .map(|review| {
                let author = authors.get(&review.user).cloned();
                ReviewResponse::new(review, author)
            })
            .collect())
    }

    async fn after_write(&self, review: &Review) -> AppResult<()> {
        self.recalculate_tour_rating(review.tour).await
    }

    /// 다른 투어로 옮겨진 리뷰는 이전 투어도 다시 계산
    async fn after_update(&self, previous: &Review, review: &Review) -> AppResult<()> {
        if previous.tour != review.tour {
            self.recalculate_tour_rating(previous.tour).await?;
        }
        self.recalculate_tour_rating(review.tour).await
    }

    async fn after_delete(&self, review: &Review) -> AppResult<()> {
        self.recalculate_tour_rating(review.tour).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::entities::Entity;
    use crate::db::{DocumentStore, MemoryStore};
    use crate::domain::entities::tours::tour::Difficulty;
    use crate::domain::entities::users::user::User;
    use serde_json::json;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: ReviewService,
        tours: Repository<Tour>,
        tour: Tour,
        users: Vec<User>,
    }

    fn tour_named(name: &str) -> Tour {
        Tour {
            id: None,
            name: name.into(),
            slug: crate::utils::string_utils::slugify(name),
            duration: 10,
            max_group_size: 15,
            difficulty: Difficulty::Medium,
            rating_average: DEFAULT_RATING_AVERAGE,
            rating_quantity: 0,
            price: 1497.0,
            price_discount: None,
            summary: "Breathing in Nature in America's most spectacular National Parks".into(),
            description: None,
            image_cover: None,
            images: vec![],
            created_at: mongodb::bson::DateTime::now(),
            start_dates: vec![],
            secret_tour: false,
            start_location: None,
            locations: vec![],
            guides: vec![],
        }
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let tours = Repository::<Tour>::new(store.clone());
        let users = UserRepository::new(store.clone());
        let reviews = Repository::<Review>::new(store.clone());
        reviews.create_indexes().await.unwrap();

        let tour = tours.insert(tour_named("The Park Camper")).await.unwrap();

        let mut saved = Vec::new();
        for (name, email) in [("Ann Lee", "ann@example.com"), ("Bob Kim", "bob@example.com")] {
            saved.push(users.insert(User::new(name.into(), email.into(), "hash".into())).await.unwrap());
        }

        Fixture {
            store,
            service: ReviewService::new(reviews, tours.clone(), users),
            tours,
            tour,
            users: saved,
        }
    }

    fn body(fixture: &Fixture, user: usize, rating: f64) -> serde_json::Value {
        json!({
            "review": "Great tour",
            "rating": rating,
            "tour": fixture.tour.id_string(),
            "user": fixture.users[user].id_string(),
        })
    }

    #[test]
    fn test_rating_summary_rounds_to_one_decimal() {
        assert_eq!(rating_summary(&[]), (0, DEFAULT_RATING_AVERAGE));

        let review = |rating| Review {
            id: None,
            review: "ok".into(),
            rating,
            created_at: mongodb::bson::DateTime::now(),
            tour: ObjectId::new(),
            user: ObjectId::new(),
        };
        assert_eq!(rating_summary(&[review(4.0), review(5.0), review(5.0)]), (3, 4.7));
    }

    #[actix_web::test]
    async fn test_review_writes_recompute_tour_rating() {
        let fixture = fixture().await;
        let tour_id = fixture.tour.id.unwrap();

        let first = fixture.service.create(body(&fixture, 0, 5.0)).await.unwrap();
        fixture.service.create(body(&fixture, 1, 4.0)).await.unwrap();

        let tour = fixture.tours.find_by_object_id(tour_id).await.unwrap().unwrap();
        assert_eq!(tour.rating_quantity, 2);
        assert_eq!(tour.rating_average, 4.5);

        fixture.service.update(&first.id, json!({ "rating": 2 })).await.unwrap();
        let tour = fixture.tours.find_by_object_id(tour_id).await.unwrap().unwrap();
        assert_eq!(tour.rating_average, 3.0);

        fixture.service.delete(&first.id).await.unwrap();
        let tour = fixture.tours.find_by_object_id(tour_id).await.unwrap().unwrap();
        assert_eq!(tour.rating_quantity, 1);
        assert_eq!(tour.rating_average, 4.0);
    }

    #[actix_web::test]
    async fn test_moving_review_recomputes_both_tours() {
        let fixture = fixture().await;
        let first_tour = fixture.tour.id.unwrap();
        let second = fixture.tours.insert(tour_named("The Sea Explorer")).await.unwrap();

        let review = fixture.service.create(body(&fixture, 0, 5.0)).await.unwrap();
        fixture
            .service
            .update(&review.id, json!({ "tour": second.id_string() }))
            .await
            .unwrap();

        let tour = fixture.tours.find_by_object_id(first_tour).await.unwrap().unwrap();
        assert_eq!(tour.rating_quantity, 0);
        assert_eq!(tour.rating_average, DEFAULT_RATING_AVERAGE);

        let tour = fixture.tours.find_by_object_id(second.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(tour.rating_quantity, 1);
        assert_eq!(tour.rating_average, 5.0);
    }

    #[actix_web::test]
    async fn test_rating_update_writes_only_rating_fields() {
        let fixture = fixture().await;
        let tour_id = fixture.tour.id.unwrap();
        fixture
            .store
            .update_fields(Tour::COLLECTION, tour_id, doc! { "price": 997.0, "legacyCode": "PC-01" })
            .await
            .unwrap();

        fixture.service.create(body(&fixture, 0, 4.0)).await.unwrap();

        let stored = fixture
            .store
            .find_one(Tour::COLLECTION, &[Condition::eq("_id", tour_id)])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.get_f64("price").unwrap(), 997.0);
        assert_eq!(stored.get_str("legacyCode").unwrap(), "PC-01");
        assert_eq!(stored.get_f64("ratingAverage").unwrap(), 4.0);
    }

    #[actix_web::test]
    async fn test_last_review_removal_resets_defaults() {
        let fixture = fixture().await;
        let review = fixture.service.create(body(&fixture, 0, 1.0)).await.unwrap();
        fixture.service.delete(&review.id).await.unwrap();

        let tour = fixture.tours.find_by_object_id(fixture.tour.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(tour.rating_quantity, 0);
        assert_eq!(tour.rating_average, DEFAULT_RATING_AVERAGE);
    }

    #[actix_web::test]
    async fn test_one_review_per_user_and_tour() {
        let fixture = fixture().await;
        fixture.service.create(body(&fixture, 0, 5.0)).await.unwrap();

        let err = fixture.service.create(body(&fixture, 0, 3.0)).await.unwrap_err();
        assert!(matches!(err, crate::core::errors::AppError::ValidationError(_)));
    }

    #[actix_web::test]
    async fn test_reviews_are_populated_with_author() {
        let fixture = fixture().await;
        fixture.service.create(body(&fixture, 1, 4.0)).await.unwrap();

        let reviews = fixture.service.reviews_for_tour(fixture.tour.id.unwrap()).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].user.as_ref().unwrap().name, "Bob Kim");
    }
}
