//! 투어 관리, 통계, 위치 기반 조회
//!
//! 모든 조회는 비밀 투어(`secretTour == true`)를 제외합니다. 통계와 거리 계산도
//! 같은 저장소 조회 결과 위에서 계산되므로 비밀 투어는 집계에 들어가지 않습니다.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{Datelike, TimeZone, Utc};
use mongodb::bson::oid::ObjectId;
use serde_json::{Map, Value, json};

use crate::core::errors::{AppError, AppResult};
use crate::db::{Condition, DocumentQuery};
use crate::domain::dto::to_utc;
use crate::domain::dto::tours::{MonthlyPlan, TourDistance, TourInput, TourResponse, TourStats};
use crate::domain::dto::users::UserResponse;
use crate::domain::entities::Entity;
use crate::domain::entities::tours::tour::Tour;
use crate::repositories::{Repository, UserRepository};
use crate::services::crud::CrudResource;
use crate::services::images::TourImages;
use crate::services::reviews::ReviewService;
use crate::utils::geo::{DistanceUnit, LatLng, angular_distance, haversine_meters};

/// `/monthly-plan`이 돌려주는 최대 월 수
pub const MONTHLY_PLAN_LIMIT: usize = 7;

/// `/top-5-cheap`에 덧붙는 쿼리
pub const TOP_FIVE_CHEAP_QUERY: [(&str, &str); 3] = [
    ("limit", "5"),
    ("sort", "-ratingAverage,price"),
    ("fields", "name,price,ratingAverage,summary,difficulty"),
];

#[derive(Clone)]
pub struct TourService {
    tours: Repository<Tour>,
    users: UserRepository,
    reviews: ReviewService,
}

impl TourService {
    pub fn new(tours: Repository<Tour>, users: UserRepository, reviews: ReviewService) -> Self {
        Self { tours, users, reviews }
    }

    async fn all_visible(&self) -> AppResult<Vec<Tour>> {
        self.tours.find(DocumentQuery::new()).await
    }

    /// 화면용 slug 조회 (가이드, 리뷰 포함)
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<TourResponse>> {
        match self.tours.find_one(vec![Condition::eq("slug", slug)]).await? {
            Some(tour) => Ok(Some(self.present_detail(tour).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<TourResponse>> {
        let tours = self.tours.find_by_ids(ids).await?;
        self.present_many(tours).await
    }

    pub async fn find_entity(&self, id: &str) -> AppResult<Tour> {
        self.tours
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("No tour found with that ID".to_string()))
    }

    /// 화면 개요용 전체 목록 (최신순)
    pub async fn overview(&self) -> AppResult<Vec<TourResponse>> {
        let tours = self
            .tours
            .find(DocumentQuery {
                sort: self.default_sort(),
                ..DocumentQuery::new()
            })
            .await?;
        self.present_many(tours).await
    }

    /// 난이도별 통계. 최저가 내림차순
    pub async fn stats(&self) -> AppResult<Vec<TourStats>> {
        let mut groups: BTreeMap<String, Vec<Tour>> = BTreeMap::new();
        for tour in self.all_visible().await? {
            groups
                .entry(tour.difficulty.as_str().to_uppercase())
                .or_default()
                .push(tour);
        }

        let mut stats: Vec<TourStats> = groups
            .into_iter()
            .map(|(difficulty, tours)| {
                let count = tours.len() as f64;
                let prices = tours.iter().map(|tour| tour.price);
                TourStats {
                    difficulty,
                    num_tours: tours.len() as u32,
                    num_rating: tours.iter().map(|tour| tour.rating_quantity).sum(),
                    avg_rating: tours.iter().map(|tour| tour.rating_average).sum::<f64>() / count,
                    avg_price: prices.clone().sum::<f64>() / count,
                    min_price: prices.clone().fold(f64::INFINITY, f64::min),
                    max_price: prices.fold(f64::NEG_INFINITY, f64::max),
                }
            })
            .collect();

        stats.sort_by(|a, b| b.min_price.total_cmp(&a.min_price));
        Ok(stats)
    }

    /// 해당 연도의 월별 출발 횟수와 투어 이름. 출발 횟수 내림차순 최대 7개월
    pub async fn monthly_plan(&self, year: i32) -> AppResult<Vec<MonthlyPlan>> {
        let (Some(start), Some(end)) = (
            Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single(),
            Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single(),
        ) else {
            return Err(AppError::ValidationError(format!("Invalid year: {}", year)));
        };

        let mut months: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for tour in self.all_visible().await? {
            for date in tour.start_dates.iter().copied().map(to_utc) {
                if date >= start && date < end {
                    months.entry(date.month()).or_default().push(tour.name.clone());
                }
            }
        }

        let mut plan: Vec<MonthlyPlan> = months
            .into_iter()
            .map(|(month, names)| MonthlyPlan {
                month,
                num_tour_starts: names.len() as u32,
                name_tours_starts: names,
            })
            .collect();

        plan.sort_by(|a, b| b.num_tour_starts.cmp(&a.num_tour_starts).then(a.month.cmp(&b.month)));
        plan.truncate(MONTHLY_PLAN_LIMIT);
        Ok(plan)
    }

    /// 출발지가 중심점에서 `distance` 안에 있는 투어
    pub async fn within(&self, distance: f64, center: LatLng, unit: DistanceUnit) -> AppResult<Vec<TourResponse>> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(AppError::ValidationError("Please provide a valid distance".to_string()));
        }
        let radius = distance / unit.earth_radius();

        let tours: Vec<Tour> = self
            .all_visible()
            .await?
            .into_iter()
            .filter(|tour| start_point(tour).is_some_and(|point| angular_distance(center, point) <= radius))
            .collect();

        self.present_many(tours).await
    }

    /// 모든 투어 출발지까지의 거리. 가까운 순
    pub async fn distances(&self, center: LatLng, unit: DistanceUnit) -> AppResult<Vec<TourDistance>> {
        let mut distances: Vec<TourDistance> = self
            .all_visible()
            .await?
            .into_iter()
            .filter_map(|tour| {
                let point = start_point(&tour)?;
                Some(TourDistance {
                    id: tour.id_string(),
                    name: tour.name,
                    distance: haversine_meters(center, point) * unit.meter_multiplier(),
                })
            })
            .collect();

        distances.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(distances)
    }

    /// 업로드된 이미지 파일 이름과 폼의 나머지 필드를 합쳐 일반 수정으로 적용
    pub async fn update_with_images(
        &self,
        id: &str,
        images: TourImages,
        fields: HashMap<String, String>,
    ) -> AppResult<TourResponse> {
        let mut patch: Map<String, Value> = fields
            .into_iter()
            .map(|(key, value)| (key, form_value(&value)))
            .collect();

        if let Some(cover) = images.image_cover {
            patch.insert("imageCover".to_string(), json!(cover));
        }
        if !images.images.is_empty() {
            patch.insert("images".to_string(), json!(images.images));
        }

        self.update(id, Value::Object(patch)).await
    }
}

fn start_point(tour: &Tour) -> Option<LatLng> {
    let location = tour.start_location.as_ref()?;
    Some(LatLng {
        lat: location.latitude()?,
        lng: location.longitude()?,
    })
}

/// multipart 텍스트 필드 값을 JSON 값으로. 숫자/불리언은 그대로 해석합니다.
fn form_value(raw: &str) -> Value {
    serde_json::from_str::<Value>(raw)
        .ok()
        .filter(|value| value.is_number() || value.is_boolean())
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

#[async_trait]
impl CrudResource for TourService {
    type Entity = Tour;
    type Input = TourInput;
    type Output = TourResponse;

    fn repository(&self) -> &Repository<Tour> {
        &self.tours
    }

    fn build(&self, input: TourInput, existing: Option<&Tour>) -> AppResult<Tour> {
        input.into_tour(existing)
    }

    /// 가이드를 사용자 정보로 채움. 비활성 사용자는 빠집니다.
    async fn present_many(&self, tours: Vec<Tour>) -> AppResult<Vec<TourResponse>> {
        let mut guide_ids: Vec<ObjectId> = tours.iter().flat_map(|tour| tour.guides.iter().copied()).collect();
        guide_ids.sort();
        guide_ids.dedup();

        let guides: HashMap<ObjectId, UserResponse> = self
            .users
            .find_by_ids(&guide_ids)
            .await?
            .iter()
            .filter_map(|user| user.id.map(|id| (id, UserResponse::from(user))))
            .collect();

        Ok(tours
            .into_iter()
            .map(|tour| {
                let tour_guides = tour.guides.iter().filter_map(|id| guides.get(id).cloned()).collect();
                TourResponse::new(tour, tour_guides)
            })
            .collect())
    }

    async fn present_detail(&self, tour: Tour) -> AppResult<TourResponse> {
        let reviews = match tour.id {
            Some(id) => self.reviews.reviews_for_tour(id).await?,
            None => Vec::new(),
        };
        Ok(self.present_one(tour).await?.with_reviews(reviews))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::MemoryStore;
    use crate::domain::entities::reviews::review::Review;
    use crate::domain::entities::users::user::{Role, User};
    use crate::domain::models::query::ApiFeatures;

    struct Fixture {
        service: TourService,
        users: UserRepository,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let tours = Repository::<Tour>::new(store.clone());
        let users = UserRepository::new(store.clone());
        let reviews = ReviewService::new(Repository::<Review>::new(store), tours.clone(), users.clone());
        Fixture {
            service: TourService::new(tours, users.clone(), reviews),
            users,
        }
    }

    fn tour_body(name: &str, difficulty: &str, price: f64) -> Value {
        json!({
            "name": name,
            "duration": 7,
            "maxGroupSize": 10,
            "difficulty": difficulty,
            "price": price,
            "summary": "A tour used in tests",
        })
    }

    #[actix_web::test]
    async fn test_secret_tours_are_hidden_everywhere() {
        let fixture = fixture();
        fixture.service.create(tour_body("The Forest Hiker", "easy", 397.0)).await.unwrap();
        let mut secret = tour_body("The Secret Hideout", "easy", 9999.0);
        secret["secretTour"] = json!(true);
        let secret = fixture.service.create(secret).await.unwrap();

        let listed = fixture.service.list(&ApiFeatures::default(), vec![]).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["name"], "The Forest Hiker");

        assert!(matches!(fixture.service.get(&secret.id).await, Err(AppError::NotFound(_))));

        let stats = fixture.service.stats().await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].max_price, 397.0);
    }

    #[actix_web::test]
    async fn test_update_revalidates_discount_against_merged_document() {
        let fixture = fixture();
        let tour = fixture.service.create(tour_body("The Snow Adventurer", "difficult", 997.0)).await.unwrap();

        let err = fixture.service.update(&tour.id, json!({ "priceDiscount": 1200 })).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let updated = fixture.service.update(&tour.id, json!({ "priceDiscount": 100 })).await.unwrap();
        assert_eq!(updated.price_discount, Some(100.0));
        assert_eq!(updated.name, "The Snow Adventurer");
    }

    #[actix_web::test]
    async fn test_slug_follows_renames() {
        let fixture = fixture();
        let tour = fixture.service.create(tour_body("The City Wanderer", "easy", 1197.0)).await.unwrap();
        assert_eq!(tour.slug, "the-city-wanderer");

        let renamed = fixture.service.update(&tour.id, json!({ "name": "The City Wanderer Plus" })).await.unwrap();
        assert_eq!(renamed.slug, "the-city-wanderer-plus");
        assert!(fixture.service.find_by_slug("the-city-wanderer-plus").await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn test_stats_group_by_difficulty() {
        let fixture = fixture();
        fixture.service.create(tour_body("The Forest Hiker", "easy", 397.0)).await.unwrap();
        fixture.service.create(tour_body("The Sea Explorer", "medium", 497.0)).await.unwrap();
        fixture.service.create(tour_body("The Wine Taster", "easy", 1997.0)).await.unwrap();

        let stats = fixture.service.stats().await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].difficulty, "MEDIUM");
        assert_eq!(stats[1].difficulty, "EASY");
        assert_eq!(stats[1].num_tours, 2);
        assert_eq!(stats[1].avg_price, 1197.0);
        assert_eq!(stats[1].min_price, 397.0);
    }

    #[actix_web::test]
    async fn test_monthly_plan_counts_starts_in_year() {
        let fixture = fixture();
        let mut hiker = tour_body("The Forest Hiker", "easy", 397.0);
        hiker["startDates"] = json!(["2021-04-25T09:00:00Z", "2021-07-20T09:00:00Z", "2022-04-25T09:00:00Z"]);
        let mut explorer = tour_body("The Sea Explorer", "medium", 497.0);
        explorer["startDates"] = json!(["2021-07-01T09:00:00Z"]);
        fixture.service.create(hiker).await.unwrap();
        fixture.service.create(explorer).await.unwrap();

        let plan = fixture.service.monthly_plan(2021).await.unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].month, 7);
        assert_eq!(plan[0].num_tour_starts, 2);
        assert_eq!(plan[1].month, 4);
        assert_eq!(plan[1].name_tours_starts, vec!["The Forest Hiker".to_string()]);
    }

    #[actix_web::test]
    async fn test_within_and_distances() {
        let fixture = fixture();
        let mut near = tour_body("The Forest Hiker", "easy", 397.0);
        near["startLocation"] = json!({ "type": "Point", "coordinates": [-118.2437, 34.0522] });
        let mut far = tour_body("The Sea Explorer", "medium", 497.0);
        far["startLocation"] = json!({ "type": "Point", "coordinates": [-80.185942, 25.774772] });
        fixture.service.create(near).await.unwrap();
        fixture.service.create(far).await.unwrap();

        let center = LatLng { lat: 34.111745, lng: -118.113491 };
        let within = fixture.service.within(50.0, center, DistanceUnit::Miles).await.unwrap();
        assert_eq!(within.len(), 1);
        assert_eq!(within[0].name, "The Forest Hiker");

        let distances = fixture.service.distances(center, DistanceUnit::Kilometers).await.unwrap();
        assert_eq!(distances.len(), 2);
        assert_eq!(distances[0].name, "The Forest Hiker");
        assert!(distances[0].distance < 20.0);
        assert!(distances[1].distance > 3000.0);
    }

    #[actix_web::test]
    async fn test_guides_are_populated() {
        let fixture = fixture();
        let mut guide = User::new("Lisa Brown".into(), "lisa@example.com".into(), "hash".into());
        guide.role = Role::LeadGuide;
        let guide = fixture.users.insert(guide).await.unwrap();

        let mut body = tour_body("The Northern Lights", "easy", 1497.0);
        body["guides"] = json!([guide.id_string()]);
        let tour = fixture.service.create(body).await.unwrap();

        assert_eq!(tour.guides.len(), 1);
        assert_eq!(tour.guides[0].name, "Lisa Brown");

        let detail = fixture.service.get(&tour.id).await.unwrap();
        assert_eq!(detail.reviews.map(|r| r.len()), Some(0));
    }

    #[test]
    fn test_form_value() {
        assert_eq!(form_value("497"), json!(497));
        assert_eq!(form_value("true"), json!(true));
        assert_eq!(form_value("The Forest Hiker"), json!("The Forest Hiker"));
        assert_eq!(form_value("[1,2]"), json!("[1,2]"));
    }
}
