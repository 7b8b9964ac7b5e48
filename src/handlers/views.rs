//! # 화면 핸들러
//!
//! askama 템플릿으로 서버 렌더링하는 페이지입니다. 모든 페이지는 선택적 인증을 거쳐
//! 로그인 사용자가 있으면 헤더에 표시합니다. 실패는 JSON 대신 `error.html`로 렌더링합니다.

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, ResponseError, get, post, web};
use askama::Template;
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::config::Environment;
use crate::core::errors::{AppError, ErrorContext};
use crate::core::state::AppState;
use crate::domain::dto::bookings::BookingReturnQuery;
use crate::domain::dto::reviews::ReviewResponse;
use crate::domain::dto::tours::TourResponse;
use crate::domain::dto::users::{UpdateMeRequest, UserResponse};
use crate::domain::entities::users::user::User;
use crate::domain::models::auth::OptionalUser;
use crate::middlewares::AuthMiddleware;
use crate::services::auth::LOGIN_REQUIRED_MESSAGE;

/// 화면용 에러. [`AppError`]와 같은 상태 코드로 에러 페이지를 렌더링합니다.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<AppError> for PageError {
    fn from(e: AppError) -> Self {
        PageError(e)
    }
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        self.0.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        if !self.0.is_operational() {
            log::error!("💥 {}", self.0);
        }

        let page = ErrorPage {
            title: "Something went wrong!",
            user: None,
            message: self.0.public_message(&Environment::current()),
        };
        match page.render() {
            Ok(html) => HttpResponse::build(self.status_code())
                .content_type(ContentType::html())
                .body(html),
            Err(e) => {
                log::error!("💥 에러 페이지 렌더링 실패: {}", e);
                HttpResponse::build(self.status_code()).body(page.message)
            }
        }
    }
}

type PageResult = Result<HttpResponse, PageError>;

fn render(template: &impl Template) -> PageResult {
    let html = template.render().context("템플릿 렌더링 실패")?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}

fn current_user(user: &OptionalUser) -> Option<UserResponse> {
    user.user().map(UserResponse::from)
}

/// 카드/상세에 쓰는 날짜 표기 (`April 2021`)
fn month_year(date: &DateTime<Utc>) -> String {
    date.format("%B %Y").to_string()
}

/// 투어 카드 한 장
pub struct TourCard {
    pub slug: String,
    pub name: String,
    pub image_cover: String,
    pub difficulty: &'static str,
    pub duration: u32,
    pub summary: String,
    pub start_description: String,
    pub next_start: String,
    pub stops: usize,
    pub max_group_size: u32,
    pub price: f64,
    pub rating_average: f64,
    pub rating_quantity: u32,
}

impl From<&TourResponse> for TourCard {
    fn from(tour: &TourResponse) -> Self {
        Self {
            slug: tour.slug.clone(),
            name: tour.name.clone(),
            image_cover: tour.image_cover.clone().unwrap_or_default(),
            difficulty: tour.difficulty.as_str(),
            duration: tour.duration,
            summary: tour.summary.clone(),
            start_description: tour
                .start_location
                .as_ref()
                .and_then(|location| location.description.clone())
                .unwrap_or_default(),
            next_start: tour.start_dates.first().map(month_year).unwrap_or_default(),
            stops: tour.locations.len(),
            max_group_size: tour.max_group_size,
            price: tour.price,
            rating_average: tour.rating_average,
            rating_quantity: tour.rating_quantity,
        }
    }
}

/// 리뷰 카드. `stars`는 별 5개의 CSS 상태 (`active`/`inactive`)
pub struct ReviewCard {
    pub author: String,
    pub photo: String,
    pub review: String,
    pub stars: Vec<&'static str>,
}

impl From<&ReviewResponse> for ReviewCard {
    fn from(review: &ReviewResponse) -> Self {
        let (author, photo) = review
            .user
            .as_ref()
            .map(|user| (user.name.clone(), user.photo.clone()))
            .unwrap_or_default();
        Self {
            author,
            photo,
            review: review.review.clone(),
            stars: (1..=5)
                .map(|star| if review.rating >= star as f64 { "active" } else { "inactive" })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "views/overview.html")]
struct OverviewPage<'a> {
    title: &'a str,
    user: Option<UserResponse>,
    tours: Vec<TourCard>,
}

#[derive(Template)]
#[template(path = "views/tour.html")]
struct TourPage {
    title: String,
    user: Option<UserResponse>,
    tour: TourResponse,
    card: TourCard,
    paragraphs: Vec<String>,
    locations_json: String,
    reviews: Vec<ReviewCard>,
}

#[derive(Template)]
#[template(path = "views/login.html")]
struct LoginPage<'a> {
    title: &'a str,
    user: Option<UserResponse>,
}

#[derive(Template)]
#[template(path = "views/account.html")]
struct AccountPage<'a> {
    title: &'a str,
    user: Option<UserResponse>,
    account: UserResponse,
}

#[derive(Template)]
#[template(path = "views/error.html")]
struct ErrorPage<'a> {
    title: &'a str,
    user: Option<UserResponse>,
    message: String,
}

/// 보호된 화면은 로그인 사용자가 없으면 401 에러 페이지
fn require_login(user: &OptionalUser) -> Result<&User, PageError> {
    user.user()
        .ok_or_else(|| PageError(AppError::AuthenticationError(LOGIN_REQUIRED_MESSAGE.to_string())))
}

/// 전체 투어. 결제 후 돌아온 요청이면 예약을 만든 뒤 쿼리 없는 주소로 이동
#[get("/", wrap = "AuthMiddleware::optional()")]
pub async fn overview(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: OptionalUser,
    query: web::Query<BookingReturnQuery>,
) -> PageResult {
    if state.bookings.create_from_return(&query).await?.is_some() {
        return Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, req.path().to_string()))
            .finish());
    }

    let tours = state.tours.overview().await?;
    render(&OverviewPage {
        title: "All tours",
        user: current_user(&user),
        tours: tours.iter().map(TourCard::from).collect(),
    })
}

#[get("/tour/{slug}", wrap = "AuthMiddleware::optional()")]
pub async fn tour_page(state: web::Data<AppState>, user: OptionalUser, slug: web::Path<String>) -> PageResult {
    let tour = state
        .tours
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("No tour found with that tour name".to_string()))?;

    let locations_json = serde_json::to_string(&tour.locations).context("위치 직렬화 실패")?;
    let paragraphs = tour
        .description
        .as_deref()
        .unwrap_or_default()
        .split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    let reviews = tour.reviews.iter().flatten().map(ReviewCard::from).collect();

    render(&TourPage {
        title: format!("{} Tour", tour.name),
        user: current_user(&user),
        card: TourCard::from(&tour),
        paragraphs,
        locations_json,
        reviews,
        tour,
    })
}

#[get("/login", wrap = "AuthMiddleware::optional()")]
pub async fn login(user: OptionalUser) -> PageResult {
    render(&LoginPage {
        title: "Log into your account",
        user: current_user(&user),
    })
}

#[get("/me", wrap = "AuthMiddleware::optional()")]
pub async fn account_page(user: OptionalUser) -> PageResult {
    let account = UserResponse::from(require_login(&user)?);
    render(&AccountPage {
        title: "Account details",
        user: Some(account.clone()),
        account,
    })
}

/// 예약한 투어만 모은 개요 화면
#[get("/my-tours", wrap = "AuthMiddleware::optional()")]
pub async fn my_tours(state: web::Data<AppState>, user: OptionalUser) -> PageResult {
    let current = require_login(&user)?;

    let ids = state.bookings.booked_tour_ids(current).await?;
    let tours = state.tours.find_by_ids(&ids).await?;
    render(&OverviewPage {
        title: "My Tours",
        user: current_user(&user),
        tours: tours.iter().map(TourCard::from).collect(),
    })
}

/// 계정 화면 폼 전송 (`name`, `email`)
#[post("/submit-user-data", wrap = "AuthMiddleware::optional()")]
pub async fn submit_user_data(
    state: web::Data<AppState>,
    user: OptionalUser,
    form: web::Form<UpdateMeRequest>,
) -> PageResult {
    let current = require_login(&user)?;

    let request = form.into_inner().escaped();
    request.validate().map_err(AppError::from)?;

    let updated = state.users.update_me(current, request, None).await?;
    let account = UserResponse::from(updated);
    render(&AccountPage {
        title: "Account details",
        user: Some(account.clone()),
        account,
    })
}
