//! 라우트 단위 HTTP 테스트 (메모리 저장소)

use actix_web::http::{StatusCode, header};
use actix_web::test;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};

use crate::domain::entities::Entity;
use crate::domain::entities::users::user::Role;
use crate::domain::models::token::TokenClaims;
use crate::middlewares::FORBIDDEN_MESSAGE;
use crate::test_support::{TEST_PASSWORD, TestContext, bearer, test_settings, tour_body};

async fn body_json(response: actix_web::dev::ServiceResponse) -> Value {
    let body = test::read_body(response).await;
    serde_json::from_slice(&body).unwrap()
}

#[actix_web::test]
async fn test_signup_sets_cookie_and_login_checks_password() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.app()).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/users/signup")
        .set_json(json!({
            "name": "Laura Wilson",
            "email": "laura@example.com",
            "password": TEST_PASSWORD,
            "passwordConfirm": TEST_PASSWORD,
        }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response.response().cookies().find(|c| c.name() == "jwt").unwrap();
    assert_eq!(cookie.http_only(), Some(true));

    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert!(json["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(json["user"].get("password").is_none());

    let request = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "email": "laura@example.com", "password": "wrongpass" }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Email or Password are Incorrect");

    let request = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "email": "laura@example.com" }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Please provide Email and Password");

    let request = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "email": "laura@example.com", "password": TEST_PASSWORD }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_session_cookie_authenticates_me() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.seed_user("Ann Lee", "ann@example.com", Role::User).await;
    let app = test::init_service(ctx.app()).await;

    let request = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .cookie(actix_web::cookie::Cookie::new("jwt", token))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["data"]["email"], "ann@example.com");

    let request = test::TestRequest::get().uri("/api/v1/users/me").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Please login in order to get access !!!");
}

#[actix_web::test]
async fn test_token_older_than_password_change_is_rejected() {
    let ctx = TestContext::new().await;
    let (user, _) = ctx.seed_user("Ann Lee", "ann@example.com", Role::User).await;
    let app = test::init_service(ctx.app()).await;

    let issued = Utc::now() - chrono::Duration::hours(1);
    let stale = encode(
        &Header::default(),
        &TokenClaims {
            id: user.id.unwrap().to_hex(),
            iat: issued.timestamp(),
            exp: (issued + chrono::Duration::days(90)).timestamp(),
        },
        &EncodingKey::from_secret(test_settings().jwt_secret.as_bytes()),
    )
    .unwrap();

    let fresh = ctx.state.auth.login("ann@example.com", TEST_PASSWORD).await.unwrap().token;
    let request = test::TestRequest::patch()
        .uri("/api/v1/users/update-password")
        .insert_header(bearer(&fresh))
        .set_json(json!({
            "currentPassword": TEST_PASSWORD,
            "password": "newpass123",
            "passwordConfirm": "newpass123",
        }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header(bearer(&stale))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Password has been Modified");
}

#[actix_web::test]
async fn test_forgot_password_mails_single_use_reset_link() {
    let ctx = TestContext::new().await;
    ctx.seed_user("Ann Lee", "ann@example.com", Role::User).await;
    let app = test::init_service(ctx.app()).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/users/forgot-password")
        .set_json(json!({ "email": "ann@example.com" }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Token sent to email!");

    let mail = ctx.mailer.sent().pop().unwrap();
    let token = mail
        .text
        .split("/reset-password/")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap()
        .to_string();

    let reset = || {
        test::TestRequest::patch()
            .uri(&format!("/api/v1/users/reset-password/{}", token))
            .set_json(json!({ "password": "newpass123", "passwordConfirm": "newpass123" }))
            .to_request()
    };
    let response = test::call_service(&app, reset()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test::call_service(&app, reset()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "User not Found or Token Expired");
}

#[actix_web::test]
async fn test_tour_writes_require_admin_or_lead_guide() {
    let ctx = TestContext::new().await;
    let (_, user_token) = ctx.seed_user("Ann Lee", "ann@example.com", Role::User).await;
    let (_, admin_token) = ctx.seed_user("Admin Kim", "admin@example.com", Role::Admin).await;
    let app = test::init_service(ctx.app()).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/tours")
        .insert_header(bearer(&user_token))
        .set_json(tour_body("The Forest Hiker", 397.0))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], FORBIDDEN_MESSAGE);

    let request = test::TestRequest::post()
        .uri("/api/v1/tours")
        .insert_header(bearer(&admin_token))
        .set_json(tour_body("The Forest Hiker", 397.0))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["data"]["slug"], "the-forest-hiker");
    assert_eq!(json["data"]["data"]["durationWeeks"], 5.0 / 7.0);
}

#[actix_web::test]
async fn test_discount_must_stay_below_price() {
    let ctx = TestContext::new().await;
    let (_, admin_token) = ctx.seed_user("Admin Kim", "admin@example.com", Role::Admin).await;
    let app = test::init_service(ctx.app()).await;

    let mut body = tour_body("The Forest Hiker", 397.0);
    body["priceDiscount"] = json!(397.0);
    let request = test::TestRequest::post()
        .uri("/api/v1/tours")
        .insert_header(bearer(&admin_token))
        .set_json(body)
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["status"], "fail");
}

#[actix_web::test]
async fn test_secret_tours_are_hidden_from_public_reads() {
    let ctx = TestContext::new().await;
    let (_, admin_token) = ctx.seed_user("Admin Kim", "admin@example.com", Role::Admin).await;
    let app = test::init_service(ctx.app()).await;

    let mut secret = tour_body("The Secret Valley", 1997.0);
    secret["secretTour"] = json!(true);
    for body in [tour_body("The Forest Hiker", 397.0), secret] {
        let request = test::TestRequest::post()
            .uri("/api/v1/tours")
            .insert_header(bearer(&admin_token))
            .set_json(body)
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::CREATED);
    }

    let request = test::TestRequest::get().uri("/api/v1/tours").to_request();
    let json = body_json(test::call_service(&app, request).await).await;
    assert_eq!(json["results"], 1);
    assert_eq!(json["data"]["data"][0]["name"], "The Forest Hiker");

    let request = test::TestRequest::get()
        .uri("/api/v1/tours?price%5Bgte%5D=1000")
        .to_request();
    let json = body_json(test::call_service(&app, request).await).await;
    assert_eq!(json["results"], 0);
}

#[actix_web::test]
async fn test_missing_and_malformed_ids() {
    let ctx = TestContext::new().await;
    let (_, admin_token) = ctx.seed_user("Admin Kim", "admin@example.com", Role::Admin).await;
    let app = test::init_service(ctx.app()).await;

    let request = test::TestRequest::delete()
        .uri(&format!("/api/v1/tours/{}", mongodb::bson::oid::ObjectId::new()))
        .insert_header(bearer(&admin_token))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "No document found with that ID");

    let request = test::TestRequest::get().uri("/api/v1/tours/not-an-id").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_nested_review_updates_tour_rating() {
    let ctx = TestContext::new().await;
    let (_, admin_token) = ctx.seed_user("Admin Kim", "admin@example.com", Role::Admin).await;
    let (_, user_token) = ctx.seed_user("Ann Lee", "ann@example.com", Role::User).await;
    let app = test::init_service(ctx.app()).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/tours")
        .insert_header(bearer(&admin_token))
        .set_json(tour_body("The Forest Hiker", 397.0))
        .to_request();
    let created = body_json(test::call_service(&app, request).await).await;
    let tour_id = created["data"]["data"]["id"].as_str().unwrap().to_string();

    let request = test::TestRequest::post()
        .uri(&format!("/api/v1/tours/{}/reviews", tour_id))
        .insert_header(bearer(&user_token))
        .set_json(json!({ "review": "Loved every minute", "rating": 4 }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = test::TestRequest::post()
        .uri(&format!("/api/v1/tours/{}/reviews", tour_id))
        .insert_header(bearer(&user_token))
        .set_json(json!({ "review": "Second try", "rating": 5 }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = test::TestRequest::get()
        .uri(&format!("/api/v1/tours/{}", tour_id))
        .to_request();
    let json = body_json(test::call_service(&app, request).await).await;
    assert_eq!(json["data"]["data"]["ratingQuantity"], 1);
    assert_eq!(json["data"]["data"]["ratingAverage"], 4.0);
    assert_eq!(json["data"]["data"]["reviews"][0]["user"]["name"], "Ann Lee");

    let request = test::TestRequest::get()
        .uri(&format!("/api/v1/tours/{}/reviews", tour_id))
        .insert_header(bearer(&user_token))
        .to_request();
    let json = body_json(test::call_service(&app, request).await).await;
    assert_eq!(json["results"], 1);
}

#[actix_web::test]
async fn test_checkout_session_uses_payment_gateway() {
    let ctx = TestContext::new().await;
    let (_, admin_token) = ctx.seed_user("Admin Kim", "admin@example.com", Role::Admin).await;
    let (_, user_token) = ctx.seed_user("Ann Lee", "ann@example.com", Role::User).await;
    let app = test::init_service(ctx.app()).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/tours")
        .insert_header(bearer(&admin_token))
        .set_json(tour_body("The Forest Hiker", 397.0))
        .to_request();
    let created = body_json(test::call_service(&app, request).await).await;
    let tour_id = created["data"]["data"]["id"].as_str().unwrap().to_string();

    let request = test::TestRequest::get()
        .uri(&format!("/api/v1/bookings/checkout-session/{}", tour_id))
        .insert_header(bearer(&user_token))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["session"]["id"].as_str().unwrap().starts_with("cs_test_"));

    let checkout = ctx.payments.last_request().unwrap();
    assert_eq!(checkout.customer_email, "ann@example.com");
    assert_eq!(checkout.unit_amount(), 39700);
}

#[actix_web::test]
async fn test_unknown_route_reports_path() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.app()).await;

    let request = test::TestRequest::get().uri("/api/v1/unknown").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["message"],
        "Cannot find URL /api/v1/unknown on this server !"
    );
}

#[actix_web::test]
async fn test_views_render_html() {
    let ctx = TestContext::new().await;
    let (_, admin_token) = ctx.seed_user("Admin Kim", "admin@example.com", Role::Admin).await;
    let app = test::init_service(ctx.app()).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/tours")
        .insert_header(bearer(&admin_token))
        .set_json(tour_body("The Forest Hiker", 397.0))
        .to_request();
    test::call_service(&app, request).await;

    let request = test::TestRequest::get().uri("/").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(response).await.to_vec()).unwrap();
    assert!(html.contains("The Forest Hiker"));
    assert!(html.contains("/tour/the-forest-hiker"));

    let request = test::TestRequest::get().uri("/tour/the-forest-hiker").to_request();
    assert_eq!(test::call_service(&app, request).await.status(), StatusCode::OK);

    let request = test::TestRequest::get().uri("/tour/no-such-tour").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = String::from_utf8(test::read_body(response).await.to_vec()).unwrap();
    assert!(html.contains("No tour found with that tour name"));

    let request = test::TestRequest::get().uri("/me").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/html"))
    );
}

#[actix_web::test]
async fn test_account_form_escapes_markup() {
    let ctx = TestContext::new().await;
    let (user, token) = ctx.seed_user("Ann Lee", "ann@example.com", Role::User).await;
    let app = test::init_service(ctx.app()).await;

    let request = test::TestRequest::post()
        .uri("/submit-user-data")
        .cookie(actix_web::cookie::Cookie::new("jwt", token))
        .set_form([("name", "<b>Ann Park</b>"), ("email", "ann@example.com")])
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = crate::repositories::UserRepository::new(ctx.store.clone())
        .find_by_id(&user.id_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "&lt;b&gt;Ann Park&lt;/b&gt;");
}
