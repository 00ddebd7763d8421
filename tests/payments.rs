#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::state_for;

fn customer() -> Value {
    json!({"id": "cus_1", "email": "donor@example.org", "name": "Dana Donor"})
}

#[actix_web::test]
async fn one_off_intent_charges_minor_units() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/customers"))
        .and(body_string_contains("email=donor%40example.org"))
        .respond_with(ResponseTemplate::new(200).set_body_json(customer()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .and(body_string_contains("amount=3030"))
        .and(body_string_contains("currency=aud"))
        .and(body_string_contains("customer=cus_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pi_1",
            "amount": 3030,
            "currency": "aud",
            "status": "requires_payment_method",
            "client_secret": "pi_1_secret_abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/create-payment-intent")
        .set_json(json!({
            "amount": 30.30,
            "email": "donor@example.org",
            "cardName": "Dana Donor",
            "donationType": "one-off"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["clientSecret"], "pi_1_secret_abc");
    assert_eq!(body["data"]["paymentIntentId"], "pi_1");
}

#[actix_web::test]
async fn missing_email_is_rejected_without_processor_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/create-payment-intent")
        .set_json(json!({"amount": 25}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Email is required");
}

#[actix_web::test]
async fn processor_error_message_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(customer()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({
            "error": {"message": "Your card was declined.", "code": "card_declined"}
        })))
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/create-payment-intent")
        .set_json(json!({"amount": "10", "email": "donor@example.org"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Your card was declined.");
}

#[actix_web::test]
async fn daily_interval_is_rejected_before_any_processor_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/create-subscription")
        .set_json(json!({
            "email": "donor@example.org",
            "paymentMethodId": "pm_1",
            "amount": 12,
            "interval": "day"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn monthly_subscription_creates_catalog_entries_and_returns_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/customers"))
        .and(body_string_contains("payment_method=pm_1"))
        .and(body_string_contains(
            "invoice_settings%5Bdefault_payment_method%5D=pm_1",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(customer()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "prod_1", "name": "Monthly donation"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/prices"))
        .and(body_string_contains("unit_amount=1200"))
        .and(body_string_contains("recurring%5Binterval%5D=month"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "price_1",
            "unit_amount": 1200,
            "currency": "aud",
            "recurring": {"interval": "month"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/subscriptions"))
        .and(body_string_contains("payment_behavior=default_incomplete"))
        .and(body_string_contains("price_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sub_1",
            "status": "incomplete",
            "latest_invoice": {
                "id": "in_1",
                "payment_intent": {
                    "id": "pi_9",
                    "amount": 1200,
                    "currency": "aud",
                    "status": "requires_payment_method",
                    "client_secret": "pi_9_secret_xyz"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/create-subscription")
        .set_json(json!({
            "email": "donor@example.org",
            "paymentMethodId": "pm_1",
            "amount": 12,
            "interval": "month",
            "cardName": "Dana Donor"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["subscriptionId"], "sub_1");
    assert_eq!(body["data"]["clientSecret"], "pi_9_secret_xyz");
    assert_eq!(body["data"]["status"], "incomplete");
}

#[actix_web::test]
async fn subscription_without_payment_intent_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(customer()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/products"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "prod_1", "name": "x"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "price_1", "unit_amount": 500, "currency": "aud"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/subscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sub_1",
            "status": "incomplete",
            "latest_invoice": {"id": "in_1", "payment_intent": null}
        })))
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/create-subscription")
        .set_json(json!({
            "email": "donor@example.org",
            "paymentMethodId": "pm_1",
            "amount": 5,
            "interval": "week"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "no payment_intent returned");
}

#[actix_web::test]
async fn wrong_method_is_405() {
    let server = MockServer::start().await;
    let state = state_for(&server);
    let app = api_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/create-payment-intent")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn malformed_json_is_400() {
    let server = MockServer::start().await;
    let state = state_for(&server);
    let app = api_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/create-payment-intent")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
