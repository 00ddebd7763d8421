#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{MONITOR_SECRET, state_for};

fn person() -> Value {
    json!({
        "given_name": "Kim",
        "family_name": "Park",
        "identifiers": ["action_network:1"],
        "_links": {"self": {"href": "https://crm.example/api/v2/people/1"}}
    })
}

fn signup_body() -> Value {
    json!({
        "firstName": "Kim",
        "lastName": "Park",
        "email": "Kim@Example.org",
        "postcode": "2000",
        "source": "homepage",
        "utmSource": "newsletter"
    })
}

#[actix_web::test]
async fn existing_person_is_patched_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/an/people"))
        .and(header("OSDI-API-Token", "an-token"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": "A person with that email already exists"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/an/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(person()))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/actionnetwork-signup")
        .set_json(signup_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookies: Vec<String> = resp
        .response()
        .cookies()
        .map(|c| c.name().to_string())
        .collect();
    assert!(cookies.contains(&"signup_completed".to_string()));
    assert!(cookies.contains(&"signup_timestamp".to_string()));
    assert!(cookies.contains(&"signup_source".to_string()));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "updated");
    assert_eq!(
        body["data"]["personHref"],
        "https://crm.example/api/v2/people/1"
    );
}

#[actix_web::test]
async fn failed_update_after_conflict_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/an/people"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Person already exists"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/an/people"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "Server error"})))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/actionnetwork-signup")
        .set_json(signup_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.response().cookies().count(), 0);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Server error");
}

async fn signup_rejected_with(status: u16, body: Value) -> (StatusCode, Value, usize) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/an/people"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/an/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(person()))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/actionnetwork-signup")
        .set_json(signup_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let cookies = resp.response().cookies().count();
    (status, test::read_body_json(resp).await, cookies)
}

#[actix_web::test]
async fn crm_validation_error_is_400_without_update() {
    let (status, body, cookies) =
        signup_rejected_with(422, json!({"error": "Email address is invalid"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(cookies, 0);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Email address is invalid");
}

#[actix_web::test]
async fn crm_server_error_is_400_without_update() {
    let (status, body, cookies) =
        signup_rejected_with(502, json!({"title": "Bad gateway"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(cookies, 0);
    assert_eq!(body["error"], "Bad gateway");
}

#[actix_web::test]
async fn invalid_postcode_never_reaches_the_crm() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let mut body = signup_body();
    body["postcode"] = json!("20");
    let req = test::TestRequest::post()
        .uri("/api/actionnetwork-signup")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn contact_without_policy_agreement_makes_no_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/freshdesk-contact")
        .set_json(json!({
            "firstName": "Kim",
            "lastName": "Park",
            "email": "kim@example.org",
            "message": "Hello",
            "agreeToPolicy": false
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "You must agree to the privacy policy");
}

#[actix_web::test]
async fn contact_creates_ticket_then_runs_automation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fd/api/v2/tickets"))
        .and(header("Authorization", "Basic ZmQta2V5Olg="))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": 77, "subject": "Website enquiry"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/fd/api/v2/contacts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 5})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/an/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(person()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/an/tags/tag-123/taggings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/freshdesk-contact")
        .set_json(json!({
            "firstName": "Kim",
            "lastName": "Park",
            "email": "kim@example.org",
            "message": "How can I volunteer?",
            "agreeToPolicy": true
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["ticketId"], 77);
    let steps = body["data"]["automation"]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0]["step"], "helpdesk_contact");
    assert_eq!(steps[0]["status"], "skipped");
    assert_eq!(steps[1]["status"], "succeeded");
    assert_eq!(steps[2]["step"], "crm_tagging");
    assert_eq!(steps[2]["status"], "succeeded");

    let events: Vec<String> = state
        .monitor
        .snapshot()
        .into_iter()
        .map(|e| e.event)
        .collect();
    assert!(events.contains(&"ticket.created".to_string()));
    assert!(events.contains(&"automation.crm_signup".to_string()));
}

#[actix_web::test]
async fn rejected_ticket_is_400_and_logged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fd/api/v2/tickets"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "description": "Validation failed",
            "errors": [
                {
                    "field": "email",
                    "code": "invalid_value",
                    "message": "It should be a valid email address"
                },
                {
                    "field": "subject",
                    "code": "missing_field",
                    "message": "It should not be blank"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/an/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(person()))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/freshdesk-contact")
        .set_json(json!({
            "firstName": "Kim",
            "lastName": "Park",
            "email": "kim@example.org",
            "message": "Hello",
            "agreeToPolicy": true
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "Validation failed: It should be a valid email address; It should not be blank"
    );

    let entries = state.monitor.snapshot();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].event, "ticket.rejected");
    assert_eq!(entries[0].details.as_ref().unwrap()["status"], 400);
}

#[actix_web::test]
async fn automation_records_failures_without_failing_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fd/api/v2/contacts"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "description": "Validation failed",
            "errors": [{
                "field": "email",
                "code": "duplicate_value",
                "message": "It already exists"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/an/people"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/an/tags/tag-123/taggings"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let app = api_app!(state);
    let req = test::TestRequest::post()
        .uri("/api/freshdesk-automation")
        .set_json(json!({"firstName": "Kim", "email": "kim@example.org"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let steps = body["data"]["steps"].as_array().unwrap();
    assert_eq!(steps[0]["status"], "succeeded");
    assert_eq!(steps[1]["status"], "failed");
    assert_eq!(steps[2]["status"], "skipped");
}

#[actix_web::test]
async fn monitor_log_requires_the_bearer_secret() {
    let server = MockServer::start().await;
    let state = state_for(&server);
    let app = api_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/freshdesk-monitor")
        .set_json(json!({"level": "warn", "event": "widget.error", "details": {"line": 3}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/freshdesk-monitor")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/freshdesk-monitor")
        .insert_header(("Authorization", format!("Bearer {}", MONITOR_SECRET)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["entries"][0]["event"], "widget.error");
    assert_eq!(body["data"]["entries"][0]["level"], "warn");
}

#[actix_web::test]
async fn monitor_entry_needs_an_event() {
    let server = MockServer::start().await;
    let state = state_for(&server);
    let app = api_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/freshdesk-monitor")
        .set_json(json!({"level": "info"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(state.monitor.is_empty());
}
