#![allow(dead_code)]

use actix_web::web;
use campaign_portal::config::AppConfig;
use campaign_portal::state::AppState;
use secrecy::SecretString;
use wiremock::MockServer;

pub const MONITOR_SECRET: &str = "monitor-secret";

/// Every provider points at the same mock server, each under its own prefix.
pub fn config_for(server: &MockServer) -> AppConfig {
    let uri = server.uri();
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        site_url: "http://localhost:3000".to_string(),
        campaign_name: "test-campaign".to_string(),
        http_timeout_secs: 5,
        stripe_secret_key: SecretString::from("sk_test_123"),
        stripe_publishable_key: "pk_test_123".to_string(),
        stripe_api_base: format!("{}/v1", uri),
        statement_descriptor_suffix: "DONATION".to_string(),
        action_network_api_key: SecretString::from("an-token"),
        action_network_api_base: format!("{}/an", uri),
        action_network_campaign_tag: "website-signup".to_string(),
        action_network_contact_tag_id: Some("tag-123".to_string()),
        freshdesk_domain: "campaign".to_string(),
        freshdesk_api_key: SecretString::from("fd-key"),
        freshdesk_api_base: Some(format!("{}/fd/api/v2", uri)),
        humanitix_api_key: SecretString::from("hx-key"),
        humanitix_api_base: format!("{}/hx/v1", uri),
        blogger_blog_id: "blog-1".to_string(),
        blogger_api_key: SecretString::from("blog-key"),
        blogger_api_base: format!("{}/blogger/v3", uri),
        blogger_label: "website".to_string(),
        monitor_secret: Some(SecretString::from(MONITOR_SECRET)),
        smtp_server: None,
        smtp_port: None,
        smtp_username: None,
        smtp_password: None,
        from_email: None,
        from_name: None,
    }
}

pub fn state_for(server: &MockServer) -> web::Data<AppState> {
    web::Data::new(AppState::new(config_for(server)).expect("state builds"))
}

/// Builds the real `/api` routes around the given state.
#[macro_export]
macro_rules! api_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .service(
                    actix_web::web::scope("/api")
                        .configure(campaign_portal::routes::api::scoped_config),
                ),
        )
        .await
    };
}
