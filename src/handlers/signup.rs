use actix_web::{HttpRequest, HttpResponse, Result, web};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::models::signup_gate::SignupGate;
use crate::requests::signup::SignupRequest;
use crate::services::action_network::{ActionNetworkError, PersonSignup};
use crate::state::AppState;
use crate::utils::helpers::{ApiResponse, bad_request, internal_error};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub status: &'static str,
    pub person_href: Option<String>,
}

pub async fn actionnetwork_signup(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    let record = match request.validate() {
        Ok(record) => record,
        Err(message) => return Ok(bad_request(message)),
    };

    let now = Utc::now();
    if SignupGate::from_request(&req).is_active(now) {
        info!("Repeat signup from a visitor who already signed up");
    }

    let payload = PersonSignup::from_record(
        &record,
        &state.config.campaign_name,
        vec![state.config.action_network_campaign_tag.clone()],
    );

    match state.action_network.signup(&payload).await {
        Ok(outcome) => {
            info!("CRM signup {} for {}", outcome.label(), record.email);
            let gate = SignupGate::completed(record.source.clone(), now);
            let mut response = HttpResponse::Ok();
            for cookie in gate.to_cookies() {
                response.cookie(cookie);
            }
            Ok(response.json(ApiResponse::success(SignupResponse {
                status: outcome.label(),
                person_href: outcome.person().href().map(str::to_string),
            })))
        }
        Err(ActionNetworkError::Request(e)) => {
            error!("CRM request error for {}: {}", record.email, e);
            Ok(internal_error(e.to_string()))
        }
        Err(e) => {
            warn!("CRM signup failed for {}: {}", record.email, e);
            Ok(bad_request(e.detail()))
        }
    }
}
