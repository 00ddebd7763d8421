use actix_web::{HttpResponse, Result, web};
use tracing::{error, info, warn};

use crate::requests::payment::{PaymentIntentRequest, SubscriptionRequest};
use crate::services::donation;
use crate::services::stripe::StripeError;
use crate::state::AppState;
use crate::utils::helpers::{ApiResponse, bad_request, internal_error};

pub async fn create_payment_intent(
    state: web::Data<AppState>,
    request: web::Json<PaymentIntentRequest>,
) -> Result<HttpResponse> {
    let donation = match request.validate() {
        Ok(donation) => donation,
        Err(message) => {
            warn!("Rejected payment intent request: {}", message);
            return Ok(bad_request(message));
        }
    };
    info!(
        "Creating {} payment intent of ${} for {}",
        donation.donation_type, donation.amount, donation.email
    );

    match donation::create_one_off(&state.stripe, &state.donation_settings(), &donation).await {
        Ok(created) => Ok(HttpResponse::Ok().json(ApiResponse::success(created))),
        Err(StripeError::Amount(e)) => Ok(bad_request(e.to_string())),
        Err(e) => {
            error!("Error creating payment intent: {}", e);
            Ok(internal_error(e.to_string()))
        }
    }
}

pub async fn create_subscription(
    state: web::Data<AppState>,
    request: web::Json<SubscriptionRequest>,
) -> Result<HttpResponse> {
    let donation = match request.validate() {
        Ok(donation) => donation,
        Err(message) => {
            warn!("Rejected subscription request: {}", message);
            return Ok(bad_request(message));
        }
    };
    info!(
        "Creating {} subscription of ${} for {}",
        donation.interval, donation.amount, donation.email
    );

    match donation::create_recurring(&state.stripe, &state.donation_settings(), &donation).await {
        Ok(created) => Ok(HttpResponse::Ok().json(ApiResponse::success(created))),
        Err(StripeError::Amount(e)) => Ok(bad_request(e.to_string())),
        Err(StripeError::MissingPaymentIntent) => {
            error!("Subscription created without a first payment intent");
            Ok(internal_error(StripeError::MissingPaymentIntent.to_string()))
        }
        Err(e) => {
            error!("Error creating subscription: {}", e);
            Ok(internal_error(e.to_string()))
        }
    }
}
