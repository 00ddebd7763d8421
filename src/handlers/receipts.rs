use actix_web::{HttpRequest, HttpResponse, Result, http::StatusCode, web};
use tracing::{error, info, warn};

use crate::requests::receipt::CustomReceiptRequest;
use crate::services::receipts::{ReceiptError, compose_receipt};
use crate::state::AppState;
use crate::utils::helpers::{ApiResponse, bad_request, bearer_matches, internal_error, non_blank};

pub async fn send_custom_receipt(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<CustomReceiptRequest>,
) -> Result<HttpResponse> {
    if let Some(secret) = state.config.monitor_secret() {
        if !bearer_matches(&req, Some(secret)) {
            return Ok(ApiResponse::<()>::error("Unauthorized".to_string())
                .to_response(StatusCode::UNAUTHORIZED));
        }
    }

    let Some(payment_intent_id) = non_blank(&request.payment_intent_id) else {
        return Ok(bad_request("paymentIntentId is required"));
    };
    info!("Composing custom receipt for {}", payment_intent_id);

    let composed = compose_receipt(
        &state.stripe,
        payment_intent_id,
        non_blank(&request.custom_message),
        non_blank(&request.email),
    )
    .await;

    let mut receipt = match composed {
        Ok(receipt) => receipt,
        Err(
            e @ (ReceiptError::MissingCustomer(_)
            | ReceiptError::MissingCharge(_)
            | ReceiptError::MissingRecipient(_)),
        ) => {
            warn!("Cannot compose receipt: {}", e);
            return Ok(bad_request(e.to_string()));
        }
        Err(ReceiptError::Stripe(e)) => {
            error!("Payment processor error composing receipt: {}", e);
            return Ok(internal_error(e.to_string()));
        }
    };

    if request.send {
        let Some(mailer) = state.mailer.clone() else {
            return Ok(bad_request("Email sending is not configured"));
        };
        let to = receipt.email.to.clone();
        let template = receipt.email_template();
        let sent = web::block(move || mailer.send_email(&to, None, template)).await;
        match sent {
            Ok(Ok(())) => receipt.sent = true,
            Ok(Err(e)) => {
                error!("Failed to send receipt for {}: {}", payment_intent_id, e);
                return Ok(internal_error(e.to_string()));
            }
            Err(e) => {
                error!("Receipt mail task failed: {}", e);
                return Ok(internal_error("Failed to send receipt"));
            }
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(receipt)))
}
