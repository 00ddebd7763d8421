use actix_web::{HttpRequest, error, web};

use crate::handlers;
use crate::utils::helpers::{bad_request, method_not_allowed};

/// Malformed JSON bodies get the same envelope as any other validation error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
            let response = bad_request(format!("Invalid request body: {}", err));
            error::InternalError::from_response(err, response).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, _req: &HttpRequest| {
        let response = bad_request(format!("Invalid query string: {}", err));
        error::InternalError::from_response(err, response).into()
    })
}

pub fn scoped_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(
            web::resource("/create-payment-intent")
                .route(web::post().to(handlers::payments::create_payment_intent))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/create-subscription")
                .route(web::post().to(handlers::payments::create_subscription))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/send-custom-receipt")
                .route(web::post().to(handlers::receipts::send_custom_receipt))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/actionnetwork-signup")
                .route(web::post().to(handlers::signup::actionnetwork_signup))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/freshdesk-contact")
                .route(web::post().to(handlers::freshdesk::contact))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/freshdesk-automation")
                .route(web::post().to(handlers::freshdesk::automation))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/freshdesk-monitor")
                .route(web::get().to(handlers::freshdesk::monitor_entries))
                .route(web::post().to(handlers::freshdesk::record_monitor_entry))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/humanitix-events")
                .route(web::get().to(handlers::events::humanitix_events))
                .route(web::post().to(handlers::events::humanitix_events))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/blogger-posts")
                .route(web::get().to(handlers::blog::blogger_posts))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/blogger-post")
                .route(web::get().to(handlers::blog::blogger_post))
                .default_service(web::route().to(method_not_allowed)),
        );
}
