use actix_web::{HttpResponse, Result, web};
use chrono::Utc;
use tracing::{error, info};

use crate::models::event::{EventBucket, paginate_events};
use crate::requests::events::EventsQuery;
use crate::state::AppState;
use crate::utils::helpers::{ApiResponse, bad_request, internal_error, non_blank};

pub async fn humanitix_events(
    state: web::Data<AppState>,
    query: web::Query<EventsQuery>,
) -> Result<HttpResponse> {
    let bucket = match non_blank(&query.kind) {
        Some(kind) => match kind.parse::<EventBucket>() {
            Ok(bucket) => bucket,
            Err(()) => return Ok(bad_request("type must be 'upcoming' or 'past'")),
        },
        None => EventBucket::default(),
    };
    let page = query.page.unwrap_or(1);

    match state.humanitix.all_events().await {
        Ok(events) => {
            let page = paginate_events(events, bucket, page, Utc::now());
            info!(
                "Serving {} of {} {:?} events (page {})",
                page.events.len(),
                page.total,
                bucket,
                page.page
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
        }
        Err(e) => {
            error!("Error fetching events: {}", e);
            Ok(internal_error(e.to_string()))
        }
    }
}
