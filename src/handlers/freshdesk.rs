use actix_web::{HttpRequest, HttpResponse, Result, http::StatusCode, web};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::models::monitor::{MonitorEntry, MonitorLevel};
use crate::requests::contact::{AutomationRequest, ContactRequest, MonitorRequest};
use crate::services::automation::AutomationReport;
use crate::services::freshdesk::{FreshdeskError, NewTicket};
use crate::state::AppState;
use crate::utils::helpers::{ApiResponse, bad_request, bearer_matches, internal_error, non_blank};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub ticket_id: u64,
    pub automation: AutomationReport,
}

#[derive(Debug, Serialize)]
pub struct MonitorSnapshot {
    pub count: usize,
    pub entries: Vec<MonitorEntry>,
}

pub async fn contact(
    state: web::Data<AppState>,
    request: web::Json<ContactRequest>,
) -> Result<HttpResponse> {
    let message = match request.validate() {
        Ok(message) => message,
        Err(e) => return Ok(bad_request(e)),
    };
    info!("Creating helpdesk ticket for {}", message.email);

    let ticket = match state.freshdesk.create_ticket(&NewTicket::from_message(&message)).await {
        Ok(ticket) => ticket,
        Err(FreshdeskError::Rejected { status, detail }) => {
            state.monitor.record(
                MonitorLevel::Error,
                "ticket.rejected",
                Some(serde_json::json!({ "status": status, "detail": detail })),
            );
            warn!("Helpdesk rejected ticket for {}: {}", message.email, detail);
            return Ok(bad_request(detail));
        }
        Err(e) => {
            state.monitor.record(
                MonitorLevel::Error,
                "ticket.failed",
                Some(serde_json::json!({ "error": e.to_string() })),
            );
            error!("Error creating helpdesk ticket: {}", e);
            return Ok(internal_error(e.to_string()));
        }
    };

    state.monitor.record(
        MonitorLevel::Info,
        "ticket.created",
        Some(serde_json::json!({ "ticketId": ticket.id, "email": message.email })),
    );

    let mut follow_up = AutomationRequest::from(&message);
    follow_up.ticket_id = Some(ticket.id);
    let automation = match follow_up.validate() {
        Ok(record) => state.contact_automation().run(&record, Some(ticket.id)).await,
        Err(e) => {
            warn!("Skipping contact automation: {}", e);
            AutomationReport::default()
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(ContactResponse {
        ticket_id: ticket.id,
        automation,
    })))
}

pub async fn automation(
    state: web::Data<AppState>,
    request: web::Json<AutomationRequest>,
) -> Result<HttpResponse> {
    let record = match request.validate() {
        Ok(record) => record,
        Err(e) => return Ok(bad_request(e)),
    };

    let report = state
        .contact_automation()
        .run(&record, request.ticket_id)
        .await;
    if report.has_failures() {
        warn!("Contact automation for {} finished with failures", record.email);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}

pub async fn monitor_entries(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !bearer_matches(&req, state.config.monitor_secret()) {
        return Ok(ApiResponse::<()>::error("Unauthorized".to_string())
            .to_response(StatusCode::UNAUTHORIZED));
    }

    let entries = state.monitor.snapshot();
    Ok(HttpResponse::Ok().json(ApiResponse::success(MonitorSnapshot {
        count: entries.len(),
        entries,
    })))
}

pub async fn record_monitor_entry(
    state: web::Data<AppState>,
    request: web::Json<MonitorRequest>,
) -> Result<HttpResponse> {
    let Some(event) = non_blank(&request.event) else {
        return Ok(bad_request("event is required"));
    };

    let entry = state
        .monitor
        .record(request.level, event, request.details.clone());
    Ok(HttpResponse::Created().json(ApiResponse::success(entry)))
}
