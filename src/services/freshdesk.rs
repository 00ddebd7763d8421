//! Helpdesk relay: tickets and contacts, authenticated with `apiKey:X`.

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::requests::contact::ContactMessage;
use crate::services::client::{ProviderAuth, ProviderClient};

pub const STATUS_OPEN: u8 = 2;
pub const PRIORITY_LOW: u8 = 1;
pub const SOURCE_PORTAL: u8 = 2;

#[derive(Error, Debug)]
pub enum FreshdeskError {
    #[error("Helpdesk request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Helpdesk rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTicket {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub description: String,
    pub status: u8,
    pub priority: u8,
    pub source: u8,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl NewTicket {
    pub fn from_message(message: &ContactMessage) -> Self {
        let mut description = format!("<p>{}</p>", message.message.replace('\n', "<br>"));
        if let Some(phone) = &message.phone {
            description.push_str(&format!("<p>Phone: {}</p>", phone));
        }
        if let Some(postcode) = &message.postcode {
            description.push_str(&format!("<p>Postcode: {}</p>", postcode));
        }

        Self {
            name: message.full_name(),
            email: message.email.clone(),
            subject: message.subject.clone(),
            description,
            status: STATUS_OPEN,
            priority: PRIORITY_LOW,
            source: SOURCE_PORTAL,
            tags: vec!["website-contact".to_string()],
            phone: message.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Ticket {
    pub id: u64,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HelpdeskContact {
    pub id: u64,
}

#[derive(Debug, Clone)]
pub enum ContactResult {
    Created(HelpdeskContact),
    AlreadyExists,
}

#[derive(Debug, Deserialize)]
struct FieldError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    description: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

struct Rejection {
    status: StatusCode,
    detail: String,
    duplicate: bool,
}

async fn rejection(response: Response) -> Result<Rejection, reqwest::Error> {
    let status = response.status();
    let text = response.text().await?;
    let parsed = serde_json::from_str::<ErrorBody>(&text).ok();
    let duplicate = status == StatusCode::CONFLICT
        || parsed
            .as_ref()
            .map(|b| b.errors.iter().any(|e| e.code.as_deref() == Some("duplicate_value")))
            .unwrap_or(false);
    let detail = parsed
        .map(|b| {
            let fields: Vec<String> = b.errors.into_iter().filter_map(|e| e.message).collect();
            match (b.description, fields.is_empty()) {
                (Some(d), true) => d,
                (Some(d), false) => format!("{}: {}", d, fields.join("; ")),
                (None, _) => fields.join("; "),
            }
        })
        .filter(|d| !d.is_empty())
        .unwrap_or(text);
    Ok(Rejection {
        status,
        detail,
        duplicate,
    })
}

pub struct FreshdeskClient {
    client: ProviderClient,
}

impl FreshdeskClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: ProviderClient::new(http, base_url, ProviderAuth::basic(api_key, "X")),
        }
    }

    pub async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket, FreshdeskError> {
        let response = self.client.post_json("/tickets", ticket).await?;
        if response.status().is_success() {
            return Ok(response.json().await?);
        }
        let rejection = rejection(response).await?;
        warn!(
            "Helpdesk ticket rejected with {}: {}",
            rejection.status, rejection.detail
        );
        Err(FreshdeskError::Rejected {
            status: rejection.status.as_u16(),
            detail: rejection.detail,
        })
    }

    /// A duplicate email is reported as `AlreadyExists`, not an error.
    pub async fn create_contact(
        &self,
        contact: &NewContact,
    ) -> Result<ContactResult, FreshdeskError> {
        let response = self.client.post_json("/contacts", contact).await?;
        if response.status().is_success() {
            return Ok(ContactResult::Created(response.json().await?));
        }
        let rejection = rejection(response).await?;
        if rejection.duplicate {
            return Ok(ContactResult::AlreadyExists);
        }
        Err(FreshdeskError::Rejected {
            status: rejection.status.as_u16(),
            detail: rejection.detail,
        })
    }
}
