//! CRM relay over the OSDI `people` and `taggings` resources.

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::signup::SignupRecord;
use crate::services::client::{ProviderAuth, ProviderClient};

pub const API_TOKEN_HEADER: &str = "OSDI-API-Token";
const CONFLICT_MARKER: &str = "already exists";

#[derive(Error, Debug)]
pub enum ActionNetworkError {
    #[error("CRM request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("CRM rejected the signup ({status}): {detail}")]
    Rejected { status: u16, detail: String },
    #[error("CRM update after conflict failed ({status}): {detail}")]
    UpdateFailed { status: u16, detail: String },
}

impl ActionNetworkError {
    pub fn detail(&self) -> String {
        match self {
            ActionNetworkError::Request(e) => e.to_string(),
            ActionNetworkError::Rejected { detail, .. }
            | ActionNetworkError::UpdateFailed { detail, .. } => detail.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmailAddress {
    pub address: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PostalAddress {
    pub postal_code: String,
    pub country: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PhoneNumber {
    pub number: String,
    pub number_type: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OsdiPerson {
    pub given_name: String,
    pub family_name: String,
    pub email_addresses: Vec<EmailAddress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub postal_addresses: Vec<PostalAddress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<PhoneNumber>,
    pub custom_fields: BTreeMap<String, String>,
}

/// Body of a `people` POST (and the PATCH fallback).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PersonSignup {
    pub person: OsdiPerson,
    pub add_tags: Vec<String>,
}

impl PersonSignup {
    pub fn from_record(record: &SignupRecord, campaign: &str, tags: Vec<String>) -> Self {
        let mut custom_fields = BTreeMap::new();
        custom_fields.insert("source".to_string(), record.source.clone());
        custom_fields.insert("campaign".to_string(), campaign.to_string());
        custom_fields.insert(
            "first_nations".to_string(),
            if record.first_nations { "yes" } else { "no" }.to_string(),
        );
        for (key, value) in record.utm.fields() {
            custom_fields.insert(key.to_string(), value.to_string());
        }

        Self {
            person: OsdiPerson {
                given_name: record.given_name.clone(),
                family_name: record.family_name.clone(),
                email_addresses: vec![EmailAddress {
                    address: record.email.clone(),
                    status: "subscribed",
                }],
                postal_addresses: record
                    .postcode
                    .iter()
                    .map(|postcode| PostalAddress {
                        postal_code: postcode.clone(),
                        country: "AU",
                    })
                    .collect(),
                phone_numbers: record
                    .phone
                    .iter()
                    .map(|number| PhoneNumber {
                        number: number.clone(),
                        number_type: "Mobile",
                    })
                    .collect(),
                custom_fields,
            },
            add_tags: tags,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Href {
    pub href: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PersonLinks {
    #[serde(rename = "self")]
    pub self_link: Option<Href>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PersonRecord {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    #[serde(default)]
    pub identifiers: Vec<String>,
    #[serde(rename = "_links")]
    pub links: Option<PersonLinks>,
}

impl PersonRecord {
    pub fn href(&self) -> Option<&str> {
        self.links
            .as_ref()?
            .self_link
            .as_ref()
            .map(|h| h.href.as_str())
    }
}

/// Every shape a `people` write can come back as.
#[derive(Debug)]
pub enum CrmResponse {
    Success(PersonRecord),
    AlreadyExists(String),
    Validation { status: u16, detail: String },
    Failure { status: u16, detail: String },
}

#[derive(Debug, Deserialize)]
struct CrmErrorBody {
    error: Option<String>,
    title: Option<String>,
    message: Option<String>,
}

pub fn classify(status: StatusCode, body: &str) -> CrmResponse {
    if status.is_success() {
        return match serde_json::from_str::<PersonRecord>(body) {
            Ok(person) => CrmResponse::Success(person),
            Err(e) => CrmResponse::Failure {
                status: status.as_u16(),
                detail: format!("Unreadable CRM response: {}", e),
            },
        };
    }

    let detail = serde_json::from_str::<CrmErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.title).or(b.message))
        .unwrap_or_else(|| body.to_string());

    if status.is_client_error() && detail.to_lowercase().contains(CONFLICT_MARKER) {
        CrmResponse::AlreadyExists(detail)
    } else if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
        CrmResponse::Validation {
            status: status.as_u16(),
            detail,
        }
    } else {
        CrmResponse::Failure {
            status: status.as_u16(),
            detail,
        }
    }
}

async fn read(response: Response) -> Result<CrmResponse, reqwest::Error> {
    let status = response.status();
    let body = response.text().await?;
    Ok(classify(status, &body))
}

#[derive(Debug, Clone)]
pub enum SignupOutcome {
    Created(PersonRecord),
    Updated(PersonRecord),
}

impl SignupOutcome {
    pub fn person(&self) -> &PersonRecord {
        match self {
            SignupOutcome::Created(p) | SignupOutcome::Updated(p) => p,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignupOutcome::Created(_) => "created",
            SignupOutcome::Updated(_) => "updated",
        }
    }
}

pub struct ActionNetworkClient {
    client: ProviderClient,
}

impl ActionNetworkClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: ProviderClient::new(
                http,
                base_url,
                ProviderAuth::header(API_TOKEN_HEADER, api_key),
            ),
        }
    }

    /// POSTs the person; on an "already exists" conflict PATCHes the same
    /// payload once.
    pub async fn signup(
        &self,
        payload: &PersonSignup,
    ) -> Result<SignupOutcome, ActionNetworkError> {
        let response = self.client.post_json("/people", payload).await?;
        match read(response).await? {
            CrmResponse::Success(person) => Ok(SignupOutcome::Created(person)),
            CrmResponse::AlreadyExists(detail) => {
                info!("CRM person already exists ({}), updating instead", detail);
                let response = self.client.patch_json("/people", payload).await?;
                match read(response).await? {
                    CrmResponse::Success(person) => Ok(SignupOutcome::Updated(person)),
                    CrmResponse::AlreadyExists(detail) => Err(ActionNetworkError::UpdateFailed {
                        status: 409,
                        detail,
                    }),
                    CrmResponse::Validation { status, detail }
                    | CrmResponse::Failure { status, detail } => {
                        warn!("CRM update failed with {}: {}", status, detail);
                        Err(ActionNetworkError::UpdateFailed { status, detail })
                    }
                }
            }
            CrmResponse::Validation { status, detail }
            | CrmResponse::Failure { status, detail } => {
                warn!("CRM signup rejected with {}: {}", status, detail);
                Err(ActionNetworkError::Rejected { status, detail })
            }
        }
    }

    pub async fn add_tagging(
        &self,
        tag_id: &str,
        person_href: &str,
    ) -> Result<(), ActionNetworkError> {
        let body = serde_json::json!({
            "_links": { "osdi:person": { "href": person_href } }
        });
        let response = self
            .client
            .post_json(&format!("/tags/{}/taggings", tag_id), &body)
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let detail = response.text().await?;
        Err(ActionNetworkError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::signup::UtmAttribution;

    #[test]
    fn conflict_is_detected_from_error_text() {
        let response = classify(
            StatusCode::BAD_REQUEST,
            r#"{"error": "A person with this email Already Exists"}"#,
        );
        assert!(matches!(response, CrmResponse::AlreadyExists(_)));

        let titled = classify(
            StatusCode::CONFLICT,
            r#"{"title": "Person already exists"}"#,
        );
        assert!(matches!(titled, CrmResponse::AlreadyExists(_)));
    }

    #[test]
    fn other_client_errors_are_validation_or_failure() {
        let invalid = classify(StatusCode::UNPROCESSABLE_ENTITY, r#"{"error": "email invalid"}"#);
        assert!(matches!(invalid, CrmResponse::Validation { status: 422, .. }));

        let down = classify(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            down,
            CrmResponse::Failure { status: 502, ref detail } if detail == "upstream down"
        ));
    }

    #[test]
    fn success_exposes_person_href() {
        let response = classify(
            StatusCode::OK,
            r#"{"given_name": "Ana", "_links": {"self": {"href": "https://crm/people/1"}}}"#,
        );
        match response {
            CrmResponse::Success(person) => assert_eq!(person.href(), Some("https://crm/people/1")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn payload_carries_attribution_and_flags() {
        let record = SignupRecord {
            given_name: "Ana".to_string(),
            family_name: "Silva".to_string(),
            email: "ana@example.org".to_string(),
            postcode: Some("3000".to_string()),
            phone: None,
            source: "homepage".to_string(),
            utm: UtmAttribution {
                medium: Some("email".to_string()),
                ..Default::default()
            },
            first_nations: true,
        };

        let payload =
            PersonSignup::from_record(&record, "campaign", vec!["website-signup".to_string()]);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["person"]["email_addresses"][0]["address"], "ana@example.org");
        assert_eq!(json["person"]["postal_addresses"][0]["postal_code"], "3000");
        assert!(json["person"].get("phone_numbers").is_none());
        assert_eq!(json["person"]["custom_fields"]["utm_medium"], "email");
        assert_eq!(json["person"]["custom_fields"]["first_nations"], "yes");
        assert_eq!(json["add_tags"][0], "website-signup");
    }
}
