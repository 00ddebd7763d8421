use serde::Deserialize;

use crate::models::monitor::MonitorLevel;
use crate::models::signup::SignupRecord;
use crate::utils::helpers::{is_valid_email, non_blank};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub postcode: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub agree_to_policy: bool,
}

/// A contact form submission that passed validation.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub postcode: Option<String>,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl ContactRequest {
    pub fn validate(&self) -> Result<ContactMessage, String> {
        let first_name = non_blank(&self.first_name).ok_or("First name is required")?;
        let last_name = non_blank(&self.last_name).ok_or("Last name is required")?;
        let email = non_blank(&self.email).ok_or("Email is required")?;
        if !is_valid_email(email) {
            return Err("Please enter a valid email address".to_string());
        }
        let message = non_blank(&self.message).ok_or("Message is required")?;
        if !self.agree_to_policy {
            return Err("You must agree to the privacy policy".to_string());
        }

        Ok(ContactMessage {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: non_blank(&self.phone).map(str::to_string),
            postcode: non_blank(&self.postcode).map(str::to_string),
            subject: non_blank(&self.subject)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Website enquiry from {} {}", first_name, last_name)),
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub postcode: Option<String>,
    /// Set when the helpdesk already holds the contact through a ticket.
    pub ticket_id: Option<u64>,
    pub source: Option<String>,
}

impl AutomationRequest {
    pub fn validate(&self) -> Result<SignupRecord, String> {
        let email = non_blank(&self.email).ok_or("Email is required")?;
        if !is_valid_email(email) {
            return Err("Please enter a valid email address".to_string());
        }
        Ok(SignupRecord {
            given_name: non_blank(&self.first_name).unwrap_or_default().to_string(),
            family_name: non_blank(&self.last_name).unwrap_or_default().to_string(),
            email: email.to_lowercase(),
            postcode: non_blank(&self.postcode).map(str::to_string),
            phone: non_blank(&self.phone).map(str::to_string),
            source: non_blank(&self.source).unwrap_or("contact-form").to_string(),
            utm: Default::default(),
            first_nations: false,
        })
    }
}

impl From<&ContactMessage> for AutomationRequest {
    fn from(message: &ContactMessage) -> Self {
        Self {
            first_name: Some(message.first_name.clone()),
            last_name: Some(message.last_name.clone()),
            email: Some(message.email.clone()),
            phone: message.phone.clone(),
            postcode: message.postcode.clone(),
            ticket_id: None,
            source: Some("contact-form".to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorRequest {
    #[serde(default)]
    pub level: MonitorLevel,
    pub event: Option<String>,
    pub details: Option<serde_json::Value>,
}
