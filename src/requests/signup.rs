use serde::Deserialize;

use crate::models::signup::{SignupRecord, UtmAttribution};
use crate::utils::helpers::{is_valid_email, non_blank};

pub const DEFAULT_SOURCE: &str = "website";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub postcode: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    #[serde(default)]
    pub first_nations: bool,
}

fn owned(value: &Option<String>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

impl SignupRequest {
    pub fn validate(&self) -> Result<SignupRecord, String> {
        let given_name = non_blank(&self.first_name).ok_or("First name is required")?;
        let family_name = non_blank(&self.last_name).ok_or("Last name is required")?;
        let email = non_blank(&self.email).ok_or("Email is required")?;
        if !is_valid_email(email) {
            return Err("Please enter a valid email address".to_string());
        }
        let postcode = non_blank(&self.postcode).ok_or("Postcode is required")?;
        if !postcode.chars().all(|c| c.is_ascii_digit()) || postcode.len() != 4 {
            return Err("Postcode must be 4 digits".to_string());
        }

        Ok(SignupRecord {
            given_name: given_name.to_string(),
            family_name: family_name.to_string(),
            email: email.to_lowercase(),
            postcode: Some(postcode.to_string()),
            phone: owned(&self.phone),
            source: owned(&self.source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            utm: UtmAttribution {
                source: owned(&self.utm_source),
                medium: owned(&self.utm_medium),
                campaign: owned(&self.utm_campaign),
                term: owned(&self.utm_term),
                content: owned(&self.utm_content),
            },
            first_nations: self.first_nations,
        })
    }
}
