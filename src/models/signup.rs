use serde::{Deserialize, Serialize};

/// Marketing attribution carried from the landing URL into the CRM.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UtmAttribution {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub term: Option<String>,
    pub content: Option<String>,
}

impl UtmAttribution {
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("utm_source", &self.source),
            ("utm_medium", &self.medium),
            ("utm_campaign", &self.campaign),
            ("utm_term", &self.term),
            ("utm_content", &self.content),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

/// A validated supporter record, ready to relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRecord {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub postcode: Option<String>,
    pub phone: Option<String>,
    pub source: String,
    pub utm: UtmAttribution,
    pub first_nations: bool,
}

impl SignupRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
            .trim()
            .to_string()
    }
}
