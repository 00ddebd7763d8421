use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Runtime settings, read from the process environment (and `.env` via dotenv).
///
/// Keys are the lower-cased environment variable names, so `STRIPE_SECRET_KEY`
/// lands in `stripe_secret_key`. Values are taken as strings and only the
/// numeric fields are converted, so digit-only keys and ids survive intact.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Public origin of the campaign site, used for CORS and thank-you redirects.
    pub site_url: String,
    pub campaign_name: String,
    pub http_timeout_secs: u64,

    // Payment processor
    pub stripe_secret_key: SecretString,
    pub stripe_publishable_key: String,
    pub stripe_api_base: String,
    pub statement_descriptor_suffix: String,

    // CRM
    pub action_network_api_key: SecretString,
    pub action_network_api_base: String,
    pub action_network_campaign_tag: String,
    pub action_network_contact_tag_id: Option<String>,

    // Helpdesk
    pub freshdesk_domain: String,
    pub freshdesk_api_key: SecretString,
    pub freshdesk_api_base: Option<String>,

    // Events
    pub humanitix_api_key: SecretString,
    pub humanitix_api_base: String,

    // Blog
    pub blogger_blog_id: String,
    pub blogger_api_key: SecretString,
    pub blogger_api_base: String,
    pub blogger_label: String,

    /// Bearer secret guarding the monitor log and receipt composer.
    pub monitor_secret: Option<SecretString>,

    pub smtp_server: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<SecretString>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("site_url", "http://localhost:3000")?
            .set_default("campaign_name", "campaign")?
            .set_default("http_timeout_secs", 30)?
            .set_default("stripe_api_base", "https://api.stripe.com/v1")?
            .set_default("statement_descriptor_suffix", "DONATION")?
            .set_default("action_network_api_base", "https://actionnetwork.org/api/v2")?
            .set_default("action_network_campaign_tag", "website-signup")?
            .set_default("humanitix_api_base", "https://api.humanitix.com/v1")?
            .set_default("blogger_api_base", "https://www.googleapis.com/blogger/v3")?
            .set_default("blogger_label", "website")?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    pub fn freshdesk_base_url(&self) -> String {
        match &self.freshdesk_api_base {
            Some(base) => base.clone(),
            None => format!("https://{}.freshdesk.com/api/v2", self.freshdesk_domain),
        }
    }

    pub fn monitor_secret(&self) -> Option<&str> {
        self.monitor_secret.as_ref().map(|secret| secret.expose_secret())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
