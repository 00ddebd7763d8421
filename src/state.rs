use secrecy::ExposeSecret;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::monitor::MonitorLog;
use crate::services::action_network::ActionNetworkClient;
use crate::services::automation::ContactAutomation;
use crate::services::blogger::BloggerClient;
use crate::services::client::build_http_client;
use crate::services::donation::DonationSettings;
use crate::services::email::{EmailConfig, EmailError, EmailService};
use crate::services::freshdesk::FreshdeskClient;
use crate::services::humanitix::HumanitixClient;
use crate::services::stripe::StripeClient;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// Everything the handlers share, held in `web::Data`.
pub struct AppState {
    pub config: AppConfig,
    pub stripe: StripeClient,
    pub action_network: ActionNetworkClient,
    pub freshdesk: FreshdeskClient,
    pub humanitix: HumanitixClient,
    pub blogger: BloggerClient,
    pub monitor: MonitorLog,
    pub mailer: Option<Arc<EmailService>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, StateError> {
        let http = build_http_client(config.http_timeout_secs)?;
        let mailer = match EmailConfig::from_app_config(&config) {
            Some(email_config) => Some(Arc::new(EmailService::new(email_config)?)),
            None => None,
        };

        Ok(Self {
            stripe: StripeClient::new(
                http.clone(),
                &config.stripe_api_base,
                config.stripe_secret_key.expose_secret(),
            ),
            action_network: ActionNetworkClient::new(
                http.clone(),
                &config.action_network_api_base,
                config.action_network_api_key.expose_secret(),
            ),
            freshdesk: FreshdeskClient::new(
                http.clone(),
                config.freshdesk_base_url(),
                config.freshdesk_api_key.expose_secret(),
            ),
            humanitix: HumanitixClient::new(
                http.clone(),
                &config.humanitix_api_base,
                config.humanitix_api_key.expose_secret(),
            ),
            blogger: BloggerClient::new(
                http,
                &config.blogger_api_base,
                config.blogger_api_key.expose_secret(),
                &config.blogger_blog_id,
                &config.blogger_label,
            ),
            monitor: MonitorLog::default(),
            mailer,
            config,
        })
    }

    pub fn donation_settings(&self) -> DonationSettings {
        DonationSettings {
            campaign: self.config.campaign_name.clone(),
            statement_descriptor_suffix: self.config.statement_descriptor_suffix.clone(),
        }
    }

    pub fn contact_automation(&self) -> ContactAutomation<'_> {
        ContactAutomation {
            freshdesk: &self.freshdesk,
            action_network: &self.action_network,
            monitor: &self.monitor,
            campaign: &self.config.campaign_name,
            contact_tag_id: self.config.action_network_contact_tag_id.as_deref(),
        }
    }
}
