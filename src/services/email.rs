use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, MultiPart, SinglePart, header, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("SMTP configuration error: {0}")]
    Config(String),
    #[error("Email sending failed: {0}")]
    Send(#[from] lettre::transport::smtp::Error),
    #[error("Message building failed: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("Address parsing failed: {0}")]
    Address(#[from] lettre::address::AddressError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_email: String,
    pub from_name: String,
}

impl EmailConfig {
    /// `None` when SMTP is not configured; receipts are then compose-only.
    pub fn from_app_config(config: &AppConfig) -> Option<Self> {
        Some(Self {
            smtp_server: config.smtp_server.clone()?,
            smtp_port: config.smtp_port.unwrap_or(587),
            username: config.smtp_username.clone()?,
            password: config.smtp_password.clone()?,
            from_email: config.from_email.clone()?,
            from_name: config
                .from_name
                .clone()
                .unwrap_or_else(|| config.campaign_name.clone()),
        })
    }
}

pub struct EmailService {
    mailer: SmtpTransport,
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let creds = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let mailer = SmtpTransport::relay(&config.smtp_server)
            .map_err(|e| EmailError::Config(format!("SMTP relay error: {}", e)))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, config })
    }

    fn sender(&self) -> Result<Mailbox, EmailError> {
        Ok(Mailbox::new(
            Some(self.config.from_name.clone()),
            self.config.from_email.parse()?,
        ))
    }

    /// Blocking; call from `web::block`.
    pub fn send_email(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        template: EmailTemplate,
    ) -> Result<(), EmailError> {
        let recipient = Mailbox::new(to_name.map(str::to_string), to_email.parse()?);
        let message = build_message(self.sender()?, recipient, template)?;

        self.mailer.send(&message)?;
        info!("Sent \"{}\" to {}", message_subject(&message), to_email);
        Ok(())
    }
}

fn message_subject(message: &Message) -> String {
    message
        .headers()
        .get::<header::Subject>()
        .map(|subject| subject.as_ref().to_string())
        .unwrap_or_default()
}

/// HTML only, or a text/HTML alternative when a plain body is supplied.
fn build_message(
    from: Mailbox,
    to: Mailbox,
    template: EmailTemplate,
) -> Result<Message, EmailError> {
    let builder = Message::builder().from(from).to(to).subject(template.subject);
    let html = SinglePart::builder()
        .header(ContentType::TEXT_HTML)
        .body(template.html_body);

    let message = match template.text_body {
        Some(text) => builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text),
                )
                .singlepart(html),
        )?,
        None => builder.singlepart(html)?,
    };
    Ok(message)
}
