//! Donor-side half of the donation flow: amount, tokenization, intent creation
//! through the site API, then confirmation with the processor.

pub mod site;
pub mod stripe_js;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::donation::{AmountError, AmountSelection, Recurrence};
use crate::requests::payment::{PaymentIntentRequest, SubscriptionRequest};
use crate::services::stripe::StripeError;
use crate::utils::helpers::is_valid_email;

use self::site::SiteApi;
use self::stripe_js::{BillingContact, CardDetails, StripeJs};

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error("{0}")]
    Invalid(&'static str),
    #[error("A donation is already being processed")]
    InProgress,
    #[error(transparent)]
    Processor(#[from] StripeError),
    #[error("Could not reach the donation service: {0}")]
    Site(reqwest::Error),
    #[error("{0}")]
    Rejected(String),
    #[error("Unrecognised client secret")]
    MalformedClientSecret,
    #[error("Payment {id} was not completed (status {status})")]
    NotCompleted { id: String, status: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationPhase {
    Idle,
    Tokenizing,
    IntentCreated,
    Confirming,
    Succeeded,
    Failed,
}

pub struct DonationForm {
    pub selection: AmountSelection,
    pub recurrence: Recurrence,
    pub email: String,
    pub card_name: String,
    pub card: CardDetails,
}

pub struct DonationFlow {
    stripe: StripeJs,
    site: SiteApi,
    site_url: String,
    phase: DonationPhase,
    history: Vec<DonationPhase>,
    last_error: Option<String>,
}

impl DonationFlow {
    pub fn new(stripe: StripeJs, site: SiteApi, site_url: impl Into<String>) -> Self {
        Self {
            stripe,
            site,
            site_url: site_url.into().trim_end_matches('/').to_string(),
            phase: DonationPhase::Idle,
            history: vec![DonationPhase::Idle],
            last_error: None,
        }
    }

    pub fn phase(&self) -> DonationPhase {
        self.phase
    }

    /// Every phase entered so far, oldest first.
    pub fn history(&self) -> &[DonationPhase] {
        &self.history
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn enter(&mut self, phase: DonationPhase) {
        self.phase = phase;
        self.history.push(phase);
    }

    fn check(&self, form: &DonationForm) -> Result<(), CheckoutError> {
        if self.phase != DonationPhase::Idle {
            return Err(CheckoutError::InProgress);
        }
        form.selection.validate()?;
        if !is_valid_email(&form.email) {
            return Err(CheckoutError::Invalid("Please enter a valid email address"));
        }
        if form.card_name.trim().is_empty() {
            return Err(CheckoutError::Invalid("Please enter the name on the card"));
        }
        Ok(())
    }

    /// Runs one submission and returns the thank-you URL. Input problems are
    /// caught before any network call and leave the flow untouched. Any later
    /// failure is surfaced through `last_error` and the flow returns to idle,
    /// ready for another attempt.
    pub async fn submit(&mut self, form: &DonationForm) -> Result<String, CheckoutError> {
        self.check(form)?;
        self.last_error = None;

        match self.run(form).await {
            Ok(()) => {
                self.enter(DonationPhase::Succeeded);
                Ok(format!("{}/donate?success=true", self.site_url))
            }
            Err(e) => {
                warn!("Donation failed: {}", e);
                self.last_error = Some(e.to_string());
                self.enter(DonationPhase::Failed);
                self.enter(DonationPhase::Idle);
                Err(e)
            }
        }
    }

    async fn run(&mut self, form: &DonationForm) -> Result<(), CheckoutError> {
        let amount = form.selection.validate()?;
        let email = form.email.trim().to_string();
        let card_name = form.card_name.trim().to_string();

        self.enter(DonationPhase::Tokenizing);
        let billing = BillingContact {
            name: card_name.clone(),
            email: email.clone(),
        };
        let method = self.stripe.create_payment_method(&form.card, &billing).await?;

        let client_secret = match form.recurrence {
            Recurrence::OneOff => {
                let created = self
                    .site
                    .create_payment_intent(&PaymentIntentRequest {
                        amount: Some(amount.total),
                        email: Some(email),
                        card_name: Some(card_name),
                        donation_type: Some(form.recurrence.donation_type().to_string()),
                    })
                    .await?;
                created.client_secret
            }
            Recurrence::Recurring(interval) => {
                let created = self
                    .site
                    .create_subscription(&SubscriptionRequest {
                        email: Some(email),
                        payment_method_id: Some(method.id.clone()),
                        amount: Some(amount.total),
                        interval: Some(interval.as_str().to_string()),
                        card_name: Some(card_name),
                    })
                    .await?;
                created.client_secret
            }
        };
        self.enter(DonationPhase::IntentCreated);

        self.enter(DonationPhase::Confirming);
        let confirmed = self.stripe.confirm(&client_secret, &method.id).await?;
        info!("Donation confirmed: {} ({})", confirmed.id, confirmed.status);
        Ok(())
    }
}
