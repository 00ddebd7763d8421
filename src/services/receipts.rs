use chrono::{TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::donation::from_minor_units;
use crate::models::receipt::{ReceiptTemplate, render_html};
use crate::services::email::EmailTemplate;
use crate::services::stripe::{Customer, Expandable, PaymentIntent, StripeClient, StripeError};

#[derive(Error, Debug)]
pub enum ReceiptError {
    #[error("No customer found for payment {0}")]
    MissingCustomer(String),
    #[error("No charge found for payment {0}")]
    MissingCharge(String),
    #[error("No recipient email for payment {0}")]
    MissingRecipient(String),
    #[error(transparent)]
    Stripe(#[from] StripeError),
}

#[derive(Debug, Clone, Serialize)]
pub struct ComposedEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedReceipt {
    pub email: ComposedEmail,
    pub receipt_url: Option<String>,
    pub template: ReceiptTemplate,
    pub sent: bool,
}

impl ComposedReceipt {
    pub fn email_template(&self) -> EmailTemplate {
        EmailTemplate {
            subject: self.email.subject.clone(),
            html_body: self.email.html.clone(),
            text_body: None,
        }
    }
}

const RECURRING_TYPES: [&str; 3] = ["recurring", "monthly", "weekly"];

pub fn is_recurring(intent: &PaymentIntent) -> bool {
    intent.invoice.is_some()
        || intent
            .metadata
            .get("donation_type")
            .map(|t| RECURRING_TYPES.contains(&t.to_lowercase().as_str()))
            .unwrap_or(false)
}

async fn resolve_customer(
    stripe: &StripeClient,
    intent: &PaymentIntent,
) -> Result<Option<Customer>, StripeError> {
    let customer = match &intent.customer {
        Some(Expandable::Object(customer)) => Some(customer.as_ref().clone()),
        Some(Expandable::Id(id)) => Some(stripe.get_customer(id).await?),
        None => None,
    };
    Ok(customer.filter(|c| !c.deleted))
}

/// Looks up a past payment and renders its receipt. Nothing is sent here.
pub async fn compose_receipt(
    stripe: &StripeClient,
    payment_intent_id: &str,
    custom_message: Option<&str>,
    email_override: Option<&str>,
) -> Result<ComposedReceipt, ReceiptError> {
    let intent = stripe.retrieve_payment_intent(payment_intent_id).await?;
    let customer = resolve_customer(stripe, &intent)
        .await?
        .ok_or_else(|| ReceiptError::MissingCustomer(intent.id.clone()))?;
    let charge = stripe
        .list_charges(&intent.id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ReceiptError::MissingCharge(intent.id.clone()))?;

    let recurring = is_recurring(&intent);
    let amount = from_minor_units(intent.amount);
    let template = ReceiptTemplate::select(amount, recurring);

    let donor_name = customer
        .name
        .clone()
        .or_else(|| intent.metadata.get("donor_name").cloned())
        .or_else(|| charge.billing_details.as_ref().and_then(|b| b.name.clone()))
        .filter(|n| !n.trim().is_empty());
    let to = email_override
        .map(str::to_string)
        .or_else(|| customer.email.clone())
        .or_else(|| intent.receipt_email.clone())
        .or_else(|| charge.billing_details.as_ref().and_then(|b| b.email.clone()))
        .ok_or_else(|| ReceiptError::MissingRecipient(intent.id.clone()))?;

    let date = Utc
        .timestamp_opt(charge.created, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let receipt_number = charge
        .receipt_number
        .clone()
        .unwrap_or_else(|| charge.id.clone());

    let html = render_html(
        template,
        amount,
        date,
        &receipt_number,
        custom_message,
        donor_name.as_deref(),
    );

    Ok(ComposedReceipt {
        email: ComposedEmail {
            to,
            subject: template.subject().to_string(),
            html,
        },
        receipt_url: charge.receipt_url,
        template,
        sent: false,
    })
}
