//! Server-side calls to the payment processor (Stripe-compatible REST API).

use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

use crate::models::donation::{AmountError, CURRENCY, Interval};
use crate::services::client::{ProviderAuth, ProviderClient};

#[derive(Error, Debug)]
pub enum StripeError {
    #[error("Payment processor request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The processor's own message, passed through untouched.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        decline_code: Option<String>,
        message: String,
    },
    #[error("no payment_intent returned")]
    MissingPaymentIntent,
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Either a bare id or the expanded object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

impl<T> Expandable<T> {
    pub fn object(&self) -> Option<&T> {
        match self {
            Expandable::Object(object) => Some(object),
            Expandable::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub client_secret: Option<String>,
    pub customer: Option<Expandable<Customer>>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub created: i64,
    pub receipt_email: Option<String>,
    pub invoice: Option<Expandable<Invoice>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub payment_intent: Option<Expandable<PaymentIntent>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceRecurring {
    pub interval: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    pub id: String,
    pub unit_amount: Option<i64>,
    pub currency: String,
    pub recurring: Option<PriceRecurring>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub status: String,
    pub latest_invoice: Option<Expandable<Invoice>>,
}

impl Subscription {
    /// Client secret of the first invoice's payment intent, when expanded.
    pub fn first_payment_secret(&self) -> Option<&str> {
        self.latest_invoice
            .as_ref()?
            .object()?
            .payment_intent
            .as_ref()?
            .object()?
            .client_secret
            .as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillingDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    pub id: String,
    pub amount: i64,
    pub created: i64,
    pub receipt_url: Option<String>,
    pub receipt_number: Option<String>,
    pub billing_details: Option<BillingDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct List<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    code: Option<String>,
    decline_code: Option<String>,
}

/// Decodes a processor response, turning non-2xx bodies into `StripeError::Api`.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StripeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await?;
    let detail = serde_json::from_str::<ErrorBody>(&text).ok().map(|b| b.error);
    let err = StripeError::Api {
        status: status.as_u16(),
        code: detail.as_ref().and_then(|d| d.code.clone()),
        decline_code: detail.as_ref().and_then(|d| d.decline_code.clone()),
        message: detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| format!("Payment processor returned {}: {}", status, text)),
    };
    warn!("Payment processor error: {}", err);
    Err(err)
}

pub struct NewPaymentIntent<'a> {
    pub amount_minor: i64,
    pub customer_id: &'a str,
    pub receipt_email: &'a str,
    pub statement_descriptor_suffix: &'a str,
    pub metadata: Vec<(&'static str, String)>,
}

pub struct NewSubscription<'a> {
    pub customer_id: &'a str,
    pub price_id: &'a str,
    pub metadata: Vec<(&'static str, String)>,
}

type Form = Vec<(String, String)>;

fn push(form: &mut Form, key: &str, value: impl Into<String>) {
    form.push((key.to_string(), value.into()));
}

fn push_metadata(form: &mut Form, metadata: &[(&'static str, String)]) {
    for (key, value) in metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }
}

/// Secret-key client for the processor.
pub struct StripeClient {
    client: ProviderClient,
}

impl StripeClient {
    pub fn new(http: Client, base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client: ProviderClient::new(http, base_url, ProviderAuth::bearer(secret_key)),
        }
    }

    /// Always creates a new customer; there is no lookup by email.
    pub async fn create_customer(
        &self,
        email: &str,
        name: &str,
        payment_method: Option<&str>,
    ) -> Result<Customer, StripeError> {
        let mut form = Form::new();
        push(&mut form, "email", email);
        if !name.is_empty() {
            push(&mut form, "name", name);
        }
        if let Some(pm) = payment_method {
            push(&mut form, "payment_method", pm);
            push(&mut form, "invoice_settings[default_payment_method]", pm);
        }

        let response = self.client.post_form("/customers", &form).await?;
        decode(response).await
    }

    pub async fn get_customer(&self, id: &str) -> Result<Customer, StripeError> {
        let response = self
            .client
            .get(&format!("/customers/{}", id), &[] as &[(&str, &str)])
            .await?;
        decode(response).await
    }

    pub async fn create_payment_intent(
        &self,
        intent: &NewPaymentIntent<'_>,
    ) -> Result<PaymentIntent, StripeError> {
        let mut form = Form::new();
        push(&mut form, "amount", intent.amount_minor.to_string());
        push(&mut form, "currency", CURRENCY);
        push(&mut form, "customer", intent.customer_id);
        push(&mut form, "receipt_email", intent.receipt_email);
        push(&mut form, "automatic_payment_methods[enabled]", "true");
        push(
            &mut form,
            "statement_descriptor_suffix",
            intent.statement_descriptor_suffix,
        );
        push_metadata(&mut form, &intent.metadata);

        let response = self.client.post_form("/payment_intents", &form).await?;
        decode(response).await
    }

    /// Fetches an intent with its customer expanded.
    pub async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, StripeError> {
        let response = self
            .client
            .get(&format!("/payment_intents/{}", id), &[("expand[]", "customer")])
            .await?;
        decode(response).await
    }

    pub async fn list_charges(&self, payment_intent: &str) -> Result<Vec<Charge>, StripeError> {
        let response = self
            .client
            .get("/charges", &[("payment_intent", payment_intent)])
            .await?;
        let list: List<Charge> = decode(response).await?;
        Ok(list.data)
    }

    pub async fn create_product(&self, name: &str) -> Result<Product, StripeError> {
        let form = vec![("name".to_string(), name.to_string())];
        let response = self.client.post_form("/products", &form).await?;
        decode(response).await
    }

    pub async fn create_price(
        &self,
        product_id: &str,
        unit_amount: i64,
        interval: Interval,
    ) -> Result<Price, StripeError> {
        let mut form = Form::new();
        push(&mut form, "product", product_id);
        push(&mut form, "unit_amount", unit_amount.to_string());
        push(&mut form, "currency", CURRENCY);
        push(&mut form, "recurring[interval]", interval.as_str());

        let response = self.client.post_form("/prices", &form).await?;
        decode(response).await
    }

    /// Creates an incomplete subscription whose first invoice still needs
    /// client-side confirmation.
    pub async fn create_subscription(
        &self,
        subscription: &NewSubscription<'_>,
    ) -> Result<Subscription, StripeError> {
        let mut form = Form::new();
        push(&mut form, "customer", subscription.customer_id);
        push(&mut form, "items[0][price]", subscription.price_id);
        push(&mut form, "payment_behavior", "default_incomplete");
        push(
            &mut form,
            "payment_settings[save_default_payment_method]",
            "on_subscription",
        );
        push(&mut form, "expand[]", "latest_invoice.payment_intent");
        push_metadata(&mut form, &subscription.metadata);

        let response = self.client.post_form("/subscriptions", &form).await?;
        decode(response).await
    }
}
