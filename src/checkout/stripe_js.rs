//! Donor-side processor calls made with the publishable key: card
//! tokenization and intent confirmation.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::info;

use crate::services::client::{ProviderAuth, ProviderClient};
use crate::services::stripe::{StripeError, decode};

use super::CheckoutError;

/// Raw card input. Held as secrets so it never shows up in logs or `Debug`.
pub struct CardDetails {
    pub number: SecretString,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: SecretString,
}

impl CardDetails {
    pub fn new(
        number: impl Into<String>,
        exp_month: u8,
        exp_year: u16,
        cvc: impl Into<String>,
    ) -> Self {
        Self {
            number: SecretString::new(number.into().into()),
            exp_month,
            exp_year,
            cvc: SecretString::new(cvc.into().into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BillingContact {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Payment,
    Setup,
}

impl IntentKind {
    fn collection(&self) -> &'static str {
        match self {
            IntentKind::Payment => "payment_intents",
            IntentKind::Setup => "setup_intents",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmedIntent {
    pub id: String,
    pub status: String,
}

impl ConfirmedIntent {
    pub fn is_successful(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "processing")
    }
}

/// Splits `pi_123_secret_abc` into the intent kind and `pi_123`.
pub fn intent_from_secret(client_secret: &str) -> Option<(IntentKind, &str)> {
    let (id, _) = client_secret.split_once("_secret_")?;
    if id.starts_with("pi_") {
        Some((IntentKind::Payment, id))
    } else if id.starts_with("seti_") {
        Some((IntentKind::Setup, id))
    } else {
        None
    }
}

pub struct StripeJs {
    client: ProviderClient,
}

impl StripeJs {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        publishable_key: impl Into<String>,
    ) -> Self {
        Self {
            client: ProviderClient::new(http, base_url, ProviderAuth::bearer(publishable_key)),
        }
    }

    /// Tokenizes the card. Processor errors come back verbatim and are not
    /// retried.
    pub async fn create_payment_method(
        &self,
        card: &CardDetails,
        billing: &BillingContact,
    ) -> Result<PaymentMethod, StripeError> {
        let form = [
            ("type", "card".to_string()),
            ("card[number]", card.number.expose_secret().to_string()),
            ("card[exp_month]", card.exp_month.to_string()),
            ("card[exp_year]", card.exp_year.to_string()),
            ("card[cvc]", card.cvc.expose_secret().to_string()),
            ("billing_details[name]", billing.name.clone()),
            ("billing_details[email]", billing.email.clone()),
        ];
        let response = self.client.post_form("/payment_methods", &form[..]).await?;
        let method: PaymentMethod = decode(response).await?;
        info!("Tokenized {} payment method {}", method.kind, method.id);
        Ok(method)
    }

    pub async fn confirm(
        &self,
        client_secret: &str,
        payment_method: &str,
    ) -> Result<ConfirmedIntent, CheckoutError> {
        let (kind, id) =
            intent_from_secret(client_secret).ok_or(CheckoutError::MalformedClientSecret)?;
        let form = [
            ("client_secret", client_secret),
            ("payment_method", payment_method),
        ];
        let response = self
            .client
            .post_form(&format!("/{}/{}/confirm", kind.collection(), id), &form[..])
            .await
            .map_err(StripeError::from)?;
        let confirmed: ConfirmedIntent = decode(response).await?;

        if confirmed.is_successful() {
            Ok(confirmed)
        } else {
            Err(CheckoutError::NotCompleted {
                id: confirmed.id,
                status: confirmed.status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_id_comes_from_the_secret_prefix() {
        assert_eq!(
            intent_from_secret("pi_3Abc_secret_xyz"),
            Some((IntentKind::Payment, "pi_3Abc"))
        );
        assert_eq!(
            intent_from_secret("seti_9_secret_q"),
            Some((IntentKind::Setup, "seti_9"))
        );
        assert_eq!(intent_from_secret("pi_no_marker"), None);
        assert_eq!(intent_from_secret("cus_1_secret_x"), None);
    }

    #[test]
    fn processing_counts_as_success() {
        let intent = ConfirmedIntent {
            id: "pi_1".to_string(),
            status: "processing".to_string(),
        };
        assert!(intent.is_successful());

        let action = ConfirmedIntent {
            id: "pi_1".to_string(),
            status: "requires_action".to_string(),
        };
        assert!(!action.is_successful());
    }
}
