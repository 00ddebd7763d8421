use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::requests::payment::{PaymentIntentRequest, SubscriptionRequest};
use crate::services::donation::{CreatedIntent, CreatedSubscription};
use crate::utils::helpers::ApiResponse;

use super::CheckoutError;

/// Calls the site's own donation endpoints.
pub struct SiteApi {
    http: Client,
    base_url: String,
}

impl SiteApi {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CheckoutError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(CheckoutError::Site)?;
        let envelope: ApiResponse<T> = response.json().await.map_err(CheckoutError::Site)?;
        envelope.into_result().map_err(CheckoutError::Rejected)
    }

    pub async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<CreatedIntent, CheckoutError> {
        self.post("/api/create-payment-intent", request).await
    }

    pub async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<CreatedSubscription, CheckoutError> {
        self.post("/api/create-subscription", request).await
    }
}
