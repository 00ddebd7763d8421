use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomReceiptRequest {
    pub payment_intent_id: Option<String>,
    pub custom_message: Option<String>,
    /// Overrides the customer's email as the recipient.
    pub email: Option<String>,
    #[serde(default)]
    pub send: bool,
}
