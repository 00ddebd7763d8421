use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::donation::{Interval, Recurrence};
use crate::utils::helpers::{is_valid_email, non_blank};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub amount: Option<Decimal>,
    pub email: Option<String>,
    pub card_name: Option<String>,
    pub donation_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub email: Option<String>,
    pub payment_method_id: Option<String>,
    pub amount: Option<Decimal>,
    pub interval: Option<String>,
    pub card_name: Option<String>,
}

/// A one-off donation that passed request validation.
#[derive(Debug, Clone)]
pub struct OneOffDonation {
    pub amount: Decimal,
    pub email: String,
    pub donor_name: String,
    pub donation_type: String,
}

#[derive(Debug, Clone)]
pub struct RecurringDonation {
    pub amount: Decimal,
    pub email: String,
    pub donor_name: String,
    pub payment_method_id: String,
    pub interval: Interval,
}

fn positive_amount(amount: Option<Decimal>) -> Result<Decimal, String> {
    match amount {
        Some(amount) if amount > Decimal::ZERO => Ok(amount),
        Some(_) => Err("Amount must be greater than zero".to_string()),
        None => Err("Amount is required".to_string()),
    }
}

fn required_email(email: &Option<String>) -> Result<String, String> {
    match non_blank(email) {
        Some(email) if is_valid_email(email) => Ok(email.to_string()),
        Some(_) => Err("Email address is invalid".to_string()),
        None => Err("Email is required".to_string()),
    }
}

impl PaymentIntentRequest {
    pub fn validate(&self) -> Result<OneOffDonation, String> {
        let amount = positive_amount(self.amount)?;
        let email = required_email(&self.email)?;
        Ok(OneOffDonation {
            amount,
            email,
            donor_name: non_blank(&self.card_name).unwrap_or_default().to_string(),
            donation_type: non_blank(&self.donation_type)
                .unwrap_or(Recurrence::OneOff.donation_type())
                .to_string(),
        })
    }
}

impl SubscriptionRequest {
    /// Interval is checked first so a bad interval never reaches the processor.
    pub fn validate(&self) -> Result<RecurringDonation, String> {
        let interval = match non_blank(&self.interval) {
            Some(raw) => raw
                .parse::<Interval>()
                .map_err(|_| format!("Invalid interval '{}': expected 'month' or 'week'", raw))?,
            None => return Err("Interval is required".to_string()),
        };
        let email = required_email(&self.email)?;
        let payment_method_id = non_blank(&self.payment_method_id)
            .ok_or_else(|| "Payment method is required".to_string())?
            .to_string();
        let amount = positive_amount(self.amount)?;

        Ok(RecurringDonation {
            amount,
            email,
            donor_name: non_blank(&self.card_name).unwrap_or_default().to_string(),
            payment_method_id,
            interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_off_requires_amount_and_email() {
        let missing_amount = PaymentIntentRequest {
            email: Some("a@b.org".to_string()),
            ..Default::default()
        };
        assert!(missing_amount.validate().is_err());

        let missing_email = PaymentIntentRequest {
            amount: Some(Decimal::from(10)),
            ..Default::default()
        };
        assert!(missing_email.validate().is_err());

        let ok = PaymentIntentRequest {
            amount: Some(Decimal::new(3030, 2)),
            email: Some("donor@example.org".to_string()),
            card_name: Some("Alex Chen".to_string()),
            donation_type: None,
        }
        .validate()
        .unwrap();
        assert_eq!(ok.donation_type, "one-off");
        assert_eq!(ok.donor_name, "Alex Chen");
    }

    #[test]
    fn subscription_rejects_unknown_interval() {
        let request = SubscriptionRequest {
            email: Some("donor@example.org".to_string()),
            payment_method_id: Some("pm_123".to_string()),
            amount: Some(Decimal::from(12)),
            interval: Some("day".to_string()),
            card_name: None,
        };
        let err = request.validate().unwrap_err();
        assert!(err.contains("day"));

        let monthly = SubscriptionRequest {
            interval: Some("month".to_string()),
            ..request
        };
        assert_eq!(monthly.validate().unwrap().interval, Interval::Month);
    }

    #[test]
    fn amounts_accept_numbers_and_strings() {
        let from_number: PaymentIntentRequest =
            serde_json::from_str(r#"{"amount": 30.3, "email": "a@b.org"}"#).unwrap();
        assert_eq!(from_number.amount, Some(Decimal::new(303, 1)));

        let from_string: PaymentIntentRequest =
            serde_json::from_str(r#"{"amount": "30.30", "email": "a@b.org"}"#).unwrap();
        assert_eq!(from_string.amount, Some(Decimal::new(3030, 2)));
    }
}
