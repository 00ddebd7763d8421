use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::donation::{Recurrence, THANK_YOU_MESSAGE, to_minor_units};
use crate::requests::payment::{OneOffDonation, RecurringDonation};
use crate::services::stripe::{NewPaymentIntent, NewSubscription, StripeClient, StripeError};

/// Campaign-wide values stamped on every processor object.
#[derive(Debug, Clone)]
pub struct DonationSettings {
    pub campaign: String,
    pub statement_descriptor_suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIntent {
    pub client_secret: String,
    pub payment_intent_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSubscription {
    pub subscription_id: String,
    pub client_secret: String,
    pub status: String,
}

/// Customer, then payment intent. Every call creates a fresh customer.
pub async fn create_one_off(
    stripe: &StripeClient,
    settings: &DonationSettings,
    donation: &OneOffDonation,
) -> Result<CreatedIntent, StripeError> {
    let amount_minor = to_minor_units(donation.amount)?;
    let customer = stripe
        .create_customer(&donation.email, &donation.donor_name, None)
        .await?;

    let intent = stripe
        .create_payment_intent(&NewPaymentIntent {
            amount_minor,
            customer_id: &customer.id,
            receipt_email: &donation.email,
            statement_descriptor_suffix: &settings.statement_descriptor_suffix,
            metadata: vec![
                ("campaign", settings.campaign.clone()),
                ("donor_name", donation.donor_name.clone()),
                ("donation_type", donation.donation_type.clone()),
                ("message", THANK_YOU_MESSAGE.to_string()),
            ],
        })
        .await?;

    info!(
        "Created payment intent {} for {} cents (customer {})",
        intent.id, amount_minor, customer.id
    );

    let client_secret = intent
        .client_secret
        .ok_or(StripeError::MissingPaymentIntent)?;
    Ok(CreatedIntent {
        client_secret,
        payment_intent_id: intent.id,
    })
}

/// Customer with default payment method, a product and price of its own, then
/// an incomplete subscription. Nothing is reused between donors.
pub async fn create_recurring(
    stripe: &StripeClient,
    settings: &DonationSettings,
    donation: &RecurringDonation,
) -> Result<CreatedSubscription, StripeError> {
    let amount_minor = to_minor_units(donation.amount)?;
    let recurrence = Recurrence::Recurring(donation.interval);

    let customer = stripe
        .create_customer(
            &donation.email,
            &donation.donor_name,
            Some(&donation.payment_method_id),
        )
        .await?;

    let product_name = if donation.donor_name.is_empty() {
        format!("{} {} donation", settings.campaign, recurrence.donation_type())
    } else {
        format!(
            "{} {} donation - {}",
            settings.campaign,
            recurrence.donation_type(),
            donation.donor_name
        )
    };
    let product = stripe.create_product(&product_name).await?;
    let price = stripe
        .create_price(&product.id, amount_minor, donation.interval)
        .await?;

    let subscription = stripe
        .create_subscription(&NewSubscription {
            customer_id: &customer.id,
            price_id: &price.id,
            metadata: vec![
                ("campaign", settings.campaign.clone()),
                ("donor_name", donation.donor_name.clone()),
                ("donation_type", recurrence.donation_type().to_string()),
            ],
        })
        .await?;

    let client_secret = subscription
        .first_payment_secret()
        .ok_or(StripeError::MissingPaymentIntent)?
        .to_string();

    info!(
        "Created {} subscription {} for {} cents (customer {})",
        donation.interval, subscription.id, amount_minor, customer.id
    );

    Ok(CreatedSubscription {
        subscription_id: subscription.id,
        client_secret,
        status: subscription.status,
    })
}
