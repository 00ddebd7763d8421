use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// All donations are taken in Australian dollars.
pub const CURRENCY: &str = "aud";

/// Fixed thank-you text stored on every intent's metadata.
pub const THANK_YOU_MESSAGE: &str = "Thank you for supporting the campaign!";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AmountError {
    #[error("Please choose or enter a donation amount greater than zero")]
    NotPositive,
    #[error("Amount {0} is too large to charge")]
    OutOfRange(Decimal),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Week,
    Month,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Week => "week",
            Interval::Month => "month",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Interval::Week),
            "month" => Ok(Interval::Month),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    OneOff,
    Recurring(Interval),
}

impl Recurrence {
    /// Tag written to the processor metadata as `donation_type`.
    pub fn donation_type(&self) -> &'static str {
        match self {
            Recurrence::OneOff => "one-off",
            Recurrence::Recurring(Interval::Week) => "weekly",
            Recurrence::Recurring(Interval::Month) => "monthly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self, Recurrence::Recurring(_))
    }

    pub fn presets(&self) -> Vec<Decimal> {
        let whole: &[i64] = match self {
            Recurrence::OneOff => &[10, 25, 50, 100, 250],
            Recurrence::Recurring(_) => &[5, 10, 25, 50],
        };
        whole.iter().map(|v| Decimal::from(*v)).collect()
    }
}

/// What the donor picked on the form: a preset button and/or a typed amount.
#[derive(Debug, Clone, Default)]
pub struct AmountSelection {
    pub preset: Option<Decimal>,
    pub custom: Option<String>,
    pub cover_fees: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DonationAmount {
    #[serde(with = "rust_decimal::serde::float")]
    pub base: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl AmountSelection {
    pub fn preset(amount: Decimal, cover_fees: bool) -> Self {
        Self {
            preset: Some(amount),
            custom: None,
            cover_fees,
        }
    }

    pub fn custom(input: impl Into<String>, cover_fees: bool) -> Self {
        Self {
            preset: None,
            custom: Some(input.into()),
            cover_fees,
        }
    }

    /// A typed amount overrides the preset; unparsable input counts as zero.
    pub fn base(&self) -> Decimal {
        match self.custom.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                let text = text.trim_start_matches('$').replace(',', "");
                Decimal::from_str(&text).unwrap_or(Decimal::ZERO)
            }
            _ => self.preset.unwrap_or(Decimal::ZERO),
        }
    }

    pub fn calculate(&self) -> DonationAmount {
        let base = self.base();
        let fee = if self.cover_fees {
            round_cents(base * fee_rate())
        } else {
            Decimal::ZERO
        };
        DonationAmount {
            base,
            fee,
            total: base + fee,
        }
    }

    /// Pre-submit guard: nothing goes to the processor unless `base > 0`.
    pub fn validate(&self) -> Result<DonationAmount, AmountError> {
        let amount = self.calculate();
        if amount.base <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }
        Ok(amount)
    }
}

/// Processor fee the donor may choose to cover, as a fraction of the base.
pub fn fee_rate() -> Decimal {
    Decimal::new(1, 2)
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Dollars to cents, rounding half away from zero at the boundary.
pub fn to_minor_units(amount: Decimal) -> Result<i64, AmountError> {
    if amount <= Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(AmountError::OutOfRange(amount))
}

pub fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
