use serde::{Deserialize, Serialize};

use promo_core::Money;

/// Discount recorded against a shipping rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    /// Total amount taken off the rate so far.
    pub amount: Money,
    /// Reason shown to the buyer (latest discount wins).
    pub message: String,
}

/// Shipping rate offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub name: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<AppliedDiscount>,
}

impl ShippingRate {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
            discount: None,
        }
    }

    /// Price before any discount was applied to this rate.
    pub fn original_price(&self) -> Money {
        self.price + self.discount.as_ref().map_or(Money::ZERO, |d| d.amount)
    }

    pub fn discount_message(&self) -> Option<&str> {
        self.discount.as_ref().map(|d| d.message.as_str())
    }

    /// Take `amount` off the price (never below zero) and record `message`.
    pub fn apply_discount(&mut self, amount: Money, message: impl Into<String>) {
        let amount = amount.min(self.price).max(Money::ZERO);
        self.price -= amount;
        let message = message.into();
        match &mut self.discount {
            Some(applied) => {
                applied.amount += amount;
                applied.message = message;
            }
            None => self.discount = Some(AppliedDiscount { amount, message }),
        }
    }
}
