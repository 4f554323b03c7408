//! Discount strategies applied to matched shipping rates.

use core::fmt;

use promo_checkout::{Cart, ShippingRate};
use promo_core::{ConfigError, Fraction, Money};

/// Strategy a campaign applies to every rate its rate selector matches.
///
/// `apply_final` runs once per qualified campaign run, after every rate has
/// been visited and before the post-amount check. Strategies that rewrite
/// line items do it there; whatever they change is rolled back if the
/// campaign's post-amount qualifier fails afterwards.
pub trait Discount: fmt::Debug + Send + Sync {
    fn apply(&self, rate: &mut ShippingRate);

    fn apply_final(&self, _cart: &mut Cart) {}
}

/// Takes a fixed percentage off the rate price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentageDiscount {
    fraction: Fraction,
    message: String,
}

impl PercentageDiscount {
    /// `percent` must be within 0..=100.
    pub fn new(percent: i64, message: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            fraction: Fraction::from_percent(percent)?,
            message: message.into(),
        })
    }

    pub fn fraction(&self) -> Fraction {
        self.fraction
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Amount this discount takes off `price`.
    pub fn amount_off(&self, price: Money) -> Money {
        price.mul_fraction(self.fraction)
    }
}

impl Discount for PercentageDiscount {
    fn apply(&self, rate: &mut ShippingRate) {
        let amount = self.amount_off(rate.price);
        rate.apply_discount(amount, self.message.as_str());
    }
}
