//! Cart-level qualifiers.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use promo_checkout::{Cart, LineItem};
use promo_core::{Comparator, ConfigError, Money};

use crate::condition::{Candidate, Condition, MatchMode};

/// Predicate over the whole cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    CustomerAcceptsMarketing(CustomerAcceptsMarketingQualifier),
    CartAmount(CartAmountQualifier),
    NoCode(NoCodeQualifier),
}

impl Qualifier {
    /// `selector` narrows the line items that item-level amount checks sum over.
    pub fn matches(&self, cart: &Cart, selector: Option<&Condition>) -> bool {
        match self {
            Qualifier::CustomerAcceptsMarketing(q) => q.matches(cart),
            Qualifier::CartAmount(q) => q.matches(cart, selector),
            Qualifier::NoCode(q) => q.matches(cart),
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::CustomerAcceptsMarketing(q) => match q.mode {
                MatchMode::Does => f.write_str("customer accepts marketing"),
                MatchMode::DoesNot => f.write_str("customer does not accept marketing"),
            },
            Qualifier::CartAmount(q) => write!(f, "{} {} {}", q.scope, q.comparator, q.threshold),
            Qualifier::NoCode(_) => f.write_str("no discount code"),
        }
    }
}

/// Customer marketing consent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CustomerAcceptsMarketingQualifier {
    mode: MatchMode,
}

impl CustomerAcceptsMarketingQualifier {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    /// No customer on the cart never matches, whatever the mode.
    pub fn matches(&self, cart: &Cart) -> bool {
        cart.customer()
            .is_some_and(|customer| self.mode.apply(customer.accepts_marketing))
    }
}

/// What a [`CartAmountQualifier`] totals up and compares.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountScope {
    /// Cart subtotal vs. threshold.
    Cart,
    /// Current price of the selected lines vs. threshold.
    Item,
    /// `subtotal_was - threshold` vs. current subtotal.
    DiffCart,
    /// `original price of selected lines - threshold` vs. their current price.
    DiffItem,
}

impl AmountScope {
    pub fn as_str(self) -> &'static str {
        match self {
            AmountScope::Cart => "cart",
            AmountScope::Item => "item",
            AmountScope::DiffCart => "diff_cart",
            AmountScope::DiffItem => "diff_item",
        }
    }
}

impl fmt::Display for AmountScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmountScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cart" => Ok(AmountScope::Cart),
            "item" => Ok(AmountScope::Item),
            "diff_cart" => Ok(AmountScope::DiffCart),
            "diff_item" => Ok(AmountScope::DiffItem),
            other => Err(ConfigError::UnknownAmountScope(other.to_string())),
        }
    }
}

/// Threshold comparison on cart or line-item totals.
///
/// The first one found in a campaign's condition tree doubles as the
/// campaign's post-amount qualifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CartAmountQualifier {
    scope: AmountScope,
    comparator: Comparator,
    threshold: Money,
}

impl CartAmountQualifier {
    /// `amount` is in whole currency units; amounts beyond the representable
    /// range saturate. Use [`CartAmountQualifier::parse`] to reject them.
    pub fn new(scope: AmountScope, comparator: Comparator, amount: i64) -> Self {
        Self::with_threshold(scope, comparator, Money::from_units(amount))
    }

    pub fn with_threshold(scope: AmountScope, comparator: Comparator, threshold: Money) -> Self {
        Self {
            scope,
            comparator,
            threshold,
        }
    }

    /// Build from configuration values, rejecting unknown scopes or
    /// comparators and amounts that do not fit in cents.
    pub fn parse(scope: &str, comparator: &str, amount: i64) -> Result<Self, ConfigError> {
        let threshold =
            Money::checked_from_units(amount).ok_or(ConfigError::AmountOutOfRange(amount))?;
        Ok(Self::with_threshold(scope.parse()?, comparator.parse()?, threshold))
    }

    pub fn scope(&self) -> AmountScope {
        self.scope
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn threshold(&self) -> Money {
        self.threshold
    }

    pub fn matches(&self, cart: &Cart, selector: Option<&Condition>) -> bool {
        match self.scope {
            AmountScope::Cart => self.comparator.compare(cart.subtotal_price(), self.threshold),
            AmountScope::Item => {
                let total = selected_lines(cart, selector).map(|item| item.line_price).sum();
                self.comparator.compare(total, self.threshold)
            }
            AmountScope::DiffCart => self.comparator.compare(
                cart.subtotal_price_was() - self.threshold,
                cart.subtotal_price(),
            ),
            AmountScope::DiffItem => {
                let (original, current) = selected_lines(cart, selector).fold(
                    (Money::ZERO, Money::ZERO),
                    |(original, current), item| {
                        (original + item.original_line_price, current + item.line_price)
                    },
                );
                self.comparator.compare(original - self.threshold, current)
            }
        }
    }
}

/// Lines picked by `selector`; without one, nothing is picked.
fn selected_lines<'a>(
    cart: &'a Cart,
    selector: Option<&'a Condition>,
) -> impl Iterator<Item = &'a LineItem> + 'a {
    cart.line_items().iter().filter(move |item| {
        selector.is_some_and(|selector| selector.matches_candidate(Candidate::LineItem(*item)))
    })
}

/// Cart carries no discount code.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct NoCodeQualifier;

impl NoCodeQualifier {
    pub fn matches(&self, cart: &Cart) -> bool {
        cart.discount_code().is_none()
    }
}

impl From<CustomerAcceptsMarketingQualifier> for Condition {
    fn from(value: CustomerAcceptsMarketingQualifier) -> Self {
        Condition::Qualifier(Qualifier::CustomerAcceptsMarketing(value))
    }
}

impl From<CartAmountQualifier> for Condition {
    fn from(value: CartAmountQualifier) -> Self {
        Condition::Qualifier(Qualifier::CartAmount(value))
    }
}

impl From<NoCodeQualifier> for Condition {
    fn from(value: NoCodeQualifier) -> Self {
        Condition::Qualifier(Qualifier::NoCode(value))
    }
}
