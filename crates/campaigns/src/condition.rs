//! The unit campaigns and composites are built from.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use promo_checkout::{Cart, LineItem, ShippingRate};
use promo_core::ConfigError;

use crate::qualifier::{CartAmountQualifier, Qualifier};
use crate::selector::Selector;

/// Whether a condition is checked against the whole cart or one candidate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Cart,
    Candidate,
}

/// Individual thing a selector is asked about.
#[derive(Debug, Copy, Clone)]
pub enum Candidate<'a> {
    LineItem(&'a LineItem),
    Rate(&'a ShippingRate),
}

/// `does` / `does_not` switch carried by several conditions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Does,
    DoesNot,
}

impl MatchMode {
    /// Flip `matched` for [`MatchMode::DoesNot`].
    pub fn apply(self, matched: bool) -> bool {
        matched != (self == MatchMode::DoesNot)
    }
}

impl FromStr for MatchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "does" => Ok(MatchMode::Does),
            "does_not" => Ok(MatchMode::DoesNot),
            other => Err(ConfigError::UnknownMatchMode(other.to_string())),
        }
    }
}

/// Qualifier or selector.
///
/// A campaign's arguments and the children of [`AndSelector`] /
/// [`OrSelector`] are conditions. Each one reports its [`Scope`]; a composite
/// is candidate-scoped as soon as one of its children is.
///
/// [`AndSelector`]: crate::AndSelector
/// [`OrSelector`]: crate::OrSelector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Qualifier(Qualifier),
    Selector(Selector),
}

impl Condition {
    pub fn scope(&self) -> Scope {
        match self {
            Condition::Qualifier(_) => Scope::Cart,
            Condition::Selector(selector) => selector.scope(),
        }
    }

    /// Nested conditions of a composite; empty for leaves.
    pub fn children(&self) -> &[Condition] {
        match self {
            Condition::Selector(selector) => selector.children(),
            Condition::Qualifier(_) => &[],
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Condition::Selector(selector) if selector.is_composite())
    }

    /// Evaluate against the whole cart, handing `selector` down to qualifiers.
    pub fn matches_cart(&self, cart: &Cart, selector: Option<&Condition>) -> bool {
        match self {
            Condition::Qualifier(qualifier) => qualifier.matches(cart, selector),
            Condition::Selector(inner) => inner.matches_cart(cart, selector),
        }
    }

    /// Evaluate against a single line item or rate.
    pub fn matches_candidate(&self, candidate: Candidate<'_>) -> bool {
        match self {
            Condition::Qualifier(_) => false,
            Condition::Selector(selector) => selector.matches(candidate),
        }
    }

    /// Depth-first, argument-order search for the first cart amount qualifier.
    pub fn find_cart_amount(&self) -> Option<&CartAmountQualifier> {
        match self {
            Condition::Qualifier(Qualifier::CartAmount(amount)) => Some(amount),
            Condition::Qualifier(_) => None,
            Condition::Selector(selector) => selector
                .children()
                .iter()
                .find_map(Condition::find_cart_amount),
        }
    }

    /// True when a composite somewhere in this tree mixes cart-level and
    /// candidate-level leaves.
    pub fn has_mixed_scopes(&self) -> bool {
        if !self.is_composite() {
            return false;
        }
        let (cart, candidate) = self.leaf_scopes();
        (cart && candidate) || self.children().iter().any(Condition::has_mixed_scopes)
    }

    fn leaf_scopes(&self) -> (bool, bool) {
        if !self.is_composite() {
            return match self.scope() {
                Scope::Cart => (true, false),
                Scope::Candidate => (false, true),
            };
        }
        self.children()
            .iter()
            .map(Condition::leaf_scopes)
            .fold((false, false), |acc, next| (acc.0 || next.0, acc.1 || next.1))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Qualifier(qualifier) => fmt::Display::fmt(qualifier, f),
            Condition::Selector(selector) => fmt::Display::fmt(selector, f),
        }
    }
}

impl From<Qualifier> for Condition {
    fn from(value: Qualifier) -> Self {
        Condition::Qualifier(value)
    }
}

impl From<Selector> for Condition {
    fn from(value: Selector) -> Self {
        Condition::Selector(value)
    }
}
