//! Per-candidate selectors and the AND/OR composites.

use core::fmt;

use promo_checkout::Cart;

use crate::condition::{Candidate, Condition, MatchMode, Scope};
use crate::partial_match::{MatchKind, Subject, partial_match};

/// Predicate over one line item or shipping rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    RateName(RateNameSelector),
    ProductTag(ProductTagSelector),
    And(AndSelector),
    Or(OrSelector),
}

impl Selector {
    pub fn matches(&self, candidate: Candidate<'_>) -> bool {
        match self {
            Selector::RateName(s) => s.matches(candidate),
            Selector::ProductTag(s) => s.matches(candidate),
            Selector::And(s) => s.conditions.iter().all(|c| c.matches_candidate(candidate)),
            Selector::Or(s) => s.conditions.iter().any(|c| c.matches_candidate(candidate)),
        }
    }

    /// Composites of qualifiers evaluated against the whole cart; leaf
    /// selectors have nothing to look at here.
    pub fn matches_cart(&self, cart: &Cart, selector: Option<&Condition>) -> bool {
        match self {
            Selector::RateName(_) | Selector::ProductTag(_) => false,
            Selector::And(s) => s.conditions.iter().all(|c| c.matches_cart(cart, selector)),
            Selector::Or(s) => s.conditions.iter().any(|c| c.matches_cart(cart, selector)),
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            Selector::RateName(_) | Selector::ProductTag(_) => Scope::Candidate,
            Selector::And(_) | Selector::Or(_) => {
                if self
                    .children()
                    .iter()
                    .any(|c| c.scope() == Scope::Candidate)
                {
                    Scope::Candidate
                } else {
                    Scope::Cart
                }
            }
        }
    }

    pub fn children(&self) -> &[Condition] {
        match self {
            Selector::And(s) => &s.conditions,
            Selector::Or(s) => &s.conditions,
            Selector::RateName(_) | Selector::ProductTag(_) => &[],
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Selector::And(_) | Selector::Or(_))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::RateName(s) => {
                write!(f, "rate name {} {}", s.kind, s.names.join("|"))?;
                if s.mode == MatchMode::DoesNot {
                    f.write_str(" (inverted)")?;
                }
                Ok(())
            }
            Selector::ProductTag(s) => {
                write!(f, "product tag {} {}", s.kind, s.tags.join("|"))?;
                if s.mode == MatchMode::DoesNot {
                    f.write_str(" (inverted)")?;
                }
                Ok(())
            }
            Selector::And(s) => write_group(f, "all of", &s.conditions),
            Selector::Or(s) => write_group(f, "any of", &s.conditions),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, label: &str, conditions: &[Condition]) -> fmt::Result {
    write!(f, "{label} (")?;
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{condition}")?;
    }
    f.write_str(")")
}

fn lowercase_all<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().to_lowercase())
        .collect()
}

/// Shipping rate name check (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateNameSelector {
    mode: MatchMode,
    kind: MatchKind,
    names: Vec<String>,
}

impl RateNameSelector {
    pub fn new<I, S>(mode: MatchMode, kind: MatchKind, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            mode,
            kind,
            names: lowercase_all(names),
        }
    }

    /// Line items are never rate candidates.
    pub fn matches(&self, candidate: Candidate<'_>) -> bool {
        let Candidate::Rate(rate) = candidate else {
            return false;
        };
        let name = rate.name.to_lowercase();
        let matched = match self.kind {
            MatchKind::Match => self.names.contains(&name),
            kind => partial_match(kind, Subject::One(&name), &self.names),
        };
        self.mode.apply(matched)
    }
}

/// Line item tag check (case-insensitive, any tag may satisfy it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductTagSelector {
    mode: MatchMode,
    kind: MatchKind,
    tags: Vec<String>,
}

impl ProductTagSelector {
    pub fn new<I, S>(mode: MatchMode, kind: MatchKind, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            mode,
            kind,
            tags: lowercase_all(tags),
        }
    }

    /// Shipping rates are never tag candidates.
    pub fn matches(&self, candidate: Candidate<'_>) -> bool {
        let Candidate::LineItem(item) = candidate else {
            return false;
        };
        let item_tags = lowercase_all(&item.tags);
        let matched = match self.kind {
            MatchKind::Match => item_tags.iter().any(|tag| self.tags.contains(tag)),
            kind => partial_match(kind, Subject::Many(&item_tags), &self.tags),
        };
        self.mode.apply(matched)
    }
}

/// Every child condition must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AndSelector {
    conditions: Vec<Condition>,
}

impl AndSelector {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub(crate) fn into_conditions(self) -> Vec<Condition> {
        self.conditions
    }
}

/// At least one child condition must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrSelector {
    conditions: Vec<Condition>,
}

impl OrSelector {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

impl From<RateNameSelector> for Selector {
    fn from(value: RateNameSelector) -> Self {
        Selector::RateName(value)
    }
}

impl From<ProductTagSelector> for Selector {
    fn from(value: ProductTagSelector) -> Self {
        Selector::ProductTag(value)
    }
}

impl From<AndSelector> for Selector {
    fn from(value: AndSelector) -> Self {
        Selector::And(value)
    }
}

impl From<OrSelector> for Selector {
    fn from(value: OrSelector) -> Self {
        Selector::Or(value)
    }
}

impl From<RateNameSelector> for Condition {
    fn from(value: RateNameSelector) -> Self {
        Condition::Selector(value.into())
    }
}

impl From<ProductTagSelector> for Condition {
    fn from(value: ProductTagSelector) -> Self {
        Condition::Selector(value.into())
    }
}

impl From<AndSelector> for Condition {
    fn from(value: AndSelector) -> Self {
        Condition::Selector(value.into())
    }
}

impl From<OrSelector> for Condition {
    fn from(value: OrSelector) -> Self {
        Condition::Selector(value.into())
    }
}
