//! Shipping promotion campaigns.
//!
//! A campaign is a fixed graph of [`Condition`]s (cart-level qualifiers and
//! per-candidate selectors, composable with AND/OR) plus a [`Discount`]. Running
//! a campaign decides eligibility against the cart, discounts every shipping
//! rate its rate selector matches, then re-checks its post-amount qualifier and
//! restores the cart's line items if that check now fails.
//!
//! Everything here is deterministic, synchronous domain logic (no IO).

pub mod campaign;
pub mod condition;
pub mod discount;
pub mod error;
pub mod partial_match;
pub mod qualifier;
pub mod selector;

pub use campaign::{Campaign, CampaignBuilder, CampaignOutcome, Quantifier, run_campaigns};
pub use condition::{Candidate, Condition, MatchMode, Scope};
pub use discount::{Discount, PercentageDiscount};
pub use error::CampaignError;
pub use partial_match::{MatchKind, Subject, partial_match};
pub use qualifier::{
    AmountScope, CartAmountQualifier, CustomerAcceptsMarketingQualifier, NoCodeQualifier,
    Qualifier,
};
pub use selector::{AndSelector, OrSelector, ProductTagSelector, RateNameSelector, Selector};
