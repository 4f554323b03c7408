//! `promo-core`: shared primitives for shipping promotions.
//!
//! This crate contains **pure domain** primitives (no IO): integer-cent money,
//! exact fractions, amount comparators, typed identifiers and the error model.

pub mod error;
pub mod id;
pub mod money;

pub use error::{ConfigError, DomainError, DomainResult};
pub use id::{CampaignId, CartId};
pub use money::{Comparator, Fraction, Money};
