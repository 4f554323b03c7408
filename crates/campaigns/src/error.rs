use thiserror::Error;

use promo_core::ConfigError;

/// Malformed campaign definition, reported by [`CampaignBuilder::build`].
///
/// [`CampaignBuilder::build`]: crate::CampaignBuilder::build
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CampaignError {
    #[error("campaign requires a discount")]
    MissingDiscount,

    #[error("missing line item match type")]
    MissingLineItemMatchType,

    #[error("condition mixes cart-level and per-item checks: {0}")]
    MixedConditionScopes(String),

    #[error("rate selector must match individual rates")]
    RateSelectorNotCandidateScoped,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
