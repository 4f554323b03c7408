//! Host harness: reads a checkout document, runs the campaign list over it
//! and renders the discounted rates.

pub mod config;
pub mod document;

use chrono::{DateTime, Utc};

use promo_campaigns::{
    AmountScope, AndSelector, Campaign, CampaignError, CartAmountQualifier,
    CustomerAcceptsMarketingQualifier, MatchKind, MatchMode, NoCodeQualifier, PercentageDiscount,
    Quantifier, RateNameSelector, run_campaigns,
};
use promo_core::Comparator;

pub use config::{InputSource, OutputTarget, RunnerConfig};
pub use document::{CheckoutInput, CheckoutOutput};

/// Errors surfaced by the harness.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid checkout document: {0}")]
    Document(#[from] serde_json::Error),

    #[error(transparent)]
    Campaign(#[from] CampaignError),
}

/// Free priority shipping for marketing subscribers spending at least $100
/// without a discount code.
pub fn default_campaigns() -> Result<Vec<Campaign>, CampaignError> {
    let free_priority = Campaign::builder("Free priority shipping")
        .aggregation(Quantifier::All)
        .qualifier(CustomerAcceptsMarketingQualifier::new(MatchMode::Does))
        .qualifier(AndSelector::new(vec![
            CartAmountQualifier::new(AmountScope::Cart, Comparator::GreaterThanOrEqual, 100).into(),
            NoCodeQualifier.into(),
        ]))
        .line_item_match(Quantifier::Any)
        .rate_selector(RateNameSelector::new(
            MatchMode::Does,
            MatchKind::Match,
            ["Priority Shipping"],
        ))
        .discount(PercentageDiscount::new(100, "Free Shipping")?)
        .build()?;

    Ok(vec![free_priority])
}

/// Run `campaigns` over `input`, stamping the result with the current time.
pub fn execute(input: CheckoutInput, campaigns: &[Campaign]) -> CheckoutOutput {
    execute_at(input, campaigns, Utc::now())
}

pub fn execute_at(
    input: CheckoutInput,
    campaigns: &[Campaign],
    evaluated_at: DateTime<Utc>,
) -> CheckoutOutput {
    let CheckoutInput {
        mut cart,
        mut shipping_rates,
    } = input;

    let outcomes = run_campaigns(campaigns, &mut shipping_rates, &mut cart);

    tracing::info!(
        rates = shipping_rates.len(),
        campaigns = campaigns.len(),
        qualified = outcomes.iter().filter(|o| o.qualified).count(),
        reverted = outcomes.iter().filter(|o| o.reverted).count(),
        "checkout evaluated"
    );

    CheckoutOutput {
        shipping_rates,
        outcomes,
        evaluated_at,
    }
}
