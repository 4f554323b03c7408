//! Campaign evaluation: qualify, discount rates, verify, revert.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use promo_checkout::{Cart, ShippingRate};
use promo_core::{CampaignId, ConfigError};

use crate::condition::{Candidate, Condition, Scope};
use crate::discount::Discount;
use crate::error::CampaignError;
use crate::qualifier::{CartAmountQualifier, Qualifier};
use crate::selector::{AndSelector, Selector};

/// `all` / `any` aggregation used for qualifier lists and line-item checks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    All,
    Any,
}

impl Quantifier {
    pub fn evaluate<T, I, F>(self, items: I, mut predicate: F) -> bool
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> bool,
    {
        let mut items = items.into_iter();
        match self {
            Quantifier::All => items.all(|item| predicate(item)),
            Quantifier::Any => items.any(|item| predicate(item)),
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantifier::All => f.write_str("all"),
            Quantifier::Any => f.write_str("any"),
        }
    }
}

impl FromStr for Quantifier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Quantifier::All),
            "any" => Ok(Quantifier::Any),
            other => Err(ConfigError::UnknownQuantifier(other.to_string())),
        }
    }
}

/// One entry of the flattened qualifier list, with its evaluation plan
/// resolved at build time.
#[derive(Debug)]
enum Check {
    Cart(Condition),
    PerLineItem(Condition, Quantifier),
}

impl Check {
    fn condition(&self) -> &Condition {
        match self {
            Check::Cart(condition) | Check::PerLineItem(condition, _) => condition,
        }
    }
}

/// What a single campaign run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignOutcome {
    pub campaign_id: CampaignId,
    pub campaign: String,
    pub qualified: bool,
    pub rates_discounted: usize,
    /// Line items were restored because the post-amount check failed.
    pub reverted: bool,
}

/// Shipping discount campaign.
///
/// Built once through [`CampaignBuilder`] and run once per checkout. The only
/// per-run state is the line-item snapshot taken inside [`Campaign::run`].
#[derive(Debug)]
pub struct Campaign {
    id: CampaignId,
    name: String,
    aggregation: Quantifier,
    checks: Vec<Check>,
    line_item_selector: Option<Condition>,
    post_amount_qualifier: Option<CartAmountQualifier>,
    rate_selector: Option<Selector>,
    discount: Box<dyn Discount>,
}

impl Campaign {
    pub fn builder(name: impl Into<String>) -> CampaignBuilder {
        CampaignBuilder::new(name)
    }

    pub fn id(&self) -> CampaignId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aggregation(&self) -> Quantifier {
        self.aggregation
    }

    /// Flattened qualifier list, in evaluation order.
    pub fn qualifiers(&self) -> impl Iterator<Item = &Condition> {
        self.checks.iter().map(Check::condition)
    }

    pub fn post_amount_qualifier(&self) -> Option<&CartAmountQualifier> {
        self.post_amount_qualifier.as_ref()
    }

    pub fn rate_selector(&self) -> Option<&Selector> {
        self.rate_selector.as_ref()
    }

    /// Eligibility of `cart`; an empty qualifier list always qualifies.
    pub fn qualifies(&self, cart: &Cart) -> bool {
        if self.checks.is_empty() {
            return true;
        }
        self.aggregation.evaluate(&self.checks, |check| match check {
            Check::Cart(condition) => {
                condition.matches_cart(cart, self.line_item_selector.as_ref())
            }
            Check::PerLineItem(condition, quantifier) => quantifier
                .evaluate(cart.line_items(), |item| {
                    condition.matches_candidate(Candidate::LineItem(item))
                }),
        })
    }

    /// Run against one checkout.
    ///
    /// Rates matched by the rate selector are discounted in place. If a
    /// post-amount qualifier exists and fails once the discount (including its
    /// final hook) has been applied, the cart's line items are restored to
    /// their state before the run. Discounted rate prices are kept either
    /// way; only line items roll back.
    pub fn run(&self, rates: &mut [ShippingRate], cart: &mut Cart) -> CampaignOutcome {
        let span = tracing::debug_span!("campaign", id = %self.id, name = %self.name);
        let _enter = span.enter();

        let mut outcome = CampaignOutcome {
            campaign_id: self.id,
            campaign: self.name.clone(),
            qualified: false,
            rates_discounted: 0,
            reverted: false,
        };

        if !self.qualifies(cart) {
            tracing::debug!("cart does not qualify");
            return outcome;
        }
        outcome.qualified = true;

        let snapshot = self
            .post_amount_qualifier
            .as_ref()
            .map(|_| cart.snapshot_line_items());

        for rate in rates.iter_mut() {
            let selected = self
                .rate_selector
                .as_ref()
                .is_none_or(|selector| selector.matches(Candidate::Rate(&*rate)));
            if selected {
                self.discount.apply(rate);
                outcome.rates_discounted += 1;
            }
        }
        self.discount.apply_final(cart);

        if let (Some(post_amount), Some(snapshot)) = (&self.post_amount_qualifier, snapshot) {
            if !post_amount.matches(cart, self.line_item_selector.as_ref()) {
                cart.restore_line_items(snapshot);
                outcome.reverted = true;
                tracing::info!(
                    check = %Qualifier::CartAmount(*post_amount),
                    "post-amount check failed; line items restored"
                );
            }
        }

        tracing::debug!(
            rates_discounted = outcome.rates_discounted,
            reverted = outcome.reverted,
            "campaign applied"
        );
        outcome
    }
}

/// Assembles a [`Campaign`], flattening its conditions and rejecting
/// malformed definitions.
#[derive(Debug)]
pub struct CampaignBuilder {
    id: Option<CampaignId>,
    name: String,
    aggregation: Quantifier,
    qualifiers: Vec<Condition>,
    line_item_match: Option<Quantifier>,
    line_item_qualifier: Option<Condition>,
    rate_selector: Option<Selector>,
    discount: Option<Box<dyn Discount>>,
}

impl CampaignBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            aggregation: Quantifier::All,
            qualifiers: Vec::new(),
            line_item_match: None,
            line_item_qualifier: None,
            rate_selector: None,
            discount: None,
        }
    }

    pub fn id(mut self, id: CampaignId) -> Self {
        self.id = Some(id);
        self
    }

    /// How qualifier results combine (defaults to `All`).
    pub fn aggregation(mut self, aggregation: Quantifier) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn qualifier(mut self, condition: impl Into<Condition>) -> Self {
        self.qualifiers.push(condition.into());
        self
    }

    /// How per-line-item conditions combine across the cart's lines.
    pub fn line_item_match(mut self, quantifier: Quantifier) -> Self {
        self.line_item_match = Some(quantifier);
        self
    }

    /// Last qualifier of the campaign. Besides being evaluated like any other
    /// qualifier, it narrows the lines that item-level amount checks sum over.
    pub fn line_item_qualifier(mut self, condition: impl Into<Condition>) -> Self {
        self.line_item_qualifier = Some(condition.into());
        self
    }

    pub fn rate_selector(mut self, selector: impl Into<Selector>) -> Self {
        self.rate_selector = Some(selector.into());
        self
    }

    pub fn discount(mut self, discount: impl Discount + 'static) -> Self {
        self.discount = Some(Box::new(discount));
        self
    }

    pub fn build(self) -> Result<Campaign, CampaignError> {
        let discount = self.discount.ok_or(CampaignError::MissingDiscount)?;

        let arguments: Vec<Condition> = self
            .qualifiers
            .into_iter()
            .chain(self.line_item_qualifier.iter().cloned())
            .collect();

        if let Some(mixed) = arguments.iter().find(|c| c.has_mixed_scopes()) {
            return Err(CampaignError::MixedConditionScopes(mixed.to_string()));
        }
        if let Some(selector) = &self.rate_selector {
            let selector = Condition::Selector(selector.clone());
            if selector.has_mixed_scopes() {
                return Err(CampaignError::MixedConditionScopes(selector.to_string()));
            }
            if selector.scope() != Scope::Candidate {
                return Err(CampaignError::RateSelectorNotCandidateScoped);
            }
        }

        let post_amount_qualifier = arguments.iter().find_map(|c| c.find_cart_amount()).copied();

        let mut flat = Vec::new();
        for condition in arguments {
            flatten_into(condition, self.aggregation, &mut flat);
        }

        let checks = flat
            .into_iter()
            .map(|condition| match condition.scope() {
                Scope::Cart => Ok(Check::Cart(condition)),
                Scope::Candidate => self
                    .line_item_match
                    .map(|quantifier| Check::PerLineItem(condition, quantifier))
                    .ok_or(CampaignError::MissingLineItemMatchType),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Campaign {
            id: self.id.unwrap_or_default(),
            name: self.name,
            aggregation: self.aggregation,
            checks,
            line_item_selector: self.line_item_qualifier,
            post_amount_qualifier,
            rate_selector: self.rate_selector,
            discount,
        })
    }
}

/// Splice cart-level AND groups into their leaves when the campaign already
/// requires every entry; anything else stays a single entry.
fn flatten_into(condition: Condition, aggregation: Quantifier, out: &mut Vec<Condition>) {
    match condition {
        Condition::Selector(Selector::And(group))
            if aggregation == Quantifier::All && group_is_cart_scoped(&group) =>
        {
            for child in group.into_conditions() {
                flatten_into(child, aggregation, out);
            }
        }
        other => out.push(other),
    }
}

fn group_is_cart_scoped(group: &AndSelector) -> bool {
    group.conditions().iter().all(|c| c.scope() == Scope::Cart)
}

/// Run `campaigns` in order against the same rates and cart.
///
/// Each campaign sees the side effects of the ones before it.
pub fn run_campaigns(
    campaigns: &[Campaign],
    rates: &mut [ShippingRate],
    cart: &mut Cart,
) -> Vec<CampaignOutcome> {
    campaigns
        .iter()
        .map(|campaign| campaign.run(rates, cart))
        .collect()
}
