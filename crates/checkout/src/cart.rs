use serde::{Deserialize, Serialize};

use promo_core::{CartId, DomainError, DomainResult, Money};

/// Customer attached to a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub accepts_marketing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Customer {
    pub fn new(accepts_marketing: bool) -> Self {
        Self {
            accepts_marketing,
            email: None,
            tags: Vec::new(),
        }
    }
}

/// One cart line: a product variant with its current and original line price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub quantity: u32,
    /// Current line price (after any discounts), in cents.
    pub line_price: Money,
    /// Line price before any discounts, in cents.
    pub original_line_price: Money,
}

impl LineItem {
    /// Undiscounted line: current and original price are the same.
    pub fn new(title: impl Into<String>, quantity: u32, line_price: Money) -> Self {
        Self {
            title: title.into(),
            tags: Vec::new(),
            quantity,
            line_price,
            original_line_price: line_price,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_discounted(&self) -> bool {
        self.line_price != self.original_line_price
    }
}

/// Deep copy of the cart's line items and the subtotal derived from them.
///
/// Taken before a campaign applies its discount; handing it back to
/// [`Cart::restore_line_items`] undoes every line-item change made since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemSnapshot {
    line_items: Vec<LineItem>,
    subtotal_price: Money,
}

impl LineItemSnapshot {
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn subtotal_price(&self) -> Money {
        self.subtotal_price
    }
}

/// Checkout cart as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CartRecord")]
pub struct Cart {
    id: Option<CartId>,
    line_items: Vec<LineItem>,
    subtotal_price: Money,
    subtotal_price_was: Money,
    discount_code: Option<String>,
    customer: Option<Customer>,
}

impl Cart {
    /// Cart whose subtotals are derived from its line items.
    pub fn new(line_items: Vec<LineItem>) -> Self {
        let subtotal_price = line_items.iter().map(|item| item.line_price).sum();
        let subtotal_price_was = line_items.iter().map(|item| item.original_line_price).sum();
        Self {
            id: None,
            line_items,
            subtotal_price,
            subtotal_price_was,
            discount_code: None,
            customer: None,
        }
    }

    pub fn with_id(mut self, id: CartId) -> Self {
        self.id = Some(id);
        self
    }

    /// Override the derived subtotals with host-supplied values.
    pub fn with_subtotals(mut self, current: Money, was: Money) -> Self {
        self.subtotal_price = current;
        self.subtotal_price_was = was;
        self
    }

    pub fn with_discount_code(mut self, code: impl Into<String>) -> Self {
        self.discount_code = Some(code.into());
        self
    }

    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn id(&self) -> Option<CartId> {
        self.id
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn subtotal_price(&self) -> Money {
        self.subtotal_price
    }

    /// Subtotal before any discounts (the baseline for "diff" comparisons).
    pub fn subtotal_price_was(&self) -> Money {
        self.subtotal_price_was
    }

    pub fn discount_code(&self) -> Option<&str> {
        self.discount_code.as_deref()
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    /// Rewrite the current price of one line, keeping the subtotal in step.
    pub fn set_line_price(&mut self, index: usize, price: Money) -> DomainResult<()> {
        if price < Money::ZERO {
            return Err(DomainError::invariant(format!(
                "line price cannot be negative (got {price})"
            )));
        }
        let count = self.line_items.len();
        let item = self.line_items.get_mut(index).ok_or_else(|| {
            DomainError::validation(format!("line item {index} out of range ({count} lines)"))
        })?;
        let subtotal = price
            .checked_sub(item.line_price)
            .and_then(|delta| self.subtotal_price.checked_add(delta))
            .ok_or_else(|| DomainError::invariant("cart subtotal overflow"))?;
        self.subtotal_price = subtotal;
        item.line_price = price;
        Ok(())
    }

    pub fn snapshot_line_items(&self) -> LineItemSnapshot {
        LineItemSnapshot {
            line_items: self.line_items.clone(),
            subtotal_price: self.subtotal_price,
        }
    }

    pub fn restore_line_items(&mut self, snapshot: LineItemSnapshot) {
        self.line_items = snapshot.line_items;
        self.subtotal_price = snapshot.subtotal_price;
    }
}

/// Wire shape of a cart; missing subtotals are derived from the lines.
#[derive(Deserialize)]
struct CartRecord {
    #[serde(default)]
    id: Option<CartId>,
    #[serde(default)]
    line_items: Vec<LineItem>,
    #[serde(default)]
    subtotal_price: Option<Money>,
    #[serde(default)]
    subtotal_price_was: Option<Money>,
    #[serde(default)]
    discount_code: Option<String>,
    #[serde(default)]
    customer: Option<Customer>,
}

impl TryFrom<CartRecord> for Cart {
    type Error = DomainError;

    /// Rejects negative amounts and line totals that do not fit in `i64`.
    fn try_from(record: CartRecord) -> DomainResult<Self> {
        for item in &record.line_items {
            if item.line_price < Money::ZERO || item.original_line_price < Money::ZERO {
                return Err(DomainError::validation(format!(
                    "line item '{}' has a negative price",
                    item.title
                )));
            }
        }
        let subtotal_price = match record.subtotal_price {
            Some(current) => current,
            None => Money::checked_sum(record.line_items.iter().map(|item| item.line_price))
                .ok_or_else(|| DomainError::invariant("cart subtotal overflow"))?,
        };
        let subtotal_price_was = match record.subtotal_price_was {
            Some(was) => was,
            None => Money::checked_sum(
                record.line_items.iter().map(|item| item.original_line_price),
            )
            .ok_or_else(|| DomainError::invariant("cart original subtotal overflow"))?,
        };
        if subtotal_price < Money::ZERO || subtotal_price_was < Money::ZERO {
            return Err(DomainError::validation("cart subtotals cannot be negative"));
        }

        Ok(Cart {
            id: record.id,
            line_items: record.line_items,
            subtotal_price,
            subtotal_price_was,
            discount_code: record.discount_code,
            customer: record.customer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_cart() -> Cart {
        Cart::new(vec![
            LineItem::new("Wool Socks", 2, Money::from_cents(2_400))
                .with_tags(["apparel", "winter"]),
            LineItem::new("Camp Mug", 1, Money::from_cents(1_600)),
        ])
    }

    #[test]
    fn new_derives_subtotals_from_lines() {
        let cart = test_cart();
        assert_eq!(cart.subtotal_price(), Money::from_cents(4_000));
        assert_eq!(cart.subtotal_price_was(), Money::from_cents(4_000));
        assert!(cart.discount_code().is_none());
        assert!(cart.customer().is_none());
    }

    #[test]
    fn set_line_price_keeps_subtotal_in_step() {
        let mut cart = test_cart();
        cart.set_line_price(0, Money::from_cents(1_900)).unwrap();

        assert_eq!(cart.line_items()[0].line_price, Money::from_cents(1_900));
        assert_eq!(cart.line_items()[0].original_line_price, Money::from_cents(2_400));
        assert!(cart.line_items()[0].is_discounted());
        assert_eq!(cart.subtotal_price(), Money::from_cents(3_500));
        assert_eq!(cart.subtotal_price_was(), Money::from_cents(4_000));
    }

    #[test]
    fn set_line_price_rejects_unknown_line() {
        let mut cart = test_cart();
        let err = cart.set_line_price(7, Money::ZERO).unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("out of range") => {}
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn set_line_price_rejects_negative_price() {
        let mut cart = test_cart();
        let err = cart.set_line_price(0, Money::from_cents(-1)).unwrap_err();

        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(cart, test_cart());
    }

    #[test]
    fn snapshot_is_independent_of_live_cart() {
        let mut cart = test_cart();
        let snapshot = cart.snapshot_line_items();

        cart.set_line_price(1, Money::ZERO).unwrap();

        assert_eq!(snapshot.line_items()[1].line_price, Money::from_cents(1_600));
        assert_eq!(snapshot.subtotal_price(), Money::from_cents(4_000));
    }

    #[test]
    fn restore_brings_back_exact_line_state() {
        let mut cart = test_cart();
        let before = cart.clone();
        let snapshot = cart.snapshot_line_items();

        cart.set_line_price(0, Money::from_cents(100)).unwrap();
        cart.set_line_price(1, Money::from_cents(200)).unwrap();
        cart.restore_line_items(snapshot);

        assert_eq!(cart, before);
    }

    #[test]
    fn deserialize_derives_missing_subtotals() {
        let json = r#"{
            "line_items": [
                {"title": "Tent", "quantity": 1, "line_price": 12000, "original_line_price": 15000}
            ],
            "customer": {"accepts_marketing": true}
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();

        assert_eq!(cart.subtotal_price(), Money::from_cents(12_000));
        assert_eq!(cart.subtotal_price_was(), Money::from_cents(15_000));
        assert_eq!(cart.customer().map(|c| c.accepts_marketing), Some(true));
        assert!(cart.line_items()[0].tags.is_empty());
    }

    #[test]
    fn deserialize_keeps_host_supplied_subtotals() {
        let json =
            r#"{"subtotal_price": 15000, "subtotal_price_was": 16000, "discount_code": "SPRING"}"#;
        let cart: Cart = serde_json::from_str(json).unwrap();

        assert!(cart.line_items().is_empty());
        assert_eq!(cart.subtotal_price(), Money::from_units(150));
        assert_eq!(cart.subtotal_price_was(), Money::from_units(160));
        assert_eq!(cart.discount_code(), Some("SPRING"));
    }

    #[test]
    fn deserialize_rejects_line_totals_that_overflow() {
        let json = r#"{
            "line_items": [
                {"title": "A", "quantity": 1, "line_price": 5000000000000000000,
                 "original_line_price": 5000000000000000000},
                {"title": "B", "quantity": 1, "line_price": 5000000000000000000,
                 "original_line_price": 5000000000000000000}
            ]
        }"#;
        let err = serde_json::from_str::<Cart>(json).unwrap_err();
        assert!(err.to_string().contains("cart subtotal overflow"));
    }

    #[test]
    fn deserialize_rejects_negative_amounts() {
        let negative_line = r#"{
            "line_items": [
                {"title": "Refund", "quantity": 1, "line_price": -100, "original_line_price": 0}
            ]
        }"#;
        let negative_was = r#"{"subtotal_price_was": -9223372036854775803}"#;

        let err = serde_json::from_str::<Cart>(negative_line).unwrap_err();
        assert!(err.to_string().contains("negative price"));
        let err = serde_json::from_str::<Cart>(negative_was).unwrap_err();
        assert!(err.to_string().contains("cannot be negative"));
    }

    #[test]
    fn set_line_price_reports_subtotal_overflow() {
        let mut cart = Cart::new(vec![LineItem::new("Cheap", 1, Money::ZERO)])
            .with_subtotals(Money::from_cents(i64::MAX), Money::from_cents(i64::MAX));

        let err = cart.set_line_price(0, Money::from_cents(1)).unwrap_err();

        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(cart.line_items()[0].line_price, Money::ZERO);
        assert_eq!(cart.subtotal_price(), Money::from_cents(i64::MAX));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any sequence of line rewrites is fully undone by restoring
        /// the snapshot taken before it.
        #[test]
        fn restore_undoes_arbitrary_rewrites(
            prices in prop::collection::vec(0i64..50_000i64, 1..8),
            rewrites in prop::collection::vec((0usize..8usize, 0i64..50_000i64), 0..16)
        ) {
            let lines = prices
                .iter()
                .enumerate()
                .map(|(i, cents)| LineItem::new(format!("item-{i}"), 1, Money::from_cents(*cents)))
                .collect();
            let mut cart = Cart::new(lines);
            let before = cart.clone();
            let snapshot = cart.snapshot_line_items();

            for (index, cents) in rewrites {
                let _ = cart.set_line_price(index, Money::from_cents(cents));
            }
            let derived: Money = cart.line_items().iter().map(|item| item.line_price).sum();
            prop_assert_eq!(cart.subtotal_price(), derived);

            cart.restore_line_items(snapshot);
            prop_assert_eq!(cart, before);
        }
    }
}
