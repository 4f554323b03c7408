//! Wire documents exchanged with the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use promo_campaigns::CampaignOutcome;
use promo_checkout::{Cart, ShippingRate};

use crate::RunnerError;

/// Checkout handed over by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutInput {
    pub cart: Cart,
    #[serde(default)]
    pub shipping_rates: Vec<ShippingRate>,
}

impl CheckoutInput {
    pub fn from_json(raw: &str) -> Result<Self, RunnerError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Rates after every campaign ran, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutOutput {
    pub shipping_rates: Vec<ShippingRate>,
    pub outcomes: Vec<CampaignOutcome>,
    pub evaluated_at: DateTime<Utc>,
}

impl CheckoutOutput {
    pub fn to_json(&self, pretty: bool) -> Result<String, RunnerError> {
        let rendered = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_core::Money;

    #[test]
    fn missing_rates_default_to_empty() {
        let input = CheckoutInput::from_json(r#"{"cart": {}}"#).unwrap();
        assert!(input.shipping_rates.is_empty());
        assert_eq!(input.cart.subtotal_price(), Money::ZERO);
    }

    #[test]
    fn malformed_document_is_reported() {
        let err = CheckoutInput::from_json(r#"{"shipping_rates": []}"#).unwrap_err();
        assert!(matches!(err, RunnerError::Document(_)));
        assert!(err.to_string().starts_with("invalid checkout document"));
    }

    #[test]
    fn out_of_range_amounts_are_rejected() {
        let raw = r#"{
            "cart": {
                "line_items": [
                    {"title": "A", "quantity": 1, "line_price": 5000000000000000000,
                     "original_line_price": 5000000000000000000},
                    {"title": "B", "quantity": 1, "line_price": 5000000000000000000,
                     "original_line_price": 5000000000000000000}
                ]
            },
            "shipping_rates": []
        }"#;

        let err = CheckoutInput::from_json(raw).unwrap_err();
        assert!(matches!(err, RunnerError::Document(_)));
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn output_renders_rfc3339_timestamp() {
        let output = CheckoutOutput {
            shipping_rates: vec![ShippingRate::new("Standard", Money::from_cents(599))],
            outcomes: Vec::new(),
            evaluated_at: DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let json: serde_json::Value =
            serde_json::from_str(&output.to_json(false).unwrap()).unwrap();
        assert_eq!(json["evaluated_at"], "2026-03-01T12:00:00Z");
        assert_eq!(json["shipping_rates"][0]["price"], 599);
        assert!(output.to_json(true).unwrap().contains('\n'));
    }
}
