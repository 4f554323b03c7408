//! Checkout data model (cart, line items, customer, shipping rates).
//!
//! These types are supplied by the host for every checkout request. The
//! promotion engine reads them, discounts shipping rates in place and may
//! speculatively rewrite line items, restoring them from a
//! [`LineItemSnapshot`] when a campaign has to back out.

pub mod cart;
pub mod rate;

pub use cart::{Cart, Customer, LineItem, LineItemSnapshot};
pub use rate::{AppliedDiscount, ShippingRate};
