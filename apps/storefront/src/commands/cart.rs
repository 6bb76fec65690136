//! # Cart Commands
//!
//! Cart manipulation, promo entry and checkout.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│ Confirm  │       │
//! │  │  Cart    │     │          │     │  screen  │     │  screen  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart        checkout()                        │
//! │                   increment_item     ?total=98.00                      │
//! │                   decrement_item                                        │
//! │                   apply_promo                                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating command returns the whole cart with a fresh breakdown,
//! so the cart and checkout screens never compute totals themselves.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use topcare_core::cart::{Cart, CartLineItem, CheckoutSummary, QuantityChange};
use topcare_core::pricing::{AppliedPromo, PriceBreakdown, PromoOutcome};
use topcare_core::CoreResult;

use crate::error::ApiError;
use crate::state::{CartState, CatalogState, ConfigState};

/// Cart response including items and the price breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub session_id: Uuid,
    pub items: Vec<CartLineItem>,
    pub saved_for_later: Vec<CartLineItem>,
    pub applied_promo: Option<AppliedPromo>,
    pub breakdown: PriceBreakdown,
    /// Distinct lines.
    pub line_count: usize,
    /// Σ quantity, for the tab badge.
    pub total_quantity: i64,
    /// Total with the store's currency symbol.
    pub formatted_total: String,
}

impl CartResponse {
    pub fn build(cart: &Cart, config: &ConfigState) -> Self {
        let breakdown = cart.breakdown(&config.pricing_engine());
        CartResponse {
            session_id: cart.session_id,
            items: cart.items.clone(),
            saved_for_later: cart.saved_for_later.clone(),
            applied_promo: cart.applied_promo.clone(),
            breakdown,
            line_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            formatted_total: config.format_money(breakdown.total),
        }
    }
}

/// Promo entry result plus the repriced cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoResponse {
    pub outcome: PromoOutcome,
    pub cart: CartResponse,
}

/// What the order-confirmation screen receives.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub store_name: String,
    pub summary: CheckoutSummary,
    /// `total=98.00`, appended to the confirmation route.
    pub confirmation_query: String,
    pub formatted_total: String,
}

fn mutate<F>(cart: &CartState, config: &ConfigState, f: F) -> Result<CartResponse, ApiError>
where
    F: FnOnce(&mut Cart) -> CoreResult<()>,
{
    cart.with_cart_mut(|c| {
        f(c)?;
        Ok(CartResponse::build(c, config))
    })
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState, config: &ConfigState) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|c| CartResponse::build(c, config))
}

/// Adds a cart-provider payload (cart API item or bare listing).
///
/// ## Behavior
/// - Listing already in cart: quantity + 1
/// - New listing: added with the payload's quantity (at least 1)
/// - Only a payload without an identifier is rejected
pub fn add_to_cart(
    cart: &CartState,
    config: &ConfigState,
    payload: &Value,
) -> Result<CartResponse, ApiError> {
    let line = CartLineItem::from_payload(payload)?;
    debug!(id = %line.id, quantity = line.quantity, "add_to_cart command");

    mutate(cart, config, |c| c.add_item(line))
}

/// Adds a listing from the current catalog snapshot ("Add to cart" on a
/// search result).
pub fn add_listing_to_cart(
    cart: &CartState,
    catalog: &CatalogState,
    config: &ConfigState,
    listing_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(listing_id = %listing_id, "add_listing_to_cart command");

    let snapshot = catalog.snapshot();
    let item = snapshot
        .get(listing_id)
        .ok_or_else(|| ApiError::not_found("Listing", listing_id))?;
    let line = CartLineItem::from(item);

    mutate(cart, config, |c| c.add_item(line))
}

/// "+" control.
pub fn increment_item(
    cart: &CartState,
    config: &ConfigState,
    id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "increment_item command");
    mutate(cart, config, |c| c.increment(id).map(|_| ()))
}

/// "−" control. At quantity 1 the cart comes back unchanged.
pub fn decrement_item(
    cart: &CartState,
    config: &ConfigState,
    id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "decrement_item command");
    mutate(cart, config, |c| {
        if let QuantityChange::Unchanged(quantity) = c.decrement(id)? {
            debug!(id = %id, quantity, "Quantity already at minimum");
        }
        Ok(())
    })
}

/// Sets an explicit quantity. Below 1 is rejected; use
/// [`remove_from_cart`] to drop the line.
pub fn update_cart_item(
    cart: &CartState,
    config: &ConfigState,
    id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(id = %id, quantity, "update_cart_item command");
    mutate(cart, config, |c| c.set_quantity(id, quantity))
}

/// Removes a line from the cart.
pub fn remove_from_cart(
    cart: &CartState,
    config: &ConfigState,
    id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "remove_from_cart command");
    mutate(cart, config, |c| c.remove_item(id).map(|_| ()))
}

/// Moves a line to the saved-for-later list.
pub fn save_for_later(
    cart: &CartState,
    config: &ConfigState,
    id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "save_for_later command");
    mutate(cart, config, |c| c.save_for_later(id))
}

/// Moves a saved line back into the cart.
pub fn move_to_cart(
    cart: &CartState,
    config: &ConfigState,
    id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "move_to_cart command");
    mutate(cart, config, |c| c.move_to_cart(id))
}

/// Clears all lines and the promo.
pub fn clear_cart(cart: &CartState, config: &ConfigState) -> CartResponse {
    debug!("clear_cart command");
    cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::build(c, config)
    })
}

/// Enters a promo code.
///
/// An unknown code is a normal response with `outcome.applied == false`.
pub fn apply_promo(cart: &CartState, config: &ConfigState, code: &str) -> PromoResponse {
    debug!(code = %code, "apply_promo command");
    let engine = config.pricing_engine();
    cart.with_cart_mut(|c| {
        let outcome = c.apply_promo(&engine, code);
        PromoResponse {
            outcome,
            cart: CartResponse::build(c, config),
        }
    })
}

/// Completes the purchase and starts a new cart session.
pub fn checkout(cart: &CartState, config: &ConfigState) -> Result<CheckoutResponse, ApiError> {
    debug!("checkout command");
    let engine = config.pricing_engine();
    let summary = cart.with_cart_mut(|c| c.checkout(&engine))?;

    Ok(CheckoutResponse {
        store_name: config.store_name.clone(),
        confirmation_query: summary.confirmation_query(),
        formatted_total: config.format_money(summary.total()),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;
    use topcare_core::{Catalog, Money};

    fn setup() -> (CartState, ConfigState) {
        (CartState::new(), ConfigState::default())
    }

    fn fill(cart: &CartState, config: &ConfigState) -> CartResponse {
        add_to_cart(
            cart,
            config,
            &json!({ "listing": { "_id": "a", "title": "Designer Jeans", "price": 60 }, "quantity": 1 }),
        )
        .unwrap();
        add_to_cart(cart, config, &json!({ "id": "b", "name": "Tee", "price": "40.00" })).unwrap()
    }

    #[test]
    fn test_add_and_breakdown() {
        let (cart, config) = setup();
        let response = fill(&cart, &config);

        assert_eq!(response.line_count, 2);
        assert_eq!(response.breakdown.subtotal, Money::from_cents(10000));
        assert_eq!(response.breakdown.shipping, Money::zero());
        assert_eq!(response.breakdown.tax, Money::from_cents(800));
        assert_eq!(response.formatted_total, "S$108.00");
    }

    #[test]
    fn test_adding_same_listing_bumps_quantity() {
        let (cart, config) = setup();
        fill(&cart, &config);
        let response =
            add_to_cart(&cart, &config, &json!({ "id": "b", "name": "Tee", "price": 40 })).unwrap();

        assert_eq!(response.line_count, 2);
        assert_eq!(response.total_quantity, 3);
    }

    #[test]
    fn test_payload_without_id_is_rejected() {
        let (cart, config) = setup();
        let err = add_to_cart(&cart, &config, &json!({ "name": "?" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_oversized_price_is_rejected() {
        let (cart, config) = setup();
        fill(&cart, &config);

        let err = add_to_cart(&cart, &config, &json!({ "_id": "x", "price": 9e16, "quantity": 2 }))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let response = get_cart(&cart, &config);
        assert_eq!(response.line_count, 2);
        assert_eq!(response.formatted_total, "S$108.00");
    }

    #[test]
    fn test_quantity_controls() {
        let (cart, config) = setup();
        fill(&cart, &config);

        let response = decrement_item(&cart, &config, "a").unwrap();
        assert_eq!(response.items[0].quantity, 1);

        let response = increment_item(&cart, &config, "a").unwrap();
        assert_eq!(response.items[0].quantity, 2);
        assert_eq!(response.breakdown.subtotal, Money::from_cents(16000));

        let err = update_cart_item(&cart, &config, "a", 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
        assert_eq!(get_cart(&cart, &config).items[0].quantity, 2);

        let err = increment_item(&cart, &config, "zzz").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_save_for_later_and_back() {
        let (cart, config) = setup();
        fill(&cart, &config);

        let response = save_for_later(&cart, &config, "a").unwrap();
        assert_eq!(response.line_count, 1);
        assert_eq!(response.saved_for_later.len(), 1);
        assert_eq!(response.breakdown.shipping, Money::from_cents(499));
        assert_eq!(response.breakdown.amount_to_free_shipping, Money::from_cents(1000));

        let response = move_to_cart(&cart, &config, "a").unwrap();
        assert_eq!(response.line_count, 2);
        assert!(response.saved_for_later.is_empty());
    }

    #[test]
    fn test_promo_and_checkout() {
        let (cart, config) = setup();
        fill(&cart, &config);

        let promo = apply_promo(&cart, &config, "WELCOME10");
        assert!(promo.outcome.applied);
        assert_eq!(promo.cart.breakdown.promo_discount, Money::from_cents(1000));
        assert_eq!(promo.cart.breakdown.total, Money::from_cents(9800));

        let again = apply_promo(&cart, &config, "welcome10");
        assert_eq!(again.cart.breakdown.total, Money::from_cents(9800));

        let done = checkout(&cart, &config).unwrap();
        assert_eq!(done.confirmation_query, "total=98.00");
        assert_eq!(done.formatted_total, "S$98.00");
        assert_eq!(done.summary.promo_code.as_deref(), Some("welcome10"));

        let after = get_cart(&cart, &config);
        assert!(after.items.is_empty());
        assert!(after.applied_promo.is_none());
        assert_ne!(after.session_id, done.summary.session_id);
    }

    #[test]
    fn test_unknown_promo_is_not_an_error() {
        let (cart, config) = setup();
        fill(&cart, &config);

        let promo = apply_promo(&cart, &config, "FREESTUFF");
        assert!(!promo.outcome.applied);
        assert_eq!(promo.outcome.discount_amount, Money::zero());
        assert_eq!(promo.cart.breakdown.promo_discount, Money::zero());
    }

    #[test]
    fn test_checkout_of_empty_cart_fails() {
        let (cart, config) = setup();
        let err = checkout(&cart, &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
    }

    #[test]
    fn test_clear_cart_drops_promo() {
        let (cart, config) = setup();
        fill(&cart, &config);
        apply_promo(&cart, &config, "welcome10");

        let response = clear_cart(&cart, &config);
        assert!(response.items.is_empty());
        assert!(response.applied_promo.is_none());
        assert_eq!(response.breakdown.total, Money::zero());
    }

    #[test]
    fn test_add_listing_from_catalog() {
        let (cart, config) = setup();
        let report = Catalog::ingest_json(
            r#"[{"_id": "v1", "title": "Varsity Jacket", "price": 89.9, "category": "Outerwear",
                 "size": "L", "condition": "Like new", "gender": "Men"}]"#,
        )
        .unwrap();
        let catalog = CatalogState::new(report.catalog);

        let response = add_listing_to_cart(&cart, &catalog, &config, "v1").unwrap();
        assert_eq!(response.items[0].name, "Varsity Jacket");
        assert_eq!(response.breakdown.total, Money::from_cents(9709));

        let err = add_listing_to_cart(&cart, &catalog, &config, "missing").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
