//! # Cart
//!
//! Cart line items, the cart mutation rules, and checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  UI Action                Cart Method             Effect               │
//! │  ─────────                ───────────             ──────               │
//! │                                                                         │
//! │  "Add to cart" ─────────► add_item() ──────────► push / quantity + 1   │
//! │  "+" ───────────────────► increment() ─────────► quantity + 1          │
//! │  "−" ───────────────────► decrement() ─────────► quantity − 1 (≥ 1)    │
//! │  "Remove" ──────────────► remove_item() ───────► line dropped          │
//! │  "Save for later" ──────► save_for_later() ────► line → saved list     │
//! │  "Apply" promo ─────────► apply_promo() ───────► promo captured        │
//! │  "Checkout" ────────────► checkout() ──────────► summary, cart reset   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `id` (adding the same listing bumps the quantity)
//! - Quantity stays within 1..=[`MAX_ITEM_QUANTITY`]; a decrement at 1 is a
//!   no-op, never a removal
//! - At most [`MAX_CART_ITEMS`] distinct lines
//! - At most one promo per cart session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::CatalogItem;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{AppliedPromo, PriceBreakdown, PricingEngine, PromoOutcome};
use crate::validation::{
    validate_cart_size, validate_discount_percentage, validate_listing_id, validate_price,
    validate_quantity,
};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line Item
// =============================================================================

/// One distinct listing selection in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Listing identifier.
    pub id: String,

    /// Name shown in the cart.
    pub name: String,

    /// Unit list price.
    pub list_price: Money,

    /// Sale price, never above `list_price`.
    pub discounted_price: Option<Money>,

    pub quantity: i64,

    /// Percentage badge shown next to deals. Display only.
    pub discount_percentage: Option<u8>,

    pub in_stock: bool,

    pub image: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl CartLineItem {
    /// Creates an in-stock line with no sale price.
    pub fn new(id: impl Into<String>, name: impl Into<String>, list_price: Money, quantity: i64) -> Self {
        CartLineItem {
            id: id.into(),
            name: name.into(),
            list_price,
            discounted_price: None,
            quantity,
            discount_percentage: None,
            in_stock: true,
            image: None,
            size: None,
            color: None,
        }
    }

    /// The price actually charged per unit.
    #[inline]
    pub fn effective_price(&self) -> Money {
        self.discounted_price.unwrap_or(self.list_price)
    }

    /// Whether the line counts towards totals.
    #[inline]
    pub fn is_chargeable(&self) -> bool {
        self.quantity > 0
    }

    /// Effective price × quantity, or zero for a non-positive quantity.
    pub fn line_total(&self) -> Money {
        if self.is_chargeable() {
            self.effective_price().multiply_quantity(self.quantity)
        } else {
            Money::zero()
        }
    }

    /// Normalizes an "add to cart" payload into a line item.
    ///
    /// ## Accepted Shapes
    /// ```text
    /// { "listing": { "_id", "title", "price", "image", "size", "color",
    ///                "inStock" }, "quantity": 2 }      ← cart API item
    /// { "_id" | "id", "name" | "title", "price", ... }  ← bare listing
    /// ```
    ///
    /// ## Defaults
    /// - `name`: `"Product"`
    /// - `price`: coerced via [`Money::from_untrusted`]; negative → 0
    /// - `quantity`: missing or < 1 → 1
    /// - `inStock`: true unless explicitly `false`
    /// - `discountedPrice` above the list price is dropped
    ///
    /// ## Errors
    /// A missing identifier, or a price above [`crate::MAX_PRICE`].
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let field = |key: &str| payload_field(payload, key);

        let id = ["_id", "id"]
            .iter()
            .filter_map(|key| field(*key))
            .find_map(id_string)
            .ok_or_else(|| ValidationError::Required {
                field: "id".to_string(),
            })?;
        validate_listing_id(&id)?;

        let name = ["title", "name"]
            .iter()
            .filter_map(|key| field(*key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or("Product")
            .to_string();

        let mut list_price = field("price").map(Money::from_untrusted).unwrap_or_default();
        if list_price.is_negative() {
            warn!(id = %id, price = %list_price, "Negative price in cart payload, using zero");
            list_price = Money::zero();
        }
        validate_price(list_price)?;

        let discounted_price = field("discountedPrice")
            .map(Money::from_untrusted)
            .filter(|price| {
                let valid = !price.is_negative() && *price <= list_price;
                if !valid {
                    warn!(id = %id, discounted = %price, list = %list_price, "Ignoring invalid discounted price");
                }
                valid
            });

        let quantity = payload
            .get("quantity")
            .and_then(Value::as_i64)
            .filter(|q| *q >= 1)
            .unwrap_or(1)
            .min(MAX_ITEM_QUANTITY);

        let discount_percentage = field("discountPercentage").and_then(|v| {
            let pct = match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
                _ => None,
            };
            match pct.map(validate_discount_percentage) {
                Some(Ok(pct)) => Some(pct),
                _ => {
                    warn!(id = %id, value = %v, "Ignoring invalid discount percentage");
                    None
                }
            }
        });

        let in_stock = field("inStock").and_then(Value::as_bool).unwrap_or(true);

        let text = |key: &str| field(key).and_then(Value::as_str).map(str::to_string);

        Ok(CartLineItem {
            name,
            list_price,
            discounted_price,
            quantity,
            discount_percentage,
            in_stock,
            image: text("image"),
            size: text("size"),
            color: text("color"),
            id,
        })
    }
}

/// "Add to cart" from a search result: one unit at the listing's price.
impl From<&CatalogItem> for CartLineItem {
    fn from(item: &CatalogItem) -> Self {
        CartLineItem {
            size: Some(item.size.clone()),
            ..CartLineItem::new(item.id.clone(), item.name.clone(), item.price, 1)
        }
    }
}

/// Looks a key up on the nested `listing` object first, then on the payload
/// itself. JSON `null` counts as missing.
fn payload_field<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    payload
        .get("listing")
        .filter(|l| l.is_object())
        .and_then(|l| l.get(key))
        .or_else(|| payload.get(key))
        .filter(|v| !v.is_null())
}

/// Identifiers arrive as strings (Mongo ObjectIds) or numbers (mock data).
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// Quantity Change
// =============================================================================

/// Result of a +/- tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Changed(i64),
    /// The request was a no-op; the line keeps this quantity.
    Unchanged(i64),
}

impl QuantityChange {
    pub fn quantity(&self) -> i64 {
        match self {
            QuantityChange::Changed(q) | QuantityChange::Unchanged(q) => *q,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Changes on every checkout; a promo is valid for one session.
    pub session_id: Uuid,

    pub items: Vec<CartLineItem>,

    pub saved_for_later: Vec<CartLineItem>,

    pub applied_promo: Option<AppliedPromo>,

    /// When the session started.
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            session_id: Uuid::new_v4(),
            items: Vec::new(),
            saved_for_later: Vec::new(),
            applied_promo: None,
            created_at: Utc::now(),
        }
    }

    fn line_mut(&mut self, id: &str) -> CoreResult<&mut CartLineItem> {
        self.items
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or_else(|| CoreError::LineNotFound(id.to_string()))
    }

    /// Adds a line, or bumps the quantity of the existing line by one.
    ///
    /// ## Behavior
    /// - Same `id` already in cart: quantity + 1 (the incoming quantity is
    ///   ignored, as with the storefront's "Add to cart" button)
    /// - New `id`: pushed with its quantity raised to at least 1
    pub fn add_item(&mut self, mut line: CartLineItem) -> CoreResult<()> {
        if let Some(existing) = self.items.iter_mut().find(|l| l.id == line.id) {
            let new_qty = existing.quantity + 1;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            existing.quantity = new_qty;
            debug!(id = %line.id, quantity = new_qty, "Cart line quantity bumped");
            return Ok(());
        }

        validate_cart_size(self.items.len()).map_err(|_| CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        })?;

        if line.quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: line.quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        line.quantity = line.quantity.max(1);

        debug!(id = %line.id, quantity = line.quantity, "Cart line added");
        self.items.push(line);
        Ok(())
    }

    /// "+" control.
    pub fn increment(&mut self, id: &str) -> CoreResult<QuantityChange> {
        let line = self.line_mut(id)?;
        if line.quantity >= MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: line.quantity + 1,
                max: MAX_ITEM_QUANTITY,
            });
        }
        line.quantity += 1;
        Ok(QuantityChange::Changed(line.quantity))
    }

    /// "−" control. At quantity 1 nothing happens.
    pub fn decrement(&mut self, id: &str) -> CoreResult<QuantityChange> {
        let line = self.line_mut(id)?;
        if line.quantity <= 1 {
            return Ok(QuantityChange::Unchanged(line.quantity));
        }
        line.quantity -= 1;
        Ok(QuantityChange::Changed(line.quantity))
    }

    /// Sets an explicit quantity.
    ///
    /// A quantity below 1 is rejected and the line is left as it was; use
    /// [`Cart::remove_item`] to drop a line.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> CoreResult<()> {
        let line = self.line_mut(id)?;

        validate_quantity(quantity).map_err(|err| match err {
            ValidationError::MustBePositive { .. } => CoreError::QuantityBelowMinimum {
                id: id.to_string(),
                requested: quantity,
            },
            _ => CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            },
        })?;

        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line and returns it.
    pub fn remove_item(&mut self, id: &str) -> CoreResult<CartLineItem> {
        let index = self
            .items
            .iter()
            .position(|line| line.id == id)
            .ok_or_else(|| CoreError::LineNotFound(id.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// Moves a line to the saved-for-later list.
    pub fn save_for_later(&mut self, id: &str) -> CoreResult<()> {
        let line = self.remove_item(id)?;
        self.saved_for_later.retain(|saved| saved.id != line.id);
        self.saved_for_later.push(line);
        Ok(())
    }

    /// Moves a saved line back into the cart, merging quantities with a line
    /// of the same id.
    pub fn move_to_cart(&mut self, id: &str) -> CoreResult<()> {
        let index = self
            .saved_for_later
            .iter()
            .position(|saved| saved.id == id)
            .ok_or_else(|| CoreError::LineNotFound(id.to_string()))?;
        let saved_qty = self.saved_for_later[index].quantity.max(1);

        if let Some(existing) = self.items.iter().find(|l| l.id == id) {
            let merged = existing.quantity + saved_qty;
            if merged > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            self.saved_for_later.remove(index);
            self.line_mut(id)?.quantity = merged;
            return Ok(());
        }

        validate_cart_size(self.items.len()).map_err(|_| CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        })?;
        let mut line = self.saved_for_later.remove(index);
        line.quantity = saved_qty;
        self.items.push(line);
        Ok(())
    }

    /// Empties the cart and drops the promo. Saved items stay.
    pub fn clear(&mut self) {
        self.items.clear();
        self.applied_promo = None;
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Σ quantity (the cart badge).
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().filter(|l| l.is_chargeable()).map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current breakdown.
    pub fn breakdown(&self, engine: &PricingEngine) -> PriceBreakdown {
        engine.compute_breakdown(&self.items, self.applied_promo.as_ref())
    }

    /// Enters a promo code for this session.
    pub fn apply_promo(&mut self, engine: &PricingEngine, code: &str) -> PromoOutcome {
        let outcome = engine.apply_promo(&self.items, code, self.applied_promo.as_ref());
        if self.applied_promo.is_none() && outcome.applied {
            self.applied_promo = outcome.promo.clone();
        }
        outcome
    }

    /// Completes the purchase.
    ///
    /// Returns what was bought and what it cost, then starts a fresh session:
    /// lines and promo are cleared, saved-for-later items are kept.
    pub fn checkout(&mut self, engine: &PricingEngine) -> CoreResult<CheckoutSummary> {
        let breakdown = self.breakdown(engine);
        if breakdown.item_count == 0 {
            return Err(CoreError::EmptyCart);
        }

        let items: Vec<CartLineItem> = self
            .items
            .drain(..)
            .filter(CartLineItem::is_chargeable)
            .collect();

        let summary = CheckoutSummary {
            session_id: self.session_id,
            items,
            breakdown,
            promo_code: self.applied_promo.take().map(|p| p.code),
            completed_at: Utc::now(),
        };

        self.session_id = Uuid::new_v4();
        self.created_at = summary.completed_at;

        debug!(
            session_id = %summary.session_id,
            total = %summary.breakdown.total,
            "Checkout complete"
        );
        Ok(summary)
    }
}

// =============================================================================
// Checkout Summary
// =============================================================================

/// What the order-confirmation screen shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub session_id: Uuid,
    pub items: Vec<CartLineItem>,
    pub breakdown: PriceBreakdown,
    pub promo_code: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl CheckoutSummary {
    /// The grand total.
    pub fn total(&self) -> Money {
        self.breakdown.total
    }

    /// Query string handed to the confirmation screen, e.g. `total=102.99`.
    pub fn confirmation_query(&self) -> String {
        format!("total={}", self.breakdown.total.to_decimal_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
