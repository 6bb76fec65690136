//! # Pricing Engine
//!
//! Derives the price breakdown shown on the cart screen and repeated on the
//! checkout screen. Both screens call the same [`PricingEngine`].
//!
//! ## Breakdown Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Price Breakdown                                 │
//! │                                                                         │
//! │  subtotal  = Σ effective_price × quantity      (quantity ≥ 1 lines)    │
//! │  shipping  = 0        if subtotal ≥ 50.00                               │
//! │              4.99     otherwise                                         │
//! │  tax       = subtotal × 8%                     (before any discount)   │
//! │  discount  = applied promo (see PromoMode)                              │
//! │  total     = max(0, subtotal + shipping + tax + fee − discount)        │
//! │                                                                         │
//! │  Empty cart → every field is 0                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Promo Codes
//! A single allow-listed code, `welcome10`, takes 10% off. The discount is
//! captured as an absolute amount when the code is applied. Whether later
//! cart changes should re-derive it is a product decision, so both behaviors
//! exist behind [`PromoMode`]; the captured amount is the default.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;
use ts_rs::TS;

use crate::cart::CartLineItem;
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::TaxRate;

// =============================================================================
// Configuration
// =============================================================================

/// How an applied promo's discount is evaluated on later breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PromoMode {
    /// The amount computed at application time is kept, even if the cart
    /// changes afterwards.
    #[default]
    Snapshot,
    /// The stored rate is re-applied to the current subtotal.
    Recompute,
}

impl FromStr for PromoMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snapshot" => Ok(PromoMode::Snapshot),
            "recompute" => Ok(PromoMode::Recompute),
            _ => Err(ValidationError::NotAllowed {
                field: "promo mode".to_string(),
                allowed: vec!["snapshot".to_string(), "recompute".to_string()],
            }),
        }
    }
}

/// Pricing constants.
///
/// ## Defaults
/// - Free shipping from $50.00
/// - Flat shipping fee $4.99 below that
/// - Tax 8% on the subtotal
/// - No platform fee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub free_shipping_threshold: Money,
    pub flat_shipping_fee: Money,
    pub tax_rate: TaxRate,
    /// Fixed per-order fee added to non-empty carts.
    pub platform_fee: Money,
    pub promo_mode: PromoMode,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            free_shipping_threshold: Money::from_cents(5000),
            flat_shipping_fee: Money::from_cents(499),
            tax_rate: TaxRate::from_bps(800),
            platform_fee: Money::zero(),
            promo_mode: PromoMode::Snapshot,
        }
    }
}

// =============================================================================
// Promo Codes
// =============================================================================

/// A recognized promo code and the discount it unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromoRule {
    /// Lowercase code.
    pub code: &'static str,
    /// Discount in basis points of the subtotal.
    pub discount_bps: u32,
}

/// The promo allow-list.
pub const PROMO_CODES: &[PromoRule] = &[PromoRule {
    code: "welcome10",
    discount_bps: 1000,
}];

/// A user-entered promo code, normalized for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoCode(String);

impl PromoCode {
    pub fn new(input: &str) -> Self {
        PromoCode(input.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Looks the code up in [`PROMO_CODES`].
    pub fn rule(&self) -> Option<&'static PromoRule> {
        PROMO_CODES.iter().find(|rule| rule.code == self.0)
    }
}

/// A promo attached to a cart session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppliedPromo {
    pub code: String,
    pub rate_bps: u32,
    /// Discount captured when the code was applied.
    pub discount: Money,
}

/// Result of entering a promo code.
///
/// An unknown code is not an error: `applied` is false and `message` says
/// why, for the caller to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PromoOutcome {
    pub applied: bool,
    pub discount_amount: Money,
    pub message: Option<String>,
    /// The promo now attached to the cart, if any.
    pub promo: Option<AppliedPromo>,
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// Derived totals for a cart. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// Σ quantity over chargeable lines.
    pub item_count: i64,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub platform_fee: Money,
    pub promo_discount: Money,
    pub total: Money,
    /// Subtotal still missing for free shipping; zero once reached.
    pub amount_to_free_shipping: Money,
}

// =============================================================================
// Pricing Engine
// =============================================================================

/// Stateless pricing calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        PricingEngine { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Σ effective price × quantity. Lines with quantity ≤ 0 are skipped.
    pub fn subtotal(&self, items: &[CartLineItem]) -> Money {
        items.iter().map(CartLineItem::line_total).sum()
    }

    /// Shipping for a given subtotal.
    ///
    /// ```rust
    /// use topcare_core::money::Money;
    /// use topcare_core::pricing::PricingEngine;
    ///
    /// let engine = PricingEngine::default();
    /// assert_eq!(engine.shipping_for(Money::from_cents(5000)), Money::zero());
    /// assert_eq!(engine.shipping_for(Money::from_cents(4999)), Money::from_cents(499));
    /// ```
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal >= self.config.free_shipping_threshold {
            Money::zero()
        } else {
            self.config.flat_shipping_fee
        }
    }

    /// The discount an applied promo is worth against `subtotal`.
    pub fn promo_discount(&self, promo: Option<&AppliedPromo>, subtotal: Money) -> Money {
        match (promo, self.config.promo_mode) {
            (None, _) => Money::zero(),
            (Some(p), PromoMode::Snapshot) => p.discount,
            (Some(p), PromoMode::Recompute) => subtotal.percentage(p.rate_bps),
        }
    }

    /// Computes the full breakdown for the cart.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart screen / Checkout screen
    ///      │
    ///      ▼
    /// compute_breakdown(items, promo) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Subtotal $100.00 · Shipping FREE · Tax $8.00 · Promo −$10.00
    /// Total $98.00
    /// ```
    pub fn compute_breakdown(
        &self,
        items: &[CartLineItem],
        promo: Option<&AppliedPromo>,
    ) -> PriceBreakdown {
        let item_count: i64 = items
            .iter()
            .filter(|item| item.is_chargeable())
            .map(|item| item.quantity)
            .sum();

        if item_count == 0 {
            return PriceBreakdown::default();
        }

        let subtotal = self.subtotal(items);
        let shipping = self.shipping_for(subtotal);
        let tax = subtotal.calculate_tax(self.config.tax_rate);
        let platform_fee = self.config.platform_fee;
        let promo_discount = self.promo_discount(promo, subtotal);

        let total = (subtotal + shipping + tax + platform_fee - promo_discount).clamp_non_negative();
        let amount_to_free_shipping =
            (self.config.free_shipping_threshold - subtotal).clamp_non_negative();

        PriceBreakdown {
            item_count,
            subtotal,
            shipping,
            tax,
            platform_fee,
            promo_discount,
            total,
            amount_to_free_shipping,
        }
    }

    /// Applies a promo code to the current cart.
    ///
    /// ## Outcomes
    /// ```text
    /// ┌──────────────────────────────┬──────────┬────────────────────────────┐
    /// │ Situation                    │ applied  │ discount                   │
    /// ├──────────────────────────────┼──────────┼────────────────────────────┤
    /// │ promo already applied        │ true     │ existing (no-op)           │
    /// │ recognized code              │ true     │ rate × current subtotal    │
    /// │ unknown code                 │ false    │ 0                          │
    /// └──────────────────────────────┴──────────┴────────────────────────────┘
    /// ```
    pub fn apply_promo(
        &self,
        items: &[CartLineItem],
        code: &str,
        current: Option<&AppliedPromo>,
    ) -> PromoOutcome {
        if let Some(existing) = current {
            debug!(code = %existing.code, "Promo already applied, ignoring");
            return PromoOutcome {
                applied: true,
                discount_amount: existing.discount,
                message: Some("A promo code has already been applied".to_string()),
                promo: Some(existing.clone()),
            };
        }

        let code = PromoCode::new(code);
        let Some(rule) = code.rule() else {
            debug!(code = %code.as_str(), "Unrecognized promo code");
            return PromoOutcome {
                applied: false,
                discount_amount: Money::zero(),
                message: Some("Invalid promo code".to_string()),
                promo: None,
            };
        };

        let discount = self.subtotal(items).percentage(rule.discount_bps);
        debug!(code = %rule.code, discount = %discount, "Promo applied");

        PromoOutcome {
            applied: true,
            discount_amount: discount,
            message: Some(format!(
                "Promo code applied: {}% off",
                rule.discount_bps / 100
            )),
            promo: Some(AppliedPromo {
                code: rule.code.to_string(),
                rate_bps: rule.discount_bps,
                discount,
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, price_cents: i64, quantity: i64) -> CartLineItem {
        CartLineItem::new(id, format!("Item {}", id), Money::from_cents(price_cents), quantity)
    }

    fn engine() -> PricingEngine {
        PricingEngine::default()
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let breakdown = engine().compute_breakdown(&[], None);
        assert_eq!(breakdown, PriceBreakdown::default());
        assert_eq!(breakdown.total, Money::zero());
        assert_eq!(breakdown.shipping, Money::zero());
    }

    #[test]
    fn test_subtotal_uses_effective_price() {
        let mut discounted = line("1", 5000, 2);
        discounted.discounted_price = Some(Money::from_cents(3500));
        let items = vec![discounted, line("2", 1099, 3)];

        // 35.00 × 2 + 10.99 × 3
        assert_eq!(engine().subtotal(&items), Money::from_cents(7000 + 3297));
    }

    #[test]
    fn test_non_positive_quantities_are_excluded() {
        let items = vec![line("1", 2000, 1), line("2", 9999, 0), line("3", 9999, -2)];
        let breakdown = engine().compute_breakdown(&items, None);

        assert_eq!(breakdown.subtotal, Money::from_cents(2000));
        assert_eq!(breakdown.item_count, 1);
    }

    #[test]
    fn test_only_zero_quantity_lines_is_empty() {
        let items = vec![line("1", 2000, 0)];
        assert_eq!(engine().compute_breakdown(&items, None), PriceBreakdown::default());
    }

    #[test]
    fn test_shipping_boundary() {
        let at_threshold = engine().compute_breakdown(&[line("1", 5000, 1)], None);
        assert_eq!(at_threshold.shipping, Money::zero());
        assert_eq!(at_threshold.amount_to_free_shipping, Money::zero());

        let below = engine().compute_breakdown(&[line("1", 4999, 1)], None);
        assert_eq!(below.shipping, Money::from_cents(499));
        assert_eq!(below.amount_to_free_shipping, Money::from_cents(1));
    }

    #[test]
    fn test_breakdown_without_promo() {
        // 38.99 + 2 × 22.20 = 83.39
        let items = vec![line("1", 3899, 1), line("2", 2220, 2)];
        let breakdown = engine().compute_breakdown(&items, None);

        assert_eq!(breakdown.subtotal, Money::from_cents(8339));
        assert_eq!(breakdown.shipping, Money::zero());
        // 8339 × 8% = 667.12 → 667
        assert_eq!(breakdown.tax, Money::from_cents(667));
        assert_eq!(breakdown.total, Money::from_cents(8339 + 667));
        assert_eq!(breakdown.item_count, 3);
    }

    #[test]
    fn test_small_cart_pays_shipping() {
        let breakdown = engine().compute_breakdown(&[line("1", 1850, 1)], None);
        // 18.50 + 4.99 + 1.48
        assert_eq!(breakdown.tax, Money::from_cents(148));
        assert_eq!(breakdown.total, Money::from_cents(1850 + 499 + 148));
    }

    #[test]
    fn test_welcome10_on_100() {
        let items = vec![line("1", 10000, 1)];
        let outcome = engine().apply_promo(&items, "welcome10", None);

        assert!(outcome.applied);
        assert_eq!(outcome.discount_amount, Money::from_cents(1000));

        let breakdown = engine().compute_breakdown(&items, outcome.promo.as_ref());
        assert_eq!(breakdown.promo_discount, Money::from_cents(1000));
        // Tax is computed before the discount.
        assert_eq!(breakdown.tax, Money::from_cents(800));
        assert_eq!(breakdown.total, Money::from_cents(10000 + 800 - 1000));
    }

    #[test]
    fn test_promo_code_is_case_insensitive() {
        let items = vec![line("1", 10000, 1)];
        let outcome = engine().apply_promo(&items, "  WELCOME10 ", None);
        assert!(outcome.applied);
    }

    #[test]
    fn test_reapplying_promo_is_noop() {
        let items = vec![line("1", 10000, 1)];
        let first = engine().apply_promo(&items, "welcome10", None);

        let bigger = vec![line("1", 10000, 3)];
        let second = engine().apply_promo(&bigger, "welcome10", first.promo.as_ref());

        assert!(second.applied);
        assert_eq!(second.discount_amount, Money::from_cents(1000));
        assert_eq!(second.promo, first.promo);
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let items = vec![line("1", 10000, 1)];
        let outcome = engine().apply_promo(&items, "bogus", None);

        assert!(!outcome.applied);
        assert_eq!(outcome.discount_amount, Money::zero());
        assert_eq!(outcome.message.as_deref(), Some("Invalid promo code"));
        assert!(outcome.promo.is_none());

        let breakdown = engine().compute_breakdown(&items, outcome.promo.as_ref());
        assert_eq!(breakdown.promo_discount, Money::zero());
    }

    #[test]
    fn test_snapshot_discount_stays_after_cart_change() {
        let items = vec![line("1", 10000, 1)];
        let promo = engine().apply_promo(&items, "welcome10", None).promo;

        let grown = vec![line("1", 10000, 2)];
        let breakdown = engine().compute_breakdown(&grown, promo.as_ref());
        assert_eq!(breakdown.promo_discount, Money::from_cents(1000));
    }

    #[test]
    fn test_recompute_discount_follows_subtotal() {
        let engine = PricingEngine::new(PricingConfig {
            promo_mode: PromoMode::Recompute,
            ..PricingConfig::default()
        });
        let items = vec![line("1", 10000, 1)];
        let promo = engine.apply_promo(&items, "welcome10", None).promo;

        let grown = vec![line("1", 10000, 2)];
        let breakdown = engine.compute_breakdown(&grown, promo.as_ref());
        assert_eq!(breakdown.promo_discount, Money::from_cents(2000));
    }

    #[test]
    fn test_total_clamps_at_zero() {
        let items = vec![line("1", 1000, 1)];
        let oversized = AppliedPromo {
            code: "welcome10".to_string(),
            rate_bps: 1000,
            discount: Money::from_cents(50_000),
        };

        let breakdown = engine().compute_breakdown(&items, Some(&oversized));
        assert_eq!(breakdown.total, Money::zero());
    }

    #[test]
    fn test_platform_fee_is_added() {
        let engine = PricingEngine::new(PricingConfig {
            platform_fee: Money::from_cents(30),
            ..PricingConfig::default()
        });
        let breakdown = engine.compute_breakdown(&[line("1", 5000, 1)], None);
        assert_eq!(breakdown.platform_fee, Money::from_cents(30));
        assert_eq!(breakdown.total, Money::from_cents(5000 + 400 + 30));
    }

    #[test]
    fn test_promo_mode_from_str() {
        assert_eq!("Recompute".parse::<PromoMode>(), Ok(PromoMode::Recompute));
        assert!("sometimes".parse::<PromoMode>().is_err());
    }
}
