//! # topcare-core: Pricing and Search Logic for the TopCare Storefront
//!
//! The buyer-facing rules of the TopCare second-hand fashion marketplace:
//! what a cart costs, and which listings a search shows. Everything here is
//! a pure function over values; no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     TopCare Storefront Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Mobile app (React Native)                       │   │
//! │  │   Search screen ──► Listing ──► Cart ──► Checkout ──► Confirm  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               apps/storefront (commands + state)                │   │
//! │  │    search_catalog, add_to_cart, apply_promo, checkout, ...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ topcare-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  money   │ │   cart   │ │ pricing  │ │ catalog  │          │   │
//! │  │   │  Money   │ │   Cart   │ │ Pricing  │ │ Catalog  │          │   │
//! │  │   │ TaxRate  │ │ LineItem │ │  Engine  │ │  Item    │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐                       │   │
//! │  │   │  filter  │ │  types   │ │validation│                       │   │
//! │  │   │ Criteria │ │ Category │ │  rules   │                       │   │
//! │  │   │  Buckets │ │Condition │ │          │                       │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘                       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO GLOBAL STATE • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic and untrusted-input parsing
//! - [`types`] - TaxRate and the closed category/condition/gender sets
//! - [`cart`] - Cart line items and the cart session
//! - [`pricing`] - Price breakdown and promo codes
//! - [`catalog`] - Listing snapshot and ingestion
//! - [`filter`] - Search criteria, filtering, sorting and facet counts
//! - [`error`] - Domain error types
//! - [`validation`] - Boundary checks
//!
//! ## Example Usage
//!
//! ```rust
//! use topcare_core::cart::{Cart, CartLineItem};
//! use topcare_core::money::Money;
//! use topcare_core::pricing::{PricingConfig, PricingEngine};
//!
//! let engine = PricingEngine::new(PricingConfig::default());
//! let mut cart = Cart::new();
//! cart.add_item(CartLineItem::new("1", "Varsity Jacket", Money::from_cents(8990), 1))
//!     .unwrap();
//!
//! let breakdown = cart.breakdown(&engine);
//! assert_eq!(breakdown.shipping, Money::zero());        // over $50
//! assert_eq!(breakdown.tax, Money::from_cents(719));     // 8% of $89.90
//! assert_eq!(breakdown.total, Money::from_cents(9709));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLineItem, CheckoutSummary};
pub use catalog::{Catalog, CatalogItem, RawListing};
pub use error::{CoreError, CoreResult, ValidationError};
pub use filter::{filter, FilterCriteria, PriceBucket, SortOrder};
pub use money::Money;
pub use pricing::{PriceBreakdown, PricingConfig, PricingEngine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// Second-hand listings are usually one-offs; this only guards against
/// runaway input.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest accepted listing or line price ($1,000,000.00).
///
/// Keeps every cart total far inside `i64` cents.
pub const MAX_PRICE: Money = Money::from_cents(100_000_000);
