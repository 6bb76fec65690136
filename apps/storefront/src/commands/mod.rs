//! # Commands Module
//!
//! Every operation the mobile app can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── search.rs   ◄─── Catalog search, filter options, catalog refresh
//! ├── cart.rs     ◄─── Cart manipulation, promo, checkout
//! └── config.rs   ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Mobile app                                                             │
//! │  ──────────                                                             │
//! │  const cart = await storefront.addToCart({ listing, quantity: 1 });     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust                                                                   │
//! │  ────                                                                   │
//! │  pub fn add_to_cart(                                                    │
//! │      cart: &CartState,        ◄── Only the state it needs              │
//! │      config: &ConfigState,                                              │
//! │      payload: &Value,         ◄── From the app                         │
//! │  ) -> Result<CartResponse, ApiError>                                    │
//! │         │                                                               │
//! │         │ (JSON serialization, camelCase)                               │
//! │         ▼                                                               │
//! │  App receives: { items, breakdown, formattedTotal, ... }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod config;
pub mod search;
