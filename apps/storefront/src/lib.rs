//! # TopCare Storefront Library
//!
//! Application shell around `topcare-core`: state, commands and
//! configuration. The `storefront` binary and the mobile bridge both link
//! against this library.
//!
//! ## Module Organization
//! ```text
//! topcare_storefront/
//! ├── lib.rs          ◄─── You are here (logging setup)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── cart.rs     ◄─── Cart state (Arc<Mutex<Cart>>)
//! │   ├── catalog.rs  ◄─── Catalog snapshot (swappable)
//! │   └── config.rs   ◄─── Configuration from TOPCARE_* variables
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── search.rs   ◄─── Search, filter options, catalog refresh
//! │   ├── cart.rs     ◄─── Cart, promo, checkout
//! │   └── config.rs   ◄─── Configuration retrieval
//! └── error.rs        ◄─── ApiError / ConfigError
//! ```
//!
//! ## State Management
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Storefront State                                     │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐   │
//! │  │    CartState     │ │   CatalogState   │ │    ConfigState       │   │
//! │  │                  │ │                  │ │                      │   │
//! │  │  • Cart lines    │ │  • Listings      │ │  • Store name        │   │
//! │  │  • Saved items   │ │  • Loaded at     │ │  • Currency symbol   │   │
//! │  │  • Promo         │ │                  │ │  • Pricing config    │   │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘   │
//! │                                                                         │
//! │  Each command takes only the state it needs, by reference.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use tracing_subscriber::EnvFilter;

pub use error::{ApiError, ConfigError, ErrorCode};
pub use state::{CartState, CatalogState, ConfigState};

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output on stdout stays valid JSON.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=topcare_core=trace` - Trace the engines only
/// - Default: `info`, with `debug` for the topcare crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,topcare_core=debug,topcare_storefront=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
