//! # State Module
//!
//! Application state for the storefront shell.
//!
//! ## Why Multiple State Types?
//! Each command takes only the state it needs, passed in explicitly:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Startup (main / bridge)                    │   │
//! │  │  let config  = ConfigState::from_env()?;                        │   │
//! │  │  let cart    = CartState::new();                                │   │
//! │  │  let catalog = CatalogState::default();                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │  CartState   │  │  CatalogState    │  │   ConfigState    │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Arc<Mutex<  │  │  Arc<RwLock<     │  │  store_name      │          │
//! │  │    Cart      │  │   Arc<Catalog>   │  │  currency        │          │
//! │  │  >>          │  │  >>              │  │  PricingConfig   │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CartState: Arc<Mutex<T>> for exclusive access                       │
//! │  • CatalogState: readers clone the Arc, refresh swaps it               │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
mod config;

pub use cart::CartState;
pub use catalog::CatalogState;
pub use config::ConfigState;
