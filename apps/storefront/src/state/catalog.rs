//! # Catalog State
//!
//! The listing snapshot searches run against.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Snapshot Swap                                        │
//! │                                                                         │
//! │  search A ──► snapshot() ──► Arc<Catalog v1> ───── filtering ... ──┐   │
//! │                                                                     │   │
//! │  refresh  ──► replace(v2) ─► write lock, swap pointer, release      │   │
//! │                                                                     │   │
//! │  search B ──► snapshot() ──► Arc<Catalog v2>                        │   │
//! │                                                  v1 dropped ◄───────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock is held only long enough to clone or swap the `Arc`; filtering
//! never runs under it.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use topcare_core::Catalog;

#[derive(Debug)]
struct Snapshot {
    catalog: Arc<Catalog>,
    loaded_at: DateTime<Utc>,
}

/// Shared, swappable catalog snapshot.
#[derive(Debug, Clone)]
pub struct CatalogState {
    snapshot: Arc<RwLock<Snapshot>>,
}

impl CatalogState {
    pub fn new(catalog: Catalog) -> Self {
        CatalogState {
            snapshot: Arc::new(RwLock::new(Snapshot {
                catalog: Arc::new(catalog),
                loaded_at: Utc::now(),
            })),
        }
    }

    /// The current catalog. Stays valid after a later [`CatalogState::replace`].
    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard.catalog)
    }

    /// When the current snapshot was installed.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .loaded_at
    }

    /// Installs a new snapshot and returns the previous one.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        guard.loaded_at = Utc::now();
        std::mem::replace(&mut guard.catalog, Arc::new(catalog))
    }
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}
