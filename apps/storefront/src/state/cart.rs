//! # Cart State
//!
//! Holds the shopper's cart for the lifetime of the app session.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Lifecycle                                 │
//! │                                                                         │
//! │  App start ──► CartState::new() ──► empty Cart, fresh session id       │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  Commands ──► with_cart_mut(|cart| ...) ──► add / +/- / remove / promo │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  checkout ──► Cart::checkout() ──► summary; cart emptied, new session  │
//! │                                                                         │
//! │  NOTE: reads and writes both take the Mutex; every closure is short.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use topcare_core::Cart;

/// Shared cart state.
///
/// ## Thread Safety
/// `Arc<Mutex<Cart>>`: most cart operations write, so a plain Mutex.
/// A poisoned lock is recovered: the cart only ever holds plain values and
/// every core mutation validates before it writes.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust
    /// use topcare_storefront::state::CartState;
    ///
    /// let state = CartState::new();
    /// assert!(state.with_cart(|cart| cart.is_empty()));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use topcare_core::{CartLineItem, Money};

    #[test]
    fn test_mutations_are_visible_to_readers() {
        let state = CartState::new();
        state
            .with_cart_mut(|cart| {
                cart.add_item(CartLineItem::new("1", "Shirt", Money::from_cents(3899), 1))
            })
            .unwrap();

        assert_eq!(state.with_cart(|cart| cart.total_quantity()), 1);
    }

    #[test]
    fn test_clones_share_the_same_cart() {
        let state = CartState::new();
        let other = state.clone();

        let handle = thread::spawn(move || {
            other.with_cart_mut(|cart| {
                cart.add_item(CartLineItem::new("2", "Boots", Money::from_cents(4704), 1))
            })
        });
        handle.join().unwrap().unwrap();

        assert_eq!(state.with_cart(|cart| cart.item_count()), 1);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let state = CartState::new();
        let other = state.clone();

        let result = thread::spawn(move || {
            other.with_cart_mut(|_cart| panic!("command panicked mid-way"));
        })
        .join();
        assert!(result.is_err());

        assert!(state.with_cart(|cart| cart.is_empty()));
    }
}
