//! # Validation Module
//!
//! Input validation utilities shared by cart mutations and catalog
//! ingestion.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (React Native)                                      │
//! │  └── Quantity buttons never go below 1                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Ingestion boundary (THIS MODULE)                             │
//! │  ├── Listing records → CatalogItem (reject unknown categories)         │
//! │  └── Cart payloads → CartLineItem (coerce prices, default quantity)    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engines                                                      │
//! │  └── Assume validated data; still skip zero-quantity lines             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a listing identifier (cart line id / catalog id).
///
/// ```rust
/// use topcare_core::validation::validate_listing_id;
///
/// assert!(validate_listing_id("665f1c2e9b1e8a0012ab34cd").is_ok());
/// assert!(validate_listing_id("   ").is_err());
/// ```
pub fn validate_listing_id(id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Normalizes a free-text search query.
///
/// Trims surrounding whitespace only; the query is otherwise matched as
/// typed, whatever its length.
pub fn normalize_search_query(query: &str) -> String {
    query.trim().to_string()
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items); negative prices and
/// prices above [`MAX_PRICE`] are not.
///
/// ```rust
/// use topcare_core::money::Money;
/// use topcare_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(1099)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_cents(-100)).is_err());
/// assert!(validate_price(Money::from_cents(9_000_000_000_000_000)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() || price > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE.dollars(),
        });
    }

    Ok(())
}

/// Validates a display-only discount percentage (0-100).
pub fn validate_discount_percentage(pct: i64) -> ValidationResult<u8> {
    if !(0..=100).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: "discount percentage".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(pct as u8)
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more distinct line fits in the cart.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_listing_id() {
        assert!(validate_listing_id("1").is_ok());
        assert!(validate_listing_id("665f1c2e9b1e8a0012ab34cd").is_ok());
        assert!(validate_listing_id("").is_err());
        assert!(validate_listing_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_normalize_search_query() {
        assert_eq!(normalize_search_query("  shirt "), "shirt");
        assert_eq!(normalize_search_query(&"a".repeat(300)).len(), 300);
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_bounds() {
        assert!(validate_price(MAX_PRICE).is_ok());
        assert!(validate_price(MAX_PRICE + Money::from_cents(1)).is_err());
        assert_eq!(
            validate_price(Money::from_cents(-1)),
            Err(ValidationError::OutOfRange {
                field: "price".to_string(),
                min: 0,
                max: 1_000_000,
            })
        );
    }

    #[test]
    fn test_validate_discount_percentage() {
        assert_eq!(validate_discount_percentage(0), Ok(0));
        assert_eq!(validate_discount_percentage(35), Ok(35));
        assert!(validate_discount_percentage(101).is_err());
        assert!(validate_discount_percentage(-5).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }
}
