//! # Error Types
//!
//! Domain-specific error types for topcare-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  topcare-core errors (this file)                                       │
//! │  ├── CoreError        - Cart rule violations                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  topcare-storefront errors (app crate)                                 │
//! │  ├── ApiError         - What the frontend sees (serialized)            │
//! │  └── ConfigError      - Bad TOPCARE_* environment values               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pricing and filtering never return errors: bad prices become zero,
//! unknown filter values are dropped, an unknown promo code is a normal
//! outcome. Only explicit cart mutations and ingestion can fail.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No line with this identifier exists in the cart (or saved list).
    #[error("Item not in cart: {0}")]
    LineNotFound(String),

    /// Cart has exceeded maximum allowed distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Quantity below one was requested. The line keeps its previous value.
    ///
    /// ## User Workflow
    /// ```text
    /// Quantity shows 1, user taps "-"
    ///      │
    ///      ▼
    /// set_quantity(id, 0)
    ///      │
    ///      ▼
    /// QuantityBelowMinimum { id, requested: 0 }   (line stays at 1)
    /// ```
    #[error("Quantity for {id} cannot go below 1 (requested {requested})")]
    QuantityBelowMinimum { id: String, requested: i64 },

    /// Checkout was attempted with nothing chargeable in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. a price that is not a number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
