//! # Error Types
//!
//! Domain-specific error types for stockbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockbook-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockbook-db errors (separate crate)                                  │
//! │  ├── DbError          - Persistence failures                           │
//! │  └── LedgerError      - What ledger callers see (Core | Persistence)   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → form handler        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant carries enough context for the form layer to render a
//! message without re-deriving anything (the available stock count, the
//! offending field name, ...).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Input failed validation before any business rule ran.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Not enough stock to complete the sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Record sale (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=2
    ///      │
    ///      ▼
    /// InsufficientStock { available: 2, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Insufficient stock: only 2 units available"
    /// ```
    #[error("Insufficient stock: only {available} units available (requested {requested})")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// A computed amount does not fit in the money representation.
    #[error("Amount overflow while computing {what}")]
    AmountOverflow { what: String },
}

impl CoreError {
    /// Returns the available quantity for stock errors.
    pub fn available_quantity(&self) -> Option<i64> {
        match self {
            CoreError::InsufficientStock { available, .. } => Some(*available),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// They are recoverable: the form re-prompts the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The sale form was submitted without a product.
    #[error("no product selected")]
    NoProductSelected,

    /// The selected product is not in the caller's snapshot.
    #[error("product not found")]
    ProductNotFound { id: String },

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. an amount with three decimals).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A derived value disagrees with the values it is derived from.
    #[error("{field} must be {expected}, got {actual}")]
    Mismatch {
        field: String,
        expected: i64,
        actual: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message_carries_count() {
        let err = CoreError::InsufficientStock {
            product_id: "p1".to_string(),
            available: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock: only 2 units available (requested 5)"
        );
        assert_eq!(err.available_quantity(), Some(2));
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::NoProductSelected.to_string(),
            "no product selected"
        );
        assert_eq!(
            ValidationError::ProductNotFound {
                id: "x".to_string()
            }
            .to_string(),
            "product not found"
        );
        assert_eq!(
            ValidationError::Required {
                field: "name".to_string()
            }
            .to_string(),
            "name is required"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::NoProductSelected.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.available_quantity(), None);
    }
}
