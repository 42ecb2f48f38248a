//! # Ledger Error Types
//!
//! Error types for persistence, ledger operations and configuration.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          CoreError (stockbook-core)        │
//! │       │                                   │                             │
//! │       ▼                                   │                             │
//! │  DbError ← Adds context and categorization│                             │
//! │       │                                   │                             │
//! │       └──────────────┬────────────────────┘                             │
//! │                      ▼                                                  │
//! │  LedgerError { Core | Persistence }                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  code() + user_message() ← what the form layer renders                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use stockbook_core::{CoreError, ValidationError};
use thiserror::Error;

/// Message shown for any persistence failure.
pub const PERSISTENCE_USER_MESSAGE: &str = "An error occurred. Please try again.";

// =============================================================================
// Database Error
// =============================================================================

/// Persistence failures.
///
/// These wrap sqlx errors and add the context the ledger knows about
/// (which document, which stock level was expected).
#[derive(Debug, Error)]
pub enum DbError {
    /// Document not found in the caller's scope.
    ///
    /// ## When This Occurs
    /// - Updating or deleting an id that does not exist
    /// - The id belongs to another owner
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed (including CHECK constraint violations).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin or commit failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A conditional stock update found a different stock level than the
    /// one the caller's snapshot was validated against. The whole atomic
    /// write was rolled back.
    #[error("Stock for product {product_id} changed since it was read (expected {expected})")]
    StaleSnapshot { product_id: String, expected: i64 },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether this error means the caller should re-read and retry.
    pub fn is_stale(&self) -> bool {
        matches!(self, DbError::StaleSnapshot { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → DbError::QueryFailed (constraint text kept)
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Ledger Error
// =============================================================================

/// Coarse classification the form layer switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    InsufficientStock,
    Persistence,
}

/// What every ledger operation returns on failure.
///
/// No variant is fatal: the caller shows [`LedgerError::user_message`] and
/// the session continues.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Rejected before any write was issued.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store refused or failed the write. Nothing was retried.
    #[error("Persistence error: {0}")]
    Persistence(#[from] DbError),
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Core(CoreError::Validation(err))
    }
}

impl LedgerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LedgerError::Core(CoreError::InsufficientStock { .. }) => ErrorCode::InsufficientStock,
            LedgerError::Core(_) => ErrorCode::Validation,
            LedgerError::Persistence(_) => ErrorCode::Persistence,
        }
    }

    /// Text for the form's error banner.
    ///
    /// Validation and stock errors are specific (the stock message carries
    /// the exact remaining count). Persistence errors are generic; the cause
    /// goes to the log, not the user.
    pub fn user_message(&self) -> String {
        match self {
            LedgerError::Core(CoreError::Validation(err)) => err.to_string(),
            LedgerError::Core(err) => err.to_string(),
            LedgerError::Persistence(_) => PERSISTENCE_USER_MESSAGE.to_string(),
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
