//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate holds every rule of the inventory / sales / expense tracker
//! that can be expressed without touching storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI layer (forms, dashboard)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               stockbook-db (Ledger, LiveView)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   sale    │  │  summary  │  │ validation│  │   │
//! │  │   │  Product  │  │  prepare  │  │  Summary  │  │   rules   │  │   │
//! │  │   │  Sale     │  │  _sale    │  │  low stock│  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Expense, OwnerId)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`sale`] - Sale planning: stock checks and totals
//! - [`summary`] - Aggregation of revenue, profit, expenses, low stock
//! - [`ordering`] - Newest-first ordering tolerant of pending timestamps
//!
//! ## Example Usage
//!
//! ```rust
//! use stockbook_core::{compute_summary, prepare_sale, Money, Product};
//!
//! let whey = Product {
//!     id: "p1".to_string(),
//!     name: "Whey".to_string(),
//!     cost_price_cents: 2000,
//!     sale_price_cents: 3500,
//!     quantity: 10,
//!     created_at: None,
//!     last_updated: None,
//! };
//!
//! let plan = prepare_sale("p1", 3, &[whey]).unwrap();
//! assert_eq!(plan.sale.total_revenue(), Money::from_cents(10500));
//! assert_eq!(plan.stock_after, 7);
//!
//! let summary = compute_summary(&[], &[], &[]);
//! assert!(summary.net_profit.is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod ordering;
pub mod sale;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use ordering::{newest_first, Timestamped};
pub use sale::{prepare_sale, PreparedSale, SaleTotals};
pub use summary::{compute_summary, Summary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Products at or below this stock level show up in the low-stock list.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum length of a product name.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Maximum length of an expense description.
pub const MAX_EXPENSE_DESCRIPTION_LEN: usize = 500;
