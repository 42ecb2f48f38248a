//! # stockbook-db: Ledger Store for Stockbook
//!
//! Owner-scoped persistence of products, sales and expenses on SQLite, with
//! atomic multi-writes and full-snapshot subscriptions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  Form handler (record sale / add product / add expense)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockbook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │    Ledger     │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │  (ledger.rs)  │───►│  product.rs   │    │  (embedded)  │   │   │
//! │  │   │ atomic_write  │    │  sale.rs      │    │ 001_init.sql │   │   │
//! │  │   │ subscribe_*   │    │  expense.rs   │    │              │   │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘   │   │
//! │  │           │ Change broadcast                                    │   │
//! │  │           ▼                                                     │   │
//! │  │   ┌───────────────┐    ┌───────────────┐                        │   │
//! │  │   │ Subscription  │───►│   LiveView    │──► Summary             │   │
//! │  │   │ (per coll.)   │    │  (live.rs)    │    (stockbook-core)    │   │
//! │  │   └───────────────┘    └───────────────┘                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Persistence, ledger and config errors
//! - [`repository`] - Scoped SQL per collection
//! - [`ledger`] - The owner-scoped store contract
//! - [`subscription`] - Full-snapshot subscriptions
//! - [`live`] - Live view over all three collections
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_core::OwnerId;
//! use stockbook_db::{Database, DbConfig, LiveView, Scope};
//!
//! let db = Database::new(DbConfig::new("stockbook.db")).await?;
//! let ledger = db.ledger(Scope::new("stockbook", OwnerId::new(uid)?));
//!
//! let products = ledger.list_products().await?;
//! let sale = ledger.record_sale(&product_id, 3, &products).await?;
//!
//! let mut view = LiveView::start(&ledger);
//! while let Some(change) = view.next_change().await {
//!     change?;
//!     println!("{}", view.summary().net_profit);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod ledger;
pub mod live;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod subscription;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::StockbookConfig;
pub use error::{ConfigError, DbError, DbResult, ErrorCode, LedgerError, LedgerResult};
pub use ledger::{Change, Ledger, Scope, WriteOp, WriteOutcome};
pub use live::{LiveView, Snapshot, ViewState};
pub use pool::{Database, DbConfig};
pub use subscription::Subscription;

// Repository re-exports for convenience
pub use repository::{ExpenseRepository, ProductRepository, SaleRepository};
