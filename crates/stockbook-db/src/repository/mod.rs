//! # Repository Module
//!
//! SQL for the three collections, always filtered by the caller's scope.
//!
//! ## Two Entry Points Per Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ProductRepository::list(&self)          ← pool-backed, one statement  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  product::list(executor, scope)          ← generic over SqliteExecutor │
//! │       ▲                                                                 │
//! │       │                                                                 │
//! │  Ledger::atomic_write                    ← same fn, on &mut *tx        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The free functions take any executor so the atomic multi-write can run
//! them inside one transaction; the repository structs are the convenient
//! pool-backed face for single statements.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Catalog CRUD and conditional stock updates
//! - [`SaleRepository`] - Append-only sales history
//! - [`ExpenseRepository`] - Expense CRUD

pub mod expense;
pub mod product;
pub mod sale;

pub use expense::ExpenseRepository;
pub use product::ProductRepository;
pub use sale::SaleRepository;

/// A fresh document id.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
