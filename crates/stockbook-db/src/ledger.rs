//! # Ledger
//!
//! The owner-scoped store of products, sales and expenses.
//!
//! ## Recording a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ledger.record_sale(product_id, qty, &snapshot)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  stockbook_core::prepare_sale  ── Err → LedgerError::Core (no write)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  atomic_write([InsertSale, SetStock { expected, quantity }])           │
//! │       │                                                                 │
//! │       ├── BEGIN                                                         │
//! │       ├── INSERT INTO sales ...                                         │
//! │       ├── UPDATE products ... AND quantity = expected                   │
//! │       │      └── 0 rows → ROLLBACK → LedgerError::Persistence          │
//! │       ├── COMMIT                                                        │
//! │       ▼                                                                 │
//! │  broadcast Change(Sales), Change(Products) → subscriptions reload      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writers never assume their write shows up in the next snapshot; the
//! subscriptions alone decide what the UI sees.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult, LedgerResult};
use crate::repository::{self, ExpenseRepository, ProductRepository, SaleRepository};
use crate::subscription::{self, Subscription};
use stockbook_core::validation::validate_stock_level;
use stockbook_core::{
    prepare_sale, Collection, CoreResult, Expense, NewExpense, NewProduct, NewSale, OwnerId,
    Product, Sale, ValidationError,
};

// =============================================================================
// Scope
// =============================================================================

/// The `(app_id, owner_id)` pair every document lives under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    app_id: String,
    owner_id: OwnerId,
}

impl Scope {
    pub fn new(app_id: impl Into<String>, owner_id: OwnerId) -> Self {
        Scope {
            app_id: app_id.into(),
            owner_id,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }
}

/// Notification that one collection of one scope changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub scope: Scope,
    pub collection: Collection,
}

// =============================================================================
// Atomic Writes
// =============================================================================

/// One write inside an [`Ledger::atomic_write`] batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Must carry exact totals and be paired with a `SetStock` on the same
    /// product that lowers stock by the sold quantity.
    InsertSale(NewSale),
    /// Conditional: fails the whole batch unless stock is still `expected`.
    SetStock {
        product_id: String,
        expected: i64,
        quantity: i64,
    },
    InsertProduct(NewProduct),
    ReplaceProduct {
        id: String,
        product: NewProduct,
    },
    DeleteProduct {
        id: String,
    },
    InsertExpense(NewExpense),
    DeleteExpense {
        id: String,
    },
}

impl WriteOp {
    pub fn collection(&self) -> Collection {
        match self {
            WriteOp::InsertSale(_) => Collection::Sales,
            WriteOp::SetStock { .. }
            | WriteOp::InsertProduct(_)
            | WriteOp::ReplaceProduct { .. }
            | WriteOp::DeleteProduct { .. } => Collection::Products,
            WriteOp::InsertExpense(_) | WriteOp::DeleteExpense { .. } => Collection::Expenses,
        }
    }
}

/// What one [`WriteOp`] produced, in batch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    SaleInserted(Sale),
    StockSet { product_id: String, quantity: i64 },
    ProductInserted(Product),
    ProductReplaced { id: String },
    ProductDeleted { id: String },
    ExpenseInserted(Expense),
    ExpenseDeleted { id: String },
}

/// Validates a batch before any of it is written.
///
/// ```text
/// InsertProduct / ReplaceProduct  → NewProduct::validate
/// InsertExpense                   → NewExpense::validate
/// SetStock                        → stock levels never negative
/// InsertSale                      → NewSale::validate, plus one unclaimed
///                                   SetStock { product_id, expected - quantity == sold }
/// ```
fn check_batch(ops: &[WriteOp]) -> CoreResult<()> {
    let mut claimed = vec![false; ops.len()];

    for op in ops {
        match op {
            WriteOp::InsertProduct(product) | WriteOp::ReplaceProduct { product, .. } => {
                product.validate()?
            }
            WriteOp::InsertExpense(expense) => expense.validate()?,
            WriteOp::SetStock {
                expected, quantity, ..
            } => {
                validate_stock_level(*expected)?;
                validate_stock_level(*quantity)?;
            }
            WriteOp::InsertSale(sale) => {
                sale.validate()?;
                let decrement = ops.iter().enumerate().position(|(i, other)| {
                    !claimed[i]
                        && matches!(other, WriteOp::SetStock { product_id, expected, quantity }
                            if *product_id == sale.product_id
                                && expected.checked_sub(*quantity) == Some(sale.quantity))
                });
                match decrement {
                    Some(i) => claimed[i] = true,
                    None => {
                        return Err(ValidationError::Required {
                            field: format!("stock decrement for sold product {}", sale.product_id),
                        }
                        .into());
                    }
                }
            }
            WriteOp::DeleteProduct { .. } | WriteOp::DeleteExpense { .. } => {}
        }
    }

    Ok(())
}

// =============================================================================
// Ledger
// =============================================================================

/// Owner-scoped access to the three collections.
///
/// Built by [`crate::Database::ledger`]; it cannot exist without an
/// [`OwnerId`].
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
    scope: Scope,
    changes: broadcast::Sender<Change>,
}

impl Ledger {
    pub(crate) fn new(pool: SqlitePool, scope: Scope, changes: broadcast::Sender<Change>) -> Self {
        Ledger {
            pool,
            scope,
            changes,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone(), self.scope.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone(), self.scope.clone())
    }

    pub fn expenses(&self) -> ExpenseRepository {
        ExpenseRepository::new(self.pool.clone(), self.scope.clone())
    }

    // -------------------------------------------------------------------------
    // One-shot reads
    // -------------------------------------------------------------------------

    pub async fn list_products(&self) -> LedgerResult<Vec<Product>> {
        Ok(self.products().list().await?)
    }

    /// Newest first; records without a timestamp last.
    pub async fn list_sales(&self) -> LedgerResult<Vec<Sale>> {
        Ok(self.sales().list().await?)
    }

    /// Newest first; records without a timestamp last.
    pub async fn list_expenses(&self) -> LedgerResult<Vec<Expense>> {
        Ok(self.expenses().list().await?)
    }

    // -------------------------------------------------------------------------
    // Sales
    // -------------------------------------------------------------------------

    /// Records a sale of `quantity` units against the caller's product
    /// snapshot.
    ///
    /// Validation runs first and issues no write on failure. On success the
    /// sale row and the stock decrement commit together or not at all.
    pub async fn record_sale(
        &self,
        product_id: &str,
        quantity: i64,
        products: &[Product],
    ) -> LedgerResult<Sale> {
        let plan = prepare_sale(product_id, quantity, products)?;

        let product_id = plan.product_id().to_string();
        let ops = vec![
            WriteOp::InsertSale(plan.sale),
            WriteOp::SetStock {
                product_id: product_id.clone(),
                expected: plan.stock_before,
                quantity: plan.stock_after,
            },
        ];

        let sale = self
            .atomic_write(ops)
            .await?
            .into_iter()
            .find_map(|outcome| match outcome {
                WriteOutcome::SaleInserted(sale) => Some(sale),
                _ => None,
            })
            .ok_or_else(|| DbError::Internal("sale write produced no sale".to_string()))?;

        info!(
            sale_id = %sale.id,
            product_id = %product_id,
            quantity = sale.quantity,
            revenue_cents = sale.total_revenue_cents,
            stock_after = plan.stock_after,
            "Sale recorded"
        );

        Ok(sale)
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Adds a product; the store assigns id, `created_at` and `last_updated`.
    pub async fn add_product(&self, product: NewProduct) -> LedgerResult<Product> {
        product.validate()?;

        let product = repository::product::insert(&self.pool, &self.scope, &product).await?;
        self.notify(Collection::Products);

        Ok(product)
    }

    /// Replaces every editable field of a product.
    pub async fn update_product(&self, id: &str, product: NewProduct) -> LedgerResult<()> {
        product.validate()?;

        repository::product::replace(&self.pool, &self.scope, id, &product).await?;
        self.notify(Collection::Products);

        Ok(())
    }

    /// Hard-deletes a product. Its sales keep their back-reference.
    pub async fn delete_product(&self, id: &str) -> LedgerResult<()> {
        repository::product::delete(&self.pool, &self.scope, id).await?;
        self.notify(Collection::Products);

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Expenses
    // -------------------------------------------------------------------------

    /// Adds an expense; the store assigns id and `date`.
    pub async fn add_expense(&self, expense: NewExpense) -> LedgerResult<Expense> {
        expense.validate()?;

        let expense = repository::expense::insert(&self.pool, &self.scope, &expense).await?;
        self.notify(Collection::Expenses);

        Ok(expense)
    }

    pub async fn delete_expense(&self, id: &str) -> LedgerResult<()> {
        repository::expense::delete(&self.pool, &self.scope, id).await?;
        self.notify(Collection::Expenses);

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Atomic multi-write
    // -------------------------------------------------------------------------

    /// Applies every op in one SQLite transaction.
    ///
    /// The whole batch is validated first, with the same rules as the
    /// single-document operations, and nothing is written if any op is
    /// invalid. Either all ops land or none do. Subscribers of each touched
    /// collection are notified once, after commit.
    pub async fn atomic_write(&self, ops: Vec<WriteOp>) -> LedgerResult<Vec<WriteOutcome>> {
        if ops.is_empty() {
            return Ok(Vec::new());
        }

        check_batch(&ops)?;

        let mut touched: Vec<Collection> = Vec::new();
        for op in &ops {
            let collection = op.collection();
            if !touched.contains(&collection) {
                touched.push(collection);
            }
        }

        debug!(ops = ops.len(), "Beginning atomic write");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut outcomes = Vec::with_capacity(ops.len());
        for op in ops {
            match self.apply(&mut tx, op).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!(error = %e, "Atomic write failed, rolling back");
                    if let Err(rollback) = tx.rollback().await {
                        warn!(error = %rollback, "Rollback failed");
                    }
                    return Err(e.into());
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for collection in touched {
            self.notify(collection);
        }

        Ok(outcomes)
    }

    async fn apply(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        op: WriteOp,
    ) -> DbResult<WriteOutcome> {
        let scope = &self.scope;

        let outcome = match op {
            WriteOp::InsertSale(sale) => {
                WriteOutcome::SaleInserted(repository::sale::insert(&mut **tx, scope, sale).await?)
            }
            WriteOp::SetStock {
                product_id,
                expected,
                quantity,
            } => {
                repository::product::set_stock(&mut **tx, scope, &product_id, expected, quantity)
                    .await?;
                WriteOutcome::StockSet {
                    product_id,
                    quantity,
                }
            }
            WriteOp::InsertProduct(product) => WriteOutcome::ProductInserted(
                repository::product::insert(&mut **tx, scope, &product).await?,
            ),
            WriteOp::ReplaceProduct { id, product } => {
                repository::product::replace(&mut **tx, scope, &id, &product).await?;
                WriteOutcome::ProductReplaced { id }
            }
            WriteOp::DeleteProduct { id } => {
                repository::product::delete(&mut **tx, scope, &id).await?;
                WriteOutcome::ProductDeleted { id }
            }
            WriteOp::InsertExpense(expense) => WriteOutcome::ExpenseInserted(
                repository::expense::insert(&mut **tx, scope, &expense).await?,
            ),
            WriteOp::DeleteExpense { id } => {
                repository::expense::delete(&mut **tx, scope, &id).await?;
                WriteOutcome::ExpenseDeleted { id }
            }
        };

        Ok(outcome)
    }

    fn notify(&self, collection: Collection) {
        let change = Change {
            scope: self.scope.clone(),
            collection,
        };
        // No receivers just means nobody is subscribed yet.
        let _ = self.changes.send(change);
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Full product snapshot now and after every product change.
    pub fn subscribe_products(&self) -> Subscription<Product> {
        subscription::spawn(
            Collection::Products,
            self.scope.clone(),
            self.pool.clone(),
            self.changes.subscribe(),
            |pool, scope| async move { repository::product::list(&pool, &scope).await },
        )
    }

    /// Full sales snapshot, newest first.
    pub fn subscribe_sales(&self) -> Subscription<Sale> {
        subscription::spawn(
            Collection::Sales,
            self.scope.clone(),
            self.pool.clone(),
            self.changes.subscribe(),
            |pool, scope| async move { repository::sale::list(&pool, &scope).await },
        )
    }

    /// Full expenses snapshot, newest first.
    pub fn subscribe_expenses(&self) -> Subscription<Expense> {
        subscription::spawn(
            Collection::Expenses,
            self.scope.clone(),
            self.pool.clone(),
            self.changes.subscribe(),
            |pool, scope| async move { repository::expense::list(&pool, &scope).await },
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
