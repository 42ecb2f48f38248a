//! # Product Repository
//!
//! Catalog operations, scoped to one owner.
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE products SET quantity = :after                                 │
//! │  WHERE id = :id AND <scope> AND quantity = :before                     │
//! │                                                                         │
//! │  1 row  → the snapshot was current, stock is now :after                │
//! │  0 rows → stock moved (or product gone) → DbError::StaleSnapshot       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deletes are hard deletes. Sales keep their `product_id` back-reference.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::ledger::Scope;
use crate::repository::new_id;
use stockbook_core::{NewProduct, Product};

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, cost_price_cents, sale_price_cents, quantity, created_at, last_updated
    FROM products
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    scope: Scope,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool, scope: Scope) -> Self {
        ProductRepository { pool, scope }
    }

    /// All products of the owner, in store order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        list(&self.pool, &self.scope).await
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        get_by_id(&self.pool, &self.scope, id).await
    }

    /// Counts the owner's products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE app_id = ?1 AND owner_id = ?2",
        )
        .bind(self.scope.app_id())
        .bind(self.scope.owner_id().as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Executor-generic queries
// =============================================================================

pub(crate) async fn list<'e, E>(executor: E, scope: &Scope) -> DbResult<Vec<Product>>
where
    E: SqliteExecutor<'e>,
{
    debug!(owner = %scope.owner_id(), "Listing products");

    let sql = format!("{SELECT_PRODUCT} WHERE app_id = ?1 AND owner_id = ?2 ORDER BY rowid");
    let products = sqlx::query_as::<_, Product>(&sql)
        .bind(scope.app_id())
        .bind(scope.owner_id().as_str())
        .fetch_all(executor)
        .await?;

    Ok(products)
}

pub(crate) async fn get_by_id<'e, E>(
    executor: E,
    scope: &Scope,
    id: &str,
) -> DbResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("{SELECT_PRODUCT} WHERE id = ?1 AND app_id = ?2 AND owner_id = ?3");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .bind(scope.app_id())
        .bind(scope.owner_id().as_str())
        .fetch_optional(executor)
        .await?;

    Ok(product)
}

/// Inserts a product with a fresh id; `created_at` and `last_updated` are
/// both set to now.
pub(crate) async fn insert<'e, E>(
    executor: E,
    scope: &Scope,
    new: &NewProduct,
) -> DbResult<Product>
where
    E: SqliteExecutor<'e>,
{
    let now = Utc::now();
    let product = Product {
        id: new_id(),
        name: new.name.trim().to_string(),
        cost_price_cents: new.cost_price_cents,
        sale_price_cents: new.sale_price_cents,
        quantity: new.quantity,
        created_at: Some(now),
        last_updated: Some(now),
    };

    debug!(id = %product.id, name = %product.name, "Inserting product");

    sqlx::query(
        r#"
        INSERT INTO products (
            id, app_id, owner_id, name,
            cost_price_cents, sale_price_cents, quantity,
            created_at, last_updated
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&product.id)
    .bind(scope.app_id())
    .bind(scope.owner_id().as_str())
    .bind(&product.name)
    .bind(product.cost_price_cents)
    .bind(product.sale_price_cents)
    .bind(product.quantity)
    .bind(product.created_at)
    .bind(product.last_updated)
    .execute(executor)
    .await?;

    Ok(product)
}

/// Replaces every editable field of a product and bumps `last_updated`.
pub(crate) async fn replace<'e, E>(
    executor: E,
    scope: &Scope,
    id: &str,
    new: &NewProduct,
) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, "Replacing product");

    let result = sqlx::query(
        r#"
        UPDATE products SET
            name = ?1,
            cost_price_cents = ?2,
            sale_price_cents = ?3,
            quantity = ?4,
            last_updated = ?5
        WHERE id = ?6 AND app_id = ?7 AND owner_id = ?8
        "#,
    )
    .bind(new.name.trim())
    .bind(new.cost_price_cents)
    .bind(new.sale_price_cents)
    .bind(new.quantity)
    .bind(Utc::now())
    .bind(id)
    .bind(scope.app_id())
    .bind(scope.owner_id().as_str())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", id));
    }

    Ok(())
}

/// Hard-deletes a product.
pub(crate) async fn delete<'e, E>(executor: E, scope: &Scope, id: &str) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, "Deleting product");

    let result = sqlx::query("DELETE FROM products WHERE id = ?1 AND app_id = ?2 AND owner_id = ?3")
        .bind(id)
        .bind(scope.app_id())
        .bind(scope.owner_id().as_str())
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", id));
    }

    Ok(())
}

/// Sets stock to `quantity` only if it is still `expected`.
pub(crate) async fn set_stock<'e, E>(
    executor: E,
    scope: &Scope,
    product_id: &str,
    expected: i64,
    quantity: i64,
) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(
        product_id = %product_id,
        expected = expected,
        quantity = quantity,
        "Setting stock"
    );

    let result = sqlx::query(
        r#"
        UPDATE products SET quantity = ?1, last_updated = ?2
        WHERE id = ?3 AND app_id = ?4 AND owner_id = ?5 AND quantity = ?6
        "#,
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(product_id)
    .bind(scope.app_id())
    .bind(scope.owner_id().as_str())
    .bind(expected)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::StaleSnapshot {
            product_id: product_id.to_string(),
            expected,
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
    use crate::pool::{Database, DbConfig};
    use stockbook_core::OwnerId;

    async fn setup() -> (Database, Scope) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let scope = Scope::new("stockbook", OwnerId::new("owner-1").unwrap());
        (db, scope)
    }

    fn whey() -> NewProduct {
        NewProduct {
            name: " Whey ".to_string(),
            cost_price_cents: 2000,
            sale_price_cents: 3500,
            quantity: 10,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (db, scope) = setup().await;

        let product = insert(db.pool(), &scope, &whey()).await.unwrap();
        assert_eq!(product.name, "Whey");
        assert!(product.created_at.is_some());

        let found = get_by_id(db.pool(), &scope, &product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, product.id);
        assert_eq!(found.quantity, 10);
        assert!(found.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_set_stock_requires_expected_level() {
        let (db, scope) = setup().await;
        let product = insert(db.pool(), &scope, &whey()).await.unwrap();

        let stale = set_stock(db.pool(), &scope, &product.id, 9, 4).await;
        assert!(matches!(stale, Err(DbError::StaleSnapshot { expected: 9, .. })));

        set_stock(db.pool(), &scope, &product.id, 10, 7).await.unwrap();
        let repo = ProductRepository::new(db.pool().clone(), scope);
        assert_eq!(repo.get_by_id(&product.id).await.unwrap().unwrap().quantity, 7);
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_by_schema() {
        let (db, scope) = setup().await;
        let product = insert(db.pool(), &scope, &whey()).await.unwrap();

        let err = set_stock(db.pool(), &scope, &product.id, 10, -1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));
    }

    #[tokio::test]
    async fn test_replace_and_delete_missing() {
        let (db, scope) = setup().await;

        let err = replace(db.pool(), &scope, "ghost", &whey()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = delete(db.pool(), &scope, "ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_count_is_scoped() {
        let (db, scope) = setup().await;
        let other = Scope::new("stockbook", OwnerId::new("owner-2").unwrap());

        insert(db.pool(), &scope, &whey()).await.unwrap();
        insert(db.pool(), &scope, &whey()).await.unwrap();
        insert(db.pool(), &other, &whey()).await.unwrap();

        let repo = ProductRepository::new(db.pool().clone(), scope);
        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }
}
