//! # Sale Repository
//!
//! Sales are append-only. The only write is the insert that runs inside the
//! sale's atomic write, next to the stock update.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::ledger::Scope;
use crate::repository::new_id;
use stockbook_core::{newest_first, NewSale, Sale};

/// Repository for reading the sales history.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    scope: Scope,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool, scope: Scope) -> Self {
        SaleRepository { pool, scope }
    }

    /// All sales of the owner, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        list(&self.pool, &self.scope).await
    }
}

pub(crate) async fn list<'e, E>(executor: E, scope: &Scope) -> DbResult<Vec<Sale>>
where
    E: SqliteExecutor<'e>,
{
    debug!(owner = %scope.owner_id(), "Listing sales");

    let mut sales = sqlx::query_as::<_, Sale>(
        r#"
        SELECT id, product_id, product_name, quantity,
               sale_price_cents, cost_price_cents,
               total_revenue_cents, total_cost_cents, profit_cents, date
        FROM sales
        WHERE app_id = ?1 AND owner_id = ?2
        ORDER BY rowid
        "#,
    )
    .bind(scope.app_id())
    .bind(scope.owner_id().as_str())
    .fetch_all(executor)
    .await?;

    newest_first(&mut sales);
    Ok(sales)
}

/// Inserts a computed sale with a fresh id and the current time.
///
/// ## Snapshot Pattern
/// Product name and prices are stored on the sale itself. Later edits or a
/// delete of the product never change this row.
pub(crate) async fn insert<'e, E>(executor: E, scope: &Scope, new: NewSale) -> DbResult<Sale>
where
    E: SqliteExecutor<'e>,
{
    let sale = new.into_sale(new_id(), Some(Utc::now()));

    debug!(
        id = %sale.id,
        product_id = %sale.product_id,
        quantity = sale.quantity,
        "Inserting sale"
    );

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, app_id, owner_id, product_id, product_name, quantity,
            sale_price_cents, cost_price_cents,
            total_revenue_cents, total_cost_cents, profit_cents, date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&sale.id)
    .bind(scope.app_id())
    .bind(scope.owner_id().as_str())
    .bind(&sale.product_id)
    .bind(&sale.product_name)
    .bind(sale.quantity)
    .bind(sale.sale_price_cents)
    .bind(sale.cost_price_cents)
    .bind(sale.total_revenue_cents)
    .bind(sale.total_cost_cents)
    .bind(sale.profit_cents)
    .bind(sale.date)
    .execute(executor)
    .await?;

    Ok(sale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockbook_core::OwnerId;

    fn new_sale(product_id: &str, quantity: i64) -> NewSale {
        NewSale {
            product_id: product_id.to_string(),
            product_name: "Whey".to_string(),
            quantity,
            sale_price_cents: 3500,
            cost_price_cents: 2000,
            total_revenue_cents: 3500 * quantity,
            total_cost_cents: 2000 * quantity,
            profit_cents: 1500 * quantity,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let scope = Scope::new("stockbook", OwnerId::new("owner-1").unwrap());

        let first = insert(db.pool(), &scope, new_sale("p1", 1)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = insert(db.pool(), &scope, new_sale("p2", 2)).await.unwrap();

        let sales = list(db.pool(), &scope).await.unwrap();
        let ids: Vec<&str> = sales.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, [second.id.as_str(), first.id.as_str()]);
        assert_eq!(sales[0].profit_cents, 3000);
    }
}
