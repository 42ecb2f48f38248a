//! # Expense Repository
//!
//! Expense CRUD, scoped to one owner. Listed newest first.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::ledger::Scope;
use crate::repository::new_id;
use stockbook_core::{newest_first, Expense, NewExpense};

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
    scope: Scope,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool, scope: Scope) -> Self {
        ExpenseRepository { pool, scope }
    }

    /// All expenses of the owner, newest first.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        list(&self.pool, &self.scope).await
    }
}

pub(crate) async fn list<'e, E>(executor: E, scope: &Scope) -> DbResult<Vec<Expense>>
where
    E: SqliteExecutor<'e>,
{
    debug!(owner = %scope.owner_id(), "Listing expenses");

    let mut expenses = sqlx::query_as::<_, Expense>(
        r#"
        SELECT id, description, amount_cents, date
        FROM expenses
        WHERE app_id = ?1 AND owner_id = ?2
        ORDER BY rowid
        "#,
    )
    .bind(scope.app_id())
    .bind(scope.owner_id().as_str())
    .fetch_all(executor)
    .await?;

    newest_first(&mut expenses);
    Ok(expenses)
}

pub(crate) async fn insert<'e, E>(
    executor: E,
    scope: &Scope,
    new: &NewExpense,
) -> DbResult<Expense>
where
    E: SqliteExecutor<'e>,
{
    let expense = Expense {
        id: new_id(),
        description: new.description.trim().to_string(),
        amount_cents: new.amount_cents,
        date: Some(Utc::now()),
    };

    debug!(id = %expense.id, amount_cents = expense.amount_cents, "Inserting expense");

    sqlx::query(
        r#"
        INSERT INTO expenses (id, app_id, owner_id, description, amount_cents, date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&expense.id)
    .bind(scope.app_id())
    .bind(scope.owner_id().as_str())
    .bind(&expense.description)
    .bind(expense.amount_cents)
    .bind(expense.date)
    .execute(executor)
    .await?;

    Ok(expense)
}

pub(crate) async fn delete<'e, E>(executor: E, scope: &Scope, id: &str) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, "Deleting expense");

    let result = sqlx::query("DELETE FROM expenses WHERE id = ?1 AND app_id = ?2 AND owner_id = ?3")
        .bind(id)
        .bind(scope.app_id())
        .bind(scope.owner_id().as_str())
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Expense", id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockbook_core::OwnerId;

    #[tokio::test]
    async fn test_insert_list_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let scope = Scope::new("stockbook", OwnerId::new("owner-1").unwrap());

        let rent = NewExpense {
            description: "Rent".to_string(),
            amount_cents: 100_000,
        };
        let expense = insert(db.pool(), &scope, &rent).await.unwrap();
        assert!(expense.date.is_some());

        let repo = ExpenseRepository::new(db.pool().clone(), scope.clone());
        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, expense.id);
        assert_eq!(listed[0].description, "Rent");
        assert_eq!(listed[0].amount_cents, 100_000);

        delete(db.pool(), &scope, &expense.id).await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());

        let err = delete(db.pool(), &scope, &expense.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
