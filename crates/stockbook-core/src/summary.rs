//! # Summary Aggregation
//!
//! Derives the dashboard figures from a full snapshot of the three
//! collections. Nothing here is incremental: every new snapshot is
//! recomputed from scratch, so no component ever mutates shared totals.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total_revenue       = Σ sale.total_revenue                            │
//! │  total_gross_profit  = Σ sale.profit                                   │
//! │  total_expenses      = Σ expense.amount                                │
//! │  net_profit          = total_gross_profit − total_expenses             │
//! │  low_stock           = products with quantity ≤ 5, ascending, stable  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Expense, Product, Sale};

/// The four figures and the low-stock list shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_revenue: Money,
    pub total_gross_profit: Money,
    pub total_expenses: Money,
    pub net_profit: Money,
    pub low_stock: Vec<Product>,
}

/// Computes the summary for one snapshot.
///
/// Pure and deterministic. Empty inputs give zero figures and an empty
/// low-stock list. Records whose timestamps are still pending are counted
/// like any other. Totals clamp at the bounds of `Money`; they never
/// overflow.
///
/// ## Example
/// ```rust
/// use stockbook_core::{compute_summary, Expense, Money};
///
/// let rent = Expense {
///     id: "e1".to_string(),
///     description: "Rent".to_string(),
///     amount_cents: 1000,
///     date: None,
/// };
///
/// let summary = compute_summary(&[], &[], &[rent]);
/// assert_eq!(summary.net_profit, Money::from_cents(-1000));
/// ```
pub fn compute_summary(products: &[Product], sales: &[Sale], expenses: &[Expense]) -> Summary {
    let total_revenue = saturating_total(sales.iter().map(Sale::total_revenue));
    let total_gross_profit = saturating_total(sales.iter().map(Sale::profit));
    let total_expenses = saturating_total(expenses.iter().map(Expense::amount));

    Summary {
        total_revenue,
        total_gross_profit,
        total_expenses,
        net_profit: total_gross_profit.saturating_sub(total_expenses),
        low_stock: low_stock(products),
    }
}

fn saturating_total(amounts: impl Iterator<Item = Money>) -> Money {
    amounts.fold(Money::zero(), |acc, m| acc.saturating_add(m))
}

/// Products at or below the low-stock threshold, fewest units first.
///
/// `sort_by_key` is stable, so products with equal stock keep their
/// snapshot order.
pub fn low_stock(products: &[Product]) -> Vec<Product> {
    let mut low: Vec<Product> = products
        .iter()
        .filter(|p| p.is_low_stock())
        .cloned()
        .collect();
    low.sort_by_key(|p| p.quantity);
    low
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, quantity: i64) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_uppercase(),
            cost_price_cents: 100,
            sale_price_cents: 200,
            quantity,
            created_at: None,
            last_updated: None,
        }
    }

    fn sale(revenue: i64, profit: i64) -> Sale {
        Sale {
            id: format!("s-{revenue}-{profit}"),
            product_id: "p".to_string(),
            product_name: "P".to_string(),
            quantity: 1,
            sale_price_cents: revenue,
            cost_price_cents: revenue - profit,
            total_revenue_cents: revenue,
            total_cost_cents: revenue - profit,
            profit_cents: profit,
            date: None,
        }
    }

    fn expense(amount: i64) -> Expense {
        Expense {
            id: format!("e-{amount}"),
            description: "misc".to_string(),
            amount_cents: amount,
            date: None,
        }
    }

    #[test]
    fn test_empty_snapshot_is_all_zero() {
        let summary = compute_summary(&[], &[], &[]);

        assert_eq!(summary, Summary::default());
        assert_eq!(summary.total_revenue.to_string(), "R$ 0.00");
        assert_eq!(summary.total_gross_profit.to_string(), "R$ 0.00");
        assert_eq!(summary.total_expenses.to_string(), "R$ 0.00");
        assert_eq!(summary.net_profit.to_string(), "R$ 0.00");
        assert!(summary.low_stock.is_empty());
    }

    #[test]
    fn test_net_profit_scenario() {
        let summary = compute_summary(&[], &[sale(10500, 4500)], &[expense(1000)]);

        assert_eq!(summary.total_revenue, Money::from_cents(10500));
        assert_eq!(summary.total_gross_profit, Money::from_cents(4500));
        assert_eq!(summary.total_expenses, Money::from_cents(1000));
        assert_eq!(summary.net_profit, Money::from_cents(3500));
        assert_eq!(summary.net_profit.to_string(), "R$ 35.00");
    }

    #[test]
    fn test_net_profit_is_exact_difference() {
        let sales = vec![sale(10, 1), sale(20, 2), sale(30, 3)];
        let expenses = vec![expense(7), expense(11)];

        let summary = compute_summary(&[], &sales, &expenses);

        let profit: i64 = sales.iter().map(|s| s.profit_cents).sum();
        let spent: i64 = expenses.iter().map(|e| e.amount_cents).sum();
        assert_eq!(summary.net_profit.cents(), profit - spent);
        assert_eq!(summary.total_revenue.cents(), 60);
    }

    #[test]
    fn test_only_expenses_or_only_sales() {
        let only_sales = compute_summary(&[], &[sale(500, 200)], &[]);
        assert_eq!(only_sales.net_profit, Money::from_cents(200));

        let only_expenses = compute_summary(&[], &[], &[expense(300)]);
        assert_eq!(only_expenses.net_profit, Money::from_cents(-300));
        assert!(only_expenses.total_revenue.is_zero());
    }

    #[test]
    fn test_large_totals_clamp_instead_of_overflowing() {
        let half = i64::MAX / 2 + 1;
        let sales = vec![sale(half, half), sale(half, half)];

        let summary = compute_summary(&[], &sales, &[expense(1)]);

        assert_eq!(summary.total_revenue, Money::from_cents(i64::MAX));
        assert_eq!(summary.total_gross_profit, Money::from_cents(i64::MAX));
        assert_eq!(summary.net_profit, Money::from_cents(i64::MAX - 1));
    }

    #[test]
    fn test_low_stock_filter_and_stable_order() {
        let products = vec![
            product("a", 5),
            product("b", 12),
            product("c", 0),
            product("d", 5),
            product("e", 6),
            product("f", 3),
        ];

        let ids: Vec<String> = compute_summary(&products, &[], &[])
            .low_stock
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(ids, vec!["c", "f", "a", "d"]);
    }

    #[test]
    fn test_summary_is_pure() {
        let products = vec![product("a", 2), product("b", 1)];
        let sales = vec![sale(100, 40)];
        let expenses = vec![expense(15)];

        let first = compute_summary(&products, &sales, &expenses);
        let second = compute_summary(&products, &sales, &expenses);

        assert_eq!(first, second);
    }
}
