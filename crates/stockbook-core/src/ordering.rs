//! # Newest-First Ordering
//!
//! Sales and expenses are listed newest first by their store-assigned
//! timestamp. A record the store has not acknowledged yet has no timestamp;
//! it sorts after every timestamped record instead of failing.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::types::{Expense, Sale};

/// Records that carry a store-assigned timestamp.
pub trait Timestamped {
    fn timestamp(&self) -> Option<DateTime<Utc>>;
}

impl Timestamped for Sale {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date
    }
}

impl Timestamped for Expense {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date
    }
}

/// Sorts records newest first; pending timestamps go last.
///
/// The sort is stable: records with equal timestamps (or both pending) keep
/// the order the store delivered them in.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use stockbook_core::{newest_first, Expense};
///
/// let at = |secs| Some(Utc.timestamp_opt(secs, 0).unwrap());
/// let expense = |id: &str, date| Expense {
///     id: id.to_string(),
///     description: id.to_string(),
///     amount_cents: 100,
///     date,
/// };
///
/// let mut expenses = vec![expense("old", at(10)), expense("pending", None), expense("new", at(20))];
/// newest_first(&mut expenses);
///
/// let ids: Vec<&str> = expenses.iter().map(|e| e.id.as_str()).collect();
/// assert_eq!(ids, ["new", "old", "pending"]);
/// ```
pub fn newest_first<T: Timestamped>(records: &mut [T]) {
    records.sort_by(|a, b| compare_newest_first(a.timestamp(), b.timestamp()));
}

fn compare_newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> Option<DateTime<Utc>> {
        Some(Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn sale(id: &str, date: Option<DateTime<Utc>>) -> Sale {
        Sale {
            id: id.to_string(),
            product_id: "p".to_string(),
            product_name: "P".to_string(),
            quantity: 1,
            sale_price_cents: 100,
            cost_price_cents: 50,
            total_revenue_cents: 100,
            total_cost_cents: 50,
            profit_cents: 50,
            date,
        }
    }

    fn ids(sales: &[Sale]) -> Vec<&str> {
        sales.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_descending_by_timestamp() {
        let mut sales = vec![sale("a", at(1)), sale("b", at(3)), sale("c", at(2))];
        newest_first(&mut sales);
        assert_eq!(ids(&sales), ["b", "c", "a"]);
    }

    #[test]
    fn test_pending_records_sort_last_in_store_order() {
        let mut sales = vec![
            sale("p1", None),
            sale("a", at(5)),
            sale("p2", None),
            sale("b", at(9)),
        ];
        newest_first(&mut sales);
        assert_eq!(ids(&sales), ["b", "a", "p1", "p2"]);
    }

    #[test]
    fn test_equal_timestamps_are_stable() {
        let mut sales = vec![sale("x", at(7)), sale("y", at(7)), sale("z", at(8))];
        newest_first(&mut sales);
        assert_eq!(ids(&sales), ["z", "x", "y"]);
    }

    #[test]
    fn test_empty_is_fine() {
        let mut sales: Vec<Sale> = Vec::new();
        newest_first(&mut sales);
        assert!(sales.is_empty());
    }
}
