//! # Live View
//!
//! Keeps the latest snapshot of all three collections for one owner and
//! derives the dashboard summary from it.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Unsubscribed ──start()──► Subscribed(empty)                          │
//! │                                   │                                     │
//! │                            next_change()                                │
//! │                                   ▼                                     │
//! │                             Subscribed(S) ◄──┐                          │
//! │                                   │          │ next_change()            │
//! │                                   ├──────────┘                          │
//! │                                   │                                     │
//! │                          close() / drop                                 │
//! │                                   ▼                                     │
//! │                             Unsubscribed                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every delivery replaces one collection wholesale. The summary is
//! recomputed from the current snapshot on request, never patched.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::LedgerResult;
use crate::ledger::Ledger;
use crate::subscription::Subscription;
use stockbook_core::{compute_summary, Collection, Expense, Product, Sale, Summary};

/// The current contents of the three collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub products: Vec<Product>,
    /// Newest first.
    pub sales: Vec<Sale>,
    /// Newest first.
    pub expenses: Vec<Expense>,
}

impl Snapshot {
    pub fn summary(&self) -> Summary {
        compute_summary(&self.products, &self.sales, &self.expenses)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Subscribed,
    Unsubscribed,
}

/// Live projection of one owner's ledger.
#[derive(Debug)]
pub struct LiveView {
    products: Subscription<Product>,
    sales: Subscription<Sale>,
    expenses: Subscription<Expense>,
    snapshot: Snapshot,
    state: ViewState,
}

impl LiveView {
    /// Subscribes to all three collections. The snapshot starts empty and
    /// fills as the initial deliveries arrive through [`LiveView::next_change`].
    pub fn start(ledger: &Ledger) -> Self {
        info!(owner = %ledger.scope().owner_id(), "Starting live view");

        LiveView {
            products: ledger.subscribe_products(),
            sales: ledger.subscribe_sales(),
            expenses: ledger.subscribe_expenses(),
            snapshot: Snapshot::default(),
            state: ViewState::Subscribed,
        }
    }

    /// Waits for the next delivery on any collection and applies it.
    ///
    /// Returns which collection changed, the store's error if that
    /// collection could not be read (the previous contents are kept), or
    /// `None` once the view is closed.
    pub async fn next_change(&mut self) -> Option<LedgerResult<Collection>> {
        if self.state == ViewState::Unsubscribed {
            return None;
        }

        tokio::select! {
            Some(delivery) = self.products.next() => Some(match delivery {
                Ok(products) => {
                    debug!(count = products.len(), "Products snapshot applied");
                    self.snapshot.products = products;
                    Ok(Collection::Products)
                }
                Err(e) => Err(e.into()),
            }),
            Some(delivery) = self.sales.next() => Some(match delivery {
                Ok(sales) => {
                    debug!(count = sales.len(), "Sales snapshot applied");
                    self.snapshot.sales = sales;
                    Ok(Collection::Sales)
                }
                Err(e) => Err(e.into()),
            }),
            Some(delivery) = self.expenses.next() => Some(match delivery {
                Ok(expenses) => {
                    debug!(count = expenses.len(), "Expenses snapshot applied");
                    self.snapshot.expenses = expenses;
                    Ok(Collection::Expenses)
                }
                Err(e) => Err(e.into()),
            }),
            else => None,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Summary of the current snapshot.
    pub fn summary(&self) -> Summary {
        self.snapshot.summary()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Unsubscribes from every collection. Idempotent; dropping the view
    /// does the same.
    pub fn close(&mut self) {
        if self.state == ViewState::Unsubscribed {
            return;
        }
        self.products.unsubscribe();
        self.sales.unsubscribe();
        self.expenses.unsubscribe();
        self.state = ViewState::Unsubscribed;
        info!("Live view closed");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Scope;
    use crate::pool::{Database, DbConfig};
    use std::time::Duration;
    use stockbook_core::{Money, NewExpense, NewProduct, OwnerId};

    async fn setup() -> (Database, Ledger) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ledger = db.ledger(Scope::new("stockbook", OwnerId::new("owner-1").unwrap()));
        (db, ledger)
    }

    /// Applies deliveries until `done` holds for the snapshot.
    async fn settle(view: &mut LiveView, done: impl Fn(&Snapshot) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !done(view.snapshot()) {
                view.next_change().await.expect("view closed").unwrap();
            }
        })
        .await
        .expect("timed out waiting for snapshot");
    }

    #[tokio::test]
    async fn test_starts_subscribed_and_empty() {
        let (_db, ledger) = setup().await;
        let view = LiveView::start(&ledger);

        assert_eq!(view.state(), ViewState::Subscribed);
        assert_eq!(view.snapshot(), &Snapshot::default());
        assert_eq!(view.summary().net_profit.to_string(), "R$ 0.00");
    }

    #[tokio::test]
    async fn test_summary_follows_the_ledger() {
        let (_db, ledger) = setup().await;
        let mut view = LiveView::start(&ledger);

        let whey = ledger
            .add_product(NewProduct {
                name: "Whey".to_string(),
                cost_price_cents: 2000,
                sale_price_cents: 3500,
                quantity: 10,
            })
            .await
            .unwrap();
        let products = ledger.list_products().await.unwrap();
        ledger.record_sale(&whey.id, 3, &products).await.unwrap();
        ledger
            .add_expense(NewExpense {
                description: "Rent".to_string(),
                amount_cents: 1000,
            })
            .await
            .unwrap();

        settle(&mut view, |s| {
            s.sales.len() == 1
                && s.expenses.len() == 1
                && s.products.first().map(|p| p.quantity) == Some(7)
        })
        .await;

        let summary = view.summary();
        assert_eq!(summary.total_revenue, Money::from_cents(10500));
        assert_eq!(summary.total_gross_profit, Money::from_cents(4500));
        assert_eq!(summary.total_expenses, Money::from_cents(1000));
        assert_eq!(summary.net_profit.to_string(), "R$ 35.00");
        assert!(summary.low_stock.is_empty());
    }

    #[tokio::test]
    async fn test_low_stock_tracks_sales() {
        let (_db, ledger) = setup().await;
        let mut view = LiveView::start(&ledger);

        let bar = ledger
            .add_product(NewProduct {
                name: "Protein Bar".to_string(),
                cost_price_cents: 450,
                sale_price_cents: 900,
                quantity: 8,
            })
            .await
            .unwrap();
        let products = ledger.list_products().await.unwrap();
        ledger.record_sale(&bar.id, 3, &products).await.unwrap();

        settle(&mut view, |s| s.products.first().map(|p| p.quantity) == Some(5)).await;

        let summary = view.summary();
        let low: Vec<&str> = summary.low_stock.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(low, ["Protein Bar"]);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (_db, ledger) = setup().await;
        let mut view = LiveView::start(&ledger);

        view.close();
        view.close();

        assert_eq!(view.state(), ViewState::Unsubscribed);
        assert!(view.next_change().await.is_none());
    }
}
