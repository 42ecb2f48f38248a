//! # Snapshot Subscriptions
//!
//! A subscription delivers the FULL current contents of one collection,
//! first immediately and then after every change to that collection.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subscribe_*()                                                         │
//! │       │  1. register on the change broadcast (before any read)         │
//! │       │  2. spawn the reload task                                      │
//! │       ▼                                                                 │
//! │  ┌────────────────────── reload task ─────────────────────────────┐    │
//! │  │  load snapshot ──► mpsc ──► Subscription::next()               │    │
//! │  │       ▲                                                         │    │
//! │  │       └── Change { scope, collection } matches? reload          │    │
//! │  │       └── Lagged?  drain the backlog, reload once              │    │
//! │  │       └── Closed?  stop                                         │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  unsubscribe() / drop ──► abort task, close channel, never yield again │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Load failures are delivered as `Err` items; the subscription stays open
//! and the next change triggers another attempt.

use sqlx::SqlitePool;
use std::future::Future;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::ledger::{Change, Scope};
use stockbook_core::Collection;

/// Snapshots buffered between the reload task and the reader.
const SNAPSHOT_BUFFER: usize = 16;

/// One delivery: the full collection, or why it could not be read.
pub type SnapshotResult<T> = DbResult<Vec<T>>;

/// Live handle on one collection of one owner.
///
/// ## Example
/// ```rust,ignore
/// let mut sales = ledger.subscribe_sales();
/// while let Some(snapshot) = sales.next().await {
///     render(snapshot?);
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<T> {
    collection: Collection,
    receiver: mpsc::Receiver<SnapshotResult<T>>,
    task: JoinHandle<()>,
    closed: bool,
}

impl<T> Subscription<T> {
    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the subscription is closed, even if snapshots
    /// were still buffered.
    pub async fn next(&mut self) -> Option<SnapshotResult<T>> {
        if self.closed {
            return None;
        }
        self.receiver.recv().await
    }

    /// Stops deliveries. Calling it again is a no-op.
    pub fn unsubscribe(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.task.abort();
        self.receiver.close();
        info!(collection = %self.collection, "Subscription closed");
    }

    pub fn is_active(&self) -> bool {
        !self.closed
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Starts the reload task for one collection.
///
/// `changes` must already be registered so that a write landing between
/// this call and the first load is still seen.
pub(crate) fn spawn<T, F, Fut>(
    collection: Collection,
    scope: Scope,
    pool: SqlitePool,
    mut changes: broadcast::Receiver<Change>,
    load: F,
) -> Subscription<T>
where
    T: Send + 'static,
    F: Fn(SqlitePool, Scope) -> Fut + Send + 'static,
    Fut: Future<Output = SnapshotResult<T>> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(SNAPSHOT_BUFFER);

    info!(collection = %collection, owner = %scope.owner_id(), "Subscription opened");

    let task = tokio::spawn(async move {
        loop {
            let snapshot = load(pool.clone(), scope.clone()).await;
            if let Err(e) = &snapshot {
                warn!(collection = %collection, error = %e, "Snapshot load failed");
            }
            if sender.send(snapshot).await.is_err() {
                debug!(collection = %collection, "Subscriber gone, stopping reloads");
                return;
            }

            loop {
                match changes.recv().await {
                    Ok(change) if change.collection == collection && change.scope == scope => break,
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        let drained = drain_backlog(&mut changes);
                        warn!(
                            collection = %collection,
                            skipped,
                            drained,
                            "Subscriber lagged, reloading once"
                        );
                        break;
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        }
    });

    Subscription {
        collection,
        receiver,
        task,
        closed: false,
    }
}

/// Discards every queued change. The reload that follows covers them all.
fn drain_backlog(changes: &mut broadcast::Receiver<Change>) -> usize {
    let mut drained = 0;
    loop {
        match changes.try_recv() {
            Ok(_) => drained += 1,
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                return drained
            }
        }
    }
}
