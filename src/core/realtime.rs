//! Table change notifications and self-refreshing views.
//!
//! Every successful write in the core publishes a [`ChangeEvent`] on the shared
//! [`ChangeFeed`]. Consumers subscribe per table and react by refetching the whole
//! list they display ([`LiveView`]). Refetch-and-replace is idempotent, so an echoed
//! notification for a write the consumer already knows about only costs one extra query.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::errors::Result;

const DEFAULT_CAPACITY: usize = 256;

/// Tables that publish change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Categories,
    Products,
    Sales,
    SiteSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One row-level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    /// Primary key of the affected row
    pub id: i64,
}

impl ChangeEvent {
    #[must_use]
    pub const fn inserted(table: Table, id: i64) -> Self {
        Self {
            table,
            kind: ChangeKind::Insert,
            id,
        }
    }

    #[must_use]
    pub const fn updated(table: Table, id: i64) -> Self {
        Self {
            table,
            kind: ChangeKind::Update,
            id,
        }
    }

    #[must_use]
    pub const fn deleted(table: Table, id: i64) -> Self {
        Self {
            table,
            kind: ChangeKind::Delete,
            id,
        }
    }
}

/// Broadcast channel of [`ChangeEvent`]s. Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeFeed {
    /// Creates a feed that buffers up to `capacity` events per slow subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event. Having no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        trace!(?event, "publishing change");
        if self.sender.send(event).is_err() {
            trace!("no subscribers for change notification");
        }
    }

    /// Subscribes to every change of one table.
    #[must_use]
    pub fn subscribe(&self, table: Table) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            table: Some(table),
            kind: None,
        }
    }

    /// Subscribes to one kind of change of one table.
    #[must_use]
    pub fn subscribe_kind(&self, table: Table, kind: ChangeKind) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            table: Some(table),
            kind: Some(kind),
        }
    }

    /// Subscribes to every change of every table.
    #[must_use]
    pub fn subscribe_all(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            table: None,
            kind: None,
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// What a subscriber is told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// A matching row changed
    Changed(ChangeEvent),
    /// Events were dropped because the subscriber fell behind; refetch everything
    Resync,
}

/// Filtered receiving end of a [`ChangeFeed`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<ChangeEvent>,
    table: Option<Table>,
    kind: Option<ChangeKind>,
}

impl Subscription {
    fn matches(&self, event: &ChangeEvent) -> bool {
        self.table.is_none_or(|t| t == event.table) && self.kind.is_none_or(|k| k == event.kind)
    }

    /// Waits for the next matching notification.
    ///
    /// Returns `None` once every [`ChangeFeed`] handle has been dropped.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.matches(&event) => return Some(Notification::Changed(event)),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "change subscriber lagged, forcing resync");
                    return Some(Notification::Resync);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// A value kept in sync with the store by refetching on every notification.
///
/// Typical contents are `Vec<Model>` for lists and `Option<Model>` for singletons.
#[derive(Debug)]
pub struct LiveView<T> {
    value: Arc<RwLock<T>>,
}

impl<T> Clone for LiveView<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
        }
    }
}

impl<T: Default> Default for LiveView<T> {
    fn default() -> Self {
        Self {
            value: Arc::new(RwLock::new(T::default())),
        }
    }
}

impl<T> LiveView<T>
where
    T: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(initial)),
        }
    }

    /// Copy of the current value.
    pub async fn snapshot(&self) -> T {
        self.value.read().await.clone()
    }

    /// Replaces the current value wholesale.
    pub async fn replace(&self, value: T) {
        *self.value.write().await = value;
    }

    /// Loads a fresh value and swaps it in. On failure the previous value is kept.
    pub async fn refresh<F, Fut>(&self, loader: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let fresh = loader().await?;
        self.replace(fresh).await;
        Ok(())
    }

    /// Spawns a task that refetches on every notification of `subscription`.
    ///
    /// The task ends when the feed closes; abort the handle to stop it earlier.
    /// Refetch failures are logged and the stale value is kept until the next change.
    pub fn spawn_refresher<F, Fut>(&self, mut subscription: Subscription, loader: F) -> JoinHandle<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send,
    {
        let view = self.clone();
        tokio::spawn(async move {
            while let Some(notification) = subscription.recv().await {
                debug!(?notification, "refetching live view");
                if let Err(e) = view.refresh(&loader).await {
                    error!("Failed to refetch after change notification: {e}");
                }
            }
            debug!("change feed closed, refresher exiting");
        })
    }
}
