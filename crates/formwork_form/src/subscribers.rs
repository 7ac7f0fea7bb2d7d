//! Snapshot publication.
//!
//! [`SnapshotSubscribers`] fans every published [`FormSnapshot`] out to
//! callback listeners and to a [`tokio::sync::watch`] channel for async
//! consumers. Listeners run in registration order and are invoked without
//! any internal lock held, so a listener may call back into the form.
//!
//! Publishing is split in two: [`store`](SnapshotSubscribers::store) updates
//! the channel and assigns a revision, and must be called in commit order;
//! [`notify`](SnapshotSubscribers::notify) runs the listeners later and
//! drops a snapshot once a newer revision has been delivered.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::snapshot::FormSnapshot;

/// Callback receiving published snapshots.
pub type SnapshotListener = Arc<dyn Fn(&FormSnapshot) + Send + Sync>;

/// Handle identifying a subscription.
///
/// Generated with nanoid, so ids never collide across forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Arc<str>);

impl SubscriptionId {
    fn new() -> Self {
        Self(nanoid::nanoid!().into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub_{}", self.0)
    }
}

struct ListenerEntry {
    id: SubscriptionId,
    listener: SnapshotListener,
}

/// Listener list plus a watch channel holding the latest snapshot.
pub struct SnapshotSubscribers {
    listeners: RwLock<Vec<ListenerEntry>>,
    channel: watch::Sender<Arc<FormSnapshot>>,
    revision: AtomicU64,
    delivered: AtomicU64,
}

impl fmt::Debug for SnapshotSubscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotSubscribers")
            .field("listeners", &self.subscriber_count())
            .field("watchers", &self.channel.receiver_count())
            .field("revision", &self.revision.load(Ordering::Relaxed))
            .finish()
    }
}

impl SnapshotSubscribers {
    /// Creates a publisher whose current snapshot is `initial`.
    #[must_use]
    pub fn new(initial: Arc<FormSnapshot>) -> Self {
        let (channel, _receiver) = watch::channel(initial);
        Self {
            listeners: RwLock::new(Vec::new()),
            channel,
            revision: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
        }
    }

    /// Registers a listener and immediately delivers the current snapshot
    /// to it.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&FormSnapshot) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        let listener: SnapshotListener = Arc::new(listener);
        self.listeners.write().push(ListenerEntry {
            id: id.clone(),
            listener: Arc::clone(&listener),
        });

        let current = self.current();
        listener(current.as_ref());

        tracing::debug!(subscription = %id, "snapshot listener subscribed");
        id
    }

    /// Removes a listener, returning whether it was registered.
    pub fn unsubscribe(&self, id: &SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|entry| entry.id != *id);
        let removed = listeners.len() != before;
        if removed {
            tracing::debug!(subscription = %id, "snapshot listener unsubscribed");
        }
        removed
    }

    /// Number of callback listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns a receiver that always holds the latest snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Arc<FormSnapshot>> {
        self.channel.subscribe()
    }

    /// Returns the most recently published snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<FormSnapshot> {
        Arc::clone(&self.channel.borrow())
    }

    /// Makes `snapshot` the current one and returns its revision.
    pub fn store(&self, snapshot: &Arc<FormSnapshot>) -> u64 {
        self.channel.send_replace(Arc::clone(snapshot));
        self.revision.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Delivers the snapshot stored as `revision` to every listener.
    ///
    /// Nothing is delivered once a newer revision has reached the
    /// listeners, including part-way through the listener list.
    pub fn notify(&self, snapshot: &Arc<FormSnapshot>, revision: u64) {
        if self.delivered.fetch_max(revision, Ordering::AcqRel) > revision {
            tracing::trace!(revision, "stale snapshot not delivered");
            return;
        }

        let listeners: Vec<SnapshotListener> = self
            .listeners
            .read()
            .iter()
            .map(|entry| Arc::clone(&entry.listener))
            .collect();
        for listener in &listeners {
            if self.delivered.load(Ordering::Acquire) > revision {
                tracing::trace!(revision, "snapshot superseded during delivery");
                break;
            }
            listener(snapshot.as_ref());
        }
    }

    /// Stores and delivers a snapshot.
    pub fn publish(&self, snapshot: &Arc<FormSnapshot>) {
        let revision = self.store(snapshot);
        self.notify(snapshot, revision);
    }
}
