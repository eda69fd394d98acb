//! In-process publish/subscribe channel for "collection changed" notifications.
//!
//! Views that mutate the remote collection publish a [`ViewSyncEvent`]; views
//! that cache the collection subscribe and re-fetch. Delivery is synchronous,
//! in subscription order, exactly once per live subscriber per publish. There
//! is no queue and no replay: a subscriber only sees events published while
//! its [`Subscription`] is alive.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Name of the channel carrying pact collection changes.
pub const COLLECTION_CHANGED: &str = "pacts-changed";

/// What happened to the remote collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Created => write!(f, "created"),
            ChangeKind::Updated => write!(f, "updated"),
            ChangeKind::Deleted => write!(f, "deleted"),
        }
    }
}

/// A change notification. Carries no record data, only the kind and id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSyncEvent {
    pub kind: ChangeKind,
    pub affected_id: Option<String>,
}

impl ViewSyncEvent {
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Created,
            affected_id: Some(id.into()),
        }
    }

    pub fn updated(id: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Updated,
            affected_id: Some(id.into()),
        }
    }

    pub fn deleted(id: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            affected_id: Some(id.into()),
        }
    }
}

type Handler = Arc<dyn Fn(&ViewSyncEvent) + Send + Sync>;

struct Subscriber {
    id: u64,
    handler: Handler,
}

struct BusInner {
    name: String,
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl BusInner {
    fn remove(&self, id: u64) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        before != subscribers.len()
    }
}

/// Process-wide broadcast bus. Cloning yields another handle to the same bus.
#[derive(Clone)]
pub struct ViewSyncBus {
    inner: Arc<BusInner>,
}

impl Default for ViewSyncBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSyncBus {
    /// Create the pact collection channel.
    pub fn new() -> Self {
        Self::named(COLLECTION_CHANGED)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(BusInner {
                name: name.into(),
                next_id: AtomicU64::new(1),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Register a handler. It stays registered until the returned
    /// [`Subscription`] is unsubscribed or dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ViewSyncEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().push(Subscriber {
            id,
            handler: Arc::new(handler),
        });
        tracing::debug!("{}: subscriber {} added", self.inner.name, id);

        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver an event to every current subscriber, in subscription order.
    ///
    /// The subscriber list is snapshotted before dispatch, so handlers may
    /// subscribe or unsubscribe without deadlocking. Returns the number of
    /// handlers invoked.
    pub fn publish(&self, event: ViewSyncEvent) -> usize {
        let handlers: Vec<Handler> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|s| s.handler.clone())
            .collect();

        tracing::debug!(
            "{}: publishing {} {:?} to {} subscribers",
            self.inner.name,
            event.kind,
            event.affected_id,
            handlers.len()
        );

        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

impl fmt::Debug for ViewSyncBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSyncBus")
            .field("name", &self.inner.name)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle for a live subscription. Unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// Remove the handler from the bus. Does not stop a dispatch round that is
    /// already running.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }

    fn detach(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            if bus.remove(self.id) {
                tracing::debug!("{}: subscriber {} removed", bus.name, self.id);
            }
        }
        self.bus = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(bus: &ViewSyncBus, log: &Arc<Mutex<Vec<String>>>, tag: &str) -> Subscription {
        let log = log.clone();
        let tag = tag.to_string();
        bus.subscribe(move |event| {
            log.lock().push(format!(
                "{}:{}:{}",
                tag,
                event.kind,
                event.affected_id.as_deref().unwrap_or("-")
            ));
        })
    }

    #[test]
    fn delivers_in_subscription_order() {
        let bus = ViewSyncBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _a = recorder(&bus, &log, "a");
        let _b = recorder(&bus, &log, "b");

        assert_eq!(bus.publish(ViewSyncEvent::created("1")), 2);
        assert_eq!(*log.lock(), vec!["a:created:1", "b:created:1"]);
    }

    #[test]
    fn each_publish_delivered_once_without_dedup() {
        let bus = ViewSyncBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _a = recorder(&bus, &log, "a");

        bus.publish(ViewSyncEvent::deleted("7"));
        bus.publish(ViewSyncEvent::deleted("7"));
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn late_subscriber_gets_no_replay() {
        let bus = ViewSyncBus::new();
        bus.publish(ViewSyncEvent::updated("1"));

        let log = Arc::new(Mutex::new(Vec::new()));
        let _late = recorder(&bus, &log, "late");
        assert!(log.lock().is_empty());

        bus.publish(ViewSyncEvent::updated("2"));
        assert_eq!(*log.lock(), vec!["late:updated:2"]);
    }

    #[test]
    fn drop_unsubscribes() {
        let bus = ViewSyncBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sub = recorder(&bus, &log, "a");
        assert_eq!(bus.subscriber_count(), 1);

        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(ViewSyncEvent::created("1")), 0);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn explicit_unsubscribe_leaves_others() {
        let bus = ViewSyncBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = recorder(&bus, &log, "a");
        let _b = recorder(&bus, &log, "b");

        a.unsubscribe();
        bus.publish(ViewSyncEvent::created("1"));
        assert_eq!(*log.lock(), vec!["b:created:1"]);
    }

    #[test]
    fn unsubscribe_from_inside_handler_is_safe() {
        let bus = ViewSyncBus::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicU64::new(0));

        let sub = {
            let slot = slot.clone();
            let calls = calls.clone();
            bus.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                slot.lock().take();
            })
        };
        *slot.lock() = Some(sub);

        bus.publish(ViewSyncEvent::created("1"));
        bus.publish(ViewSyncEvent::created("2"));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn subscription_outliving_bus_is_harmless() {
        let bus = ViewSyncBus::named("scratch");
        let sub = bus.subscribe(|_| {});
        drop(bus);
        drop(sub);
    }

    #[test]
    fn clones_share_subscribers() {
        let bus = ViewSyncBus::new();
        let other = bus.clone();
        let _sub = other.subscribe(|_| {});
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(bus.name(), COLLECTION_CHANGED);
    }
}
