//! Change notification: listener registration and synchronous dispatch.
//!
//! Listeners run on the thread that emits the event. Subscribers needing a
//! particular thread (a UI thread, say) must redispatch themselves.

use crate::i18n::LanguageResource;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A set of listeners for events of type `E`.
pub struct Listeners<E> {
    next_id: AtomicU64,
    entries: RwLock<Vec<(SubscriptionId, Callback<E>)>>,
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every listener with `event`, in subscription order.
    ///
    /// The list is snapshotted first and no lock is held while listeners run.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self
            .entries
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in snapshot {
            callback(event);
        }
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Raised after the active language has been switched.
#[derive(Debug, Clone)]
pub struct LanguageChanged {
    /// The new active language
    pub language: String,

    /// The language that was active before, if any
    pub previous: Option<String>,

    /// The resource that is now active
    pub resource: Arc<LanguageResource>,

    pub changed_at: DateTime<Utc>,
}

impl LanguageChanged {
    /// Resolve a key against the newly active resource.
    pub fn text(&self, dotted_key: &str, fallback: Option<&str>) -> String {
        self.resource.resolve(dotted_key, fallback)
    }
}

/// Raised when an observable property changes value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyChanged {
    pub property: &'static str,
}

impl PropertyChanged {
    /// Property name of the localizer's active language id.
    pub const CURRENT_LANGUAGE: &'static str = "current_language";

    pub fn current_language() -> Self {
        Self {
            property: Self::CURRENT_LANGUAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // ==================== Subscription Tests ====================

    #[test]
    fn test_subscribe_assigns_distinct_ids() {
        let listeners: Listeners<u32> = Listeners::new();
        let a = listeners.subscribe(|_| {});
        let b = listeners.subscribe(|_| {});

        assert_ne!(a, b);
        assert_eq!(listeners.len(), 2);
    }

    #[test]
    fn test_unsubscribe_removes_listener() {
        let listeners: Listeners<u32> = Listeners::new();
        let id = listeners.subscribe(|_| {});

        assert!(listeners.unsubscribe(id));
        assert!(listeners.is_empty());
        assert!(!listeners.unsubscribe(id));
    }

    // ==================== Emit Tests ====================

    #[test]
    fn test_emit_calls_listeners_in_order() {
        let listeners: Listeners<u32> = Listeners::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        listeners.subscribe(move |value| first.lock().unwrap().push(("first", *value)));
        let second = Arc::clone(&seen);
        listeners.subscribe(move |value| second.lock().unwrap().push(("second", *value)));

        listeners.emit(&7);
        assert_eq!(*seen.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_emit_skips_unsubscribed() {
        let listeners: Listeners<u32> = Listeners::new();
        let count = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&count);
        let id = listeners.subscribe(move |_| *counter.lock().unwrap() += 1);
        listeners.emit(&1);
        listeners.unsubscribe(id);
        listeners.emit(&2);

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_listener_may_unsubscribe_itself() {
        let listeners: Arc<Listeners<u32>> = Arc::new(Listeners::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let inner = Arc::clone(&listeners);
        let inner_slot = Arc::clone(&slot);
        let id = listeners.subscribe(move |_| {
            if let Some(id) = *inner_slot.lock().unwrap() {
                inner.unsubscribe(id);
            }
        });
        *slot.lock().unwrap() = Some(id);

        listeners.emit(&1);
        assert!(listeners.is_empty());
    }

    // ==================== Event Tests ====================

    #[test]
    fn test_property_changed_current_language() {
        assert_eq!(PropertyChanged::current_language().property, "current_language");
    }

    #[test]
    fn test_language_changed_text_uses_new_resource() {
        let resource = LanguageResource::from_json(
            "English",
            serde_json::json!({"App": {"Name": "Demo"}}),
        )
        .unwrap();
        let event = LanguageChanged {
            language: "English".to_string(),
            previous: None,
            resource: Arc::new(resource),
            changed_at: Utc::now(),
        };

        assert_eq!(event.text("App.Name", None), "Demo");
        assert_eq!(event.text("App.Nope", None), "[App.Nope]");
    }
}
