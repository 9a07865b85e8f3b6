//! Live localized strings that follow the active language.

use crate::i18n::notifier::SubscriptionId;
use crate::i18n::Localizer;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

/// A localized text for one key that refreshes itself on every language switch.
///
/// Read it with [`value`](Self::value). Dropping the handle stops updates.
pub struct LocalizedString {
    key: String,
    fallback: Option<String>,
    value: Arc<RwLock<String>>,
    localizer: Arc<Localizer>,
    subscription: SubscriptionId,
}

impl LocalizedString {
    pub fn new(localizer: &Arc<Localizer>, key: impl Into<String>) -> Self {
        Self::build(localizer, key.into(), None)
    }

    pub fn with_fallback(
        localizer: &Arc<Localizer>,
        key: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self::build(localizer, key.into(), Some(fallback.into()))
    }

    fn build(localizer: &Arc<Localizer>, key: String, fallback: Option<String>) -> Self {
        let value = Arc::new(RwLock::new(String::new()));

        // Events can arrive out of order, so each refresh re-reads the live
        // snapshot while holding the slot instead of trusting the event.
        let slot = Arc::clone(&value);
        let weak: Weak<Localizer> = Arc::downgrade(localizer);
        let listen_key = key.clone();
        let listen_fallback = fallback.clone();
        let subscription = localizer.subscribe(move |_event| {
            if let Some(localizer) = weak.upgrade() {
                let mut guard = slot.write();
                *guard = localizer.get_text(&listen_key, listen_fallback.as_deref());
            }
        });

        // Subscribed first so a switch racing this read is not lost.
        {
            let mut guard = value.write();
            *guard = localizer.get_text(&key, fallback.as_deref());
        }

        Self {
            key,
            fallback,
            value,
            localizer: Arc::clone(localizer),
            subscription,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    /// Current text for the key in the active language.
    pub fn value(&self) -> String {
        self.value.read().clone()
    }
}

impl fmt::Display for LocalizedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value.read())
    }
}

impl fmt::Debug for LocalizedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalizedString")
            .field("key", &self.key)
            .field("value", &*self.value.read())
            .finish()
    }
}

impl Drop for LocalizedString {
    fn drop(&mut self) {
        self.localizer.unsubscribe(self.subscription);
    }
}

/// Shorthand for looking up a key: `"App.Name".localize(&localizer)`.
pub trait Localize {
    fn localize(&self, localizer: &Localizer) -> String;

    fn localize_or(&self, localizer: &Localizer, fallback: &str) -> String;
}

impl Localize for str {
    fn localize(&self, localizer: &Localizer) -> String {
        localizer.text(self)
    }

    fn localize_or(&self, localizer: &Localizer, fallback: &str) -> String {
        localizer.text_or(self, fallback)
    }
}
