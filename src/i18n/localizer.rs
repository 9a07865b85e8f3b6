//! Localizer: owns the active language and serves localized text.
//!
//! The active language id and its resource live together in one immutable
//! snapshot that is replaced wholesale on every successful switch, so readers
//! always see a consistent pair. A failed switch leaves the snapshot alone.

use crate::config::Config;
use crate::i18n::notifier::{LanguageChanged, Listeners, PropertyChanged, SubscriptionId};
use crate::i18n::resource::miss_text;
use crate::i18n::{
    LanguageRegistry, LanguageResource, LoadError, LocalizationMetrics, ResourceStore,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Whether a language is currently loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loaded(String),
}

/// The active language and its resource.
#[derive(Debug)]
struct ActiveLanguage {
    language: String,
    resource: Arc<LanguageResource>,
    /// Ticket of the switch that installed this snapshot
    ticket: u64,
}

/// The authoritative current-language state.
///
/// Construct one per application and share it as `Arc<Localizer>`.
pub struct Localizer {
    default_language: String,
    directory: RwLock<PathBuf>,
    active: RwLock<Option<Arc<ActiveLanguage>>>,
    tickets: AtomicU64,
    language_changed: Listeners<LanguageChanged>,
    property_changed: Listeners<PropertyChanged>,
    metrics: LocalizationMetrics,
}

impl Localizer {
    /// Create a localizer and synchronously load the default language.
    ///
    /// If that load fails the localizer starts out [`LoadState::Unloaded`]
    /// and every lookup returns its fallback until a switch succeeds.
    pub fn new(config: &Config) -> Self {
        let localizer = Self {
            default_language: config.default_language.clone(),
            directory: RwLock::new(config.language_dir.clone()),
            active: RwLock::new(None),
            tickets: AtomicU64::new(0),
            language_changed: Listeners::new(),
            property_changed: Listeners::new(),
            metrics: LocalizationMetrics::new(),
        };

        let ticket = localizer.next_ticket();
        match localizer.store().load(&localizer.default_language) {
            Ok(resource) => {
                localizer.metrics.record_load_success();
                *localizer.active.write() = Some(Arc::new(ActiveLanguage {
                    language: localizer.default_language.clone(),
                    resource: Arc::new(resource),
                    ticket,
                }));
            }
            Err(e) => {
                localizer.metrics.record_load_failure();
                warn!(
                    "Default language '{}' unavailable, starting unloaded: {}",
                    localizer.default_language, e
                );
            }
        }

        localizer
    }

    // ==================== State ====================

    /// The active language id.
    ///
    /// Returns the configured default while nothing is loaded.
    pub fn current_language(&self) -> String {
        match self.snapshot() {
            Some(active) => active.language.clone(),
            None => self.default_language.clone(),
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn state(&self) -> LoadState {
        match self.snapshot() {
            Some(active) => LoadState::Loaded(active.language.clone()),
            None => LoadState::Unloaded,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.active.read().is_some()
    }

    /// The resource of the active language, if one is loaded.
    pub fn active_resource(&self) -> Option<Arc<LanguageResource>> {
        self.snapshot().map(|active| Arc::clone(&active.resource))
    }

    pub fn metrics(&self) -> &LocalizationMetrics {
        &self.metrics
    }

    // ==================== Directory ====================

    pub fn language_directory(&self) -> PathBuf {
        self.directory.read().clone()
    }

    /// Point subsequent loads and listings at `path`.
    ///
    /// The already loaded resource is kept.
    pub fn set_language_directory(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        debug!("Language directory set to {}", path.display());
        *self.directory.write() = path;
    }

    fn store(&self) -> ResourceStore {
        ResourceStore::new(self.language_directory())
    }

    /// Registry over the current language directory.
    pub fn registry(&self) -> LanguageRegistry {
        LanguageRegistry::new(self.language_directory())
    }

    pub fn available_languages(&self) -> Vec<String> {
        self.registry().list_available()
    }

    pub fn is_language_available(&self, language: &str) -> bool {
        self.store().exists(language)
    }

    // ==================== Lookup ====================

    /// Localized text for `dotted_key`, or `fallback` / `"[dotted_key]"` on a miss.
    pub fn get_text(&self, dotted_key: &str, fallback: Option<&str>) -> String {
        let found = self
            .active_resource()
            .and_then(|resource| resource.try_resolve(dotted_key));

        match found {
            Some(text) => {
                self.metrics.record_lookup_hit();
                text
            }
            None => {
                self.metrics.record_lookup_miss();
                miss_text(dotted_key, fallback)
            }
        }
    }

    pub fn text(&self, dotted_key: &str) -> String {
        self.get_text(dotted_key, None)
    }

    pub fn text_or(&self, dotted_key: &str, fallback: &str) -> String {
        self.get_text(dotted_key, Some(fallback))
    }

    // ==================== Switching ====================

    /// Switch to `language`. Returns `false`, leaving state unchanged, if the
    /// file cannot be loaded. The reason is logged.
    pub fn set_language(&self, language: &str) -> bool {
        let ticket = self.next_ticket();
        let loaded = self.store().load(language);
        self.finish_switch(ticket, language, loaded)
    }

    /// Switch to `language`, reading and parsing off the calling thread.
    pub async fn set_language_async(&self, language: &str) -> bool {
        let ticket = self.next_ticket();
        let loaded = self.store().load_async(language).await;
        self.finish_switch(ticket, language, loaded)
    }

    /// Start an asynchronous switch without waiting for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_set_language(
        self: &Arc<Self>,
        language: impl Into<String>,
    ) -> tokio::task::JoinHandle<bool> {
        let localizer = Arc::clone(self);
        let language = language.into();
        tokio::spawn(async move { localizer.set_language_async(&language).await })
    }

    /// Use `directory` and switch to `language`.
    pub fn initialize(&self, directory: impl Into<PathBuf>, language: &str) -> bool {
        self.set_language_directory(directory);
        self.set_language(language)
    }

    pub async fn initialize_async(&self, directory: impl Into<PathBuf>, language: &str) -> bool {
        self.set_language_directory(directory);
        self.set_language_async(language).await
    }

    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn snapshot(&self) -> Option<Arc<ActiveLanguage>> {
        self.active.read().clone()
    }

    /// Install a finished load, unless a later switch already landed.
    fn finish_switch(
        &self,
        ticket: u64,
        language: &str,
        loaded: Result<LanguageResource, LoadError>,
    ) -> bool {
        let resource = match loaded {
            Ok(resource) => {
                self.metrics.record_load_success();
                Arc::new(resource)
            }
            Err(e) => {
                self.metrics.record_load_failure();
                warn!("Failed to switch language to '{}': {}", language, e);
                return false;
            }
        };

        let previous = {
            let mut active = self.active.write();
            if let Some(current) = active.as_ref() {
                if current.ticket > ticket {
                    debug!(
                        "Discarding load of '{}': superseded by '{}'",
                        language, current.language
                    );
                    return false;
                }
            }

            let previous = active.as_ref().map(|current| current.language.clone());
            *active = Some(Arc::new(ActiveLanguage {
                language: language.to_string(),
                resource: Arc::clone(&resource),
                ticket,
            }));
            previous
        };

        self.metrics.record_switch();
        info!("Active language switched to '{}'", language);

        if previous.as_deref() != Some(language) {
            self.property_changed.emit(&PropertyChanged::current_language());
        }
        self.language_changed.emit(&LanguageChanged {
            language: language.to_string(),
            previous,
            resource,
            changed_at: Utc::now(),
        });

        true
    }

    // ==================== Notifications ====================

    /// Listen for successful language switches.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&LanguageChanged) + Send + Sync + 'static,
    {
        self.language_changed.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.language_changed.unsubscribe(id)
    }

    /// Number of language-change listeners.
    pub fn subscriber_count(&self) -> usize {
        self.language_changed.len()
    }

    /// Listen for changes of observable properties (`current_language`).
    pub fn observe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&PropertyChanged) + Send + Sync + 'static,
    {
        self.property_changed.subscribe(listener)
    }

    pub fn unobserve(&self, id: SubscriptionId) -> bool {
        self.property_changed.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let files = [
            ("Chinese", r#"{"App":{"Name":"演示","Greeting":"你好"}}"#),
            ("English", r#"{"App":{"Name":"Demo","Greeting":"Hello"}}"#),
            ("Broken", r#"{"App": "#),
            ("Empty", "{}"),
        ];
        for (language, content) in files {
            std::fs::write(dir.path().join(format!("{}.json", language)), content)
                .expect("Failed to write language file");
        }
        dir
    }

    fn localizer_for(dir: &TempDir) -> Localizer {
        Localizer::new(&Config::new(dir.path(), "Chinese"))
    }

    // ==================== Initialization Tests ====================

    #[test]
    fn test_new_loads_default_language() {
        let dir = fixture();
        let localizer = localizer_for(&dir);

        assert_eq!(localizer.state(), LoadState::Loaded("Chinese".to_string()));
        assert_eq!(localizer.current_language(), "Chinese");
        assert_eq!(localizer.text("App.Name"), "演示");
    }

    #[test]
    fn test_new_without_files_starts_unloaded() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let localizer = localizer_for(&dir);

        assert_eq!(localizer.state(), LoadState::Unloaded);
        assert!(!localizer.is_loaded());
        assert_eq!(localizer.current_language(), "Chinese");
        assert_eq!(localizer.text("App.Name"), "[App.Name]");
        assert_eq!(localizer.text_or("App.Name", "Demo"), "Demo");
        assert_eq!(localizer.metrics().load_failures(), 1);
    }

    #[test]
    fn test_unloaded_recovers_after_successful_switch() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let localizer = localizer_for(&dir);
        std::fs::write(dir.path().join("English.json"), r#"{"App":{"Name":"Demo"}}"#)
            .expect("write");

        assert!(localizer.set_language("English"));
        assert_eq!(localizer.state(), LoadState::Loaded("English".to_string()));
        assert_eq!(localizer.text("App.Name"), "Demo");
    }

    // ==================== Switch Tests ====================

    #[test]
    fn test_set_language_success() {
        let dir = fixture();
        let localizer = localizer_for(&dir);

        assert!(localizer.set_language("English"));
        assert_eq!(localizer.current_language(), "English");
        assert_eq!(localizer.text("App.Greeting"), "Hello");
        assert_eq!(localizer.metrics().switches(), 1);
    }

    #[test]
    fn test_set_language_failure_keeps_previous_state() {
        let dir = fixture();
        let localizer = localizer_for(&dir);
        let before = localizer.active_resource().expect("loaded");

        for language in ["NoSuchFile", "Broken", "Empty"] {
            assert!(!localizer.set_language(language));
            assert_eq!(localizer.current_language(), "Chinese");
            assert_eq!(localizer.text("App.Name"), "演示");
            assert!(Arc::ptr_eq(&before, &localizer.active_resource().unwrap()));
        }
        assert_eq!(localizer.metrics().load_failures(), 3);
    }

    #[test]
    fn test_failed_switch_does_not_notify() {
        let dir = fixture();
        let localizer = localizer_for(&dir);
        let count = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&count);
        localizer.subscribe(move |_| *counter.lock().unwrap() += 1);
        let counter = Arc::clone(&count);
        localizer.observe(move |_| *counter.lock().unwrap() += 1);

        assert!(!localizer.set_language("NoSuchFile"));
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn test_superseded_switch_is_discarded() {
        let dir = fixture();
        let localizer = localizer_for(&dir);
        let store = localizer.store();

        let older = localizer.next_ticket();
        let newer = localizer.next_ticket();

        assert!(localizer.finish_switch(newer, "English", store.load("English")));
        assert!(!localizer.finish_switch(older, "Chinese", store.load("Chinese")));
        assert_eq!(localizer.current_language(), "English");
    }

    // ==================== Notification Tests ====================

    #[test]
    fn test_switch_notifies_property_then_language() {
        let dir = fixture();
        let localizer = localizer_for(&dir);
        let log = Arc::new(Mutex::new(Vec::new()));

        let events = Arc::clone(&log);
        localizer.subscribe(move |event| {
            events.lock().unwrap().push(format!(
                "language:{}:{}:{}",
                event.language,
                event.previous.clone().unwrap_or_default(),
                event.text("App.Name", None)
            ));
        });
        let events = Arc::clone(&log);
        localizer.observe(move |event| {
            events.lock().unwrap().push(format!("property:{}", event.property));
        });

        assert!(localizer.set_language("English"));
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "property:current_language".to_string(),
                "language:English:Chinese:Demo".to_string(),
            ]
        );
    }

    #[test]
    fn test_reloading_same_language_skips_property_change() {
        let dir = fixture();
        let localizer = localizer_for(&dir);
        let properties = Arc::new(Mutex::new(0));
        let languages = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&properties);
        localizer.observe(move |_| *counter.lock().unwrap() += 1);
        let counter = Arc::clone(&languages);
        localizer.subscribe(move |_| *counter.lock().unwrap() += 1);

        assert!(localizer.set_language("Chinese"));
        assert_eq!(*properties.lock().unwrap(), 0);
        assert_eq!(*languages.lock().unwrap(), 1);
    }

    #[test]
    fn test_listener_can_read_new_state() {
        let dir = fixture();
        let localizer = Arc::new(localizer_for(&dir));
        let seen = Arc::new(Mutex::new(String::new()));

        let weak = Arc::downgrade(&localizer);
        let slot = Arc::clone(&seen);
        localizer.subscribe(move |_| {
            if let Some(localizer) = weak.upgrade() {
                *slot.lock().unwrap() =
                    format!("{}={}", localizer.current_language(), localizer.text("App.Name"));
            }
        });

        assert!(localizer.set_language("English"));
        assert_eq!(*seen.lock().unwrap(), "English=Demo");
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let dir = fixture();
        let localizer = localizer_for(&dir);
        let count = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&count);
        let id = localizer.subscribe(move |_| *counter.lock().unwrap() += 1);
        assert!(localizer.unsubscribe(id));

        assert!(localizer.set_language("English"));
        assert_eq!(*count.lock().unwrap(), 0);
        assert!(!localizer.unobserve(id));
    }

    // ==================== Directory Tests ====================

    #[test]
    fn test_set_language_directory_keeps_loaded_resource() {
        let dir = fixture();
        let other = TempDir::new().expect("Failed to create temp dir");
        let localizer = localizer_for(&dir);

        localizer.set_language_directory(other.path());
        assert_eq!(localizer.language_directory(), other.path());
        assert_eq!(localizer.text("App.Name"), "演示");
        assert!(localizer.available_languages().is_empty());
        assert!(!localizer.set_language("English"));
    }

    #[test]
    fn test_initialize_switches_directory_and_language() {
        let dir = fixture();
        let empty = TempDir::new().expect("Failed to create temp dir");
        let localizer = Localizer::new(&Config::new(empty.path(), "Chinese"));

        assert!(localizer.initialize(dir.path(), "English"));
        assert_eq!(localizer.current_language(), "English");
        assert!(localizer.is_language_available("Chinese"));
        assert!(!localizer.is_language_available("French"));
    }

    #[test]
    fn test_available_languages() {
        let dir = fixture();
        let mut languages = localizer_for(&dir).available_languages();
        languages.sort();
        assert_eq!(languages, vec!["Broken", "Chinese", "Empty", "English"]);
    }

    // ==================== Async Tests ====================

    #[tokio::test]
    async fn test_set_language_async_success() {
        let dir = fixture();
        let localizer = localizer_for(&dir);

        assert!(localizer.set_language_async("English").await);
        assert_eq!(localizer.current_language(), "English");
        assert_eq!(localizer.text("App.Greeting"), "Hello");
    }

    #[tokio::test]
    async fn test_set_language_async_failure_keeps_state() {
        let dir = fixture();
        let localizer = localizer_for(&dir);

        assert!(!localizer.set_language_async("Broken").await);
        assert_eq!(localizer.current_language(), "Chinese");
    }

    #[tokio::test]
    async fn test_spawn_set_language() {
        let dir = fixture();
        let localizer = Arc::new(localizer_for(&dir));

        let handle = localizer.spawn_set_language("English");
        assert!(handle.await.expect("join"));
        assert_eq!(localizer.current_language(), "English");
    }

    #[tokio::test]
    async fn test_initialize_async() {
        let dir = fixture();
        let empty = TempDir::new().expect("Failed to create temp dir");
        let localizer = Localizer::new(&Config::new(empty.path(), "Chinese"));

        assert!(localizer.initialize_async(dir.path(), "Chinese").await);
        assert_eq!(localizer.state(), LoadState::Loaded("Chinese".to_string()));
    }

    // ==================== Metrics Tests ====================

    #[test]
    fn test_lookups_are_counted() {
        let dir = fixture();
        let localizer = localizer_for(&dir);

        localizer.text("App.Name");
        localizer.text("App.Nope");
        localizer.text_or("Nope", "x");

        assert_eq!(localizer.metrics().lookup_hits(), 1);
        assert_eq!(localizer.metrics().lookup_misses(), 2);
    }
}
