//! Internationalization (i18n) module for multi-language support.
//!
//! Language files are JSON objects stored one per language as
//! `<language>.json` in a language directory. Nested objects form namespaces
//! addressed with dotted keys such as `"App.Name"`.
//!
//! # Architecture
//!
//! - `resource`: Parsed key tree of one language and dotted-key resolution
//! - `store`: Loading language files from disk (sync and async)
//! - `registry`: Listing, validating and diffing the languages of a directory
//! - `validator`: Placeholder consistency between two languages
//! - `notifier`: Listener registration and change events
//! - `localizer`: The active language, switching and lookups
//! - `localized`: Strings that follow the active language
//! - `metrics`: Lookup and load counters
//!
//! # Example
//!
//! ```rust,ignore
//! use lang_resources::config::Config;
//! use lang_resources::i18n::Localizer;
//!
//! let localizer = Localizer::new(&Config::from_env()?);
//! localizer.subscribe(|event| tracing::info!("now showing {}", event.language));
//!
//! if !localizer.set_language("English") {
//!     // previous language is still active
//! }
//! let title = localizer.text("App.Name");
//! ```

mod localized;
mod localizer;
mod metrics;
mod notifier;
mod registry;
mod resource;
mod store;
mod validator;

pub use localized::{Localize, LocalizedString};
pub use localizer::{LoadState, Localizer};
pub use metrics::{LocalizationMetrics, MetricsReport};
pub use notifier::{LanguageChanged, Listeners, PropertyChanged, SubscriptionId};
pub use registry::{
    flatten_keys, LanguageComparison, LanguageDiffReport, LanguageRegistry, ValidationResult,
};
pub use resource::{LanguageResource, Namespace, ResourceValue, Scalar};
pub use store::{LoadError, LoadErrorKind, ResourceStore, LANGUAGE_FILE_EXTENSION};
pub use validator::{PlaceholderValidator, ValidationReport};
