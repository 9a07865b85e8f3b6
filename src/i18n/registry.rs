//! Language registry: discovery, validation and comparison of language files.
//!
//! The registry works on a language directory. It never touches the active
//! language; every operation loads fresh copies through the [`ResourceStore`].

use crate::i18n::{
    LanguageResource, LoadError, LoadErrorKind, PlaceholderValidator, ResourceStore,
    ValidationReport, LANGUAGE_FILE_EXTENSION,
};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of validating a single language file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Language id that was validated
    pub language: String,

    /// Whether the file loaded and contains at least one key
    pub is_valid: bool,

    /// Why the file is invalid (`None` when valid)
    pub error_kind: Option<LoadErrorKind>,

    /// Human-readable description of the failure (`None` when valid)
    pub error_message: Option<String>,

    /// Number of dotted leaf keys (0 when invalid)
    pub key_count: usize,
}

/// Key-set comparison between two languages.
///
/// When either file fails to load, `error` is set and the key lists are empty.
/// Callers should check `error` first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageDiffReport {
    pub language_a: String,
    pub language_b: String,

    /// Keys present in B but not in A
    pub missing_in_a: Vec<String>,

    /// Keys present in A but not in B
    pub missing_in_b: Vec<String>,

    /// Keys present in both
    pub common: Vec<String>,

    pub error: Option<String>,
}

impl LanguageDiffReport {
    fn failed(language_a: &str, language_b: &str, error: String) -> Self {
        Self {
            language_a: language_a.to_string(),
            language_b: language_b.to_string(),
            missing_in_a: Vec::new(),
            missing_in_b: Vec::new(),
            common: Vec::new(),
            error: Some(error),
        }
    }

    /// Compare two already-loaded resources.
    pub fn between(a: &LanguageResource, b: &LanguageResource) -> Self {
        let keys_a: BTreeSet<String> = flatten_keys(a).into_iter().collect();
        let keys_b: BTreeSet<String> = flatten_keys(b).into_iter().collect();

        Self {
            language_a: a.language().to_string(),
            language_b: b.language().to_string(),
            missing_in_a: keys_b.difference(&keys_a).cloned().collect(),
            missing_in_b: keys_a.difference(&keys_b).cloned().collect(),
            common: keys_a.intersection(&keys_b).cloned().collect(),
            error: None,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// True when both languages loaded and define exactly the same keys.
    pub fn is_complete(&self) -> bool {
        !self.has_error() && self.missing_in_a.is_empty() && self.missing_in_b.is_empty()
    }
}

/// Key and placeholder comparison of two languages loaded once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageComparison {
    #[serde(flatten)]
    pub keys: LanguageDiffReport,

    /// `None` when either file failed to load
    pub placeholders: Option<ValidationReport>,
}

/// Every dotted leaf key of `resource`, depth-first.
pub fn flatten_keys(resource: &LanguageResource) -> Vec<String> {
    resource.flatten_keys()
}

/// Registry over the language files of one directory.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    store: ResourceStore,
}

impl LanguageRegistry {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            store: ResourceStore::new(directory),
        }
    }

    pub fn directory(&self) -> &Path {
        self.store.directory()
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    /// Language ids with a file in the directory.
    ///
    /// Ids are returned in directory-listing order, which is not sorted. A
    /// missing or unreadable directory yields an empty list.
    pub fn list_available(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(self.directory()) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(
                    "Language directory {} not readable: {}",
                    self.directory().display(),
                    e
                );
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    None
                }
            })
            .filter(|path| path.is_file() && has_language_extension(path))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect()
    }

    /// Whether a file exists for `language`.
    pub fn is_available(&self, language: &str) -> bool {
        self.store.exists(language)
    }

    /// Load `language` and report whether it is usable.
    pub fn validate(&self, language: &str) -> ValidationResult {
        match self.store.load(language) {
            Ok(resource) => ValidationResult {
                language: language.to_string(),
                is_valid: true,
                error_kind: None,
                error_message: None,
                key_count: resource.flatten_keys().len(),
            },
            Err(e) => ValidationResult {
                language: language.to_string(),
                is_valid: false,
                error_kind: Some(e.kind()),
                error_message: Some(e.to_string()),
                key_count: 0,
            },
        }
    }

    /// Validate every listed language concurrently.
    pub async fn validate_all(&self) -> Vec<ValidationResult> {
        let checks = self.list_available().into_iter().map(|language| {
            let registry = self.clone();
            async move {
                match tokio::task::spawn_blocking(move || registry.validate(&language)).await {
                    Ok(result) => Some(result),
                    Err(e) => {
                        warn!("Validation task failed: {}", e);
                        None
                    }
                }
            }
        });

        join_all(checks).await.into_iter().flatten().collect()
    }

    /// Compare the flattened key sets of two languages.
    pub fn diff(&self, language_a: &str, language_b: &str) -> LanguageDiffReport {
        match self.load_pair(language_a, language_b) {
            Ok((a, b)) => LanguageDiffReport::between(&a, &b),
            Err(e) => LanguageDiffReport::failed(language_a, language_b, e.to_string()),
        }
    }

    /// Like [`diff`](Self::diff), plus a placeholder check over the same
    /// loaded resources.
    pub fn compare(&self, language_a: &str, language_b: &str) -> LanguageComparison {
        match self.load_pair(language_a, language_b) {
            Ok((a, b)) => LanguageComparison {
                keys: LanguageDiffReport::between(&a, &b),
                placeholders: Some(PlaceholderValidator::compare(&a, &b)),
            },
            Err(e) => LanguageComparison {
                keys: LanguageDiffReport::failed(language_a, language_b, e.to_string()),
                placeholders: None,
            },
        }
    }

    fn load_pair(
        &self,
        language_a: &str,
        language_b: &str,
    ) -> Result<(LanguageResource, LanguageResource), LoadError> {
        let a = self.store.load(language_a);
        let loaded = a.and_then(|a| self.store.load(language_b).map(|b| (a, b)));
        if let Err(e) = &loaded {
            warn!("Cannot compare '{}' and '{}': {}", language_a, language_b, e);
        }
        loaded
    }
}

fn has_language_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == LANGUAGE_FILE_EXTENSION)
        .unwrap_or(false)
}
