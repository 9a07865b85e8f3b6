//! Resource store: reads `<language>.json` files from a language directory.

use crate::i18n::LanguageResource;
use serde::Serialize;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// File extension used by language files.
pub const LANGUAGE_FILE_EXTENSION: &str = "json";

/// Why a language file could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Language file not found: {}", path.display())]
    NotFound { language: String, path: PathBuf },

    #[error("Failed to read language file {}: {source}", path.display())]
    Unreadable {
        language: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid language file {}: {reason}", path.display())]
    Parse {
        language: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Language file {} has no keys", path.display())]
    Empty { language: String, path: PathBuf },
}

/// Serializable classification of a [`LoadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadErrorKind {
    NotFound,
    Unreadable,
    ParseError,
    Empty,
}

impl LoadError {
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::NotFound { .. } => LoadErrorKind::NotFound,
            LoadError::Unreadable { .. } => LoadErrorKind::Unreadable,
            LoadError::Parse { .. } => LoadErrorKind::ParseError,
            LoadError::Empty { .. } => LoadErrorKind::Empty,
        }
    }

    /// The language id the failed load was for.
    pub fn language(&self) -> &str {
        match self {
            LoadError::NotFound { language, .. }
            | LoadError::Unreadable { language, .. }
            | LoadError::Parse { language, .. }
            | LoadError::Empty { language, .. } => language,
        }
    }
}

/// Loads language resources from one directory.
///
/// The store itself holds no resource; every load builds a fresh tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStore {
    directory: PathBuf,
}

impl ResourceStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the file holding `language`.
    pub fn path_for(&self, language: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{}", language, LANGUAGE_FILE_EXTENSION))
    }

    /// Whether a file for `language` exists.
    pub fn exists(&self, language: &str) -> bool {
        self.path_for(language).is_file()
    }

    /// Read and parse the file for `language`.
    pub fn load(&self, language: &str) -> Result<LanguageResource, LoadError> {
        let path = self.path_for(language);
        debug!("Loading language file {}", path.display());

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => return Err(read_error(language, path, e)),
        };

        let resource = parse_resource(language, &path, &content)?;
        info!(
            "Loaded language '{}' from {} ({} top-level keys)",
            language,
            path.display(),
            resource.len()
        );
        Ok(resource)
    }

    /// Like [`load`](Self::load), but reads and parses on the blocking pool.
    pub async fn load_async(&self, language: &str) -> Result<LanguageResource, LoadError> {
        let store = self.clone();
        let owned = language.to_string();

        match tokio::task::spawn_blocking(move || store.load(&owned)).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Language load task for '{}' failed: {}", language, e);
                Err(LoadError::Unreadable {
                    language: language.to_string(),
                    path: self.path_for(language),
                    source: io::Error::new(io::ErrorKind::Other, e.to_string()),
                })
            }
        }
    }
}

fn read_error(language: &str, path: PathBuf, error: io::Error) -> LoadError {
    if error.kind() == io::ErrorKind::NotFound {
        LoadError::NotFound {
            language: language.to_string(),
            path,
        }
    } else {
        LoadError::Unreadable {
            language: language.to_string(),
            path,
            source: error,
        }
    }
}

/// Parse file content into a resource.
///
/// The top level must be a non-empty JSON object. A bare `null` counts as an
/// empty file rather than a malformed one.
pub(crate) fn parse_resource(
    language: &str,
    path: &Path,
    content: &str,
) -> Result<LanguageResource, LoadError> {
    let value: Value = serde_json::from_str(content).map_err(|e| LoadError::Parse {
        language: language.to_string(),
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let empty = || LoadError::Empty {
        language: language.to_string(),
        path: path.to_path_buf(),
    };

    if value.is_null() {
        return Err(empty());
    }

    let resource = LanguageResource::from_json(language, value).ok_or_else(|| LoadError::Parse {
        language: language.to_string(),
        path: path.to_path_buf(),
        reason: "top-level value must be a JSON object".to_string(),
    })?;

    if resource.is_empty() {
        return Err(empty());
    }

    Ok(resource)
}
