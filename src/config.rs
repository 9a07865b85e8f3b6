use anyhow::{Context, Result};
use std::path::PathBuf;

/// Language directory name used when `LANGUAGE_DIR` is not set.
pub const DEFAULT_LANGUAGE_DIR: &str = "Language";

/// Language loaded at startup when `DEFAULT_LANGUAGE` is not set.
pub const DEFAULT_LANGUAGE: &str = "Chinese";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding `<language>.json` files
    pub language_dir: PathBuf,

    /// Language loaded when the localizer is created
    pub default_language: String,
}

impl Config {
    pub fn new(language_dir: impl Into<PathBuf>, default_language: impl Into<String>) -> Self {
        Self {
            language_dir: language_dir.into(),
            default_language: default_language.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        // Load .env file (ignored when absent)
        let _ = dotenvy::dotenv();

        let language_dir = match non_empty_var("LANGUAGE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_language_dir().context("Failed to resolve language directory")?,
        };

        Ok(Self {
            language_dir,
            default_language: non_empty_var("DEFAULT_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE_DIR, DEFAULT_LANGUAGE)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `Language` next to the running executable, or under the working directory.
fn default_language_dir() -> Result<PathBuf> {
    let base = match std::env::current_exe() {
        Ok(exe) => exe.parent().map(PathBuf::from),
        Err(_) => None,
    };

    match base {
        Some(base) => Ok(base.join(DEFAULT_LANGUAGE_DIR)),
        None => Ok(std::env::current_dir()
            .context("Current directory is not accessible")?
            .join(DEFAULT_LANGUAGE_DIR)),
    }
}
