//! JSON-backed localization core.
//!
//! Loads per-language JSON resource files, resolves dotted keys against the
//! active language and notifies subscribers when the language changes.

pub mod config;
pub mod i18n;
