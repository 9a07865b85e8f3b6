//! Translation consistency checks between two language resources.
//!
//! Key presence is covered by [`LanguageDiffReport`](crate::i18n::LanguageDiffReport).
//! This module checks that texts sharing a key keep the same `{placeholder}`
//! names, so formatting code finds every argument in every language.

use crate::i18n::LanguageResource;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Placeholder findings for one pair of languages.
///
/// `errors` break formatting: a name one side uses and the other lacks, so an
/// argument is dropped or a `{name}` is left unfilled. `warnings` are the same
/// names used a different number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Compares placeholders between two languages.
pub struct PlaceholderValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl PlaceholderValidator {
    /// Compare the placeholders of every key defined in both resources.
    ///
    /// `a` is the reference language. Order inside a text never matters.
    pub fn compare(a: &LanguageResource, b: &LanguageResource) -> ValidationReport {
        let mut report = ValidationReport::default();

        let keys_a: BTreeSet<String> = a.flatten_keys().into_iter().collect();
        let keys_b: BTreeSet<String> = b.flatten_keys().into_iter().collect();

        for key in keys_a.intersection(&keys_b) {
            let (Some(text_a), Some(text_b)) = (a.try_resolve(key), b.try_resolve(key)) else {
                continue;
            };

            let counts_a = Self::count_placeholders(&text_a);
            let counts_b = Self::count_placeholders(&text_b);
            if counts_a == counts_b {
                continue;
            }

            let mut broken = false;
            for name in counts_a.keys().filter(|name| !counts_b.contains_key(*name)) {
                broken = true;
                report.errors.push(format!(
                    "'{}': {} drops {{{}}} used by {}",
                    key,
                    b.language(),
                    name,
                    a.language()
                ));
            }
            for name in counts_b.keys().filter(|name| !counts_a.contains_key(*name)) {
                broken = true;
                report.errors.push(format!(
                    "'{}': {} uses {{{}}} unknown to {}",
                    key,
                    b.language(),
                    name,
                    a.language()
                ));
            }

            if !broken {
                report.warnings.push(format!(
                    "'{}': placeholder counts differ, {} has {:?}, {} has {:?}",
                    key,
                    a.language(),
                    counts_a,
                    b.language(),
                    counts_b
                ));
            }
        }

        report
    }

    /// Extract all `{name}` placeholders from text, sorted
    fn extract_placeholders(text: &str) -> Vec<String> {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("valid placeholder regex"));

        let mut placeholders: Vec<String> = regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect();
        placeholders.sort();
        placeholders
    }

    fn count_placeholders(text: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for name in Self::extract_placeholders(text) {
            *counts.entry(name).or_insert(0) += 1;
        }
        counts
    }
}
