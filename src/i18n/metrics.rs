//! Localization metrics: lookup hit rates and load outcomes.
//!
//! Each [`Localizer`](crate::i18n::Localizer) owns one instance, so separate
//! localizers (and tests) never share counters.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for localizer activity.
#[derive(Debug, Default)]
pub struct LocalizationMetrics {
    /// Lookups that resolved to a translated text
    lookup_hits: AtomicUsize,

    /// Lookups that fell back to a default or the bracketed key
    lookup_misses: AtomicUsize,

    /// Language files loaded successfully
    load_successes: AtomicUsize,

    /// Language files that failed to load
    load_failures: AtomicUsize,

    /// Successful switches of the active language
    switches: AtomicUsize,
}

impl LocalizationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_lookup_hit(&self) {
        self.lookup_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup_miss(&self) {
        self.lookup_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_success(&self) {
        self.load_successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_switch(&self) {
        self.switches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lookup_hits(&self) -> usize {
        self.lookup_hits.load(Ordering::Relaxed)
    }

    pub fn lookup_misses(&self) -> usize {
        self.lookup_misses.load(Ordering::Relaxed)
    }

    pub fn load_successes(&self) -> usize {
        self.load_successes.load(Ordering::Relaxed)
    }

    pub fn load_failures(&self) -> usize {
        self.load_failures.load(Ordering::Relaxed)
    }

    pub fn switches(&self) -> usize {
        self.switches.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.lookup_hits();
        let misses = self.lookup_misses();
        let successes = self.load_successes();
        let failures = self.load_failures();

        MetricsReport {
            lookup_hits: hits,
            lookup_misses: misses,
            lookup_hit_rate: percentage(hits, hits + misses),
            load_successes: successes,
            load_failures: failures,
            load_success_rate: percentage(successes, successes + failures),
            switches: self.switches(),
        }
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Snapshot of localizer activity.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub lookup_hits: usize,
    pub lookup_misses: usize,

    /// Lookup hit rate as a percentage (0-100)
    pub lookup_hit_rate: f64,

    pub load_successes: usize,
    pub load_failures: usize,

    /// Load success rate as a percentage (0-100)
    pub load_success_rate: f64,

    pub switches: usize,
}
