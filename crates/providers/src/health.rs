//! Provider health tracking.
//!
//! Each observed success nudges a provider's score up and each failure
//! pushes it down, always within `[0, 1]`. A provider becomes unavailable
//! once its consecutive failures reach the configured threshold, and
//! available again on the next success.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Score gained per success.
pub const SUCCESS_STEP: f64 = 0.1;

/// Score lost per failure.
pub const FAILURE_STEP: f64 = 0.25;

/// Health of one provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderHealth {
    /// Provider name.
    pub name: String,
    /// Whether the provider may be used.
    pub available: bool,
    /// Score in `[0, 1]`.
    pub health_score: f64,
    /// Failures since the last success.
    pub consecutive_fails: u32,
    /// When the provider was last observed.
    pub last_check: DateTime<Utc>,
    /// Most recent failure message.
    pub last_error: Option<String>,
}

impl ProviderHealth {
    /// Fresh, fully healthy record.
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            available: true,
            health_score: 1.0,
            consecutive_fails: 0,
            last_check: Utc::now(),
            last_error: None,
        }
    }

    fn record_success(&mut self) {
        self.health_score = (self.health_score + SUCCESS_STEP).min(1.0);
        self.consecutive_fails = 0;
        self.available = true;
        self.last_check = Utc::now();
    }

    fn record_failure(&mut self, error: Option<&str>, max_failures: u32) {
        self.health_score = (self.health_score - FAILURE_STEP).max(0.0);
        self.consecutive_fails = self.consecutive_fails.saturating_add(1);
        if self.consecutive_fails >= max_failures {
            self.available = false;
        }
        if let Some(error) = error {
            self.last_error = Some(error.to_string());
        }
        self.last_check = Utc::now();
    }
}

/// Owned table of provider health records.
#[derive(Debug, Default)]
pub struct HealthTracker {
    table: Mutex<HashMap<String, ProviderHealth>>,
}

impl HealthTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation.
    ///
    /// Returns the updated record.
    pub fn update(
        &self,
        name: &str,
        success: bool,
        error: Option<&str>,
        max_failures: u32,
    ) -> ProviderHealth {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        let health = table
            .entry(name.to_string())
            .or_insert_with(|| ProviderHealth::healthy(name));

        if success {
            health.record_success();
        } else {
            health.record_failure(error, max_failures);
            if !health.available {
                log::warn!(
                    "Provider {name} marked unavailable after {} consecutive failures",
                    health.consecutive_fails
                );
            }
        }
        health.clone()
    }

    /// Current record; unknown providers are healthy.
    pub fn get(&self, name: &str) -> ProviderHealth {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .unwrap_or_else(|| ProviderHealth::healthy(name))
    }

    /// Whether `name` is available.
    pub fn is_available(&self, name: &str) -> bool {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .is_none_or(|health| health.available)
    }

    /// All observed records, sorted by name.
    pub fn all(&self) -> Vec<ProviderHealth> {
        let mut records: Vec<ProviderHealth> = self
            .table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Forget everything observed about `name`.
    pub fn reset(&self, name: &str) {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u32 = 3;

    #[test]
    fn test_unknown_provider_is_healthy() {
        let tracker = HealthTracker::new();
        let health = tracker.get("apt");
        assert!(health.available);
        assert!((health.health_score - 1.0).abs() < f64::EPSILON);
        assert!(tracker.is_available("apt"));
        assert!(tracker.all().is_empty());
    }

    #[test]
    fn test_three_failures_make_unavailable() {
        let tracker = HealthTracker::new();
        tracker.update("apt", false, Some("lock held"), MAX);
        tracker.update("apt", false, None, MAX);
        assert!(tracker.is_available("apt"));

        let health = tracker.update("apt", false, Some("dpkg error"), MAX);
        assert!(!health.available);
        assert_eq!(health.consecutive_fails, 3);
        assert!((health.health_score - 0.25).abs() < 1e-9);
        assert_eq!(health.last_error.as_deref(), Some("dpkg error"));
        assert!(!tracker.is_available("apt"));
    }

    #[test]
    fn test_success_resets_failures() {
        let tracker = HealthTracker::new();
        for _ in 0..3 {
            tracker.update("apt", false, None, MAX);
        }
        let before = tracker.get("apt").health_score;

        let health = tracker.update("apt", true, None, MAX);
        assert!(health.available);
        assert_eq!(health.consecutive_fails, 0);
        assert!(health.health_score > before);
    }

    #[test]
    fn test_score_stays_in_bounds_and_is_monotone() {
        let tracker = HealthTracker::new();
        let mut last = 1.0;
        for _ in 0..10 {
            let score = tracker.update("brew", false, None, MAX).health_score;
            assert!(score <= last);
            assert!(score >= 0.0);
            last = score;
        }
        assert!(last.abs() < f64::EPSILON);

        for _ in 0..20 {
            let score = tracker.update("brew", true, None, MAX).health_score;
            assert!(score >= last);
            assert!(score <= 1.0);
            last = score;
        }
        assert!((last - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_and_listing() {
        let tracker = HealthTracker::new();
        tracker.update("snap", false, None, 1);
        tracker.update("apt", true, None, 1);
        assert!(!tracker.is_available("snap"));

        let names: Vec<String> = tracker.all().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["apt", "snap"]);

        tracker.reset("snap");
        assert!(tracker.is_available("snap"));
        assert_eq!(tracker.all().len(), 1);
    }
}
