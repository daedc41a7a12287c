// Settings core metrics
//
// Lightweight counters for validation traffic and settings persistence health

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters shared by the settings synchronizer and the session controller
///
/// Uses atomic operations for thread-safe tracking without locks. Storage
/// failures are silent to the user, so these counters (and the log) are the
/// only place they show up.
#[derive(Debug)]
pub struct Metrics {
    /// Validator calls started
    pub validations_started: AtomicU64,

    /// Validations that returned an identity
    pub validations_succeeded: AtomicU64,

    /// Validations the remote side declined
    pub validations_rejected: AtomicU64,

    /// Validations that failed in transport or timed out
    pub validations_failed: AtomicU64,

    /// Responses dropped because a newer request or a clear superseded them
    pub stale_responses: AtomicU64,

    /// Settings documents written successfully
    pub settings_writes: AtomicU64,

    /// Settings or credential writes that failed
    pub storage_failures: AtomicU64,

    /// Checkbox toggles applied
    pub toggles_applied: AtomicU64,

    /// Creation time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            validations_started: AtomicU64::new(0),
            validations_succeeded: AtomicU64::new(0),
            validations_rejected: AtomicU64::new(0),
            validations_failed: AtomicU64::new(0),
            stale_responses: AtomicU64::new(0),
            settings_writes: AtomicU64::new(0),
            storage_failures: AtomicU64::new(0),
            toggles_applied: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_validation_started(&self) {
        self.validations_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_succeeded(&self) {
        self.validations_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_rejected(&self) {
        self.validations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_failed(&self) {
        self.validations_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_response(&self) {
        self.stale_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_settings_write(&self) {
        self.settings_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_storage_failure(&self) {
        self.storage_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_toggle(&self) {
        self.toggles_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Share of finished validations that produced an identity, 0.0 when none finished
    pub fn validation_success_rate(&self) -> f64 {
        let succeeded = self.validations_succeeded.load(Ordering::Relaxed);
        let finished = succeeded
            + self.validations_rejected.load(Ordering::Relaxed)
            + self.validations_failed.load(Ordering::Relaxed);

        if finished > 0 {
            succeeded as f64 / finished as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Settings Core Metrics ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Validations: {} started, {} succeeded, {} rejected, {} failed, {} stale",
            self.validations_started.load(Ordering::Relaxed),
            self.validations_succeeded.load(Ordering::Relaxed),
            self.validations_rejected.load(Ordering::Relaxed),
            self.validations_failed.load(Ordering::Relaxed),
            self.stale_responses.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Settings: {} toggles, {} writes, {} storage failures",
            self.toggles_applied.load(Ordering::Relaxed),
            self.settings_writes.load(Ordering::Relaxed),
            self.storage_failures.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
