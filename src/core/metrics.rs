//! Registry counters
//!
//! What happened to records after they passed the threshold check: how many
//! were dispatched (per level), how many found no appender, and how often an
//! appender failed.

use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters of one [`Hierarchy`](super::Hierarchy)
///
/// # Example
///
/// ```
/// use rust_hierarchical_logger::{LogLevel, LoggerMetrics};
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_logged(LogLevel::Warn);
/// metrics.record_dropped();
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.total_logged, 1);
/// assert_eq!(snapshot.dropped, 1);
/// assert_eq!(metrics.logged_at(LogLevel::Warn), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Enabled records that reached no appender
    dropped: AtomicU64,
    /// Dispatched records, indexed by level
    logged: [AtomicU64; 6],
    appender_writes: AtomicU64,
    /// Append/flush failures and panics, plus sinks that failed to open
    sink_errors: AtomicU64,
}

/// Point-in-time copy of [`LoggerMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub dropped: u64,
    pub total_logged: u64,
    pub logged_by_level: [u64; 6],
    pub appender_writes: u64,
    pub sink_errors: u64,
}

impl MetricsSnapshot {
    /// Share of enabled records that found no appender, in percent.
    pub fn drop_rate(&self) -> f64 {
        let attempted = self.total_logged + self.dropped;
        if attempted == 0 {
            0.0
        } else {
            self.dropped as f64 * 100.0 / attempted as f64
        }
    }
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            dropped: AtomicU64::new(0),
            logged: [
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
            ],
            appender_writes: AtomicU64::new(0),
            sink_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Dispatched records of every level.
    pub fn total_logged(&self) -> u64 {
        self.logged.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    #[inline]
    pub fn logged_at(&self, level: LogLevel) -> u64 {
        self.logged[level as usize].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn appender_writes(&self) -> u64 {
        self.appender_writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_error_count(&self) -> u64 {
        self.sink_errors.load(Ordering::Relaxed)
    }

    /// Record an enabled record without appenders, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_logged(&self, level: LogLevel) -> u64 {
        self.logged[level as usize].fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write(&self) -> u64 {
        self.appender_writes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_error(&self) -> u64 {
        self.sink_errors.fetch_add(1, Ordering::Relaxed)
    }

    /// Percentage of enabled records that found no appender
    pub fn drop_rate(&self) -> f64 {
        self.snapshot().drop_rate()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut logged_by_level = [0; 6];
        for (slot, counter) in logged_by_level.iter_mut().zip(&self.logged) {
            *slot = counter.load(Ordering::Relaxed);
        }
        MetricsSnapshot {
            dropped: self.dropped_count(),
            total_logged: logged_by_level.iter().sum(),
            logged_by_level,
            appender_writes: self.appender_writes(),
            sink_errors: self.sink_error_count(),
        }
    }

    pub fn reset(&self) {
        self.dropped.store(0, Ordering::Relaxed);
        for counter in &self.logged {
            counter.store(0, Ordering::Relaxed);
        }
        self.appender_writes.store(0, Ordering::Relaxed);
        self.sink_errors.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_level() {
        let metrics = LoggerMetrics::new();
        metrics.record_logged(LogLevel::Info);
        metrics.record_logged(LogLevel::Info);
        metrics.record_logged(LogLevel::Fatal);
        assert_eq!(metrics.logged_at(LogLevel::Info), 2);
        assert_eq!(metrics.logged_at(LogLevel::Fatal), 1);
        assert_eq!(metrics.logged_at(LogLevel::Trace), 0);
        assert_eq!(metrics.total_logged(), 3);
    }

    #[test]
    fn test_record_returns_previous() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_sink_error(), 0);
        assert_eq!(metrics.record_sink_error(), 1);
        assert_eq!(metrics.sink_error_count(), 2);
    }

    #[test]
    fn test_drop_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.drop_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_logged(LogLevel::Debug);
        }
        for _ in 0..10 {
            metrics.record_dropped();
        }
        let rate = metrics.drop_rate();
        assert!((rate - 10.0).abs() < f64::EPSILON, "Drop rate was {}", rate);
    }

    #[test]
    fn test_snapshot_survives_reset() {
        let metrics = LoggerMetrics::new();
        metrics.record_dropped();
        metrics.record_logged(LogLevel::Error);
        metrics.record_write();

        let snapshot = metrics.snapshot();
        metrics.reset();

        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
        assert_eq!(snapshot.dropped, 1);
        assert_eq!(snapshot.logged_by_level[LogLevel::Error as usize], 1);
        assert_eq!(snapshot.appender_writes, 1);
    }
}
