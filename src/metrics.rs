//! Metrics collection and export for object pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Point-in-time metrics for a pool
///
/// # Examples
///
/// ```
/// use loanpool::{ObjectPool, PoolConfiguration};
///
/// let config = PoolConfiguration::new().with_initial_size(2).with_max_size(4);
/// let pool = ObjectPool::new(|| 0u32, config).unwrap();
///
/// let _loan = pool.borrow_object().unwrap();
/// let metrics = pool.metrics();
/// assert_eq!(metrics.total_borrowed, 1);
/// assert_eq!(metrics.busy_entries, 1);
/// assert_eq!(metrics.free_entries, 1);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PoolMetrics {
    /// Successful borrows
    pub total_borrowed: usize,

    /// Returns that freed an entry
    pub total_returned: usize,

    /// Resources created by the factory, including initial ones
    pub total_created: usize,

    /// Borrows refused because nothing was free and the pool could not grow
    pub exhausted_events: usize,

    /// Returns of unknown or already free resources
    pub ignored_returns: usize,

    /// Entries currently lent out
    pub busy_entries: usize,

    /// Entries currently free
    pub free_entries: usize,

    /// Maximum number of entries
    pub max_size: usize,

    /// Busy entries over maximum size (0.0 to 1.0)
    pub utilization: f64,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_borrowed".to_string(), self.total_borrowed.to_string());
        metrics.insert("total_returned".to_string(), self.total_returned.to_string());
        metrics.insert("total_created".to_string(), self.total_created.to_string());
        metrics.insert("exhausted_events".to_string(), self.exhausted_events.to_string());
        metrics.insert("ignored_returns".to_string(), self.ignored_returns.to_string());
        metrics.insert("busy_entries".to_string(), self.busy_entries.to_string());
        metrics.insert("free_entries".to_string(), self.free_entries.to_string());
        metrics.insert("max_size".to_string(), self.max_size.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics
    }
}

/// Metrics exporter for Prometheus format
pub struct MetricsExporter;

impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// # Examples
    ///
    /// ```
    /// use loanpool::{ObjectPool, PoolConfiguration};
    /// use std::collections::HashMap;
    ///
    /// let pool = ObjectPool::new(|| 1u8, PoolConfiguration::new().with_name("banks")).unwrap();
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("site".to_string(), "lobby".to_string());
    ///
    /// let output = pool.export_metrics_prometheus(Some(&tags));
    /// assert!(output.contains("loanpool_entries_busy"));
    /// assert!(output.contains("pool=\"banks\""));
    /// assert!(output.contains("site=\"lobby\""));
    /// ```
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let labels = Self::format_labels(pool_name, tags);
        let mut output = String::new();

        let gauges = [
            ("loanpool_entries_busy", "Entries currently lent out", metrics.busy_entries.to_string()),
            ("loanpool_entries_free", "Entries currently free", metrics.free_entries.to_string()),
            ("loanpool_entries_max", "Maximum number of entries", metrics.max_size.to_string()),
            ("loanpool_utilization", "Pool utilization ratio", format!("{:.2}", metrics.utilization)),
        ];
        let counters = [
            ("loanpool_borrowed_total", "Successful borrows", metrics.total_borrowed),
            ("loanpool_returned_total", "Returns that freed an entry", metrics.total_returned),
            ("loanpool_created_total", "Resources created", metrics.total_created),
            ("loanpool_exhausted_total", "Borrows refused at capacity", metrics.exhausted_events),
            ("loanpool_ignored_returns_total", "Ignored returns", metrics.ignored_returns),
        ];

        for (name, help, value) in gauges {
            output.push_str(&format!("# HELP {name} {help}\n# TYPE {name} gauge\n"));
            output.push_str(&format!("{name}{{{labels}}} {value}\n"));
        }
        for (name, help, value) in counters {
            output.push_str(&format!("# HELP {name} {help}\n# TYPE {name} counter\n"));
            output.push_str(&format!("{name}{{{labels}}} {value}\n"));
        }

        output
    }

    fn format_labels(pool_name: &str, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = vec![format!("pool=\"{}\"", pool_name)];

        if let Some(tags) = tags {
            let mut sorted: Vec<_> = tags.iter().collect();
            sorted.sort();
            for (key, value) in sorted {
                labels.push(format!("{}=\"{}\"", key, value));
            }
        }

        labels.join(",")
    }
}

/// Internal metrics tracker
#[derive(Default)]
pub(crate) struct MetricsTracker {
    pub total_borrowed: AtomicUsize,
    pub total_returned: AtomicUsize,
    pub total_created: AtomicUsize,
    pub exhausted_events: AtomicUsize,
    pub ignored_returns: AtomicUsize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self, busy: usize, free: usize, max_size: usize) -> PoolMetrics {
        let utilization = if max_size > 0 {
            busy as f64 / max_size as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_borrowed: self.total_borrowed.load(Ordering::Relaxed),
            total_returned: self.total_returned.load(Ordering::Relaxed),
            total_created: self.total_created.load(Ordering::Relaxed),
            exhausted_events: self.exhausted_events.load(Ordering::Relaxed),
            ignored_returns: self.ignored_returns.load(Ordering::Relaxed),
            busy_entries: busy,
            free_entries: free,
            max_size,
            utilization,
        }
    }
}
