//! Health monitoring for object pools

#[cfg(feature = "serde")]
use serde::Serialize;

/// Health status of an object pool
///
/// # Examples
///
/// ```
/// use loanpool::{ObjectPool, PoolConfiguration};
///
/// let config = PoolConfiguration::new().with_initial_size(3).with_max_size(10);
/// let pool = ObjectPool::new(|| 0u8, config).unwrap();
///
/// let health = pool.health_status();
/// assert!(health.is_healthy());
/// assert_eq!(health.free_entries, 3);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Busy entries over maximum size (0.0 to 1.0)
    pub utilization: f64,

    /// Free entries
    pub free_entries: usize,

    /// Busy entries
    pub busy_entries: usize,

    /// Maximum number of entries
    pub max_size: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Derive a health status from the current entry counts
    pub fn new(free: usize, busy: usize, max_size: usize) -> Self {
        let utilization = if max_size > 0 {
            busy as f64 / max_size as f64
        } else {
            0.0
        };

        let mut warnings = Vec::new();
        let mut is_healthy = true;

        if utilization > 0.9 {
            warnings.push(format!("High utilization: {:.1}%", utilization * 100.0));
            is_healthy = false;
        }

        // Growth can still serve a borrow while free == 0, so this only warns.
        if free == 0 && max_size > 0 {
            warnings.push("No free entries".to_string());
        }

        Self {
            is_healthy,
            utilization,
            free_entries: free,
            busy_entries: busy,
            max_size,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}
