//! Pool configuration options

use std::time::Duration;

use crate::errors::{PoolError, PoolResult};

/// Configuration for object pool behavior
///
/// # Examples
///
/// ```
/// use loanpool::PoolConfiguration;
/// use std::time::Duration;
///
/// let config = PoolConfiguration::new()
///     .with_initial_size(2)
///     .with_max_size(3)
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.initial_size, 2);
/// assert_eq!(config.max_size, 3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfiguration {
    /// Number of resources created eagerly when the pool is constructed
    pub initial_size: usize,

    /// Maximum number of entries the pool will ever hold
    pub max_size: usize,

    /// Deadline for the polling async borrow
    pub operation_timeout: Duration,

    /// Delay between attempts of the polling async borrow
    pub poll_interval: Duration,

    /// Name reported in log events and metric labels
    pub name: String,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            initial_size: 10,
            max_size: 50,
            operation_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(10),
            name: "pool".to_string(),
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of resources created up front
    pub fn with_initial_size(mut self, size: usize) -> Self {
        self.initial_size = size;
        self
    }

    /// Set the maximum pool size
    ///
    /// # Examples
    ///
    /// ```
    /// use loanpool::PoolConfiguration;
    ///
    /// let config = PoolConfiguration::new().with_max_size(5);
    /// assert_eq!(config.max_size, 5);
    /// ```
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Set the async borrow deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Set the async borrow polling interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the pool name used in diagnostics
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check the size constraints.
    ///
    /// Sizes are unsigned, so the only violation is `max_size < initial_size`.
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_size < self.initial_size {
            return Err(PoolError::Configuration(format!(
                "max_size ({}) must not be smaller than initial_size ({})",
                self.max_size, self.initial_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PoolConfiguration::default();
        assert_eq!(config.initial_size, 10);
        assert_eq!(config.max_size, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_below_initial_is_rejected() {
        let config = PoolConfiguration::new().with_initial_size(4).with_max_size(3);
        assert!(matches!(config.validate(), Err(PoolError::Configuration(_))));
    }

    #[test]
    fn test_zero_sized_pool_is_allowed() {
        let config = PoolConfiguration::new().with_initial_size(0).with_max_size(0);
        assert!(config.validate().is_ok());
    }
}
