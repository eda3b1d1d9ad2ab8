//! Monotonic serial numbers for created resources

use std::sync::atomic::{AtomicU64, Ordering};

static GLOBAL: SerialCounter = SerialCounter::new();

/// Atomically incrementing source of unique serial numbers.
///
/// The counter lives outside any pool, so numbers are never reused when a
/// pool is cleared or dropped. Pools take a `&'static SerialCounter` or an
/// `Arc<SerialCounter>`; tests pass a fresh one to get predictable numbers.
///
/// # Examples
///
/// ```
/// use loanpool::SerialCounter;
///
/// let counter = SerialCounter::new();
/// assert_eq!(counter.next_serial(), 1);
/// assert_eq!(counter.next_serial(), 2);
/// ```
#[derive(Debug, Default)]
pub struct SerialCounter {
    last: AtomicU64,
}

impl SerialCounter {
    /// Create a counter whose first serial is 1
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// The process-wide counter
    pub fn global() -> &'static SerialCounter {
        &GLOBAL
    }

    /// Hand out the next serial number
    pub fn next_serial(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Most recently issued serial, 0 if none yet
    pub fn last_issued(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

impl AsRef<SerialCounter> for SerialCounter {
    fn as_ref(&self) -> &SerialCounter {
        self
    }
}
