//! Pool entries pairing a resource with its busy flag

use std::sync::Arc;

/// One managed resource and whether it is currently lent out.
///
/// The entry owns the resource; borrowers receive clones of the `Arc`, which
/// act as loan handles. Handles are matched back to entries by pointer
/// identity, never by value. Each loan also gets a generation number, so a
/// release can be tied to the loan it came from.
pub struct PooledEntry<R> {
    resource: Arc<R>,
    busy: bool,
    generation: u64,
}

impl<R> PooledEntry<R> {
    /// Wrap a freshly created resource. New entries start free.
    pub fn new(resource: R) -> Self {
        Self {
            resource: Arc::new(resource),
            busy: false,
            generation: 0,
        }
    }

    pub fn resource(&self) -> &Arc<R> {
        &self.resource
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Mark busy and start a new loan, returning its generation
    pub fn lend(&mut self) -> u64 {
        self.busy = true;
        self.generation += 1;
        self.generation
    }

    /// Generation of the most recent loan, 0 if never lent
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `handle` was lent out from this entry
    pub fn holds(&self, handle: &Arc<R>) -> bool {
        Arc::ptr_eq(&self.resource, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_is_free() {
        let entry = PooledEntry::new(7);
        assert!(!entry.is_busy());
        assert_eq!(**entry.resource(), 7);
    }

    #[test]
    fn test_holds_compares_identity_not_value() {
        let entry = PooledEntry::new(String::from("bank"));
        let other = PooledEntry::new(String::from("bank"));

        assert!(entry.holds(&Arc::clone(entry.resource())));
        assert!(!entry.holds(other.resource()));
    }

    #[test]
    fn test_each_loan_gets_a_new_generation() {
        let mut entry = PooledEntry::new(0u8);
        assert_eq!(entry.generation(), 0);
        assert_eq!(entry.lend(), 1);
        assert!(entry.is_busy());
        entry.set_busy(false);
        assert_eq!(entry.lend(), 2);
        assert_eq!(entry.generation(), 2);
    }

    #[test]
    fn test_set_busy_only_flips_flag() {
        let mut entry = PooledEntry::new(1u8);
        let before = Arc::clone(entry.resource());
        entry.set_busy(true);
        assert!(entry.is_busy());
        entry.set_busy(false);
        assert!(!entry.is_busy());
        assert!(entry.holds(&before));
    }
}
