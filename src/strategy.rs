//! Resource identification strategies
//!
//! Both pool flavours share the same busy/free state machine and differ only
//! in how a borrow request picks its target entry.

use std::collections::HashMap;
use std::hash::Hash;

use crate::entry::PooledEntry;

/// How a pool locates the entry to lend
///
/// # Examples
///
/// ```
/// use loanpool::{IdentificationStrategy, PoolConfiguration, power_bank_box};
///
/// let bank_box = power_bank_box(PoolConfiguration::new().with_name("box")).unwrap();
/// assert!(matches!(bank_box.strategy(), IdentificationStrategy::Keyed(_)));
/// ```
#[derive(Debug, Clone)]
pub enum IdentificationStrategy<K> {
    /// First free entry by linear scan in creation order
    Scan,

    /// Explicit key to entry position, fixed at construction
    Keyed(HashMap<K, usize>),
}

/// What a borrow request asks for
pub(crate) enum Target<'a, K> {
    AnyFree,
    Key(&'a K),
}

// Manual impls: derive would demand `K: Copy`.
impl<K> Clone for Target<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Target<'_, K> {}

/// Why no entry could be located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Miss {
    NoneFree,
    NotFound,
    AlreadyBusy,
}

impl<K: Eq + Hash> IdentificationStrategy<K> {
    /// Find the position of the entry a request resolves to.
    ///
    /// `AnyFree` uses the scan rule under either strategy, so a keyed pool can
    /// still hand out whichever entry is free first.
    pub(crate) fn locate<R>(
        &self,
        entries: &[PooledEntry<R>],
        target: Target<'_, K>,
    ) -> Result<usize, Miss> {
        match (self, target) {
            (_, Target::AnyFree) => entries
                .iter()
                .position(|entry| !entry.is_busy())
                .ok_or(Miss::NoneFree),
            (IdentificationStrategy::Keyed(index), Target::Key(key)) => {
                let position = *index.get(key).ok_or(Miss::NotFound)?;
                match entries.get(position) {
                    Some(entry) if entry.is_busy() => Err(Miss::AlreadyBusy),
                    Some(_) => Ok(position),
                    None => Err(Miss::NotFound),
                }
            }
            (IdentificationStrategy::Scan, Target::Key(_)) => Err(Miss::NotFound),
        }
    }

    /// Position registered for `key`, regardless of busy state
    pub(crate) fn position_of(&self, key: &K) -> Option<usize> {
        match self {
            IdentificationStrategy::Keyed(index) => index.get(key).copied(),
            IdentificationStrategy::Scan => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(busy: &[bool]) -> Vec<PooledEntry<usize>> {
        busy.iter()
            .enumerate()
            .map(|(idx, &b)| {
                let mut entry = PooledEntry::new(idx);
                entry.set_busy(b);
                entry
            })
            .collect()
    }

    #[test]
    fn test_scan_picks_first_free() {
        let strategy = IdentificationStrategy::<()>::Scan;
        let entries = entries(&[true, false, false]);
        assert_eq!(strategy.locate(&entries, Target::AnyFree), Ok(1));
    }

    #[test]
    fn test_scan_reports_none_free() {
        let strategy = IdentificationStrategy::<()>::Scan;
        let entries = entries(&[true, true]);
        assert_eq!(strategy.locate(&entries, Target::AnyFree), Err(Miss::NoneFree));
    }

    #[test]
    fn test_keyed_lookup_outcomes() {
        let index = HashMap::from([("a", 0), ("b", 1)]);
        let strategy = IdentificationStrategy::Keyed(index);
        let entries = entries(&[true, false]);

        assert_eq!(strategy.locate(&entries, Target::Key(&"b")), Ok(1));
        assert_eq!(strategy.locate(&entries, Target::Key(&"a")), Err(Miss::AlreadyBusy));
        assert_eq!(strategy.locate(&entries, Target::Key(&"z")), Err(Miss::NotFound));
        assert_eq!(strategy.position_of(&"a"), Some(0));
    }
}
