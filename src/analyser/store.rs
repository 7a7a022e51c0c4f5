//! Sorted intermod storage with range queries and a restore stack.

use tracing::trace;

use crate::types::{ChannelId, Intermod};

/// Index of the first intermod with frequency strictly above `limit_lo`, or
/// `intermods.len()` when there is none.
pub fn next_index(intermods: &[Intermod], limit_lo: i32) -> usize {
    intermods.partition_point(|im| im.frequency() <= limit_lo)
}

/// Intermods with `lo < frequency < hi`.
pub fn window(intermods: &[Intermod], lo: i32, hi: i32) -> &[Intermod] {
    let start = next_index(intermods, lo);
    let end = start + intermods[start..].partition_point(|im| im.frequency() < hi);
    &intermods[start..end]
}

/// Stable two-pointer merge of two sorted lists. On ties `existing` wins.
pub(crate) fn merge_sorted(existing: &[Intermod], incoming: &[Intermod]) -> Vec<Intermod> {
    let mut merged = Vec::with_capacity(existing.len() + incoming.len());
    let (mut a, mut b) = (0, 0);
    while a < existing.len() && b < incoming.len() {
        if incoming[b] < existing[a] {
            merged.push(incoming[b]);
            b += 1;
        } else {
            merged.push(existing[a]);
            a += 1;
        }
    }
    merged.extend_from_slice(&existing[a..]);
    merged.extend_from_slice(&incoming[b..]);
    merged
}

/// The analyser's intermod list, always sorted.
///
/// Tentative merges push the replaced list on a stack;
/// [`rollback`](Self::rollback) pops it back, restoring the exact previous list.
#[derive(Debug, Default, Clone)]
pub(crate) struct IntermodStore {
    intermods: Vec<Intermod>,
    backups: Vec<Vec<Intermod>>,
}

impl IntermodStore {
    pub fn as_slice(&self) -> &[Intermod] {
        &self.intermods
    }

    pub fn len(&self) -> usize {
        self.intermods.len()
    }

    pub fn window(&self, lo: i32, hi: i32) -> &[Intermod] {
        window(&self.intermods, lo, hi)
    }

    /// Merge sorted `incoming` permanently.
    pub fn merge(&mut self, incoming: &[Intermod]) {
        if incoming.is_empty() {
            return;
        }
        self.intermods = merge_sorted(&self.intermods, incoming);
    }

    /// Merge sorted `incoming`, keeping the previous list for [`rollback`](Self::rollback).
    pub fn merge_tentative(&mut self, incoming: &[Intermod]) {
        let merged = merge_sorted(&self.intermods, incoming);
        let previous = std::mem::replace(&mut self.intermods, merged);
        self.backups.push(previous);
        trace!(
            depth = self.backups.len(),
            added = incoming.len(),
            "Tentative intermod merge"
        );
    }

    /// Restore the list from before the latest tentative merge.
    pub fn rollback(&mut self) -> bool {
        match self.backups.pop() {
            Some(previous) => {
                self.intermods = previous;
                true
            }
            None => false,
        }
    }

    /// Make every tentative merge permanent.
    pub fn release_backups(&mut self) {
        self.backups.clear();
    }

    #[cfg(test)]
    pub fn backup_depth(&self) -> usize {
        self.backups.len()
    }

    /// Drop every product `id` generates. Returns how many were removed.
    pub fn remove_generator(&mut self, id: ChannelId) -> usize {
        let before = self.intermods.len();
        self.intermods.retain(|im| !im.involves(id));
        before - self.intermods.len()
    }

    pub fn clear(&mut self) {
        self.intermods.clear();
        self.backups.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Generator, IntermodType};
    use proptest::prelude::*;

    fn im(f1: i32, f2: i32) -> Intermod {
        Intermod::two_tone(
            IntermodType::TwoTone3rd,
            Generator::new(ChannelId(0), f1),
            Generator::new(ChannelId(1), f2),
        )
    }

    fn at(frequency: i32) -> Intermod {
        // 2·f − f = f
        im(frequency, frequency)
    }

    fn sorted(frequencies: &[i32]) -> Vec<Intermod> {
        let mut list: Vec<Intermod> = frequencies.iter().map(|f| at(*f)).collect();
        list.sort();
        list
    }

    // -----------------------------------------------------------------------
    // next_index
    // -----------------------------------------------------------------------

    #[test]
    fn next_index_excludes_exact_boundary() {
        let list = sorted(&[100, 200, 200, 200, 300]);
        assert_eq!(next_index(&list, 99), 0);
        assert_eq!(next_index(&list, 100), 1);
        assert_eq!(next_index(&list, 199), 1);
        assert_eq!(next_index(&list, 200), 4);
        assert_eq!(next_index(&list, 300), 5);
        assert_eq!(next_index(&[], 0), 0);
    }

    #[test]
    fn window_is_open_on_both_ends() {
        let list = sorted(&[100, 150, 200, 250, 300]);
        let freqs: Vec<i32> = window(&list, 100, 300)
            .iter()
            .map(Intermod::frequency)
            .collect();
        assert_eq!(freqs, [150, 200, 250]);
        assert!(window(&list, 300, 100).is_empty());
        assert!(window(&list, 301, 400).is_empty());
    }

    // -----------------------------------------------------------------------
    // merging and rollback
    // -----------------------------------------------------------------------

    #[test]
    fn tentative_merges_roll_back_in_order() {
        let mut store = IntermodStore::default();
        store.merge(&sorted(&[100, 300]));
        store.merge_tentative(&sorted(&[200]));
        store.merge_tentative(&sorted(&[50, 400]));
        assert_eq!(store.len(), 5);
        assert_eq!(store.backup_depth(), 2);

        assert!(store.rollback());
        let freqs: Vec<i32> = store
            .as_slice()
            .iter()
            .map(Intermod::frequency)
            .collect();
        assert_eq!(freqs, [100, 200, 300]);
        assert!(store.rollback());
        assert_eq!(store.len(), 2);
        assert!(!store.rollback());
    }

    #[test]
    fn remove_generator_drops_products() {
        let mut store = IntermodStore::default();
        let other = Intermod::two_tone(
            IntermodType::TwoTone5th,
            Generator::new(ChannelId(4), 600_000),
            Generator::new(ChannelId(5), 601_000),
        );
        let mut incoming = vec![im(606_000, 607_000), other];
        incoming.sort();
        store.merge(&incoming);
        assert_eq!(store.remove_generator(ChannelId(1)), 1);
        assert_eq!(store.remove_generator(ChannelId(1)), 0);
        assert_eq!(store.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_merge_equals_sort(
            a in prop::collection::vec(0..1000i32, 0..50),
            b in prop::collection::vec(0..1000i32, 0..50)
        ) {
            let left = sorted(&a);
            let right = sorted(&b);
            let merged = merge_sorted(&left, &right);

            let mut expected: Vec<i32> = a.iter().chain(b.iter()).copied().collect();
            expected.sort();
            let actual: Vec<i32> = merged.iter().map(Intermod::frequency).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_next_index_matches_linear_scan(
            freqs in prop::collection::vec(0..500i32, 0..60),
            limit in -10..510i32
        ) {
            let list = sorted(&freqs);
            let linear = list.iter().position(|im| im.frequency() > limit).unwrap_or(list.len());
            prop_assert_eq!(next_index(&list, limit), linear);
        }
    }
}
