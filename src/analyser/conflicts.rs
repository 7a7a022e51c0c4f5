//! Conflict predicates, detection scans and the conflict table.

use std::collections::BTreeMap;

use super::store::window;
use crate::types::{Channel, ChannelId, Conflict, ConflictId, Intermod};

/// `victim` is too close to `other` for the victim's own equipment.
///
/// Each side is judged by its own channel spacing, so the relation is not
/// symmetric.
pub fn channel_spacing_violated(victim: &Channel, other: &Channel) -> bool {
    victim.id() != other.id()
        && (i64::from(victim.frequency()) - i64::from(other.frequency())).abs()
            < i64::from(victim.equipment().channel_spacing())
}

/// `channel` is too close to `intermod` for its equipment's spacing at that
/// intermod type. A channel never conflicts with its own products.
pub fn intermod_spacing_violated(channel: &Channel, intermod: &Intermod) -> bool {
    !intermod.involves(channel.id())
        && (i64::from(channel.frequency()) - i64::from(intermod.frequency())).abs()
            < i64::from(channel.equipment().spacing(intermod.kind()))
}

/// Push a conflict for every intermod in sorted `intermods` that `channel`
/// violates. Only the `channel ± max_im_spacing` window is scanned.
pub(crate) fn scan_intermods(channel: &Channel, intermods: &[Intermod], found: &mut Vec<Conflict>) {
    let reach = channel.equipment().max_im_spacing();
    if reach <= 0 {
        return;
    }
    let centre = channel.frequency();
    let (lo, hi) = (centre.saturating_sub(reach), centre.saturating_add(reach));
    found.extend(
        window(intermods, lo, hi)
            .iter()
            .filter(|im| intermod_spacing_violated(channel, im))
            .map(|im| Conflict::IntermodSpacing {
                channel: channel.id(),
                intermod: *im,
            }),
    );
}

/// Push channel-spacing conflicts between `channel` and each of `others`, in
/// both directions.
pub(crate) fn scan_channels(channel: &Channel, others: &[Channel], found: &mut Vec<Conflict>) {
    for other in others {
        if channel_spacing_violated(channel, other) {
            found.push(Conflict::ChannelSpacing {
                channel: channel.id(),
                other: other.as_generator(),
            });
        }
        if channel_spacing_violated(other, channel) {
            found.push(Conflict::ChannelSpacing {
                channel: other.id(),
                other: channel.as_generator(),
            });
        }
    }
}

/// Conflicts keyed by a stable id. Ids are never reused.
#[derive(Debug, Default, Clone)]
pub(crate) struct ConflictTable {
    entries: BTreeMap<ConflictId, Conflict>,
    next_id: u64,
}

impl ConflictTable {
    pub fn insert(&mut self, conflict: Conflict) -> ConflictId {
        let id = ConflictId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, conflict);
        id
    }

    pub fn remove(&mut self, id: ConflictId) -> Option<Conflict> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: ConflictId) -> Option<&Conflict> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConflictId, &Conflict)> {
        self.entries.iter().map(|(id, conflict)| (*id, conflict))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Ids of every conflict that channel `id` takes part in.
    pub fn referencing(&self, id: ChannelId) -> Vec<ConflictId> {
        self.entries
            .iter()
            .filter(|(_, conflict)| conflict.references(id))
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
