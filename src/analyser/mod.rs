//! Incremental intermodulation and conflict analysis.
//!
//! The [`Analyser`] owns every channel in a coordination together with all
//! derived state: the sorted intermod list, the conflict table and the
//! per-kind counters. Adding a channel only computes the products and
//! conflicts that channel takes part in; removing one drops exactly the
//! artifacts it generated or suffered.
//!
//! ## Invariants
//!
//! After every public operation:
//! - channels are sorted by frequency (id breaks ties)
//! - intermods are sorted by `(frequency, type, f1, f2, f3)`
//! - every conflict in the table is listed by its victim channel and counted
//!   once in [`ConflictCounters`]
//!
//! ## Example
//!
//! ```rust
//! use rfcoord::analyser::Analyser;
//! use rfcoord::types::{Channel, ChannelId, Equipment, ImSpacing, Validity};
//! use std::sync::Arc;
//!
//! let spacing = ImSpacing::new(100, 90, 0, 0, 50);
//! let wide = Arc::new(Equipment::new("", "Wide", 25, 300, spacing)?);
//! let narrow = Arc::new(Equipment::new("", "Narrow", 25, 100, spacing)?);
//!
//! let mut analyser = Analyser::new();
//! let a = analyser.add_channel(Channel::new(ChannelId(0), 606_000, wide)?)?;
//! let b = analyser.add_channel(Channel::new(ChannelId(1), 606_200, narrow)?)?;
//!
//! assert_eq!(analyser.intermod_count(), 8);
//! assert_eq!(analyser.conflict_count(), 1);
//! assert_eq!(analyser.channel(a).map(Channel::validity), Some(Validity::Invalid));
//! assert_eq!(analyser.channel(b).map(Channel::validity), Some(Validity::Valid));
//! # Ok::<(), rfcoord::CoordinationError>(())
//! ```

mod calculations;
mod conflicts;
mod store;

pub use calculations::ImCalculations;
pub use conflicts::{channel_spacing_violated, intermod_spacing_violated};
pub use store::{next_index, window};

use std::cmp::Ordering;
use tracing::{debug, trace};

use crate::types::{
    Channel, ChannelId, Conflict, ConflictCounters, ConflictId, ConflictKind, Intermod,
    IntermodType, Validity,
};
use crate::{CoordinationError, Result};
use calculations::{all_intermods, calculate_intermods};
use conflicts::{ConflictTable, scan_channels, scan_intermods};
use store::IntermodStore;

/// What adding a candidate channel would produce, computed without mutation.
#[derive(Debug, Clone)]
pub struct ArtifactReport {
    /// Products the candidate would form, sorted.
    pub intermods: Vec<Intermod>,
    /// Conflicts the candidate would cause or suffer.
    pub conflicts: Vec<Conflict>,
    /// The candidate's own validity once added.
    pub validity: Validity,
}

impl ArtifactReport {
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }
}

/// Incremental conflict engine. See the [module docs](self).
#[derive(Debug, Clone, Default)]
pub struct Analyser {
    channels: Vec<Channel>,
    intermods: IntermodStore,
    conflicts: ConflictTable,
    counters: ConflictCounters,
    calculations: ImCalculations,
    next_id: u32,
}

impl Analyser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calculations(calculations: ImCalculations) -> Self {
        Self {
            calculations,
            ..Self::default()
        }
    }

    /// Build an analyser holding `channels`, added in the given order.
    pub fn from_channels(
        channels: impl IntoIterator<Item = Channel>,
        calculations: ImCalculations,
    ) -> Result<Self> {
        let mut analyser = Self::with_calculations(calculations);
        for channel in channels {
            analyser.add_channel(channel)?;
        }
        Ok(analyser)
    }

    // -----------------------------------------------------------------------
    // ids
    // -----------------------------------------------------------------------

    /// Take the next id from the monotonic counter.
    pub fn allocate_id(&mut self) -> ChannelId {
        let id = ChannelId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// The id [`allocate_id`](Self::allocate_id) would return next.
    pub fn peek_next_id(&self) -> ChannelId {
        ChannelId(self.next_id)
    }

    /// Make sure ids below `next` are never handed out again.
    pub fn reserve_ids(&mut self, next: ChannelId) {
        self.next_id = self.next_id.max(next.0);
    }

    fn note_id(&mut self, id: ChannelId) {
        self.next_id = self.next_id.max(id.0.saturating_add(1));
    }

    // -----------------------------------------------------------------------
    // mutation
    // -----------------------------------------------------------------------

    /// Add a channel and every artifact it takes part in.
    ///
    /// Any conflicts the channel carried are discarded. Fails with
    /// [`CoordinationError::InvalidArgument`] if the id is already present.
    pub fn add_channel(&mut self, mut channel: Channel) -> Result<ChannelId> {
        let id = channel.id();
        if self.position(id).is_some() {
            return Err(CoordinationError::invalid_argument(format!(
                "channel {id} is already present"
            )));
        }
        channel.clear_conflicts();

        let new_intermods = self.calculate_intermods(&channel);
        let found = self.detect_conflicts(&channel, &new_intermods);

        let frequency = channel.frequency();
        self.insert_sorted(channel);
        self.intermods.merge(&new_intermods);
        self.note_id(id);

        let conflicts = found.len();
        for conflict in found {
            self.record(conflict);
        }

        debug!(
            channel = %id,
            frequency,
            intermods = new_intermods.len(),
            conflicts,
            "Channel added"
        );
        Ok(id)
    }

    /// Remove a channel with every intermod it generates and every conflict
    /// it takes part in. Returns the channel with its conflict list cleared.
    pub fn remove_channel(&mut self, id: ChannelId) -> Result<Channel> {
        if self.position(id).is_none() {
            return Err(CoordinationError::unknown_channel(id));
        }

        let doomed = self.conflicts.referencing(id);
        let conflicts = doomed.len();
        for conflict_id in doomed {
            self.release(conflict_id);
        }

        let position = self
            .position(id)
            .ok_or_else(|| CoordinationError::unknown_channel(id))?;
        let mut channel = self.channels.remove(position);
        channel.clear_conflicts();
        let intermods = self.intermods.remove_generator(id);

        debug!(
            channel = %id,
            frequency = channel.frequency(),
            intermods,
            conflicts,
            "Channel removed"
        );
        Ok(channel)
    }

    /// Replace the channel sharing `channel`'s id, recomputing everything it
    /// takes part in. Returns the previous version.
    pub fn update_channel(&mut self, channel: Channel) -> Result<Channel> {
        let id = channel.id();
        let previous = self.remove_channel(id)?;
        self.add_channel(channel)?;
        debug!(channel = %id, from = previous.frequency(), "Channel updated");
        Ok(previous)
    }

    /// Names take no part in analysis, so renaming keeps derived state.
    pub fn rename_channel(&mut self, id: ChannelId, name: impl Into<String>) -> Result<()> {
        let position = self
            .position(id)
            .ok_or_else(|| CoordinationError::unknown_channel(id))?;
        self.channels[position].set_name(name);
        Ok(())
    }

    /// Attach the advisory white space conflict to a channel.
    pub fn flag_white_space(&mut self, id: ChannelId) -> Result<ConflictId> {
        if self.position(id).is_none() {
            return Err(CoordinationError::unknown_channel(id));
        }
        self.record(Conflict::WhiteSpace { channel: id })
            .ok_or_else(|| CoordinationError::unknown_channel(id))
    }

    /// Remove one conflict from the table and from its victim.
    pub fn remove_conflict(&mut self, id: ConflictId) -> Result<Conflict> {
        let missing = || CoordinationError::invalid_argument(format!("conflict {id} not found"));
        self.release(id).ok_or_else(missing)
    }

    /// Change which intermod types are computed and rebuild.
    pub fn set_calculations(&mut self, calculations: ImCalculations) -> Result<()> {
        self.calculations = calculations;
        self.rebuild()
    }

    /// Recompute every intermod and conflict from the channel list alone.
    ///
    /// Uses a separate full calculation rather than replaying adds. White
    /// space flags are carried over.
    pub fn rebuild(&mut self) -> Result<()> {
        let flagged: Vec<ChannelId> = self
            .conflicts
            .iter()
            .filter(|(_, conflict)| conflict.kind() == ConflictKind::WhiteSpace)
            .map(|(_, conflict)| conflict.channel())
            .collect();

        self.conflicts.clear();
        self.intermods.clear();
        self.counters = ConflictCounters::default();
        for channel in &mut self.channels {
            channel.clear_conflicts();
        }

        let intermods = all_intermods(&self.channels, &self.calculations);
        let mut found = Vec::new();
        for channel in &self.channels {
            scan_intermods(channel, &intermods, &mut found);
        }
        for (i, channel) in self.channels.iter().enumerate() {
            for other in &self.channels[i + 1..] {
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

        self.intermods.merge(&intermods);
        for conflict in found {
            self.record(conflict);
        }
        for id in flagged {
            self.flag_white_space(id)?;
        }

        debug!(
            channels = self.channels.len(),
            intermods = self.intermods.len(),
            conflicts = self.conflicts.len(),
            "Analysis rebuilt"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // dry run
    // -----------------------------------------------------------------------

    /// What [`add_channel`](Self::add_channel) would compute for `candidate`,
    /// leaving the analyser untouched.
    pub fn check_artifacts(&self, candidate: &Channel) -> Result<ArtifactReport> {
        if self.position(candidate.id()).is_some() {
            return Err(CoordinationError::invalid_argument(format!(
                "candidate id {} is already present",
                candidate.id()
            )));
        }
        let intermods = self.calculate_intermods(candidate);
        let conflicts = self.detect_conflicts(candidate, &intermods);
        let validity = Validity::from_kinds(
            conflicts
                .iter()
                .filter(|conflict| conflict.channel() == candidate.id())
                .map(Conflict::kind),
        );
        trace!(
            candidate = %candidate.id(),
            frequency = candidate.frequency(),
            conflicts = conflicts.len(),
            "Checked artifacts"
        );
        Ok(ArtifactReport {
            intermods,
            conflicts,
            validity,
        })
    }

    // -----------------------------------------------------------------------
    // queries
    // -----------------------------------------------------------------------

    /// Channels in frequency order.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.id() == id)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Intermods in sorted order.
    pub fn intermods(&self) -> &[Intermod] {
        self.intermods.as_slice()
    }

    pub fn intermod_count(&self) -> usize {
        self.intermods.len()
    }

    /// Intermods with `lo < frequency < hi`.
    pub fn intermods_in_window(&self, lo: i32, hi: i32) -> &[Intermod] {
        self.intermods.window(lo, hi)
    }

    pub fn conflicts(&self) -> impl Iterator<Item = (ConflictId, &Conflict)> {
        self.conflicts.iter()
    }

    pub fn conflict(&self, id: ConflictId) -> Option<&Conflict> {
        self.conflicts.get(id)
    }

    /// Conflicts whose victim is `id`.
    pub fn conflicts_for(&self, id: ChannelId) -> Vec<&Conflict> {
        self.channel(id)
            .map(|channel| {
                channel
                    .conflict_ids()
                    .filter_map(|key| self.conflicts.get(key))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn counters(&self) -> &ConflictCounters {
        &self.counters
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    pub fn channel_conflict_count(&self) -> usize {
        self.counters.channel_spacing
    }

    pub fn intermod_conflict_count(&self, kind: IntermodType) -> usize {
        self.counters.intermod(kind)
    }

    pub fn white_space_conflict_count(&self) -> usize {
        self.counters.white_space
    }

    /// Channels with no conflicts at all.
    pub fn valid_channel_count(&self) -> usize {
        self.channels
            .iter()
            .filter(|channel| channel.validity() == Validity::Valid)
            .count()
    }

    pub fn calculations(&self) -> &ImCalculations {
        &self.calculations
    }

    // -----------------------------------------------------------------------
    // search support
    // -----------------------------------------------------------------------

    pub(crate) fn calculate_intermods(&self, channel: &Channel) -> Vec<Intermod> {
        calculate_intermods(channel.as_generator(), &self.channels, &self.calculations)
    }

    /// Conflicts `channel` would take part in against current state, given
    /// the products it would form.
    pub(crate) fn detect_conflicts(
        &self,
        channel: &Channel,
        new_intermods: &[Intermod],
    ) -> Vec<Conflict> {
        let mut found = Vec::new();
        scan_intermods(channel, self.intermods.as_slice(), &mut found);
        for existing in &self.channels {
            scan_intermods(existing, new_intermods, &mut found);
        }
        scan_channels(channel, &self.channels, &mut found);
        found
    }

    /// Add a conflict-free channel so that
    /// [`rollback_tentative`](Self::rollback_tentative) can undo it exactly.
    pub(crate) fn commit_tentative(&mut self, channel: Channel, new_intermods: &[Intermod]) {
        self.insert_sorted(channel);
        self.intermods.merge_tentative(new_intermods);
    }

    /// Undo the latest [`commit_tentative`](Self::commit_tentative).
    pub(crate) fn rollback_tentative(&mut self, id: ChannelId) -> Option<Channel> {
        self.intermods.rollback();
        let position = self.position(id)?;
        Some(self.channels.remove(position))
    }

    /// Keep every tentative commit.
    pub(crate) fn release_tentative(&mut self) {
        self.intermods.release_backups();
        if let Some(max) = self.channels.iter().map(Channel::id).max() {
            self.note_id(max);
        }
    }

    // -----------------------------------------------------------------------
    // bookkeeping
    // -----------------------------------------------------------------------

    fn position(&self, id: ChannelId) -> Option<usize> {
        self.channels.iter().position(|channel| channel.id() == id)
    }

    fn insert_sorted(&mut self, channel: Channel) {
        let index = self.channels.partition_point(|existing| {
            Channel::cmp_frequency(existing, &channel) == Ordering::Less
        });
        self.channels.insert(index, channel);
    }

    /// Table, victim list and counter updated together.
    fn record(&mut self, conflict: Conflict) -> Option<ConflictId> {
        let position = self.position(conflict.channel())?;
        let kind = conflict.kind();
        let id = self.conflicts.insert(conflict);
        self.channels[position].push_conflict(id, kind);
        self.counters.increment(kind);
        Some(id)
    }

    fn release(&mut self, id: ConflictId) -> Option<Conflict> {
        let conflict = self.conflicts.remove(id)?;
        if let Some(position) = self.position(conflict.channel()) {
            self.channels[position].drop_conflict(id);
        }
        self.counters.decrement(conflict.kind());
        Some(conflict)
    }
}
