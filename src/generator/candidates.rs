//! Candidate frequency sets for the generator.

use rand::Rng;

use crate::analyser::Analyser;
use crate::frequency::grid_points;
use crate::types::{Channel, Equipment, Intermod, Range};

/// Sorted grid points still open for one slot.
///
/// Window removal is open on both ends: removing `spacing` around `centre`
/// drops exactly the points `p` with `|p − centre| < spacing`, matching the
/// analyser's conflict predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    points: Vec<i32>,
    lo: i32,
    hi: i32,
}

impl CandidateSet {
    /// Every multiple of `tuning_accuracy` inside `range`.
    pub fn grid(range: &Range, tuning_accuracy: i32) -> Self {
        Self {
            points: grid_points(range.lo, range.hi, tuning_accuracy).collect(),
            lo: range.lo,
            hi: range.hi,
        }
    }

    /// Grid points of `range` that clear every channel and intermod in
    /// `analyser` for `equipment`.
    pub fn from_analyser(analyser: &Analyser, equipment: &Equipment, range: &Range) -> Self {
        let mut candidates = Self::grid(range, equipment.tuning_accuracy());
        for channel in analyser.channels() {
            candidates.exclude_channel(equipment, channel);
        }
        for intermod in analyser.intermods() {
            candidates.exclude_intermod(equipment, intermod);
        }
        candidates
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, frequency: i32) -> bool {
        self.points.binary_search(&frequency).is_ok()
    }

    pub fn points(&self) -> &[i32] {
        &self.points
    }

    /// Drop every point strictly within `spacing` of `centre`.
    pub fn remove_window(&mut self, centre: i32, spacing: i32) {
        if spacing <= 0 {
            return;
        }
        let lo = centre.saturating_sub(spacing);
        let hi = centre.saturating_add(spacing);
        if hi < self.lo || lo > self.hi {
            return;
        }
        let start = self.points.partition_point(|point| *point <= lo);
        let end = self.points.partition_point(|point| *point < hi);
        if start < end {
            self.points.drain(start..end);
        }
    }

    /// Points where a channel on `equipment` would clash with `channel` in
    /// either direction.
    pub fn exclude_channel(&mut self, equipment: &Equipment, channel: &Channel) {
        let spacing = equipment
            .channel_spacing()
            .max(channel.equipment().channel_spacing());
        self.remove_window(channel.frequency(), spacing);
    }

    /// Points where a channel on `equipment` would sit on `intermod`.
    pub fn exclude_intermod(&mut self, equipment: &Equipment, intermod: &Intermod) {
        self.remove_window(intermod.frequency(), equipment.spacing(intermod.kind()));
    }

    /// Remove and return the lowest point.
    pub fn take_lowest(&mut self) -> Option<i32> {
        if self.points.is_empty() {
            None
        } else {
            Some(self.points.remove(0))
        }
    }

    /// Remove and return a uniformly chosen point.
    pub fn take_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<i32> {
        if self.points.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.points.len());
        Some(self.points.remove(index))
    }
}
