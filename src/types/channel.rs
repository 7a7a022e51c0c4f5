//! Tuned channels.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::{ConflictId, ConflictKind, Equipment, Generator, Range, Validity};
use crate::frequency::mhz_value;
use crate::{CoordinationError, Result};

/// Channel identifier. Allocated once by the analyser and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u32);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tuned RF emitter.
///
/// The frequency always lies on the equipment's tuning grid and, when a range
/// is bound, inside that range. Every constructor and setter enforces this.
///
/// The conflict list holds the conflicts this channel is the victim of. Only
/// the analyser writes it; a channel handed to the analyser starts clean.
#[derive(Debug, Clone)]
pub struct Channel {
    id: ChannelId,
    frequency: i32,
    name: String,
    equipment: Arc<Equipment>,
    range: Option<Range>,
    conflicts: Vec<(ConflictId, ConflictKind)>,
}

impl Channel {
    /// Create a channel named `Channel {id + 1}`.
    pub fn new(id: ChannelId, frequency: i32, equipment: Arc<Equipment>) -> Result<Self> {
        equipment.check_frequency(frequency, None)?;
        Ok(Self {
            id,
            frequency,
            name: format!("Channel {}", u64::from(id.0) + 1),
            equipment,
            range: None,
            conflicts: Vec::new(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_range(mut self, range: Range) -> Result<Self> {
        self.set_range(Some(range))?;
        Ok(self)
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn frequency(&self) -> i32 {
        self.frequency
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn equipment(&self) -> &Arc<Equipment> {
        &self.equipment
    }

    pub fn range(&self) -> Option<&Range> {
        self.range.as_ref()
    }

    pub fn as_generator(&self) -> Generator {
        Generator::new(self.id, self.frequency)
    }

    /// Retune, keeping the bound range.
    pub fn set_frequency(&mut self, frequency: i32) -> Result<()> {
        self.equipment.check_frequency(frequency, self.range.as_ref())?;
        self.frequency = frequency;
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Swap equipment. The bound range belongs to the old equipment and is cleared.
    pub fn set_equipment(&mut self, equipment: Arc<Equipment>) -> Result<()> {
        equipment.check_frequency(self.frequency, None)?;
        self.equipment = equipment;
        self.range = None;
        Ok(())
    }

    /// Bind or clear the tuning range. A bound range must be one of the
    /// equipment's ranges and must contain the current frequency.
    pub fn set_range(&mut self, range: Option<Range>) -> Result<()> {
        if let Some(range) = &range {
            if !self.equipment.has_range(range) {
                return Err(CoordinationError::invalid_argument(format!(
                    "range {range} is not offered by {}",
                    self.equipment
                )));
            }
            if !range.contains(self.frequency) {
                return Err(CoordinationError::out_of_range(self.frequency, range));
            }
        }
        self.range = range;
        Ok(())
    }

    /// Equipment ranges that contain the current frequency.
    pub fn assignable_ranges(&self) -> Vec<&Range> {
        self.equipment.ranges_containing(self.frequency).collect()
    }

    pub fn validity(&self) -> Validity {
        Validity::from_kinds(self.conflicts.iter().map(|(_, kind)| *kind))
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    pub fn conflict_ids(&self) -> impl Iterator<Item = ConflictId> + '_ {
        self.conflicts.iter().map(|(id, _)| *id)
    }

    pub(crate) fn push_conflict(&mut self, id: ConflictId, kind: ConflictKind) {
        self.conflicts.push((id, kind));
    }

    pub(crate) fn drop_conflict(&mut self, id: ConflictId) -> bool {
        let before = self.conflicts.len();
        self.conflicts.retain(|(existing, _)| *existing != id);
        self.conflicts.len() != before
    }

    pub(crate) fn clear_conflicts(&mut self) {
        self.conflicts.clear();
    }

    /// Frequency order with id as tie-break.
    pub fn cmp_frequency(a: &Channel, b: &Channel) -> Ordering {
        a.frequency.cmp(&b.frequency).then(a.id.cmp(&b.id))
    }

    /// Id order with frequency as tie-break.
    pub fn cmp_id(a: &Channel, b: &Channel) -> Ordering {
        a.id.cmp(&b.id).then(a.frequency.cmp(&b.frequency))
    }

    /// Case-insensitive name order with frequency as tie-break.
    pub fn cmp_name(a: &Channel, b: &Channel) -> Ordering {
        let a_name = a.name.chars().flat_map(char::to_lowercase);
        let b_name = b.name.chars().flat_map(char::to_lowercase);
        a_name.cmp(b_name).then(a.frequency.cmp(&b.frequency))
    }
}

/// Equipment, name and frequency. The id is not part of equality.
impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.frequency == other.frequency
            && self.name == other.name
            && *self.equipment == *other.equipment
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&mhz_value(self.frequency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImSpacing;

    fn equipment() -> Arc<Equipment> {
        let ranges = vec![
            Range::new(470_000, 542_000, "G7E"),
            Range::new(518_000, 608_000, "K4E"),
        ];
        let spacing = ImSpacing::new(100, 90, 0, 0, 50);
        let psm = Equipment::new("Shure", "PSM900", 25, 300, spacing).unwrap();
        Arc::new(psm.with_ranges(ranges).unwrap())
    }

    fn tuned(id: u32, frequency: i32) -> Channel {
        Channel::new(ChannelId(id), frequency, equipment()).unwrap()
    }

    fn g7e() -> Range {
        Range::new(470_000, 542_000, "G7E")
    }

    #[test]
    fn new_channel_defaults() {
        let channel = tuned(0, 500_550);
        assert_eq!(channel.name(), "Channel 1");
        assert_eq!(channel.to_string(), "500.550");
        assert_eq!(channel.validity(), Validity::Valid);
        assert!(channel.range().is_none());
    }

    #[test]
    fn off_grid_frequency_is_rejected() {
        let result = Channel::new(ChannelId(0), 500_551, equipment());
        assert!(matches!(
            result,
            Err(CoordinationError::InvalidFrequency {
                frequency: 500_551,
                ..
            })
        ));

        let mut channel = tuned(0, 500_550);
        assert!(channel.set_frequency(500_560).is_err());
        assert_eq!(channel.frequency(), 500_550);
    }

    #[test]
    fn bound_range_constrains_retuning() {
        let mut channel = tuned(0, 500_000).with_range(g7e()).unwrap();
        assert!(channel.set_frequency(542_000).is_ok());
        assert!(matches!(
            channel.set_frequency(542_025),
            Err(CoordinationError::InvalidFrequency { .. })
        ));

        channel.set_range(None).unwrap();
        assert!(channel.set_frequency(542_025).is_ok());
    }

    #[test]
    fn foreign_or_excluding_range_is_rejected() {
        let mut channel = tuned(0, 500_000);
        let other = Range::new(470_000, 542_000, "other");
        assert!(channel.set_range(Some(other)).is_err());
        let k4e = Range::new(518_000, 608_000, "K4E");
        assert!(channel.set_range(Some(k4e)).is_err());
        assert!(channel.range().is_none());
    }

    #[test]
    fn assignable_ranges_contain_frequency() {
        let channel = tuned(0, 530_000);
        let ranges = channel.assignable_ranges();
        let names: Vec<&str> = ranges.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["G7E", "K4E"]);

        assert_eq!(tuned(0, 600_000).assignable_ranges().len(), 1);
    }

    #[test]
    fn set_equipment_revalidates_and_clears_range() {
        let mut channel = tuned(0, 500_025).with_range(g7e()).unwrap();
        let spacing = ImSpacing::default();
        let coarse = Equipment::new("Sennheiser", "EW100", 50, 400, spacing);
        let coarse = Arc::new(coarse.unwrap());
        assert!(channel.set_equipment(coarse.clone()).is_err());
        assert!(channel.range().is_some());

        channel.set_frequency(500_050).unwrap();
        channel.set_equipment(coarse).unwrap();
        assert!(channel.range().is_none());
        assert_eq!(channel.equipment().to_string(), "Sennheiser EW100");
    }

    #[test]
    fn validity_follows_conflicts() {
        let mut channel = tuned(0, 500_000);
        channel.push_conflict(ConflictId(1), ConflictKind::WhiteSpace);
        assert_eq!(channel.validity(), Validity::Warning);
        channel.push_conflict(ConflictId(2), ConflictKind::ChannelSpacing);
        assert_eq!(channel.validity(), Validity::Invalid);
        assert!(channel.drop_conflict(ConflictId(2)));
        assert!(!channel.drop_conflict(ConflictId(2)));
        assert_eq!(channel.validity(), Validity::Warning);
        channel.clear_conflicts();
        assert_eq!(channel.validity(), Validity::Valid);
    }

    #[test]
    fn equality_ignores_id() {
        let a = tuned(0, 500_000).with_name("IEM");
        let b = tuned(9, 500_000).with_name("IEM");
        let c = tuned(9, 500_025).with_name("IEM");
        assert_eq!(a, b);
        assert_ne!(b, c);
    }

    #[test]
    fn comparators() {
        let mut channels = vec![
            tuned(2, 500_000).with_name("bravo"),
            tuned(1, 501_000).with_name("Alpha"),
            tuned(1, 499_000).with_name("alpha"),
        ];
        let frequencies = |channels: &[Channel]| -> Vec<i32> {
            channels.iter().map(Channel::frequency).collect()
        };

        channels.sort_by(Channel::cmp_frequency);
        assert_eq!(frequencies(&channels), [499_000, 500_000, 501_000]);

        channels.sort_by(Channel::cmp_id);
        assert_eq!(frequencies(&channels), [499_000, 501_000, 500_000]);

        channels.sort_by(Channel::cmp_name);
        let names: Vec<&str> = channels.iter().map(Channel::name).collect();
        assert_eq!(names, ["alpha", "Alpha", "bravo"]);
    }
}
