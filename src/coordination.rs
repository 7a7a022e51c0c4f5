//! Id-addressed coordination facade.
//!
//! [`Coordination`] wraps an [`Analyser`] with the operations a frequency
//! plan editor needs: channels are addressed by id, edits go through the
//! analyser so derived state stays current, and the whole plan can be saved
//! to and restored from a [`CoordinationSnapshot`].
//!
//! ```rust
//! use rfcoord::{Coordination, Equipment, ImSpacing, Validity};
//! use std::sync::Arc;
//!
//! let spacing = ImSpacing::new(100, 90, 0, 0, 50);
//! let psm = Arc::new(Equipment::new("Shure", "PSM900", 25, 300, spacing)?);
//! let mut plan = Coordination::new();
//! plan.add_channel(470_050, psm.clone())?;
//!
//! let report = plan.new_channel_report(470_200, &psm)?;
//! assert_eq!(report.validity, Validity::Invalid);
//! assert!(!report.duplicate);
//! assert_eq!(plan.channel_count(), 1);
//! # Ok::<(), rfcoord::CoordinationError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::analyser::{Analyser, ImCalculations};
use crate::catalogue::EquipmentCatalogue;
use crate::document::{DocumentFormat, read_document, write_document};
use crate::generator::{ChannelTemplate, FrequencyGenerator, GenerationReport, GeneratorConfig};
use crate::types::{
    Channel, ChannelId, Conflict, ConflictCounters, ConflictId, ConflictKind, Equipment,
    IntermodType, Range, Validity,
};
use crate::{CoordinationError, Result};

/// Dry-run verdict for a frequency that is not in the plan yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChannelReport {
    /// Conflicts the new channel would cause or suffer.
    pub conflicts: usize,
    /// The new channel's own validity.
    pub validity: Validity,
    /// An existing channel already sits on this frequency.
    pub duplicate: bool,
}

/// A frequency plan: channels plus their derived conflict state.
#[derive(Debug, Clone, Default)]
pub struct Coordination {
    analyser: Analyser,
}

impl Coordination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calculations(calculations: ImCalculations) -> Self {
        Self {
            analyser: Analyser::with_calculations(calculations),
        }
    }

    pub fn from_analyser(analyser: Analyser) -> Self {
        Self { analyser }
    }

    pub fn analyser(&self) -> &Analyser {
        &self.analyser
    }

    pub fn into_analyser(self) -> Analyser {
        self.analyser
    }

    // -----------------------------------------------------------------------
    // editing
    // -----------------------------------------------------------------------

    /// Add a channel under the next free id.
    pub fn add_channel(&mut self, frequency: i32, equipment: Arc<Equipment>) -> Result<ChannelId> {
        let channel = Channel::new(self.analyser.peek_next_id(), frequency, equipment)?;
        self.analyser.add_channel(channel)
    }

    pub fn add_named_channel(
        &mut self,
        frequency: i32,
        name: impl Into<String>,
        equipment: Arc<Equipment>,
    ) -> Result<ChannelId> {
        let channel = Channel::new(self.analyser.peek_next_id(), frequency, equipment)?
            .with_name(name);
        self.analyser.add_channel(channel)
    }

    pub fn remove_channel(&mut self, id: ChannelId) -> Result<Channel> {
        self.analyser.remove_channel(id)
    }

    pub fn set_frequency(&mut self, id: ChannelId, frequency: i32) -> Result<()> {
        self.edit(id, |channel| channel.set_frequency(frequency))
    }

    pub fn set_name(&mut self, id: ChannelId, name: impl Into<String>) -> Result<()> {
        self.analyser.rename_channel(id, name)
    }

    /// Swap equipment. Clears the bound range.
    pub fn set_equipment(&mut self, id: ChannelId, equipment: Arc<Equipment>) -> Result<()> {
        self.edit(id, |channel| channel.set_equipment(equipment))
    }

    pub fn set_range(&mut self, id: ChannelId, range: Option<Range>) -> Result<()> {
        self.edit(id, |channel| channel.set_range(range))
    }

    pub fn flag_white_space(&mut self, id: ChannelId) -> Result<ConflictId> {
        self.analyser.flag_white_space(id)
    }

    pub fn remove_conflict(&mut self, id: ConflictId) -> Result<Conflict> {
        self.analyser.remove_conflict(id)
    }

    pub fn set_calculations(&mut self, calculations: ImCalculations) -> Result<()> {
        self.analyser.set_calculations(calculations)
    }

    /// Apply `change` to a copy and swap it in only if the change succeeds.
    fn edit(
        &mut self,
        id: ChannelId,
        change: impl FnOnce(&mut Channel) -> Result<()>,
    ) -> Result<()> {
        let mut channel = self
            .channel(id)
            .ok_or_else(|| CoordinationError::unknown_channel(id))?
            .clone();
        change(&mut channel)?;
        self.analyser.update_channel(channel)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // queries
    // -----------------------------------------------------------------------

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.analyser.channel(id)
    }

    /// Channels in frequency order.
    pub fn channels(&self) -> &[Channel] {
        self.analyser.channels()
    }

    pub fn channel_count(&self) -> usize {
        self.analyser.channel_count()
    }

    pub fn intermod_count(&self) -> usize {
        self.analyser.intermod_count()
    }

    pub fn counters(&self) -> &ConflictCounters {
        self.analyser.counters()
    }

    pub fn conflict_count(&self) -> usize {
        self.analyser.conflict_count()
    }

    pub fn channel_conflict_count(&self) -> usize {
        self.analyser.channel_conflict_count()
    }

    pub fn intermod_conflict_count(&self, kind: IntermodType) -> usize {
        self.analyser.intermod_conflict_count(kind)
    }

    pub fn valid_channel_count(&self) -> usize {
        self.analyser.valid_channel_count()
    }

    /// What adding a channel at `frequency` on `equipment` would do.
    pub fn new_channel_report(
        &self,
        frequency: i32,
        equipment: &Arc<Equipment>,
    ) -> Result<NewChannelReport> {
        let candidate = Channel::new(self.analyser.peek_next_id(), frequency, equipment.clone())?;
        let artifacts = self.analyser.check_artifacts(&candidate)?;
        let duplicate = self
            .channels()
            .iter()
            .any(|channel| channel.frequency() == frequency);
        Ok(NewChannelReport {
            conflicts: artifacts.conflict_count(),
            validity: artifacts.validity,
            duplicate,
        })
    }

    // -----------------------------------------------------------------------
    // generation
    // -----------------------------------------------------------------------

    /// Find and add `count` conflict-free channels on `equipment` within `range`.
    pub fn add_new_channels(
        &mut self,
        count: usize,
        equipment: Arc<Equipment>,
        range: Range,
        config: &GeneratorConfig,
    ) -> Result<GenerationReport> {
        crate::generator::add_new_channels(&mut self.analyser, count, equipment, range, config)
    }

    /// Fill arbitrary slots. See [`FrequencyGenerator::generate`].
    pub fn generate(
        &mut self,
        templates: &[ChannelTemplate],
        config: &GeneratorConfig,
    ) -> Result<GenerationReport> {
        let mut generator = FrequencyGenerator::new(config.clone());
        generator.generate(&mut self.analyser, templates)
    }

    /// Retune the listed channels to fresh conflict-free frequencies.
    ///
    /// Every listed channel must have a bound range. The channels keep their
    /// ids, names, equipment and ranges. Unless the search finds a complete
    /// assignment the plan is restored as it was.
    pub fn update_frequencies(
        &mut self,
        ids: &[ChannelId],
        config: &GeneratorConfig,
    ) -> Result<GenerationReport> {
        let mut seen = HashSet::new();
        let mut templates = Vec::with_capacity(ids.len());
        for &id in ids {
            if !seen.insert(id) {
                return Err(CoordinationError::invalid_argument(format!(
                    "channel {id} listed twice"
                )));
            }
            let channel = self
                .channel(id)
                .ok_or_else(|| CoordinationError::unknown_channel(id))?;
            let range = channel
                .range()
                .ok_or(CoordinationError::MissingRange { channel: id })?;
            templates.push(
                ChannelTemplate::new(channel.equipment().clone(), range.clone())
                    .with_id(id)
                    .with_name(channel.name()),
            );
        }

        let mut originals = Vec::with_capacity(ids.len());
        for &id in ids {
            let flagged = self.has_white_space_flag(id);
            originals.push((self.analyser.remove_channel(id)?, flagged));
        }

        let mut generator = FrequencyGenerator::new(config.clone());
        let result = generator.generate(&mut self.analyser, &templates);
        let found = match &result {
            Ok(report) if report.is_found() => true,
            Ok(report) => {
                warn!(
                    channels = ids.len(),
                    outcome = ?report.outcome,
                    "Retune failed, restoring channels"
                );
                false
            }
            Err(error) => {
                warn!(channels = ids.len(), %error, "Retune failed, restoring channels");
                false
            }
        };
        if found {
            debug!(channels = ids.len(), "Channels retuned");
            return result;
        }

        for (channel, flagged) in originals {
            let id = self.analyser.add_channel(channel)?;
            if flagged {
                self.analyser.flag_white_space(id)?;
            }
        }
        result
    }

    fn has_white_space_flag(&self, id: ChannelId) -> bool {
        self.analyser
            .conflicts_for(id)
            .iter()
            .any(|conflict| conflict.kind() == ConflictKind::WhiteSpace)
    }

    // -----------------------------------------------------------------------
    // persistence
    // -----------------------------------------------------------------------

    /// Capture the plan. Derived state is not stored; restoring recomputes it.
    pub fn snapshot(&self) -> CoordinationSnapshot {
        let mut equipment = EquipmentCatalogue::default();
        let mut channels: Vec<ChannelRecord> = self
            .channels()
            .iter()
            .map(|channel| ChannelRecord {
                id: channel.id(),
                frequency: channel.frequency(),
                name: channel.name().to_string(),
                equipment: equipment.insert(channel.equipment().clone()),
                range: channel.range().cloned(),
                white_space: self.has_white_space_flag(channel.id()),
            })
            .collect();
        channels.sort_by_key(|record| record.id);

        CoordinationSnapshot {
            calculations: *self.analyser.calculations(),
            equipment,
            channels,
            next_id: self.analyser.peek_next_id(),
        }
    }

    /// Rebuild a plan from a snapshot, recomputing every derived artifact.
    pub fn from_snapshot(snapshot: &CoordinationSnapshot) -> Result<Self> {
        let mut analyser = Analyser::with_calculations(snapshot.calculations);
        for record in &snapshot.channels {
            let equipment = snapshot.equipment.get(record.equipment).ok_or_else(|| {
                CoordinationError::invalid_argument(format!(
                    "channel {} refers to missing equipment #{}",
                    record.id, record.equipment
                ))
            })?;
            let mut channel = Channel::new(record.id, record.frequency, equipment.clone())?
                .with_name(&record.name);
            channel.set_range(record.range.clone())?;
            analyser.add_channel(channel)?;
            if record.white_space {
                analyser.flag_white_space(record.id)?;
            }
        }
        analyser.reserve_ids(snapshot.next_id);
        debug!(
            channels = analyser.channel_count(),
            conflicts = analyser.conflict_count(),
            "Coordination restored"
        );
        Ok(Self { analyser })
    }

    pub fn to_json(&self) -> Result<String> {
        DocumentFormat::Json.render(&self.snapshot(), "coordination snapshot")
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_snapshot(&DocumentFormat::Json.parse(text, "coordination snapshot")?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        DocumentFormat::Yaml.render(&self.snapshot(), "coordination snapshot")
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Self::from_snapshot(&DocumentFormat::Yaml.parse(text, "coordination snapshot")?)
    }

    /// Write the snapshot. The extension picks the format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_document(path.as_ref(), &self.snapshot(), "coordination snapshot")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let snapshot: CoordinationSnapshot =
            read_document(path.as_ref(), "coordination snapshot")?;
        Self::from_snapshot(&snapshot)
    }
}

/// Serializable plan: equipment table, channels by id, id counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinationSnapshot {
    #[serde(default)]
    pub calculations: ImCalculations,
    pub equipment: EquipmentCatalogue,
    pub channels: Vec<ChannelRecord>,
    #[serde(default = "first_id")]
    pub next_id: ChannelId,
}

fn first_id() -> ChannelId {
    ChannelId(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    pub id: ChannelId,
    /// kHz.
    pub frequency: i32,
    pub name: String,
    /// Index into the snapshot's equipment table.
    pub equipment: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub white_space: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SearchOutcome;
    use crate::test_utils::{channel_38, reference_equipment, require_fixture, uhf_r};
    use crate::types::ImSpacing;
    use anyhow::{Context, Result};
    use std::path::PathBuf;

    fn psm900() -> Arc<Equipment> {
        let ranges = vec![
            Range::new(470_000, 506_000, "G6"),
            Range::new(606_000, 614_000, "CH38"),
        ];
        let spacing = ImSpacing::new(100, 90, 0, 0, 50);
        let profile = Equipment::new("Shure", "PSM900", 25, 300, spacing).unwrap();
        Arc::new(profile.with_ranges(ranges).unwrap())
    }

    fn ch38() -> Range {
        Range::new(606_000, 614_000, "CH38")
    }

    fn fixture_catalogue() -> Result<EquipmentCatalogue> {
        let path = require_fixture("equipment.yaml")?;
        Ok(EquipmentCatalogue::load(path)?)
    }

    fn profile(catalogue: &EquipmentCatalogue, model: &str) -> Result<Arc<Equipment>> {
        let equipment = catalogue
            .find("Shure", model)
            .with_context(|| format!("{model} missing from the fixture"))?;
        Ok(equipment.clone())
    }

    fn scratch_dir(label: &str) -> Result<PathBuf> {
        let name = format!("rfcoord-{label}-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    // -----------------------------------------------------------------------
    // editing
    // -----------------------------------------------------------------------

    #[test]
    fn edits_keep_derived_state_current() {
        let mut plan = Coordination::new();
        let a = plan.add_channel(606_000, psm900()).unwrap();
        let b = plan.add_named_channel(606_100, "Vocal", psm900()).unwrap();
        assert_eq!(plan.channel_conflict_count(), 2);
        assert_eq!(plan.channel(b).unwrap().name(), "Vocal");

        plan.set_frequency(b, 607_000).unwrap();
        assert_eq!(plan.channel_conflict_count(), 0);
        assert_eq!(plan.valid_channel_count(), 2);

        plan.set_name(a, "Guitar").unwrap();
        assert_eq!(plan.channel(a).unwrap().name(), "Guitar");
        assert!(plan.set_name(ChannelId(99), "x").is_err());
    }

    #[test]
    fn failed_edit_changes_nothing() {
        let mut plan = Coordination::new();
        let id = plan.add_channel(606_000, psm900()).unwrap();
        plan.set_range(id, Some(ch38())).unwrap();

        let err = plan.set_frequency(id, 620_000).unwrap_err();
        assert!(matches!(err, CoordinationError::InvalidFrequency { .. }));
        assert_eq!(plan.channel(id).unwrap().frequency(), 606_000);

        assert!(plan.set_frequency(id, 606_010).is_err());
        let g6 = Range::new(470_000, 506_000, "G6");
        assert!(plan.set_range(id, Some(g6)).is_err());
        let bound = plan.channel(id).and_then(Channel::range);
        assert_eq!(bound.map(|r| r.name.as_str()), Some("CH38"));
    }

    #[test]
    fn new_channel_report_flags_duplicates() {
        let mut plan = Coordination::new();
        plan.add_channel(606_000, psm900()).unwrap();
        let report = plan.new_channel_report(606_000, &psm900()).unwrap();
        assert!(report.duplicate);
        assert_eq!(report.validity, Validity::Invalid);
        assert_eq!(report.conflicts, 2);

        let clear = plan.new_channel_report(607_000, &psm900()).unwrap();
        let expected = NewChannelReport {
            conflicts: 0,
            validity: Validity::Valid,
            duplicate: false,
        };
        assert_eq!(clear, expected);
        assert_eq!(plan.channel_count(), 1);
    }

    // -----------------------------------------------------------------------
    // retuning
    // -----------------------------------------------------------------------

    #[test]
    fn update_requires_bound_ranges_before_mutating() {
        let mut plan = Coordination::new();
        let bound = plan.add_channel(606_000, psm900()).unwrap();
        plan.set_range(bound, Some(ch38())).unwrap();
        let loose = plan.add_channel(606_100, psm900()).unwrap();

        let config = GeneratorConfig::default();
        let result = plan.update_frequencies(&[bound, loose], &config);
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            CoordinationError::MissingRange { channel } if channel == loose
        ));
        assert_eq!(plan.channel_count(), 2);
        assert_eq!(plan.channel(bound).unwrap().frequency(), 606_000);
    }

    #[test]
    fn retune_without_range_is_rejected() -> Result<()> {
        let mut plan = Coordination::new();
        let id = plan.add_channel(687_000, reference_equipment())?;

        let result = plan.update_frequencies(&[id], &GeneratorConfig::default());
        assert!(matches!(
            result,
            Err(CoordinationError::MissingRange { channel }) if channel == id
        ));
        assert_eq!(plan.channel(id).map(Channel::frequency), Some(687_000));
        Ok(())
    }

    #[test]
    fn update_retunes_in_place() {
        let mut plan = Coordination::new();
        let a = plan.add_named_channel(606_000, "A", psm900()).unwrap();
        let b = plan.add_named_channel(606_100, "B", psm900()).unwrap();
        plan.set_range(a, Some(ch38())).unwrap();
        plan.set_range(b, Some(ch38())).unwrap();
        assert!(plan.conflict_count() > 0);

        let config = GeneratorConfig::default();
        let report = plan.update_frequencies(&[a, b], &config).unwrap();
        assert!(report.is_found());
        assert_eq!(report.channels, vec![a, b]);
        assert_eq!(plan.conflict_count(), 0);
        assert_eq!(plan.channel(a).unwrap().name(), "A");
        assert_eq!(plan.channel(b).unwrap().range(), Some(&ch38()));
    }

    #[test]
    fn retune_whole_coordination() -> Result<()> {
        let _ = tracing_subscriber::fmt::try_init();
        let equipment = uhf_r(channel_38());

        let mut plan = Coordination::new();
        let mut ids = Vec::new();
        for _ in 0..11 {
            let id = plan.add_channel(606_000, equipment.clone())?;
            let assignable = plan.channel(id).map(|c| c.assignable_ranges()[0].clone());
            plan.set_range(id, assignable)?;
            ids.push(id);
        }
        assert!(plan.conflict_count() > 0);
        assert_eq!(plan.valid_channel_count(), 0);

        let report = plan.update_frequencies(&ids, &GeneratorConfig::default())?;
        assert!(report.is_found());
        assert_eq!(plan.conflict_count(), 0);
        assert_eq!(plan.valid_channel_count(), 11);
        let valid = |channel: &Channel| channel.validity() == Validity::Valid;
        assert!(plan.channels().iter().all(valid));
        Ok(())
    }

    #[test]
    fn failed_update_restores_channels() {
        let range = Range::new(606_000, 606_400, "tight");
        let spacing = ImSpacing::new(100, 90, 0, 0, 50);
        let tight = Equipment::new("", "Tight", 25, 300, spacing).unwrap();
        let tight = Arc::new(tight.with_ranges(vec![range.clone()]).unwrap());

        let mut plan = Coordination::new();
        let ids: Vec<ChannelId> = [606_000, 606_100, 606_200]
            .into_iter()
            .map(|f| {
                let id = plan.add_channel(f, tight.clone()).unwrap();
                plan.set_range(id, Some(range.clone())).unwrap();
                id
            })
            .collect();
        plan.flag_white_space(ids[1]).unwrap();
        let before = *plan.counters();

        let config = GeneratorConfig::default();
        let report = plan.update_frequencies(&ids, &config).unwrap();
        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert_eq!(*plan.counters(), before);
        assert_eq!(plan.channel(ids[2]).unwrap().frequency(), 606_200);
        assert_eq!(plan.channel(ids[1]).unwrap().validity(), Validity::Invalid);
    }

    // -----------------------------------------------------------------------
    // snapshots
    // -----------------------------------------------------------------------

    #[test]
    fn snapshot_round_trip_preserves_analysis() {
        let mut plan = Coordination::new();
        for frequency in [606_000, 606_300, 606_775, 607_100, 607_150] {
            plan.add_channel(frequency, psm900()).unwrap();
        }
        plan.set_range(ChannelId(0), Some(ch38())).unwrap();
        plan.flag_white_space(ChannelId(3)).unwrap();
        plan.remove_channel(ChannelId(4)).unwrap();

        for restored in [
            Coordination::from_json(&plan.to_json().unwrap()).unwrap(),
            Coordination::from_yaml(&plan.to_yaml().unwrap()).unwrap(),
        ] {
            assert_eq!(restored.channel_count(), plan.channel_count());
            assert_eq!(restored.intermod_count(), plan.intermod_count());
            assert_eq!(restored.counters(), plan.counters());
            for channel in plan.channels() {
                let other = restored.channel(channel.id()).unwrap();
                assert_eq!(other, channel);
                assert_eq!(other.validity(), channel.validity());
            }
            assert_eq!(restored.analyser().peek_next_id(), ChannelId(5));
        }

        let snapshot = plan.snapshot();
        assert_eq!(snapshot.equipment.len(), 1);
        let ascending = |pair: &[ChannelRecord]| pair[0].id < pair[1].id;
        assert!(snapshot.channels.windows(2).all(ascending));
    }

    #[test]
    fn snapshot_with_dangling_equipment_is_rejected() {
        let snapshot = CoordinationSnapshot {
            calculations: ImCalculations::all(),
            equipment: EquipmentCatalogue::default(),
            channels: vec![ChannelRecord {
                id: ChannelId(0),
                frequency: 606_000,
                name: "Channel 1".into(),
                equipment: 0,
                range: None,
                white_space: false,
            }],
            next_id: ChannelId(1),
        };
        assert!(matches!(
            Coordination::from_snapshot(&snapshot),
            Err(CoordinationError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn calculations_travel_with_the_snapshot() -> Result<()> {
        let psm = profile(&fixture_catalogue()?, "PSM900")?;

        let mut calculations = ImCalculations::all();
        calculations.set(IntermodType::ThreeTone3rd, false);
        let mut plan = Coordination::with_calculations(calculations);
        for frequency in [606_000, 606_300, 606_775, 607_100] {
            plan.add_channel(frequency, psm.clone())?;
        }
        assert_eq!(plan.intermod_conflict_count(IntermodType::ThreeTone3rd), 0);

        let restored = Coordination::from_json(&plan.to_json()?)?;
        assert_eq!(restored.analyser().calculations(), &calculations);
        assert_eq!(restored.intermod_count(), plan.intermod_count());
        Ok(())
    }

    #[test]
    fn snapshot_text_is_stable() -> Result<()> {
        let psm = profile(&fixture_catalogue()?, "PSM900")?;
        let mut plan = Coordination::new();
        let id = plan.add_named_channel(470_050, "Wedge", psm)?;
        plan.set_range(id, Some(Range::new(470_000, 506_000, "G6")))?;

        let json = plan.to_json()?;
        let value: serde_json::Value = serde_json::from_str(&json)?;
        let channel = &value["channels"][0];
        assert_eq!(channel["frequency"], 470_050);
        assert_eq!(channel["name"], "Wedge");
        assert_eq!(channel["range"]["name"], "G6");
        assert!(channel.get("whiteSpace").is_none());
        assert_eq!(value["equipment"][0]["spacingChannel"], 300);
        assert_eq!(value["nextId"], 1);
        Ok(())
    }

    #[test]
    fn malformed_snapshot_is_a_parse_error() {
        let result = Coordination::from_yaml("channels: [not, a, plan");
        assert!(matches!(result, Err(CoordinationError::Parse { .. })));
    }

    #[test]
    fn plan_survives_a_file_round_trip() -> Result<()> {
        let _ = tracing_subscriber::fmt::try_init();
        let catalogue = fixture_catalogue()?;
        let uhf_r = profile(&catalogue, "UHF-R")?;
        let psm = profile(&catalogue, "PSM900")?;
        let ch38 = uhf_r
            .ranges()
            .iter()
            .find(|range| range.name == "Channel 38")
            .cloned()
            .context("Channel 38 missing")?;

        let mut plan = Coordination::new();
        let config = GeneratorConfig::default();
        let report = plan.add_new_channels(6, uhf_r.clone(), ch38, &config)?;
        assert!(report.is_found());
        let iem = plan.add_named_channel(606_150, "IEM 1", psm.clone())?;
        plan.add_channel(612_000, psm)?;
        plan.flag_white_space(iem)?;
        plan.remove_channel(ChannelId(2))?;
        assert!(plan.conflict_count() > 0);

        let dir = scratch_dir("plan")?;
        for name in ["plan.json", "plan.yaml"] {
            let path = dir.join(name);
            plan.save(&path)?;
            let restored = Coordination::load(&path)?;

            assert_eq!(restored.channel_count(), plan.channel_count());
            assert_eq!(restored.intermod_count(), plan.intermod_count());
            assert_eq!(restored.counters(), plan.counters());
            for channel in plan.channels() {
                let other = restored.channel(channel.id()).context("channel lost")?;
                assert_eq!(other.frequency(), channel.frequency());
                assert_eq!(other.name(), channel.name());
                assert_eq!(other.range(), channel.range());
                assert_eq!(other.validity(), channel.validity());
            }
            assert_eq!(
                restored.analyser().peek_next_id(),
                plan.analyser().peek_next_id()
            );
        }
        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
