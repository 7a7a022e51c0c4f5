//! Equipment catalogues.
//!
//! A catalogue is an ordered list of equipment profiles loaded from a JSON or
//! YAML document. It is an ordinary value: whatever builds channels takes the
//! catalogue it should draw profiles from.
//!
//! ```rust
//! use rfcoord::EquipmentCatalogue;
//!
//! let catalogue = EquipmentCatalogue::from_json_str(r#"[
//!   {"manufacturer": "Shure", "model": "PSM900", "tuningAccuracy": 25,
//!    "spacingChannel": 300, "spacing2t3o": 100, "spacing2t5o": 90,
//!    "spacing2t7o": 0, "spacing2t9o": 0, "spacing3t3o": 50,
//!    "ranges": [{"lo": 470000, "hi": 506000, "name": "G6"}]}
//! ]"#)?;
//!
//! let psm = catalogue.find("shure", "psm900").expect("profile present");
//! assert_eq!(psm.channel_spacing(), 300);
//! # Ok::<(), rfcoord::CoordinationError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::document::{DocumentFormat, read_document, write_document};
use crate::types::Equipment;
use crate::Result;

/// Ordered list of shared equipment profiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquipmentCatalogue {
    profiles: Vec<Arc<Equipment>>,
}

impl EquipmentCatalogue {
    pub fn new(profiles: impl IntoIterator<Item = Equipment>) -> Self {
        Self {
            profiles: profiles.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::parse(DocumentFormat::Json, text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::parse(DocumentFormat::Yaml, text)
    }

    /// Load a catalogue file. The extension picks the format.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let catalogue: Self = read_document(path, "equipment catalogue")?;
        info!(
            path = %path.display(),
            profiles = catalogue.len(),
            "Loaded equipment catalogue"
        );
        Ok(catalogue)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_document(path.as_ref(), self, "equipment catalogue")
    }

    fn parse(format: DocumentFormat, text: &str) -> Result<Self> {
        let catalogue: Self = format.parse(text, "equipment catalogue")?;
        info!(profiles = catalogue.len(), "Parsed equipment catalogue");
        Ok(catalogue)
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Equipment>> {
        self.profiles.get(index)
    }

    /// Look a profile up by manufacturer and model, ignoring case.
    pub fn find(&self, manufacturer: &str, model: &str) -> Option<&Arc<Equipment>> {
        self.profiles.iter().find(|profile| {
            profile.manufacturer().eq_ignore_ascii_case(manufacturer)
                && profile.model().eq_ignore_ascii_case(model)
        })
    }

    /// Position of a profile, matched by value.
    pub fn index_of(&self, equipment: &Equipment) -> Option<usize> {
        self.profiles
            .iter()
            .position(|profile| **profile == *equipment)
    }

    /// Append a profile, returning its index. An equal profile is reused.
    pub fn insert(&mut self, equipment: Arc<Equipment>) -> usize {
        match self.index_of(&equipment) {
            Some(index) => index,
            None => {
                self.profiles.push(equipment);
                self.profiles.len() - 1
            }
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Equipment>> {
        self.profiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoordinationError;
    use crate::test_utils::{require_fixture, test_data_dir};
    use crate::types::{ImSpacing, IntermodType};
    use anyhow::{Context, Result};

    const YAML: &str = r#"
- manufacturer: Shure
  model: UHF-R
  tuningAccuracy: 25
  spacingChannel: 325
  spacing2t3o: 175
  spacing2t5o: 0
  spacing2t7o: 0
  spacing2t9o: 0
  spacing3t3o: 50
  ranges:
    - { lo: 606000, hi: 614000, name: CH38 }
- manufacturer: Sennheiser
  model: EW G3
  tuningAccuracy: 25
  spacingChannel: 250
  spacing2t3o: 100
  spacing2t5o: 50
  spacing2t7o: 0
  spacing2t9o: 0
  spacing3t3o: 50
"#;

    #[test]
    fn yaml_catalogue_loads_in_order() {
        let catalogue = EquipmentCatalogue::from_yaml_str(YAML).unwrap();
        assert_eq!(catalogue.len(), 2);
        assert_eq!(catalogue.get(0).unwrap().to_string(), "Shure UHF-R");
        assert_eq!(catalogue.get(0).unwrap().ranges().len(), 1);
        assert!(catalogue.get(0).unwrap().ranges()[0].contains(610_000));
        assert!(catalogue.get(1).unwrap().ranges().is_empty());
        assert!(catalogue.get(2).is_none());
    }

    #[test]
    fn find_ignores_case() {
        let catalogue = EquipmentCatalogue::from_yaml_str(YAML).unwrap();
        let g3 = catalogue.find("SENNHEISER", "ew g3").unwrap();
        assert_eq!(g3.channel_spacing(), 250);
        assert!(catalogue.find("Shure", "PSM1000").is_none());
    }

    #[test]
    fn invalid_profile_fails_the_whole_load() {
        let json = r#"[{"manufacturer": "Bad", "model": "Step",
            "tuningAccuracy": 0, "spacingChannel": 300,
            "spacing2t3o": 100, "spacing2t5o": 90, "spacing2t7o": 0,
            "spacing2t9o": 0, "spacing3t3o": 50}]"#;
        assert!(matches!(
            EquipmentCatalogue::from_json_str(json),
            Err(CoordinationError::Parse { .. })
        ));
    }

    #[test]
    fn json_round_trip() {
        let catalogue = EquipmentCatalogue::from_yaml_str(YAML).unwrap();
        let json = serde_json::to_string(&catalogue).unwrap();
        assert_eq!(EquipmentCatalogue::from_json_str(&json).unwrap(), catalogue);
    }

    #[test]
    fn insert_reuses_equal_profiles() {
        let mut catalogue = EquipmentCatalogue::default();
        let spacing = ImSpacing::default();
        let profile = Equipment::new("A", "B", 25, 300, spacing).unwrap();
        assert_eq!(catalogue.insert(Arc::new(profile.clone())), 0);
        assert_eq!(catalogue.insert(Arc::new(profile)), 0);
        let other = Equipment::new("A", "C", 25, 300, spacing).unwrap();
        assert_eq!(catalogue.insert(Arc::new(other)), 1);
        assert_eq!(catalogue.iter().count(), 2);
    }

    #[test]
    fn load_from_disk_by_extension() {
        let name = format!("rfcoord-catalogue-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("profiles.yml");
        std::fs::write(&path, YAML).unwrap();

        let catalogue = EquipmentCatalogue::load(&path).unwrap();
        assert_eq!(catalogue.len(), 2);

        let json_path = dir.join("profiles.json");
        catalogue.save(&json_path).unwrap();
        assert_eq!(EquipmentCatalogue::load(&json_path).unwrap(), catalogue);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn fixture_catalogue_loads() -> Result<()> {
        let _ = tracing_subscriber::fmt::try_init();
        let catalogue = EquipmentCatalogue::load(require_fixture("equipment.yaml")?)?;
        assert_eq!(catalogue.len(), 4);

        let uhf_r = catalogue.find("shure", "uhf-r").context("UHF-R missing")?;
        assert_eq!(uhf_r.to_string(), "Shure UHF-R");
        assert_eq!(uhf_r.channel_spacing(), 325);
        assert_eq!(uhf_r.spacing(IntermodType::TwoTone3rd), 175);
        let names: Vec<&str> = uhf_r.ranges().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["G1E", "H4E", "Channel 38", "K4E"]);
        assert_eq!(uhf_r.ranges_containing(610_000).count(), 3);
        Ok(())
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let result = EquipmentCatalogue::load(test_data_dir().join("equipment.toml"));
        assert!(matches!(
            result,
            Err(CoordinationError::InvalidArgument { .. })
        ));
    }
}
