//! Equipment constraint profiles.
//!
//! An [`Equipment`] is immutable once built and shared between channels
//! through `Arc`. The serialized form is flat so catalogue documents read the
//! same way a profile sheet does:
//!
//! ```json
//! {
//!   "manufacturer": "Shure", "model": "PSM900",
//!   "tuningAccuracy": 25, "spacingChannel": 300,
//!   "spacing2t3o": 100, "spacing2t5o": 90, "spacing2t7o": 0,
//!   "spacing2t9o": 0, "spacing3t3o": 50,
//!   "ranges": [{ "lo": 606000, "hi": 614000, "name": "CH38" }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{IntermodType, Range};
use crate::{CoordinationError, Result};

/// Minimum channel-to-intermod separation (kHz) per intermod type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImSpacing {
    pub two_tone_3rd: i32,
    pub two_tone_5th: i32,
    pub two_tone_7th: i32,
    pub two_tone_9th: i32,
    pub three_tone_3rd: i32,
}

impl ImSpacing {
    pub fn new(
        two_tone_3rd: i32,
        two_tone_5th: i32,
        two_tone_7th: i32,
        two_tone_9th: i32,
        three_tone_3rd: i32,
    ) -> Self {
        Self {
            two_tone_3rd,
            two_tone_5th,
            two_tone_7th,
            two_tone_9th,
            three_tone_3rd,
        }
    }

    pub fn get(&self, kind: IntermodType) -> i32 {
        match kind {
            IntermodType::TwoTone3rd => self.two_tone_3rd,
            IntermodType::TwoTone5th => self.two_tone_5th,
            IntermodType::TwoTone7th => self.two_tone_7th,
            IntermodType::TwoTone9th => self.two_tone_9th,
            IntermodType::ThreeTone3rd => self.three_tone_3rd,
        }
    }

    /// Widest danger window of the five types.
    pub fn max(&self) -> i32 {
        IntermodType::ALL
            .iter()
            .map(|kind| self.get(*kind))
            .max()
            .unwrap_or(0)
    }
}

/// Tuning grid, spacing minimums and tuning ranges of one equipment model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EquipmentRecord", into = "EquipmentRecord")]
pub struct Equipment {
    manufacturer: String,
    model: String,
    tuning_accuracy: i32,
    channel_spacing: i32,
    spacing: ImSpacing,
    max_im_spacing: i32,
    ranges: Vec<Range>,
}

impl Equipment {
    /// Build a profile, rejecting a non-positive grid step or negative spacings.
    pub fn new(
        manufacturer: impl Into<String>,
        model: impl Into<String>,
        tuning_accuracy: i32,
        channel_spacing: i32,
        spacing: ImSpacing,
    ) -> Result<Self> {
        let equipment = Self {
            manufacturer: manufacturer.into(),
            model: model.into(),
            tuning_accuracy,
            channel_spacing,
            max_im_spacing: spacing.max(),
            spacing,
            ranges: Vec::new(),
        };
        equipment.validate()?;
        Ok(equipment)
    }

    /// Attach the tuning ranges this equipment supports. Ranges are kept sorted.
    pub fn with_ranges(mut self, mut ranges: Vec<Range>) -> Result<Self> {
        for range in &ranges {
            range.validate()?;
        }
        ranges.sort();
        self.ranges = ranges;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tuning_accuracy <= 0 {
            return Err(CoordinationError::invalid_argument(format!(
                "{self}: tuning accuracy must be positive, got {}",
                self.tuning_accuracy
            )));
        }
        let negative = std::iter::once(self.channel_spacing)
            .chain(IntermodType::ALL.iter().map(|kind| self.spacing.get(*kind)))
            .any(|value| value < 0);
        if negative {
            return Err(CoordinationError::invalid_argument(format!(
                "{self}: spacings must not be negative"
            )));
        }
        self.ranges.iter().try_for_each(Range::validate)
    }

    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tuning_accuracy(&self) -> i32 {
        self.tuning_accuracy
    }

    pub fn channel_spacing(&self) -> i32 {
        self.channel_spacing
    }

    /// Required channel-to-intermod separation for one intermod type.
    pub fn spacing(&self, kind: IntermodType) -> i32 {
        self.spacing.get(kind)
    }

    pub fn im_spacing(&self) -> &ImSpacing {
        &self.spacing
    }

    pub fn max_im_spacing(&self) -> i32 {
        self.max_im_spacing
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn has_range(&self, range: &Range) -> bool {
        self.ranges.binary_search(range).is_ok()
    }

    /// Ranges that contain `frequency`.
    pub fn ranges_containing(&self, frequency: i32) -> impl Iterator<Item = &Range> {
        self.ranges
            .iter()
            .filter(move |range| range.contains(frequency))
    }

    pub fn is_on_grid(&self, frequency: i32) -> bool {
        frequency.checked_rem(self.tuning_accuracy) == Some(0)
    }

    /// A frequency is valid when it sits on the tuning grid and, if a range is
    /// bound, inside that range.
    pub fn is_frequency_valid(&self, frequency: i32, range: Option<&Range>) -> bool {
        self.is_on_grid(frequency) && range.is_none_or(|range| range.contains(frequency))
    }

    /// [`is_frequency_valid`](Self::is_frequency_valid) with a reason on failure.
    pub fn check_frequency(&self, frequency: i32, range: Option<&Range>) -> Result<()> {
        if !self.is_on_grid(frequency) {
            return Err(CoordinationError::off_grid(frequency, self.tuning_accuracy));
        }
        match range {
            Some(range) if !range.contains(frequency) => {
                Err(CoordinationError::out_of_range(frequency, range))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.manufacturer.is_empty() || self.model.is_empty() {
            write!(f, "{}{}", self.manufacturer, self.model)
        } else {
            write!(f, "{} {}", self.manufacturer, self.model)
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EquipmentRecord {
    #[serde(default)]
    manufacturer: String,
    #[serde(default)]
    model: String,
    tuning_accuracy: i32,
    spacing_channel: i32,
    #[serde(rename = "spacing2t3o")]
    spacing_2t3o: i32,
    #[serde(rename = "spacing2t5o")]
    spacing_2t5o: i32,
    #[serde(rename = "spacing2t7o")]
    spacing_2t7o: i32,
    #[serde(rename = "spacing2t9o")]
    spacing_2t9o: i32,
    #[serde(rename = "spacing3t3o")]
    spacing_3t3o: i32,
    #[serde(default)]
    ranges: Vec<Range>,
}

impl TryFrom<EquipmentRecord> for Equipment {
    type Error = CoordinationError;

    fn try_from(record: EquipmentRecord) -> Result<Self> {
        let spacing = ImSpacing::new(
            record.spacing_2t3o,
            record.spacing_2t5o,
            record.spacing_2t7o,
            record.spacing_2t9o,
            record.spacing_3t3o,
        );
        let equipment = Equipment::new(
            record.manufacturer,
            record.model,
            record.tuning_accuracy,
            record.spacing_channel,
            spacing,
        )?;
        equipment.with_ranges(record.ranges)
    }
}

impl From<Equipment> for EquipmentRecord {
    fn from(equipment: Equipment) -> Self {
        let spacing = equipment.spacing;
        Self {
            manufacturer: equipment.manufacturer,
            model: equipment.model,
            tuning_accuracy: equipment.tuning_accuracy,
            spacing_channel: equipment.channel_spacing,
            spacing_2t3o: spacing.two_tone_3rd,
            spacing_2t5o: spacing.two_tone_5th,
            spacing_2t7o: spacing.two_tone_7th,
            spacing_2t9o: spacing.two_tone_9th,
            spacing_3t3o: spacing.three_tone_3rd,
            ranges: equipment.ranges,
        }
    }
}
