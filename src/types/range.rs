//! Labelled tuning ranges.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::frequency::{format_mhz, grid_len};
use crate::{CoordinationError, Result};

/// Inclusive frequency interval (kHz) an equipment profile can tune to.
///
/// Field order drives the derived ordering: `(lo, hi, name)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Range {
    pub lo: i32,
    pub hi: i32,
    #[serde(default)]
    pub name: String,
}

impl Range {
    pub fn new(lo: i32, hi: i32, name: impl Into<String>) -> Self {
        Self {
            lo,
            hi,
            name: name.into(),
        }
    }

    /// Reject inverted intervals.
    pub fn validate(&self) -> Result<()> {
        if self.lo > self.hi {
            return Err(CoordinationError::invalid_argument(format!(
                "range '{}' has lo {} above hi {}",
                self.name, self.lo, self.hi
            )));
        }
        Ok(())
    }

    pub fn contains(&self, frequency: i32) -> bool {
        self.lo <= frequency && frequency <= self.hi
    }

    /// Whether this range shares at least one frequency with `[lo, hi]`.
    pub fn overlaps(&self, lo: i32, hi: i32) -> bool {
        self.lo <= hi && lo <= self.hi
    }

    /// Number of tuning grid points inside the range.
    pub fn grid_len(&self, tuning_accuracy: i32) -> usize {
        grid_len(self.lo, self.hi, tuning_accuracy)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = (format_mhz(self.lo), format_mhz(self.hi));
        write!(f, "{} ({lo} - {hi})", self.name)
    }
}
