//! Incremental RF intermodulation analysis and conflict-free frequency generation.
//!
//! rfcoord checks a set of wireless channels for two classes of RF conflict:
//! channels tuned too close together, and channels sitting on the
//! intermodulation products of other channels. It also searches for new
//! frequencies that add no conflict to an existing plan.
//!
//! # Features
//!
//! - **Incremental analysis**: adding or removing a channel touches only the
//!   products and conflicts it takes part in
//! - **Dry runs**: preview what a channel would add without changing state
//! - **Backtracking search**: fill slots with conflict-free frequencies, with
//!   exact rollback when a search fails
//! - **Catalogues and snapshots**: JSON and YAML equipment profiles and plans
//!
//! All frequencies are integer kHz.
//!
//! # Quick Start
//!
//! ```rust
//! use rfcoord::{Coordination, Equipment, GeneratorConfig, ImSpacing, Range};
//! use std::sync::Arc;
//!
//! let ch38 = Range::new(606_000, 614_000, "Channel 38");
//! let uhf_r = Arc::new(
//!     Equipment::new("Shure", "UHF-R", 25, 325, ImSpacing::new(175, 0, 0, 0, 50))?
//!         .with_ranges(vec![ch38.clone()])?,
//! );
//!
//! let mut plan = Coordination::new();
//! plan.add_channel(606_000, uhf_r.clone())?;
//!
//! let report = plan.add_new_channels(5, uhf_r, ch38, &GeneratorConfig::default())?;
//! assert!(report.is_found());
//! assert_eq!(plan.channel_count(), 6);
//! assert_eq!(plan.conflict_count(), 0);
//! # Ok::<(), rfcoord::CoordinationError>(())
//! ```

// Core types and error handling
mod error;
pub mod frequency;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Analysis and search
pub mod analyser;
pub mod generator;

// Documents and the plan facade
pub mod catalogue;
pub mod coordination;
pub mod document;

// Core exports
pub use error::*;
pub use types::*;

pub use analyser::{Analyser, ArtifactReport, ImCalculations};
pub use catalogue::EquipmentCatalogue;
pub use coordination::{ChannelRecord, Coordination, CoordinationSnapshot, NewChannelReport};
pub use document::DocumentFormat;
pub use generator::{
    ChannelTemplate, FrequencyGenerator, GenerationReport, GeneratorConfig, SearchOutcome,
    SearchStats, Selection,
};
