//! Core types for coordination data.
//!
//! This module provides the value types the analyser and generator work on.
//! All frequencies are integer kHz.
//!
//! ## Architecture
//!
//! - [`Equipment`] is an immutable constraint profile shared through `Arc`
//! - [`Range`] is a labelled inclusive interval an equipment can tune to
//! - [`Channel`] is a tuned emitter with a derived [`Validity`]
//! - [`Intermod`] is a derived product of two or three channels
//! - [`Conflict`] is a violation attributed to one victim channel
//!
//! Channels never hold conflicts directly. They hold [`ConflictId`] keys into
//! the analyser's conflict table, so the table is the single owner.
//!
//! ## Usage Example
//!
//! ```rust
//! use rfcoord::types::{Channel, ChannelId, Equipment, ImSpacing, Range, Validity};
//! use std::sync::Arc;
//!
//! let equipment = Equipment::new("Shure", "PSM900", 25, 300, ImSpacing::new(100, 90, 0, 0, 50))?
//!     .with_ranges(vec![Range::new(606_000, 614_000, "CH38")])?;
//! let channel = Channel::new(ChannelId(0), 606_500, Arc::new(equipment))?;
//!
//! assert_eq!(channel.to_string(), "606.500");
//! assert_eq!(channel.validity(), Validity::Valid);
//! assert_eq!(channel.assignable_ranges().len(), 1);
//! # Ok::<(), rfcoord::CoordinationError>(())
//! ```

mod channel;
mod conflict;
mod equipment;
mod intermod;
mod range;

pub use channel::{Channel, ChannelId};
pub use conflict::{Conflict, ConflictCounters, ConflictId, ConflictKind, Validity};
pub use equipment::{Equipment, ImSpacing};
pub use intermod::{Generator, Intermod, IntermodType};
pub use range::Range;
