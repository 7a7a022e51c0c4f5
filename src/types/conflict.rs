//! Conflicts, conflict kinds and per-kind counters.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ChannelId, Generator, Intermod, IntermodType};
use crate::frequency::format_mhz;

/// Stable key of a conflict in the analyser's conflict table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConflictId(pub u64);

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Classification of a conflict, including the intermod type for
/// intermod-spacing conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
    ChannelSpacing,
    IntermodSpacing(IntermodType),
    WhiteSpace,
}

/// A detected violation, attributed to the affected (victim) channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// `channel` sits closer to `other` than its own equipment allows.
    ChannelSpacing {
        channel: ChannelId,
        other: Generator,
    },
    /// `channel` sits closer to `intermod` than its equipment allows for that type.
    IntermodSpacing {
        channel: ChannelId,
        intermod: Intermod,
    },
    /// Advisory flag with no paired cause.
    WhiteSpace { channel: ChannelId },
}

impl Conflict {
    /// The affected channel.
    pub fn channel(&self) -> ChannelId {
        match self {
            Conflict::ChannelSpacing { channel, .. }
            | Conflict::IntermodSpacing { channel, .. }
            | Conflict::WhiteSpace { channel } => *channel,
        }
    }

    pub fn kind(&self) -> ConflictKind {
        match self {
            Conflict::ChannelSpacing { .. } => ConflictKind::ChannelSpacing,
            Conflict::IntermodSpacing { intermod, .. } => {
                ConflictKind::IntermodSpacing(intermod.kind())
            }
            Conflict::WhiteSpace { .. } => ConflictKind::WhiteSpace,
        }
    }

    /// Whether removing channel `id` invalidates this conflict: it is the
    /// victim, the other channel, or a generator of the intermod.
    pub fn references(&self, id: ChannelId) -> bool {
        match self {
            Conflict::ChannelSpacing { channel, other } => *channel == id || other.id == id,
            Conflict::IntermodSpacing { channel, intermod } => {
                *channel == id || intermod.involves(id)
            }
            Conflict::WhiteSpace { channel } => *channel == id,
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::ChannelSpacing { other, .. } => {
                let frequency = format_mhz(other.frequency);
                write!(f, "Channel spacing violation ({frequency})")
            }
            Conflict::IntermodSpacing { intermod, .. } => {
                write!(f, "{} violation ({})", intermod.kind(), intermod)
            }
            Conflict::WhiteSpace { .. } => f.write_str("Possible white space violation"),
        }
    }
}

/// Derived channel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Validity {
    Valid,
    Warning,
    Invalid,
}

impl Validity {
    /// `Valid` with no conflicts, `Warning` with exactly one white space
    /// conflict, `Invalid` otherwise.
    pub fn from_kinds(kinds: impl IntoIterator<Item = ConflictKind>) -> Self {
        let mut kinds = kinds.into_iter();
        match (kinds.next(), kinds.next()) {
            (None, _) => Validity::Valid,
            (Some(ConflictKind::WhiteSpace), None) => Validity::Warning,
            _ => Validity::Invalid,
        }
    }
}

/// Conflict totals by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCounters {
    pub channel_spacing: usize,
    pub intermod: [usize; 5],
    pub white_space: usize,
}

impl ConflictCounters {
    pub fn get(&self, kind: ConflictKind) -> usize {
        match kind {
            ConflictKind::ChannelSpacing => self.channel_spacing,
            ConflictKind::IntermodSpacing(im) => self.intermod[im.index()],
            ConflictKind::WhiteSpace => self.white_space,
        }
    }

    pub fn intermod(&self, kind: IntermodType) -> usize {
        self.intermod[kind.index()]
    }

    pub fn total(&self) -> usize {
        self.channel_spacing + self.intermod.iter().sum::<usize>() + self.white_space
    }

    pub(crate) fn increment(&mut self, kind: ConflictKind) {
        *self.slot(kind) += 1;
    }

    pub(crate) fn decrement(&mut self, kind: ConflictKind) {
        let slot = self.slot(kind);
        *slot = slot.saturating_sub(1);
    }

    fn slot(&mut self, kind: ConflictKind) -> &mut usize {
        match kind {
            ConflictKind::ChannelSpacing => &mut self.channel_spacing,
            ConflictKind::IntermodSpacing(im) => &mut self.intermod[im.index()],
            ConflictKind::WhiteSpace => &mut self.white_space,
        }
    }
}
