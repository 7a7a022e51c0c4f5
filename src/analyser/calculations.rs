//! Intermod type toggles and the combinatorial product calculation.

use serde::{Deserialize, Serialize};

use crate::types::{Channel, Generator, Intermod, IntermodType};

/// Which intermod types the analyser computes. Disabling a type only skips
/// computation; the spacing predicates are unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImCalculations {
    pub two_tone_3rd: bool,
    pub two_tone_5th: bool,
    pub two_tone_7th: bool,
    pub two_tone_9th: bool,
    pub three_tone_3rd: bool,
}

impl Default for ImCalculations {
    fn default() -> Self {
        Self::all()
    }
}

impl ImCalculations {
    pub fn all() -> Self {
        Self {
            two_tone_3rd: true,
            two_tone_5th: true,
            two_tone_7th: true,
            two_tone_9th: true,
            three_tone_3rd: true,
        }
    }

    pub fn none() -> Self {
        Self {
            two_tone_3rd: false,
            two_tone_5th: false,
            two_tone_7th: false,
            two_tone_9th: false,
            three_tone_3rd: false,
        }
    }

    pub fn is_enabled(&self, kind: IntermodType) -> bool {
        match kind {
            IntermodType::TwoTone3rd => self.two_tone_3rd,
            IntermodType::TwoTone5th => self.two_tone_5th,
            IntermodType::TwoTone7th => self.two_tone_7th,
            IntermodType::TwoTone9th => self.two_tone_9th,
            IntermodType::ThreeTone3rd => self.three_tone_3rd,
        }
    }

    pub fn set(&mut self, kind: IntermodType, enabled: bool) {
        match kind {
            IntermodType::TwoTone3rd => self.two_tone_3rd = enabled,
            IntermodType::TwoTone5th => self.two_tone_5th = enabled,
            IntermodType::TwoTone7th => self.two_tone_7th = enabled,
            IntermodType::TwoTone9th => self.two_tone_9th = enabled,
            IntermodType::ThreeTone3rd => self.three_tone_3rd = enabled,
        }
    }

    /// Enabled two-tone types, in ordinal order.
    pub fn two_tone_types(&self) -> impl Iterator<Item = IntermodType> + '_ {
        IntermodType::TWO_TONE
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
    }

    /// `n·(n−1)·s + t·n·(n−1)·(n−2)/2` for `n` channels, `s` enabled two-tone
    /// types and `t` the three-tone toggle.
    pub fn expected_intermod_count(&self, channels: usize) -> usize {
        let n = channels;
        if n < 2 {
            return 0;
        }
        let two_tone = n * (n - 1) * self.two_tone_types().count();
        let three_tone = if self.three_tone_3rd {
            n * (n - 1) * (n - 2) / 2
        } else {
            0
        };
        two_tone + three_tone
    }
}

/// Products `channel` forms with every other channel in `others`, sorted.
///
/// Two-tone products are emitted in both argument orders. Each unordered
/// triple yields its three rotations `(c, a, b)`, `(a, b, c)`, `(b, c, a)`.
/// Entries of `others` sharing `channel`'s id are skipped.
pub(crate) fn calculate_intermods(
    channel: Generator,
    others: &[Channel],
    calculations: &ImCalculations,
) -> Vec<Intermod> {
    let others: Vec<Generator> = others
        .iter()
        .filter(|other| other.id() != channel.id)
        .map(Channel::as_generator)
        .collect();
    let two_tone: Vec<IntermodType> = calculations.two_tone_types().collect();

    let n = others.len();
    let triples = if calculations.three_tone_3rd {
        3 * n * n.saturating_sub(1) / 2
    } else {
        0
    };
    let mut intermods = Vec::with_capacity(2 * n * two_tone.len() + triples);

    for (i, &second) in others.iter().enumerate() {
        for &kind in &two_tone {
            intermods.push(Intermod::two_tone(kind, channel, second));
            intermods.push(Intermod::two_tone(kind, second, channel));
        }
        if calculations.three_tone_3rd {
            for &third in &others[i + 1..] {
                intermods.push(Intermod::three_tone(channel, second, third));
                intermods.push(Intermod::three_tone(second, third, channel));
                intermods.push(Intermod::three_tone(third, channel, second));
            }
        }
    }

    intermods.sort_unstable();
    intermods
}

/// Every product of every ordered pair and rotated triple in `channels`,
/// computed from scratch and sorted.
pub(crate) fn all_intermods(channels: &[Channel], calculations: &ImCalculations) -> Vec<Intermod> {
    let generators: Vec<Generator> = channels.iter().map(Channel::as_generator).collect();
    let two_tone: Vec<IntermodType> = calculations.two_tone_types().collect();
    let mut intermods = Vec::with_capacity(calculations.expected_intermod_count(generators.len()));

    for (i, &a) in generators.iter().enumerate() {
        for (j, &b) in generators.iter().enumerate() {
            if i != j {
                intermods.extend(two_tone.iter().map(|kind| Intermod::two_tone(*kind, a, b)));
            }
        }
    }
    if calculations.three_tone_3rd {
        for (i, &a) in generators.iter().enumerate() {
            for (j, &b) in generators.iter().enumerate().skip(i + 1) {
                for &c in &generators[j + 1..] {
                    intermods.push(Intermod::three_tone(a, b, c));
                    intermods.push(Intermod::three_tone(b, c, a));
                    intermods.push(Intermod::three_tone(c, a, b));
                }
            }
        }
    }

    intermods.sort_unstable();
    intermods
}
