//! Intermodulation products.
//!
//! An [`Intermod`] is derived state: the analyser creates one for every
//! ordered pair or rotated triple of channels and drops it when any of its
//! generators leaves. Each generator is captured as a [`Generator`] (id plus
//! frequency at creation) so an intermod never borrows a channel.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::ChannelId;
use crate::frequency::format_mhz;

/// Intermodulation product type, by tone count and order.
///
/// Declaration order is the ordinal used when sorting intermods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntermodType {
    #[serde(rename = "2T3O")]
    TwoTone3rd,
    #[serde(rename = "2T5O")]
    TwoTone5th,
    #[serde(rename = "2T7O")]
    TwoTone7th,
    #[serde(rename = "2T9O")]
    TwoTone9th,
    #[serde(rename = "3T3O")]
    ThreeTone3rd,
}

impl IntermodType {
    pub const ALL: [IntermodType; 5] = [
        IntermodType::TwoTone3rd,
        IntermodType::TwoTone5th,
        IntermodType::TwoTone7th,
        IntermodType::TwoTone9th,
        IntermodType::ThreeTone3rd,
    ];

    pub const TWO_TONE: [IntermodType; 4] = [
        IntermodType::TwoTone3rd,
        IntermodType::TwoTone5th,
        IntermodType::TwoTone7th,
        IntermodType::TwoTone9th,
    ];

    /// Position in [`IntermodType::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn tones(self) -> u8 {
        match self {
            IntermodType::ThreeTone3rd => 3,
            _ => 2,
        }
    }

    pub fn order(self) -> u8 {
        match self {
            IntermodType::TwoTone3rd | IntermodType::ThreeTone3rd => 3,
            IntermodType::TwoTone5th => 5,
            IntermodType::TwoTone7th => 7,
            IntermodType::TwoTone9th => 9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IntermodType::TwoTone3rd => "2T3O",
            IntermodType::TwoTone5th => "2T5O",
            IntermodType::TwoTone7th => "2T7O",
            IntermodType::TwoTone9th => "2T9O",
            IntermodType::ThreeTone3rd => "3T3O",
        }
    }

    /// Product frequency for the ordered generator frequencies.
    ///
    /// Two-tone products are `(k+1)·f1 − k·f2` for order `2k+1`; `f3` is
    /// ignored. The three-tone product is `f1 + f2 − f3`.
    pub fn frequency(self, f1: i32, f2: i32, f3: i32) -> i32 {
        match self {
            IntermodType::ThreeTone3rd => f1.saturating_add(f2).saturating_sub(f3),
            two_tone => {
                let k = i32::from(two_tone.order() / 2);
                let (high, low) = (f1.saturating_mul(k + 1), f2.saturating_mul(k));
                high.saturating_sub(low)
            }
        }
    }
}

impl fmt::Display for IntermodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A channel captured as an intermod generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generator {
    pub id: ChannelId,
    pub frequency: i32,
}

impl Generator {
    pub fn new(id: ChannelId, frequency: i32) -> Self {
        Self { id, frequency }
    }
}

/// An intermodulation product of two or three channels.
///
/// Ordered by `(frequency, type, f1, f2, f3)` generator frequencies, where
/// `f3` only takes part when both sides carry one. Equality follows the same
/// ordering; for three-tone products `f3` is implied by the other fields.
#[derive(Debug, Clone, Copy)]
pub struct Intermod {
    kind: IntermodType,
    f1: Generator,
    f2: Generator,
    f3: Option<Generator>,
    frequency: i32,
}

impl Intermod {
    pub(crate) fn two_tone(kind: IntermodType, f1: Generator, f2: Generator) -> Self {
        debug_assert_eq!(kind.tones(), 2);
        let frequency = kind.frequency(f1.frequency, f2.frequency, 0);
        Self {
            kind,
            f1,
            f2,
            f3: None,
            frequency,
        }
    }

    pub(crate) fn three_tone(f1: Generator, f2: Generator, f3: Generator) -> Self {
        let kind = IntermodType::ThreeTone3rd;
        let frequency = kind.frequency(f1.frequency, f2.frequency, f3.frequency);
        Self {
            kind,
            f1,
            f2,
            f3: Some(f3),
            frequency,
        }
    }

    pub fn kind(&self) -> IntermodType {
        self.kind
    }

    pub fn frequency(&self) -> i32 {
        self.frequency
    }

    pub fn f1(&self) -> Generator {
        self.f1
    }

    pub fn f2(&self) -> Generator {
        self.f2
    }

    pub fn f3(&self) -> Option<Generator> {
        self.f3
    }

    pub fn generators(&self) -> impl Iterator<Item = Generator> {
        [Some(self.f1), Some(self.f2), self.f3]
            .into_iter()
            .flatten()
    }

    /// Whether `id` is one of this product's generators.
    pub fn involves(&self, id: ChannelId) -> bool {
        self.f1.id == id || self.f2.id == id || self.f3.is_some_and(|f3| f3.id == id)
    }
}

impl Ord for Intermod {
    fn cmp(&self, other: &Self) -> Ordering {
        self.frequency
            .cmp(&other.frequency)
            .then(self.kind.cmp(&other.kind))
            .then(self.f1.frequency.cmp(&other.f1.frequency))
            .then(self.f2.frequency.cmp(&other.f2.frequency))
            .then_with(|| match (self.f3, other.f3) {
                (Some(a), Some(b)) => a.frequency.cmp(&b.frequency),
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for Intermod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Intermod {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Intermod {}

impl fmt::Display for Intermod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (f1, f2) = (format_mhz(self.f1.frequency), format_mhz(self.f2.frequency));
        write!(f, "{f1} & {f2}")?;
        if let Some(f3) = self.f3 {
            write!(f, " & {}", format_mhz(f3.frequency))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(id: u32, frequency: i32) -> Generator {
        Generator::new(ChannelId(id), frequency)
    }

    fn at((id, frequency): (u32, i32)) -> Generator {
        generator(id, frequency)
    }

    fn third_order(a: (u32, i32), b: (u32, i32)) -> Intermod {
        Intermod::two_tone(IntermodType::TwoTone3rd, at(a), at(b))
    }

    fn triple(a: (u32, i32), b: (u32, i32), c: (u32, i32)) -> Intermod {
        Intermod::three_tone(at(a), at(b), at(c))
    }

    #[test]
    fn two_tone_formulas() {
        use IntermodType::{TwoTone3rd, TwoTone5th, TwoTone7th, TwoTone9th};
        let (a, b) = (generator(0, 606_000), generator(1, 607_000));
        let product = |kind, x, y| Intermod::two_tone(kind, x, y).frequency();
        assert_eq!(product(TwoTone3rd, a, b), 605_000);
        assert_eq!(product(TwoTone5th, a, b), 604_000);
        assert_eq!(product(TwoTone7th, a, b), 603_000);
        assert_eq!(product(TwoTone9th, a, b), 602_000);
        assert_eq!(product(TwoTone3rd, b, a), 608_000);
        assert_eq!(product(TwoTone9th, b, a), 611_000);
    }

    #[test]
    fn three_tone_formula_and_display() {
        let im = triple((0, 606_000), (1, 606_300), (2, 606_700));
        assert_eq!(im.frequency(), 605_600);
        assert_eq!(im.kind(), IntermodType::ThreeTone3rd);
        assert_eq!(im.to_string(), "606.000 MHz & 606.300 MHz & 606.700 MHz");
        assert!(im.involves(ChannelId(2)));
        assert!(!im.involves(ChannelId(3)));
        assert_eq!(im.generators().count(), 3);
    }

    #[test]
    fn two_tone_display() {
        let im = third_order((0, 560_500), (1, 560_700));
        assert_eq!(im.to_string(), "560.500 MHz & 560.700 MHz");
        assert_eq!(im.generators().count(), 2);
    }

    #[test]
    fn ordering_breaks_ties_by_type_then_generators() {
        let (x, y) = (generator(0, 600_000), generator(1, 600_000));
        let a = Intermod::two_tone(IntermodType::TwoTone5th, x, y);
        let b = Intermod::two_tone(IntermodType::TwoTone3rd, x, y);
        assert!(b < a);

        let lower = third_order((0, 602_000), (1, 604_000));
        let higher = third_order((0, 603_000), (1, 606_000));
        assert_eq!(lower.frequency(), higher.frequency());
        assert!(lower < higher);
    }

    #[test]
    fn equality_ignores_generator_ids() {
        let a = third_order((0, 606_000), (1, 607_000));
        let b = third_order((7, 606_000), (9, 607_000));
        assert_eq!(a, b);

        let x = triple((0, 606_000), (1, 607_000), (2, 608_000));
        let y = triple((3, 606_000), (4, 607_000), (5, 608_000));
        assert_eq!(x, y);
        assert_ne!(x, triple((0, 606_000), (2, 608_000), (1, 607_000)));
    }

    #[test]
    fn type_metadata() {
        assert_eq!(IntermodType::ALL.map(IntermodType::index), [0, 1, 2, 3, 4]);
        assert_eq!(IntermodType::TwoTone9th.order(), 9);
        assert_eq!(IntermodType::ThreeTone3rd.tones(), 3);
        assert_eq!(IntermodType::TwoTone7th.to_string(), "2T7O");
        let json = serde_json::to_string(&IntermodType::ThreeTone3rd).unwrap();
        assert_eq!(json, "\"3T3O\"");
    }
}
