//! Test utilities: reference equipment, frequency sets and consistency checks
//!
//! The frequency sets are known coordinations with published conflict counts.
//! They are shared by the unit suites and the criterion benches.

#![cfg(any(test, feature = "benchmark"))]

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analyser::Analyser;
use crate::types::{Channel, Equipment, ImSpacing, Range};

/// Error returned when a required fixture file cannot be located.
#[derive(Debug, Clone)]
pub struct FixtureError {
    message: String,
}

impl FixtureError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FixtureError {}

/// Directory holding the catalogue and snapshot fixtures.
pub fn test_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

/// Resolve a fixture under [`test_data_dir`], failing if it is missing.
pub fn require_fixture(name: impl AsRef<Path>) -> Result<PathBuf, FixtureError> {
    let path = test_data_dir().join(name);
    if path.exists() {
        Ok(path)
    } else {
        let message = format!("Missing fixture: {}", path.display());
        Err(FixtureError::new(message))
    }
}

// ---------------------------------------------------------------------------
// equipment
// ---------------------------------------------------------------------------

/// 25 kHz grid, 300 kHz channel spacing, IM spacings (100, 90, 0, 0, 50).
pub fn reference_equipment() -> Arc<Equipment> {
    let spacing = ImSpacing::new(100, 90, 0, 0, 50);
    let equipment = Equipment::new("Test", "Equipment", 25, 300, spacing);
    Arc::new(equipment.expect("reference equipment is valid"))
}

/// 5 kHz grid with every IM type guarded.
pub fn wideband_equipment() -> Arc<Equipment> {
    let spacing = ImSpacing::new(200, 100, 50, 25, 100);
    let equipment = Equipment::new("RFXp", "Equipment", 5, 500, spacing);
    Arc::new(equipment.expect("wideband equipment is valid"))
}

/// Shure UHF-R spacings, offering the single range `range`.
pub fn uhf_r(range: Range) -> Arc<Equipment> {
    let spacing = ImSpacing::new(175, 0, 0, 0, 50);
    let equipment = Equipment::new("Shure", "UHF-R", 25, 325, spacing)
        .and_then(|equipment| equipment.with_ranges(vec![range]));
    Arc::new(equipment.expect("UHF-R profile is valid"))
}

pub fn channel_38() -> Range {
    Range::new(606_000, 614_000, "Channel 38")
}

// ---------------------------------------------------------------------------
// frequency sets (kHz)
// ---------------------------------------------------------------------------

/// Conflict-free on [`reference_equipment`].
pub const VALID_FREQUENCIES: [i32; 11] = [
    470_050, 470_600, 471_350, 471_950, 472_350, 474_800, 475_250, 475_600, 476_750, 477_050,
    478_000,
];

/// Retune targets for [`VALID_FREQUENCIES`], applied lowest channel first.
pub const RETUNE_FREQUENCIES: [i32; 11] = [
    578_250, 590_500, 563_100, 562_250, 575_250, 577_075, 581_000, 583_450, 577_825, 578_100,
    592_250,
];

/// 112 conflicts on [`reference_equipment`]: 6 channel, 18 2T3O, 20 2T5O, 68 3T3O.
pub const CONGESTED_FREQUENCIES: [i32; 13] = [
    606_000, 606_300, 606_775, 607_100, 607_525, 607_700, 608_175, 608_350, 609_000, 610_300,
    610_525, 611_000, 611_325,
];

/// 61 conflicts on [`reference_equipment`]: 4 channel, 10 2T3O, 3 2T5O, 44 3T3O.
pub const REMOVAL_FREQUENCIES: [i32; 12] = [
    768_275, 769_100, 765_250, 765_800, 766_125, 767_975, 764_250, 768_550, 770_025, 763_975,
    770_575, 771_100,
];

/// 540 conflicts on [`wideband_equipment`]: 68 2T3O, 24 2T5O, 10 2T7O, 2 2T9O, 436 3T3O.
pub const WIDEBAND_FREQUENCIES: [i32; 20] = [
    720_560, 721_980, 723_605, 724_255, 724_785, 726_025, 726_745, 727_255, 728_140, 729_185,
    729_765, 730_915, 732_195, 733_040, 734_500, 735_410, 736_280, 737_505, 738_135, 738_735,
];

/// `frequencies` in a reproducible random order.
pub fn shuffled(frequencies: &[i32], seed: u64) -> Vec<i32> {
    let mut shuffled = frequencies.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
    shuffled
}

/// Add one channel per frequency on `equipment`, in order.
pub fn analyser_with(frequencies: &[i32], equipment: &Arc<Equipment>) -> crate::Result<Analyser> {
    let mut analyser = Analyser::new();
    for &frequency in frequencies {
        let channel = Channel::new(analyser.peek_next_id(), frequency, equipment.clone())?;
        analyser.add_channel(channel)?;
    }
    Ok(analyser)
}

// ---------------------------------------------------------------------------
// invariants
// ---------------------------------------------------------------------------

/// Panic unless every structural invariant of `analyser` holds.
pub fn assert_consistent(analyser: &Analyser) {
    let ascending = |pair: &[Channel]| Channel::cmp_frequency(&pair[0], &pair[1]) == Ordering::Less;
    assert!(
        analyser.channels().windows(2).all(ascending),
        "channels out of order"
    );
    let intermods = analyser.intermods();
    assert!(
        intermods.windows(2).all(|pair| pair[0] <= pair[1]),
        "intermods out of order"
    );
    let calculations = analyser.calculations();
    assert_eq!(
        analyser.intermod_count(),
        calculations.expected_intermod_count(analyser.channel_count()),
        "intermod count"
    );

    let channels = analyser.channels();
    let listed: usize = channels.iter().map(Channel::conflict_count).sum();
    assert_eq!(
        listed,
        analyser.conflict_count(),
        "victim lists disagree with the conflict table"
    );
    assert_eq!(
        analyser.counters().total(),
        analyser.conflict_count(),
        "counters disagree with the conflict table"
    );
    for (id, conflict) in analyser.conflicts() {
        let victim = analyser
            .channel(conflict.channel())
            .expect("victim channel present");
        assert!(
            victim.conflict_ids().any(|key| key == id),
            "conflict {id} missing from its victim"
        );
    }
}

/// Panic unless `analyser` is consistent and free of conflicts.
pub fn assert_clean(analyser: &Analyser) {
    assert_consistent(analyser);
    assert_eq!(analyser.conflict_count(), 0, "unexpected conflicts");
    assert_eq!(analyser.valid_channel_count(), analyser.channel_count());
}
