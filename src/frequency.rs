//! Unit conversion, display formatting and tuning-grid arithmetic.
//!
//! Every frequency inside the crate is an integer number of kHz. MHz only
//! appears at the edges: parsing user input and rendering labels.

/// Convert a frequency in MHz to whole kHz, rounding to the nearest kHz.
pub fn mhz_to_khz(mhz: f64) -> i32 {
    (mhz * 1000.0).round() as i32
}

/// Convert a frequency in kHz to MHz.
pub fn khz_to_mhz(khz: i32) -> f64 {
    f64::from(khz) / 1000.0
}

/// Render a kHz frequency as MHz with three decimals, e.g. `500.550`.
///
/// Integer arithmetic keeps the output exact for every representable input.
pub fn mhz_value(khz: i32) -> String {
    let sign = if khz < 0 { "-" } else { "" };
    let magnitude = khz.unsigned_abs();
    format!("{sign}{}.{:03}", magnitude / 1000, magnitude % 1000)
}

/// Render a kHz frequency as a MHz label, e.g. `500.550 MHz`.
pub fn format_mhz(khz: i32) -> String {
    format!("{} MHz", mhz_value(khz))
}

/// Lowest multiple of `step` that is greater than or equal to `lo`.
///
/// Returns `None` for a non-positive step or when the grid point would not fit
/// in an `i32`.
pub fn first_grid_point(lo: i32, step: i32) -> Option<i32> {
    if step <= 0 {
        return None;
    }
    let rem = lo.rem_euclid(step);
    if rem == 0 {
        Some(lo)
    } else {
        lo.checked_add(step - rem)
    }
}

/// Number of multiples of `step` inside the inclusive interval `[lo, hi]`.
pub fn grid_len(lo: i32, hi: i32, step: i32) -> usize {
    match first_grid_point(lo, step) {
        Some(first) if first <= hi => {
            let span = i64::from(hi) - i64::from(first);
            (span / i64::from(step)) as usize + 1
        }
        _ => 0,
    }
}

/// Iterate over the multiples of `step` inside `[lo, hi]` in ascending order.
pub fn grid_points(lo: i32, hi: i32, step: i32) -> impl Iterator<Item = i32> {
    let first = first_grid_point(lo, step).unwrap_or(lo);
    let count = grid_len(lo, hi, step);
    (0..count).map(move |n| first + n as i32 * step)
}
