//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Relative distance from an integer below which a value counts as that integer.
const SNAP_EPSILON: f64 = 1e-9;

/// Pull values within float noise of an integer onto it, so products like
/// `175.0 * 0.6` round the way their exact decimal counterparts do.
fn snap_to_integer(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() <= SNAP_EPSILON * nearest.abs().max(1.0) {
        nearest
    } else {
        value
    }
}

/// Ceil a f64 and clamp it to the i64 range, returning 0 for non-finite values.
#[must_use]
pub fn ceil_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).ceil();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Floor a f64 and clamp it to the i64 range, returning 0 for non-finite values.
#[must_use]
pub fn floor_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    cast::<f64, i64>(value.clamp(min, max).floor()).unwrap_or(0)
}

/// [`ceil_f64_to_i64`] after snapping away binary representation error.
#[must_use]
pub fn ceil_snapped_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    ceil_f64_to_i64(snap_to_integer(value))
}

/// [`floor_f64_to_i64`] after snapping away binary representation error.
#[must_use]
pub fn floor_snapped_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    floor_f64_to_i64(snap_to_integer(value))
}

/// Floor a f64 into the 0..=100 percentage range, returning 0 for NaN values.
#[must_use]
pub fn floor_f64_to_pct(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    let clamped = value.clamp(0.0, 100.0).floor();
    cast::<f64, u8>(clamped).unwrap_or(0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_clamps_and_handles_nan() {
        assert_eq!(ceil_f64_to_i64(1.2), 2);
        assert_eq!(ceil_f64_to_i64(-1.2), -1);
        assert_eq!(ceil_f64_to_i64(f64::NAN), 0);
        assert_eq!(ceil_f64_to_i64(f64::INFINITY), 0);
    }

    #[test]
    fn floor_rounds_towards_negative_infinity() {
        assert_eq!(floor_f64_to_i64(633.3), 633);
        assert_eq!(floor_f64_to_i64(-0.5), -1);
        assert_eq!(floor_f64_to_i64(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn snapped_rounding_ignores_representation_error() {
        // A $175 budget scales to 105.00000000000001 in binary floating point.
        assert_eq!(ceil_snapped_f64_to_i64(5_000.0 * (175.0 / 10_000.0) * 1.2), 105);
        assert_eq!(ceil_snapped_f64_to_i64(105.2), 106);
        assert_eq!(floor_snapped_f64_to_i64((1.0 - 0.3) * 1000.0), 700);
        assert_eq!(floor_snapped_f64_to_i64(699.9), 699);
        assert_eq!(ceil_snapped_f64_to_i64(f64::NAN), 0);
        assert_eq!(floor_snapped_f64_to_i64(f64::INFINITY), 0);
    }

    #[test]
    fn pct_floors_and_clamps() {
        assert_eq!(floor_f64_to_pct(66.99), 66);
        assert_eq!(floor_f64_to_pct(140.0), 100);
        assert_eq!(floor_f64_to_pct(-3.0), 0);
        assert_eq!(floor_f64_to_pct(f64::NAN), 0);
    }

    #[test]
    fn widening_casts_are_exact_for_small_values() {
        assert!((i64_to_f64(6_000) - 6_000.0).abs() < f64::EPSILON);
        assert!((usize_to_f64(13) - 13.0).abs() < f64::EPSILON);
    }
}
