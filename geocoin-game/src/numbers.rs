//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f64 and clamp it to the i32 range, returning 0 for non-finite values.
#[must_use]
pub fn floor_f64_to_i32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.floor().clamp(min, max);
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Floor a f64 in `[0, 1)` scaled by `span`, clamped to `0..span`.
#[must_use]
pub fn scale_unit_to_u32(unit: f64, span: u32) -> u32 {
    if span == 0 || !unit.is_finite() {
        return 0;
    }
    let scaled = (unit.clamp(0.0, 1.0) * f64::from(span)).floor();
    cast::<f64, u32>(scaled).unwrap_or(0).min(span - 1)
}

/// Map a 64-bit hash onto `[0, 1)` using its top 53 bits.
#[must_use]
pub fn unit_from_hash(hash: u64) -> f64 {
    const MANTISSA_SCALE: f64 = 9_007_199_254_740_992.0; // 2^53
    cast::<u64, f64>(hash >> 11).unwrap_or(0.0) / MANTISSA_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_handles_negatives_and_non_finite() {
        assert_eq!(floor_f64_to_i32(-0.5), -1);
        assert_eq!(floor_f64_to_i32(2.999), 2);
        assert_eq!(floor_f64_to_i32(f64::NAN), 0);
        assert_eq!(floor_f64_to_i32(f64::INFINITY), 0);
        assert_eq!(floor_f64_to_i32(f64::from(i32::MAX) * 4.0), i32::MAX);
    }

    #[test]
    fn unit_scaling_stays_in_span() {
        assert_eq!(scale_unit_to_u32(0.0, 5), 0);
        assert_eq!(scale_unit_to_u32(0.999_999, 5), 4);
        assert_eq!(scale_unit_to_u32(1.0, 5), 4);
        assert_eq!(scale_unit_to_u32(0.5, 0), 0);
    }

    #[test]
    fn hash_units_are_half_open() {
        assert!(unit_from_hash(0).abs() < f64::EPSILON);
        let top = unit_from_hash(u64::MAX);
        assert!(top < 1.0);
        assert!(top > 0.999_999);
    }
}
