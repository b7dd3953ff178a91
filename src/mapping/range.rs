//! Range mapping between the normalized space and arbitrary numeric ranges
//!
//! All scale conversions in the crate go through these three functions.
//! Ranges may be passed in either orientation, the lower bound is always
//! `min(a, b)`.

/// Orders a pair of bounds
fn ordered(a: f64, b: f64) -> (f64, f64) {
    (a.min(b), a.max(b))
}

fn sign(value: f64) -> f64 {
    if value.is_sign_negative() {
        -1.0
    } else {
        1.0
    }
}

/// Maps a normalized value into `[min, max]`.
///
/// - `[0, 1]` maps to `[min, max]`, values above 1 clamp to `max`
/// - `[-1, 0)` maps to `[-max, -min)`, values below -1 clamp to `-max`
///
/// The sign of the input survives into the output, which gives the mirrored
/// negative region for fully positive ranges.
pub fn denormalize(value: f64, min: f64, max: f64) -> f64 {
    let (min, max) = ordered(min, max);
    if value < -1.0 {
        return -max;
    }
    if value > 1.0 {
        return max;
    }
    let span = max - min;
    sign(value) * (min + value.abs() * span)
}

/// Maps a value in `[min, max]` into the normalized space.
///
/// If the range reaches below zero it's treated as one unsigned band: the
/// value is clamped into the range and normalized to `[0, 1]`. A fully
/// positive range normalizes the absolute value and reapplies the sign, so
/// `[-max, -min]` mirrors to `[-1, 0]`. Zero-width ranges normalize to 0.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let (min, max) = ordered(min, max);
    let span = max - min;
    if span == 0.0 {
        return 0.0;
    }
    if min < 0.0 {
        let clamped = value.clamp(min, max);
        (clamped + min.abs()) / span
    } else {
        let clamped_abs = value.abs().clamp(min, max);
        sign(value) * ((clamped_abs - min) / span)
    }
}

/// Maps a value in `[src_min, src_max]` to `[dst_min, dst_max]`, or
/// `[-src_max, -src_min]` to `[-dst_max, -dst_min]`.
///
/// Returns 0 if the magnitude of `value` lies outside the source range.
pub fn rescale(value: f64, src_min: f64, src_max: f64, dst_min: f64, dst_max: f64) -> f64 {
    let (src_min, src_max) = ordered(src_min, src_max);
    let magnitude = value.abs();
    if magnitude < src_min || magnitude > src_max {
        return 0.0;
    }
    let (dst_min, dst_max) = ordered(dst_min, dst_max);
    denormalize(normalize(value, src_min, src_max), dst_min, dst_max)
}

/// A closed interval whose bounds are kept ordered
///
/// Setting one bound past the other drags the other one along, so
/// `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    min: f64,
    max: f64,
}

impl ValueRange {
    /// Create a range, swapping the bounds if necessary
    pub fn new(a: f64, b: f64) -> Self {
        let (min, max) = ordered(a, b);
        Self { min, max }
    }

    /// The full unit interval
    pub const fn unit() -> Self {
        Self { min: 0.0, max: 1.0 }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Set the lower bound, raising the upper one if it would end up below.
    ///
    /// Returns whether anything changed.
    pub fn set_min(&mut self, value: f64) -> bool {
        let before = *self;
        self.min = value;
        if self.max < value {
            self.max = value;
        }
        *self != before
    }

    /// Set the upper bound, lowering the lower one if it would end up above.
    ///
    /// Returns whether anything changed.
    pub fn set_max(&mut self, value: f64) -> bool {
        let before = *self;
        self.max = value;
        if self.min > value {
            self.min = value;
        }
        *self != before
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Normalize `value` with regard to this range
    pub fn normalize(&self, value: f64) -> f64 {
        normalize(value, self.min, self.max)
    }

    /// Denormalize `value` into this range
    pub fn denormalize(&self, value: f64) -> f64 {
        denormalize(value, self.min, self.max)
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    /// (value in range, normalized value) pairs for a given range
    struct Case {
        first: f64,
        second: f64,
        records: &'static [(f64, f64)],
    }

    impl Case {
        fn min(&self) -> f64 {
            self.first.min(self.second)
        }

        fn max(&self) -> f64 {
            self.first.max(self.second)
        }

        fn is_completely_positive(&self) -> bool {
            self.first >= 0.0 && self.second >= 0.0
        }

        fn swapped(&self) -> Case {
            Case {
                first: self.second,
                second: self.first,
                records: self.records,
            }
        }
    }

    const CASES: &[Case] = &[
        Case { first: 0.0, second: 1.0, records: &[(0.5, 0.5)] },
        Case { first: -1.0, second: 0.0, records: &[(-0.5, 0.5)] },
        Case { first: 1.0, second: 2.0, records: &[(1.5, 0.5)] },
        Case { first: -2.0, second: -1.0, records: &[(-1.5, 0.5)] },
        Case {
            first: -1.0,
            second: 1.0,
            records: &[(-0.5, 0.25), (0.0, 0.5), (0.5, 0.75)],
        },
        Case {
            first: -1.0,
            second: 3.0,
            records: &[(0.0, 0.25), (1.0, 0.5), (2.0, 0.75)],
        },
    ];

    fn check(case: &Case) {
        let (a, b) = (case.first, case.second);
        for &(in_range, normalized) in case.records {
            assert_eq!(normalize(in_range, a, b), normalized);
            assert_eq!(denormalize(normalized, a, b), in_range);
        }

        // Bounds
        assert_eq!(normalize(case.min(), a, b), 0.0);
        assert_eq!(normalize(case.max(), a, b), 1.0);
        assert_eq!(denormalize(0.0, a, b), case.min());
        assert_eq!(denormalize(1.0, a, b), case.max());

        // Out of range
        if !case.is_completely_positive() || case.min() - 0.5 >= 0.0 {
            assert_eq!(normalize(case.min() - 0.5, a, b), 0.0);
        }
        assert_eq!(normalize(case.max() + 0.5, a, b), 1.0);
        assert_eq!(denormalize(1.2, a, b), case.max());

        if case.is_completely_positive() {
            for &(in_range, normalized) in case.records {
                assert_eq!(normalize(-in_range, a, b), -normalized);
                assert_eq!(denormalize(-normalized, a, b), -in_range);
            }
            assert_eq!(normalize(-case.max(), a, b), -1.0);
            assert_eq!(normalize(-case.min(), a, b), 0.0);
            assert_eq!(denormalize(-1.0, a, b), -case.max());
            assert_eq!(normalize(-case.max() - 0.5, a, b), -1.0);
            if -case.min() + 0.5 < 0.0 {
                assert_eq!(normalize(-case.min() + 0.5, a, b), 0.0);
            }
            assert_eq!(denormalize(-1.2, a, b), -case.max());
        }
    }

    #[test]
    fn test_mapping_cases_in_both_orientations() {
        for case in CASES {
            check(case);
            check(&case.swapped());
        }
    }

    #[test]
    fn test_round_trip() {
        let ranges = [(0.0, 1.0), (0.2, 0.8), (-1.0, 3.0), (10.0, 20.0), (-8192.0, 8191.0)];
        for (min, max) in ranges {
            for i in 0..=20 {
                let v = i as f64 / 20.0;
                let there = denormalize(v, min, max);
                assert!(approx_eq!(f64, normalize(there, min, max), v, epsilon = 1e-12));
                let x = min + v * (max - min);
                let back = denormalize(normalize(x, min, max), min, max);
                assert!(approx_eq!(f64, back, x, epsilon = 1e-9));
            }
        }
    }

    #[test]
    fn test_zero_width_range_normalizes_to_zero() {
        assert_eq!(normalize(0.3, 0.3, 0.3), 0.0);
        assert_eq!(normalize(5.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn test_rescale_outside_source_range_is_zero() {
        assert_eq!(rescale(70.0, 0.0, 63.0, 0.0, 1.0), 0.0);
        assert_eq!(rescale(0.1, 0.2, 0.8, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_rescale_mirrors_negative_values() {
        assert!(approx_eq!(f64, rescale(1.0, 0.0, 63.0, 0.01, 0.01), 0.01, ulps = 2));
        assert!(approx_eq!(f64, rescale(-1.0, 0.0, 63.0, 0.01, 0.01), -0.01, ulps = 2));
    }

    #[test]
    fn test_rescale_uses_lower_target_bound_as_min() {
        // Regression: the lower destination bound must be the minimum of the
        // pair, not the maximum.
        assert_eq!(rescale(0.0, 0.0, 1.0, 0.2, 0.8), 0.2);
        assert_eq!(rescale(0.0, 0.0, 1.0, 0.8, 0.2), 0.2);
        assert_eq!(rescale(1.0, 0.0, 1.0, 0.8, 0.2), 0.8);
        assert!(approx_eq!(f64, rescale(0.5, 0.0, 1.0, 0.8, 0.2), 0.5, ulps = 2));
    }

    #[test]
    fn test_value_range_keeps_bounds_ordered() {
        let mut range = ValueRange::new(0.8, 0.2);
        assert_eq!((range.min(), range.max()), (0.2, 0.8));

        assert!(range.set_min(0.9));
        assert_eq!((range.min(), range.max()), (0.9, 0.9));

        assert!(range.set_max(0.1));
        assert_eq!((range.min(), range.max()), (0.1, 0.1));

        assert!(!range.set_max(0.1));
    }

    #[test]
    fn test_value_range_center() {
        let range = ValueRange::new(0.2, 0.8);
        assert!(approx_eq!(f64, range.center(), 0.5, ulps = 2));
        assert!(range.contains(0.2));
        assert!(!range.contains(0.81));
    }
}
