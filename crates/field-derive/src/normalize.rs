use std::fmt;

use mesh_types::{ScalarField, TexCoordField};
use rayon::prelude::*;

use crate::errors::FieldError;

/// Fixed `t` coordinate used for 1-D colormap lookup.
pub const TEXCOORD_T: f64 = 0.5;

/// `clamp((value - lo) / (hi - lo), 0, 1)`.
///
/// Fails when the range is degenerate. Prefer [`Normalizer`] for whole
/// fields so the range is checked once.
pub fn normalize(value: f64, lo: f64, hi: f64) -> Result<f64, FieldError> {
    Ok(Normalizer::new(lo, hi)?.apply(value))
}

/// A validated normalization range. `hi < lo` gives an inverted ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    lo: f64,
    hi: f64,
}

impl Normalizer {
    pub fn new(lo: f64, hi: f64) -> Result<Self, FieldError> {
        if hi == lo || !lo.is_finite() || !hi.is_finite() {
            return Err(FieldError::DegenerateRange { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// NaN stays NaN.
    pub fn apply(&self, value: f64) -> f64 {
        ((value - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0)
    }

    pub fn normalize_field(&self, field: &ScalarField) -> NormalizedField {
        let values: Vec<f64> = field.0.par_iter().map(|&v| self.apply(v)).collect();
        let nan_count = field.0.par_iter().filter(|v| v.is_nan()).count();
        NormalizedField {
            values,
            observed: ObservedRange::of(field),
            nan_count,
        }
    }
}

/// True `[min, max]` of a field, ignoring NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedRange {
    pub min: f64,
    pub max: f64,
}

impl ObservedRange {
    /// `None` when the field is empty or all NaN.
    pub fn of(field: &ScalarField) -> Option<Self> {
        field
            .0
            .par_iter()
            .filter(|v| !v.is_nan())
            .map(|&v| ObservedRange { min: v, max: v })
            .reduce_with(|a, b| ObservedRange {
                min: a.min.min(b.min),
                max: a.max.max(b.max),
            })
    }
}

impl fmt::Display for ObservedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {:?}]", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedField {
    /// Normalized values in [0, 1], NaN where the input was NaN.
    pub values: Vec<f64>,
    pub observed: Option<ObservedRange>,
    pub nan_count: usize,
}

impl NormalizedField {
    /// `(s, 0.5)` per vertex.
    pub fn texcoords(&self) -> TexCoordField {
        TexCoordField(self.values.iter().map(|&s| [s, TEXCOORD_T]).collect())
    }

    /// Diagnostic line `name: [min, max]` for tuning the range on a later run.
    pub fn diagnostic(&self, name: &str) -> String {
        match self.observed {
            Some(range) => format!("{}: {}", name, range),
            None => format!("{}: [no finite values]", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn endpoints_and_clamping() {
        let n = Normalizer::new(0.0, 2.0).unwrap();
        assert_eq!(n.apply(0.0), 0.0);
        assert_eq!(n.apply(2.0), 1.0);
        assert_eq!(n.apply(1.0), 0.5);
        assert_eq!(n.apply(-3.0), 0.0);
        assert_eq!(n.apply(7.0), 1.0);
        assert_eq!(n.apply(f64::INFINITY), 1.0);
        assert!(n.apply(f64::NAN).is_nan());
    }

    #[test]
    fn inverted_range() {
        let n = Normalizer::new(10.0, 0.0).unwrap();
        assert_eq!(n.apply(10.0), 0.0);
        assert_eq!(n.apply(0.0), 1.0);
        assert_eq!(n.apply(2.5), 0.75);
    }

    #[test]
    fn non_finite_bounds_rejected() {
        assert!(Normalizer::new(0.0, f64::INFINITY).is_err());
        assert!(Normalizer::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn field_tracks_observed_range_and_nans() {
        let field = ScalarField(vec![0.4, f64::NAN, -0.1, 3.0]);
        let out = Normalizer::new(0.0, 1.0).unwrap().normalize_field(&field);
        assert_eq!(out.observed, Some(ObservedRange { min: -0.1, max: 3.0 }));
        assert_eq!(out.nan_count, 1);
        assert_eq!(out.values[0], 0.4);
        assert!(out.values[1].is_nan());
        assert_eq!(out.values[2], 0.0);
        assert_eq!(out.values[3], 1.0);
        assert_eq!(out.diagnostic("forceMag"), "forceMag: [-0.1, 3.0]");
    }

    #[test]
    fn observed_range_of_empty_field() {
        assert_eq!(ObservedRange::of(&ScalarField::default()), None);
        let all_nan = ScalarField(vec![f64::NAN; 3]);
        assert_eq!(ObservedRange::of(&all_nan), None);
    }

    #[test]
    fn texcoords_fix_t() {
        let out = Normalizer::new(0.0, 2.0)
            .unwrap()
            .normalize_field(&ScalarField(vec![1.0, 2.0]));
        assert_eq!(out.texcoords().0, vec![[0.5, 0.5], [1.0, 0.5]]);
    }

    proptest! {
        #[test]
        fn degenerate_range_always_fails(x in -1e6f64..1e6, lo in -1e6f64..1e6) {
            let rejected = matches!(normalize(x, lo, lo), Err(FieldError::DegenerateRange { .. }));
            prop_assert!(rejected);
        }

        #[test]
        fn monotonic(a in -10.0f64..10.0, b in -10.0f64..10.0, lo in -5.0f64..0.0, span in 0.1f64..5.0) {
            let n = Normalizer::new(lo, lo + span).unwrap();
            let (small, large) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(n.apply(small) <= n.apply(large));
        }

        #[test]
        fn endpoints_map_to_zero_and_one(lo in -100.0f64..100.0, span in 0.01f64..100.0) {
            let hi = lo + span;
            prop_assert_eq!(normalize(lo, lo, hi).unwrap(), 0.0);
            prop_assert_eq!(normalize(hi, lo, hi).unwrap(), 1.0);
        }

        #[test]
        fn idempotent_on_unit_range(x in -2.0f64..3.0) {
            let once = normalize(x, 0.0, 1.0).unwrap();
            prop_assert_eq!(normalize(once, 0.0, 1.0).unwrap(), once);
        }
    }
}
