//! Piecewise-linear lookup curves.

/// Piecewise-linear interpolation over breakpoints `bp` with values `v`.
///
/// Saturates at the end values outside the breakpoint range, so the result is
/// always bounded by `min(v)..=max(v)`. `bp` must be non-decreasing and the
/// same length as `v`; `Curve::new` enforces this for owned tables.
#[inline]
pub fn interp(x: f32, bp: &[f32], v: &[f32]) -> f32 {
    debug_assert_eq!(bp.len(), v.len());
    let n = bp.len().min(v.len());
    if n == 0 {
        return 0.0;
    }
    if x.is_nan() || x <= bp[0] {
        return v[0];
    }
    if x >= bp[n - 1] {
        return v[n - 1];
    }
    // First breakpoint strictly above x; guaranteed in 1..n by the checks above.
    let hi = bp[..n].partition_point(|&b| b <= x);
    let lo = hi - 1;
    let span = bp[hi] - bp[lo];
    if span <= 0.0 {
        return v[hi];
    }
    v[lo] + (x - bp[lo]) * (v[hi] - v[lo]) / span
}

/// Owned lookup table validated at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    bp: Vec<f32>,
    v: Vec<f32>,
}

impl Curve {
    /// Build a curve, rejecting empty, mismatched, non-finite or unsorted tables.
    pub fn new(bp: Vec<f32>, v: Vec<f32>) -> Result<Self, &'static str> {
        if bp.is_empty() {
            return Err("lookup curve is empty");
        }
        if bp.len() != v.len() {
            return Err("lookup curve breakpoints and values differ in length");
        }
        if bp.iter().chain(v.iter()).any(|x| !x.is_finite()) {
            return Err("lookup curve contains non-finite entries");
        }
        if bp.windows(2).any(|w| w[1] < w[0]) {
            return Err("lookup curve breakpoints must be non-decreasing");
        }
        Ok(Self { bp, v })
    }

    /// Mirror a one-sided table (first breakpoint at zero) into a signed one:
    /// `[-bp_n .. -bp_1, 0, bp_1 .. bp_n]`.
    pub fn mirrored(bp: &[f32], v: &[f32]) -> Result<Self, &'static str> {
        match (bp.first(), v.first()) {
            (Some(&b0), Some(_)) if b0 == 0.0 => {}
            _ => return Err("mirrored curve must start at zero"),
        }
        let neg_bp = bp.iter().skip(1).rev().map(|b| -b);
        let neg_v = v.iter().skip(1).rev().map(|x| -x);
        Self::new(
            neg_bp.chain(bp.iter().copied()).collect(),
            neg_v.chain(v.iter().copied()).collect(),
        )
    }

    #[inline]
    pub fn eval(&self, x: f32) -> f32 {
        interp(x, &self.bp, &self.v)
    }

    pub fn breakpoints(&self) -> &[f32] {
        &self.bp
    }

    pub fn values(&self) -> &[f32] {
        &self.v
    }

    /// Last (largest-input) value of the table.
    pub fn last_value(&self) -> f32 {
        self.v.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interp_saturates_outside_range() {
        let bp = [0.0, 10.0];
        let v = [0.4, 1.0];
        assert_eq!(interp(-5.0, &bp, &v), 0.4);
        assert_eq!(interp(50.0, &bp, &v), 1.0);
    }

    #[test]
    fn interp_is_linear_between_breakpoints() {
        let bp = [0.0, 2.3, 35.0];
        let v = [0.001, 0.002, 0.15];
        assert!((interp(1.15, &bp, &v) - 0.0015).abs() < 1e-6);
        assert_eq!(interp(2.3, &bp, &v), 0.002);
    }

    #[test]
    fn interp_nan_maps_to_first_value() {
        assert_eq!(interp(f32::NAN, &[0.0, 1.0], &[3.0, 4.0]), 3.0);
    }

    #[test]
    fn mirrored_curve_is_odd() {
        let c = Curve::mirrored(&[0.0, 1000.0, 2560.0], &[0.0, 500.0, 2560.0]).unwrap();
        assert_eq!(c.breakpoints(), &[-2560.0, -1000.0, 0.0, 1000.0, 2560.0]);
        assert_eq!(c.eval(-1000.0), -500.0);
        assert_eq!(c.eval(1000.0), 500.0);
        assert_eq!(c.last_value(), 2560.0);
    }

    #[test]
    fn rejects_bad_tables() {
        assert!(Curve::new(vec![], vec![]).is_err());
        assert!(Curve::new(vec![0.0, 1.0], vec![0.0]).is_err());
        assert!(Curve::new(vec![1.0, 0.0], vec![0.0, 1.0]).is_err());
        assert!(Curve::new(vec![0.0, f32::INFINITY], vec![0.0, 1.0]).is_err());
        assert!(Curve::mirrored(&[1.0, 2.0], &[0.0, 1.0]).is_err());
    }
}
