//! Input sanitizing and period helpers for carctl_core.

use crate::calibration::DT_CTRL;

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Control period in microseconds.
#[inline]
pub fn control_period_us() -> u64 {
    ((f64::from(DT_CTRL) * MICROS_PER_SEC as f64).round() as u64).max(1)
}

/// Replace NaN/±Inf with 0.0.
#[inline]
pub fn finite_or_zero(x: f32) -> f32 {
    if x.is_finite() { x } else { 0.0 }
}

/// Speeds are non-negative and finite.
#[inline]
pub fn sanitize_speed(v: f32) -> f32 {
    finite_or_zero(v).max(0.0)
}
