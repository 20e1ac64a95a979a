//! Frame-counter cadence: which commands are due this cycle and the rotating
//! counters they carry.
//!
//! Every counter placed on the bus is a 2-bit field, so all indices are
//! reduced modulo 4 here.

use crate::calibration::DT_CTRL;

/// Longitudinal and keep-alive commands run at half rate.
pub const LONG_PERIOD: u64 = 2;
/// Dashboard commands run at 10 Hz.
pub const HUD_PERIOD: u64 = 10;
/// Radar tester-present cadence.
pub const KEEP_ALIVE_PERIOD: u64 = 10;

const COUNTER_MODULUS: u64 = 4;

#[inline]
fn counter(x: u64) -> u8 {
    (x % COUNTER_MODULUS) as u8
}

/// Steering counter, advances every cycle.
#[inline]
pub fn steering_counter(frame: u64) -> u8 {
    counter(frame)
}

/// Half-rate slot for gas, brake, ACC and stock-ACC supplemental frames.
#[inline]
pub fn is_long_frame(frame: u64) -> bool {
    frame % LONG_PERIOD == 0
}

/// Counter carried by half-rate frames.
#[inline]
pub fn long_counter(frame: u64) -> u8 {
    counter(frame / LONG_PERIOD)
}

/// Counter for cruise button frames.
///
/// Buttons share the half-rate counter on even frames and fall back to the
/// steering counter on odd ones.
#[inline]
pub fn button_counter(frame: u64) -> u8 {
    if is_long_frame(frame) {
        long_counter(frame)
    } else {
        steering_counter(frame)
    }
}

#[inline]
pub fn is_keep_alive_frame(frame: u64) -> bool {
    frame % KEEP_ALIVE_PERIOD == 0
}

#[inline]
pub fn is_hud_frame(frame: u64) -> bool {
    frame % HUD_PERIOD == 0
}

#[inline]
pub fn hud_counter(frame: u64) -> u8 {
    counter(frame / HUD_PERIOD)
}

/// Controller time of `frame` in seconds.
#[inline]
pub fn frame_ts(frame: u64) -> f64 {
    frame as f64 * f64::from(DT_CTRL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_stay_two_bit() {
        for f in 0..1000u64 {
            assert!(steering_counter(f) < 4);
            assert!(long_counter(f) < 4);
            assert!(button_counter(f) < 4);
            assert!(hud_counter(f) < 4);
        }
    }

    #[test]
    fn cadence() {
        assert_eq!((0..100).filter(|f| is_long_frame(*f)).count(), 50);
        assert_eq!((0..100).filter(|f| is_hud_frame(*f)).count(), 10);
        assert_eq!((0..100).filter(|f| is_keep_alive_frame(*f)).count(), 10);
    }

    #[test]
    fn button_counter_alternates_sources() {
        assert_eq!(button_counter(6), 3);
        assert_eq!(button_counter(7), 3);
        assert_eq!(button_counter(8), 0);
        assert_eq!(button_counter(9), 1);
    }

    #[test]
    fn hud_counter_rotates_every_tenth_frame() {
        let seq: Vec<u8> = (0..50).step_by(10).map(hud_counter).collect();
        assert_eq!(seq, vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn timestamps() {
        assert_eq!(frame_ts(0), 0.0);
        assert!((frame_ts(150) - 1.5).abs() < 1e-6);
    }
}
