//! Gas/brake split, brake hysteresis, rate limiting and the brake pump timer.
//!
//! All functions are pure: carried state goes in and comes back out as an
//! explicit record, so each stage can be tested without a controller.

use crate::calibration::LongitudinalArch;

/// Below this speed (m/s) a creep brake bias is blended in.
pub const CREEP_SPEED: f32 = 2.3;
/// Brake fraction applied at standstill by the creep bias.
pub const CREEP_BRAKE_VALUE: f32 = 0.15;
/// Accel (m/s^2) that maps to a full pedal.
pub const PEDAL_FULL_SCALE_ACCEL: f32 = 4.8;

/// Brakes engage only above this request.
pub const BRAKE_HYST_ON: f32 = 0.02;
/// Brakes release below this request.
pub const BRAKE_HYST_OFF: f32 = 0.005;
/// Dead band around the steady brake value.
pub const BRAKE_HYST_GAP: f32 = 0.01;

/// Rate (1/s) at which the brake request may fall.
pub const BRAKE_RELEASE_RATE: f32 = 2.0;

/// Pump keeps running at least this long after a trigger (s).
pub const PUMP_MIN_DWELL_S: f64 = 0.2;
/// Sustained braking re-triggers the pump after this long (s).
pub const PUMP_STALE_S: f64 = 20.0;

/// Split an acceleration request into `(gas, brake)`, each in [0, 1].
///
/// Bosch platforms are driven through acceleration requests, so the pedal
/// split is always zero there. On Nidec the split comes from a single signed
/// signal, which makes gas and brake mutually exclusive.
pub fn compute_gas_brake(accel: f32, v_ego: f32, arch: LongitudinalArch) -> (f32, f32) {
    match arch {
        LongitudinalArch::Bosch => (0.0, 0.0),
        LongitudinalArch::Nidec => {
            let creep_brake = if v_ego < CREEP_SPEED {
                (CREEP_SPEED - v_ego) / CREEP_SPEED * CREEP_BRAKE_VALUE
            } else {
                0.0
            };
            let gb = accel / PEDAL_FULL_SCALE_ACCEL - creep_brake;
            (gb.clamp(0.0, 1.0), (-gb).clamp(0.0, 1.0))
        }
    }
}

/// Carried state of the brake hysteresis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BrakeHysteresis {
    pub braking: bool,
    pub steady: f32,
}

/// Suppress brake blinking around small requests.
///
/// Returns the filtered brake and the updated state. Inside the dead band the
/// output stays pinned to the previous steady value; outside it the steady
/// value slides by exactly the band width toward the request.
pub fn brake_hysteresis(brake: f32, state: BrakeHysteresis) -> (f32, BrakeHysteresis) {
    let mut brake = brake;
    if (brake < BRAKE_HYST_ON && !state.braking) || brake < BRAKE_HYST_OFF {
        brake = 0.0;
    }
    let braking = brake > 0.0;

    let mut steady = state.steady;
    if brake == 0.0 {
        steady = 0.0;
    } else if brake > steady + BRAKE_HYST_GAP {
        steady = brake - BRAKE_HYST_GAP;
    } else if brake < steady - BRAKE_HYST_GAP {
        steady = brake + BRAKE_HYST_GAP;
    }

    (steady, BrakeHysteresis { braking, steady })
}

/// Clip `new` into `[last + down_step, last + up_step]`.
///
/// `down_step` is expected to be <= 0. Pass `f32::INFINITY` as `up_step` to
/// leave increases unbounded.
#[inline]
pub fn rate_limit(new: f32, last: f32, down_step: f32, up_step: f32) -> f32 {
    new.max(last + down_step).min(last + up_step)
}

/// Carried state of the brake pump timer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PumpTimer {
    /// Timestamp (s) of the last trigger.
    pub last_trigger_s: f64,
}

/// Decide whether the brake pump runs this cycle.
///
/// The pump is (re)triggered by any increase in the brake command, or once
/// sustained braking has gone `PUMP_STALE_S` without a trigger so pressure does
/// not bleed off. After a trigger it runs for at least `PUMP_MIN_DWELL_S`
/// while the brake stays applied.
pub fn brake_pump_hysteresis(
    apply_brake: u16,
    apply_brake_last: u16,
    timer: PumpTimer,
    ts: f64,
) -> (bool, PumpTimer) {
    let mut last = timer.last_trigger_s;
    if apply_brake > apply_brake_last || (ts - last > PUMP_STALE_S && apply_brake > 0) {
        last = ts;
    }
    let pump_on = ts - last < PUMP_MIN_DWELL_S && apply_brake > 0;
    (pump_on, PumpTimer { last_trigger_s: last })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bosch_split_is_always_zero() {
        assert_eq!(compute_gas_brake(1.5, 10.0, LongitudinalArch::Bosch), (0.0, 0.0));
        assert_eq!(compute_gas_brake(-3.0, 0.0, LongitudinalArch::Bosch), (0.0, 0.0));
    }

    #[test]
    fn nidec_split_above_creep_speed() {
        let (gas, brake) = compute_gas_brake(2.4, 10.0, LongitudinalArch::Nidec);
        assert!((gas - 0.5).abs() < 1e-6);
        assert_eq!(brake, 0.0);
        let (gas, brake) = compute_gas_brake(-2.4, 10.0, LongitudinalArch::Nidec);
        assert_eq!(gas, 0.0);
        assert!((brake - 0.5).abs() < 1e-6);
    }

    #[test]
    fn nidec_creep_brake_at_standstill() {
        let (gas, brake) = compute_gas_brake(0.0, 0.0, LongitudinalArch::Nidec);
        assert_eq!(gas, 0.0);
        assert!((brake - CREEP_BRAKE_VALUE).abs() < 1e-6);
    }

    #[test]
    fn hysteresis_ignores_small_engagement() {
        let (out, st) = brake_hysteresis(0.015, BrakeHysteresis::default());
        assert_eq!(out, 0.0);
        assert!(!st.braking);
    }

    #[test]
    fn hysteresis_holds_small_request_once_braking() {
        let (_, st) = brake_hysteresis(0.1, BrakeHysteresis::default());
        assert!(st.braking);
        assert!((st.steady - 0.09).abs() < 1e-6);
        // Below the on-threshold but above off while already braking.
        let (out, st) = brake_hysteresis(0.015, st);
        assert!(st.braking);
        assert!((out - 0.025).abs() < 1e-6);
    }

    #[test]
    fn hysteresis_pins_inside_dead_band() {
        let (_, st) = brake_hysteresis(0.30, BrakeHysteresis::default());
        let pinned = st.steady;
        for raw in [0.29, 0.295, 0.28, 0.2999] {
            let (out, _) = brake_hysteresis(raw, st);
            assert_eq!(out, pinned);
        }
    }

    #[test]
    fn hysteresis_zero_below_off_threshold() {
        let st = BrakeHysteresis {
            braking: true,
            steady: 0.2,
        };
        let (out, st) = brake_hysteresis(0.004, st);
        assert_eq!(out, 0.0);
        assert_eq!(st, BrakeHysteresis::default());
    }

    #[test]
    fn rate_limit_bounds_decrease_only() {
        assert_eq!(rate_limit(0.0, 1.0, -0.02, f32::INFINITY), 0.98);
        assert_eq!(rate_limit(1.0, 0.0, -0.02, f32::INFINITY), 1.0);
        assert_eq!(rate_limit(0.5, 0.4, -0.02, 0.05), 0.45);
    }

    #[test]
    fn pump_holds_for_min_dwell_then_releases() {
        let (on, t) = brake_pump_hysteresis(50, 0, PumpTimer::default(), 1.00);
        assert!(on);
        assert_eq!(t.last_trigger_s, 1.00);
        let (on, t) = brake_pump_hysteresis(50, 50, t, 1.10);
        assert!(on);
        let (on, _) = brake_pump_hysteresis(50, 50, t, 1.25);
        assert!(!on);
    }

    #[test]
    fn pump_retriggers_after_stale_window() {
        let t = PumpTimer { last_trigger_s: 0.0 };
        let (on, t) = brake_pump_hysteresis(50, 50, t, 20.02);
        assert!(on);
        assert_eq!(t.last_trigger_s, 20.02);
    }

    #[test]
    fn pump_off_without_brake() {
        let (on, t) = brake_pump_hysteresis(0, 0, PumpTimer::default(), 0.1);
        assert!(!on);
        assert_eq!(t.last_trigger_s, 0.0);
    }
}
