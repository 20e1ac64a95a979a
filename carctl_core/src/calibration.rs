//! Per-platform calibration tables.
//!
//! Everything the controller branches on is resolved here, once, from the
//! platform `Variant`: longitudinal architecture, resume gating, steering and
//! acceleration curves. The controller never matches on variants itself.

use carctl_traits::Variant;

use crate::curve::Curve;
use crate::error::CarError;

/// Control period in seconds (100 Hz).
pub const DT_CTRL: f32 = 0.01;

/// Brake command ceiling in bus units (10-bit field, top two bits reserved).
pub const BRAKE_MAX: u16 = 1024 / 4;

/// Acceleration forced while the longitudinal planner is stopping.
pub const STOPPING_ACCEL: f32 = -4.0;

/// Full-scale value of the dashboard pcm-accel field.
pub const PCM_ACCEL_MAX: f32 = 198.0; // 0xc6

/// Empirical divisor kept to preserve the legacy pcm-accel display scaling.
pub const PCM_ACCEL_LEGACY_GAIN: f32 = 1.44;

/// How longitudinal actuation reaches the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongitudinalArch {
    /// Radar/camera ECU accepts acceleration requests; no direct pedals.
    Bosch,
    /// Brake-by-wire with an electric pump; gas via optional interceptor.
    Nidec,
}

/// What must be true before resuming from a stock-cruise standstill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePolicy {
    /// Lead must have pulled away (distance grew or estimated speed > 0).
    LeadDeparture,
    /// Stock HUD must report a visible lead.
    LeadVisible,
    Unconditional,
}

/// Immutable calibration for one platform.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationParams {
    pub variant: Variant,
    pub arch: LongitudinalArch,
    pub resume: ResumePolicy,
    /// Platform uses the alternate pcm-speed/pcm-accel display mapping.
    pub alt_pcm_accel: bool,
    pub steer_max: i32,
    /// Signed desired torque -> steering command.
    pub steer_lookup: Curve,
    pub brake_max: u16,
    pub accel_min: f32,
    pub accel_max: f32,
    /// Bosch accel (m/s^2) -> gas request.
    pub gas_lookup: Curve,
    /// Speed (m/s) -> maximum allowed acceleration.
    pub max_accel_lookup: Curve,
}

const TORQUE_1000: &[f32] = &[0.0, 1000.0];
const TORQUE_2560: &[f32] = &[0.0, 2560.0];
const TORQUE_3840: &[f32] = &[0.0, 3840.0];
const TORQUE_4096: &[f32] = &[0.0, 4096.0];

/// One-sided torque table `(breakpoints, values)` per platform.
fn torque_table(variant: Variant) -> (&'static [f32], &'static [f32]) {
    match variant {
        Variant::AcuraIlx | Variant::CrV5g => (TORQUE_3840, TORQUE_3840),
        Variant::AcuraRdx | Variant::CrV => (TORQUE_1000, TORQUE_1000),
        Variant::Civic => (TORQUE_2560, TORQUE_2560),
        Variant::Accord
        | Variant::AccordHybrid
        | Variant::CivicBosch
        | Variant::CrVHybrid
        | Variant::Fit
        | Variant::Insight
        | Variant::Odyssey
        | Variant::Pilot
        | Variant::Ridgeline => (TORQUE_4096, TORQUE_4096),
    }
}

fn resume_policy(variant: Variant) -> ResumePolicy {
    match variant {
        Variant::Accord | Variant::AccordHybrid | Variant::Insight => ResumePolicy::LeadDeparture,
        Variant::CivicBosch | Variant::CrVHybrid => ResumePolicy::LeadVisible,
        _ => ResumePolicy::Unconditional,
    }
}

const NIDEC_ACCEL_MIN: f32 = -4.0;
const NIDEC_ACCEL_MAX: f32 = 1.6;
const BOSCH_ACCEL_MIN: f32 = -3.5;
const BOSCH_ACCEL_MAX: f32 = 2.0;

const NIDEC_MAX_ACCEL_BP: [f32; 4] = [0.0, 4.0, 10.0, 20.0];
const NIDEC_MAX_ACCEL_V: [f32; 4] = [0.5, 2.4, 1.4, 0.6];
const BOSCH_GAS_LOOKUP_BP: [f32; 2] = [-0.2, 2.0];
const BOSCH_GAS_LOOKUP_V: [f32; 2] = [0.0, 1600.0];

impl CalibrationParams {
    /// Resolve the calibration for `variant`.
    ///
    /// Table inconsistencies surface here, never inside the control cycle.
    pub fn for_variant(variant: Variant) -> Result<Self, CarError> {
        let bad = |reason: &'static str| CarError::Calibration {
            variant: variant.name(),
            reason,
        };
        let (torque_bp, torque_v) = torque_table(variant);
        let steer_lookup = Curve::mirrored(torque_bp, torque_v).map_err(bad)?;
        let steer_max = steer_lookup.last_value() as i32;
        let (arch, accel_min, accel_max) = if variant.is_bosch() {
            (LongitudinalArch::Bosch, BOSCH_ACCEL_MIN, BOSCH_ACCEL_MAX)
        } else {
            (LongitudinalArch::Nidec, NIDEC_ACCEL_MIN, NIDEC_ACCEL_MAX)
        };
        let params = Self {
            variant,
            arch,
            resume: resume_policy(variant),
            alt_pcm_accel: matches!(variant, Variant::Odyssey),
            steer_max,
            steer_lookup,
            brake_max: BRAKE_MAX,
            accel_min,
            accel_max,
            gas_lookup: Curve::new(BOSCH_GAS_LOOKUP_BP.to_vec(), BOSCH_GAS_LOOKUP_V.to_vec())
                .map_err(bad)?,
            max_accel_lookup: Curve::new(NIDEC_MAX_ACCEL_BP.to_vec(), NIDEC_MAX_ACCEL_V.to_vec())
                .map_err(bad)?,
        };
        params.validate()?;
        tracing::debug!(
            variant = variant.name(),
            arch = ?params.arch,
            resume = ?params.resume,
            steer_max = params.steer_max,
            "calibration resolved"
        );
        Ok(params)
    }

    /// Reject tables the control cycle cannot run with.
    pub fn validate(&self) -> Result<(), CarError> {
        let bad = |reason: &'static str| CarError::Calibration {
            variant: self.variant.name(),
            reason,
        };
        if self.steer_max <= 0 {
            return Err(bad("steer ceiling must be positive"));
        }
        if !(self.accel_min.is_finite() && self.accel_max.is_finite())
            || self.accel_min > self.accel_max
        {
            return Err(bad("accel limits must be finite with accel_min <= accel_max"));
        }
        if self.max_accel_lookup.values().iter().any(|&a| a <= 0.0) {
            return Err(bad("max accel curve must stay positive"));
        }
        if self.brake_max == 0 {
            return Err(bad("brake ceiling must be positive"));
        }
        Ok(())
    }

    /// Resolve by fingerprint name; unknown names are fatal.
    pub fn from_name(name: &str) -> Result<Self, CarError> {
        let variant: Variant = name.parse()?;
        Self::for_variant(variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_resolves() {
        for v in Variant::ALL {
            let p = CalibrationParams::for_variant(v).expect("calibration");
            assert_eq!(p.variant, v);
            assert_eq!(p.steer_lookup.eval(p.steer_max as f32), p.steer_max as f32);
            assert_eq!(p.brake_max, 256);
        }
    }

    #[test]
    fn capability_flags_follow_platform() {
        let accord = CalibrationParams::for_variant(Variant::Accord).unwrap();
        assert_eq!(accord.arch, LongitudinalArch::Bosch);
        assert_eq!(accord.resume, ResumePolicy::LeadDeparture);

        let civic = CalibrationParams::for_variant(Variant::Civic).unwrap();
        assert_eq!(civic.arch, LongitudinalArch::Nidec);
        assert_eq!(civic.resume, ResumePolicy::Unconditional);
        assert_eq!(civic.steer_max, 2560);

        let odyssey = CalibrationParams::for_variant(Variant::Odyssey).unwrap();
        assert!(odyssey.alt_pcm_accel);
        assert_eq!(
            CalibrationParams::for_variant(Variant::CrVHybrid)
                .unwrap()
                .resume,
            ResumePolicy::LeadVisible
        );
    }

    #[test]
    fn unknown_name_fails_fatally() {
        let err = CalibrationParams::from_name("HONDA JAZZ 1999").unwrap_err();
        assert_eq!(err, CarError::UnknownVariant("HONDA JAZZ 1999".into()));
    }

    #[test]
    fn validate_rejects_unusable_tables() {
        let good = CalibrationParams::for_variant(Variant::Civic).unwrap();
        assert_eq!(good.validate(), Ok(()));

        let mut p = good.clone();
        p.steer_max = 0;
        assert!(matches!(p.validate(), Err(CarError::Calibration { .. })));

        let mut p = good.clone();
        p.accel_min = 2.0;
        p.accel_max = -2.0;
        assert!(matches!(p.validate(), Err(CarError::Calibration { .. })));

        let mut p = good.clone();
        p.max_accel_lookup = Curve::new(vec![0.0, 10.0], vec![1.0, 0.0]).unwrap();
        assert!(matches!(p.validate(), Err(CarError::Calibration { .. })));

        let mut p = good;
        p.brake_max = 0;
        assert!(matches!(p.validate(), Err(CarError::Calibration { .. })));
    }
}
