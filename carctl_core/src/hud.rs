//! Dashboard content: alert display codes, HUD icons and the pcm speed/accel
//! fields shown on the cluster.

use std::fmt;
use std::str::FromStr;

use crate::calibration::{CalibrationParams, PCM_ACCEL_LEGACY_GAIN, PCM_ACCEL_MAX};
use crate::curve::interp;

/// Semantic alert requested by the supervisory layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisualAlert {
    #[default]
    None,
    Fcw,
    SteerRequired,
    BrakePressed,
    WrongGear,
    SeatbeltUnbuckled,
    SpeedTooHigh,
    Ldw,
}

impl VisualAlert {
    pub const ALL: [VisualAlert; 8] = [
        VisualAlert::None,
        VisualAlert::Fcw,
        VisualAlert::SteerRequired,
        VisualAlert::BrakePressed,
        VisualAlert::WrongGear,
        VisualAlert::SeatbeltUnbuckled,
        VisualAlert::SpeedTooHigh,
        VisualAlert::Ldw,
    ];

    /// Code the cluster understands for this alert.
    pub fn display_code(self) -> u8 {
        match self {
            VisualAlert::None => 0,
            VisualAlert::Fcw | VisualAlert::SteerRequired | VisualAlert::Ldw => 1,
            VisualAlert::BrakePressed => 10,
            VisualAlert::WrongGear => 6,
            VisualAlert::SeatbeltUnbuckled => 5,
            VisualAlert::SpeedTooHigh => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VisualAlert::None => "none",
            VisualAlert::Fcw => "fcw",
            VisualAlert::SteerRequired => "steerRequired",
            VisualAlert::BrakePressed => "brakePressed",
            VisualAlert::WrongGear => "wrongGear",
            VisualAlert::SeatbeltUnbuckled => "seatbeltUnbuckled",
            VisualAlert::SpeedTooHigh => "speedTooHigh",
            VisualAlert::Ldw => "ldw",
        }
    }
}

impl fmt::Display for VisualAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VisualAlert {
    type Err = String;

    /// Accepts `steerRequired`, `steer_required` and `STEER-REQUIRED` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect();
        if norm.is_empty() {
            return Ok(VisualAlert::None);
        }
        VisualAlert::ALL
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(&norm))
            .ok_or_else(|| format!("unknown visual alert '{}'", s.trim()))
    }
}

/// Display codes split by cluster field; at most one is nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertCodes {
    pub fcw: u8,
    pub steer_required: u8,
    pub acc_alert: u8,
}

pub fn process_hud_alert(alert: VisualAlert) -> AlertCodes {
    let code = alert.display_code();
    match alert {
        VisualAlert::None => AlertCodes::default(),
        VisualAlert::Fcw => AlertCodes {
            fcw: code,
            ..AlertCodes::default()
        },
        VisualAlert::SteerRequired | VisualAlert::Ldw => AlertCodes {
            steer_required: code,
            ..AlertCodes::default()
        },
        _ => AlertCodes {
            acc_alert: code,
            ..AlertCodes::default()
        },
    }
}

/// Lane icon: shown only while lane-keep mode is on.
pub fn hud_lanes(show_lanes: bool, lk_mode: bool) -> u8 {
    u8::from(show_lanes && lk_mode)
}

/// Car icon: 0 hidden (disengaged), 2 lead shown, 1 engaged without lead.
pub fn hud_car(enabled: bool, show_car: bool) -> u8 {
    match (enabled, show_car) {
        (false, _) => 0,
        (true, true) => 2,
        (true, false) => 1,
    }
}

const WIND_BRAKE_BP: [f32; 3] = [0.0, 2.3, 35.0];
const WIND_BRAKE_V: [f32; 3] = [0.001, 0.002, 0.15];
const PCM_SPEED_CEIL: f32 = 100.0;

/// Brake fraction attributable to air resistance at `v_ego`.
pub fn wind_brake(v_ego: f32) -> f32 {
    interp(v_ego, &WIND_BRAKE_BP, &WIND_BRAKE_V)
}

/// Cluster speed target and pcm-accel byte for this cycle.
///
/// `gas` and `brake` are the unfiltered pedal split; `accel` is after the
/// stopping override.
pub fn pcm_speed_accel(
    params: &CalibrationParams,
    v_ego: f32,
    gas: f32,
    brake: f32,
    accel: f32,
) -> (f32, u8) {
    let wb = wind_brake(v_ego);
    let bp = [-wb, -wb * 0.75, 0.0, 0.5];
    let clip = |x: f32| x.clamp(0.0, PCM_SPEED_CEIL);
    let (v, pcm_accel) = if params.alt_pcm_accel {
        (
            [0.0, clip(v_ego - 3.0), clip(v_ego), clip(v_ego + 5.0)],
            PCM_ACCEL_MAX as u8,
        )
    } else {
        let max_accel = params.max_accel_lookup.eval(v_ego);
        let frac = ((accel / PCM_ACCEL_LEGACY_GAIN) / max_accel).clamp(0.0, 1.0);
        (
            [0.0, clip(v_ego - 2.0), clip(v_ego + 2.0), clip(v_ego + 5.0)],
            (frac * PCM_ACCEL_MAX) as u8,
        )
    };
    (interp(gas - brake, &bp, &v), pcm_accel)
}
