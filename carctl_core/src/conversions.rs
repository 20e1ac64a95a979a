//! Conversions bridging `carctl_config` types to `carctl_core` types.

use crate::config::{BlinkerSteer, ControlOptions, PlatformConfig};
use crate::error::{CarError, Report};
use crate::hud::VisualAlert;
use crate::types::{ActuatorCommand, LongControlState, VehicleState};

// ── BlinkerSteer ─────────────────────────────────────────────────────────────

impl From<carctl_config::BlinkerSteer> for BlinkerSteer {
    fn from(b: carctl_config::BlinkerSteer) -> Self {
        match b {
            carctl_config::BlinkerSteer::Keep => BlinkerSteer::Keep,
            carctl_config::BlinkerSteer::Release => BlinkerSteer::Release,
        }
    }
}

// ── ControlOptions ───────────────────────────────────────────────────────────

impl From<&carctl_config::Options> for ControlOptions {
    fn from(c: &carctl_config::Options) -> Self {
        Self {
            signal_off_delay_frames: c.signal_off_delay_frames,
            auto_throttle_limit: c.auto_throttle_limit,
            auto_throttle_limit_op_long: c.auto_throttle_limit_op_long,
            allow_gas: c.allow_gas,
            lateral: c.lateral,
            blinker_steer: c.blinker_steer.into(),
            lane_change_assist_min_speed: c.lane_change_assist_min_speed,
        }
    }
}

// ── PlatformConfig ───────────────────────────────────────────────────────────

impl TryFrom<&carctl_config::Vehicle> for PlatformConfig {
    type Error = Report;

    fn try_from(c: &carctl_config::Vehicle) -> Result<Self, Self::Error> {
        let variant = c
            .variant
            .parse::<carctl_traits::Variant>()
            .map_err(|e| Report::new(CarError::from(e)))?;
        Ok(Self {
            variant,
            pcm_cruise: c.pcm_cruise,
            own_longitudinal: c.own_longitudinal,
            gas_interceptor: c.gas_interceptor,
        })
    }
}

// ── TraceStep ────────────────────────────────────────────────────────────────

/// One replayed control cycle decoded from a trace row.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    pub frame: u64,
    pub enabled: bool,
    pub vehicle: VehicleState,
    pub actuators: ActuatorCommand,
    pub pcm_cancel: bool,
    pub hud_v_cruise: f32,
    pub hud_alert: VisualAlert,
}

impl TryFrom<&carctl_config::TraceRow> for TraceStep {
    type Error = Report;

    fn try_from(r: &carctl_config::TraceRow) -> Result<Self, Self::Error> {
        let bad = |msg: String| Report::new(CarError::Trace(format!("frame {}: {msg}", r.frame)));
        let long_control_state: LongControlState = r.long_state.parse().map_err(bad)?;
        let hud_alert: VisualAlert = r.hud_alert.parse().map_err(bad)?;
        Ok(Self {
            frame: r.frame,
            enabled: r.enabled,
            vehicle: VehicleState {
                v_ego: r.v_ego,
                left_blinker: r.left_blinker,
                right_blinker: r.right_blinker,
                cruise_enabled: r.cruise_enabled,
                cruise_standstill: r.cruise_standstill,
                cruise_actual_enabled: r.cruise_actual_enabled,
                lk_mode: r.lk_mode,
                lead_distance: r.lead_distance,
                steer_not_allowed: false,
                hud_lead: r.hud_lead,
                is_metric: true,
                stock_hud: Vec::new(),
                stock_brake: Vec::new(),
            },
            actuators: ActuatorCommand {
                accel: r.accel,
                steer: r.steer,
                long_control_state,
            },
            pcm_cancel: r.pcm_cancel,
            hud_v_cruise: r.hud_v_cruise,
            hud_alert,
        })
    }
}
