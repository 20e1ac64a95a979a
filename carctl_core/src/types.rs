//! Per-cycle inputs handed to the controller by the planner and car-state
//! decoder.

use std::fmt;
use std::str::FromStr;

/// Longitudinal control phase as driven by the planner.
///
/// The controller only reacts: `Stopping` forces the hold-decel override,
/// `Starting` is forwarded to platforms that take a start flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LongControlState {
    #[default]
    Off,
    /// Proportional tracking of the planner's accel.
    Pid,
    Stopping,
    Starting,
}

impl LongControlState {
    pub fn as_str(self) -> &'static str {
        match self {
            LongControlState::Off => "off",
            LongControlState::Pid => "pid",
            LongControlState::Stopping => "stopping",
            LongControlState::Starting => "starting",
        }
    }
}

impl fmt::Display for LongControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LongControlState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "" => Ok(LongControlState::Off),
            "pid" | "tracking" => Ok(LongControlState::Pid),
            "stopping" => Ok(LongControlState::Stopping),
            "starting" => Ok(LongControlState::Starting),
            other => Err(format!("unknown long control state '{other}'")),
        }
    }
}

/// Actuator intent from the planner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuatorCommand {
    /// Desired acceleration, m/s^2.
    pub accel: f32,
    /// Desired steering torque fraction, [-1, 1], positive left.
    pub steer: f32,
    pub long_control_state: LongControlState,
}

/// Decoded car telemetry for one cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VehicleState {
    /// Ego speed, m/s.
    pub v_ego: f32,
    pub left_blinker: bool,
    pub right_blinker: bool,
    /// Stock cruise main state.
    pub cruise_enabled: bool,
    /// Stock cruise is holding the car stopped.
    pub cruise_standstill: bool,
    /// Stock cruise is actively regulating speed (not just armed).
    pub cruise_actual_enabled: bool,
    /// Driver lane-keep toggle.
    pub lk_mode: bool,
    /// Radar lead distance, m. Quantized; repeats between updates.
    pub lead_distance: f32,
    /// Steering fault or driver override reported by the EPS.
    pub steer_not_allowed: bool,
    /// Lead status code from the stock HUD (1 = lead visible).
    pub hud_lead: u8,
    pub is_metric: bool,
    /// Last stock dashboard frame, echoed back to the encoder.
    pub stock_hud: Vec<u8>,
    /// Last stock brake frame, echoed back to the encoder.
    pub stock_brake: Vec<u8>,
}

impl VehicleState {
    pub fn blinker_on(&self) -> bool {
        self.left_blinker || self.right_blinker
    }
}
