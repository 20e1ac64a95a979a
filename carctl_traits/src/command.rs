//! Semantic command payloads handed to a `CommandEncoder`.

use crate::variant::Variant;

/// Addressed bus payload produced by an encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanFrame {
    /// Arbitration id (11- or 29-bit).
    pub address: u32,
    /// Logical bus number on the panda-style interface.
    pub bus: u8,
    pub data: Vec<u8>,
    /// How many times the transport should repeat the frame.
    pub repeat: u8,
}

impl CanFrame {
    pub fn new(address: u32, bus: u8, data: Vec<u8>) -> Self {
        Self {
            address,
            bus,
            data,
            repeat: 1,
        }
    }
}

/// Cruise stalk buttons understood by the stock cruise computer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CruiseButton {
    None = 0,
    Main = 1,
    Cancel = 2,
    DecelSet = 3,
    ResAccel = 4,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringCommand {
    /// Signed torque command in bus units, positive steers right.
    pub apply_steer: i32,
    pub lkas_active: bool,
    pub variant: Variant,
    /// Rotating 0..=3 counter.
    pub idx: u8,
    /// Radar is held passive because this system owns longitudinal control.
    pub radar_disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccCommand {
    pub enabled: bool,
    /// m/s^2 after the stopping override.
    pub accel: f32,
    /// Gas request in the platform's pedal units.
    pub gas: f32,
    pub idx: u8,
    pub stopping: bool,
    pub starting: bool,
    pub variant: Variant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrakeCommand<'a> {
    /// Brake in bus units, `0..BRAKE_MAX`.
    pub apply_brake: u16,
    pub pump_on: bool,
    pub pcm_override: bool,
    pub pcm_cancel: bool,
    /// Forward-collision display code carried on the brake frame.
    pub fcw: u8,
    pub idx: u8,
    pub variant: Variant,
    /// Stock brake frame bytes echoed so the encoder can preserve them.
    pub stock_brake: &'a [u8],
}

/// Dashboard content synthesized for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HudData {
    /// 0..=0xc6
    pub pcm_accel: u8,
    pub v_cruise: i32,
    /// 0 hidden, 1 no lead shown, 2 lead shown.
    pub car: u8,
    pub lanes: u8,
    pub fcw: u8,
    pub acc_alert: u8,
    pub steer_required: u8,
    pub dashed_lanes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiCommand<'a> {
    pub pcm_speed: f32,
    pub hud: HudData,
    pub variant: Variant,
    pub is_metric: bool,
    pub idx: u8,
    pub own_longitudinal: bool,
    pub stock_hud: &'a [u8],
}
