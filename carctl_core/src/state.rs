//! State carried by `CarController` from one cycle to the next.

use carctl_traits::HudData;

use crate::filters::{BrakeHysteresis, PumpTimer};
use crate::lead::LeadSpeedEstimator;

/// Filter and timer memory. Created once with the controller and never reset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControllerState {
    pub(crate) brake_hyst: BrakeHysteresis,
    /// Rate-limited brake fraction.
    pub(crate) brake_last: f32,
    pub(crate) apply_brake_last: u16,
    pub(crate) pump: PumpTimer,
    pub(crate) last_blinker_on: bool,
    /// Blinker override stays active until this frame.
    pub(crate) blinker_end_frame: u64,
    pub(crate) lead: LeadSpeedEstimator,
    /// Lead distance seen while last cruising, the resume baseline.
    pub(crate) stopped_lead_distance: f32,
    pub(crate) last_hud: HudData,
}

impl ControllerState {
    pub fn brake_last(&self) -> f32 {
        self.brake_last
    }

    pub fn braking(&self) -> bool {
        self.brake_hyst.braking
    }

    pub fn brake_steady(&self) -> f32 {
        self.brake_hyst.steady
    }

    pub fn apply_brake_last(&self) -> u16 {
        self.apply_brake_last
    }

    pub fn last_pump_ts(&self) -> f64 {
        self.pump.last_trigger_s
    }

    pub fn blinker_end_frame(&self) -> u64 {
        self.blinker_end_frame
    }

    pub fn rough_lead_speed(&self) -> f32 {
        self.lead.speed()
    }

    pub fn stopped_lead_distance(&self) -> f32 {
        self.stopped_lead_distance
    }

    /// Dashboard content synthesized on the last cycle, sent or not.
    pub fn last_hud(&self) -> &HudData {
        &self.last_hud
    }
}
