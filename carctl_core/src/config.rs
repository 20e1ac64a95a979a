//! Runtime configuration for `CarController`.
//!
//! These are separate from the TOML-deserialized config in `carctl_config`;
//! see `conversions` for the bridge.

use carctl_traits::Variant;

/// Static facts about the car and how it is wired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformConfig {
    pub variant: Variant,
    /// Stock cruise computer issues speed control (cancel is meaningful).
    pub pcm_cruise: bool,
    /// This system owns gas/brake; otherwise it drives stock cruise buttons.
    pub own_longitudinal: bool,
    /// A pedal interceptor is installed.
    pub gas_interceptor: bool,
}

impl PlatformConfig {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            pcm_cruise: true,
            own_longitudinal: false,
            gas_interceptor: false,
        }
    }
}

/// What happens to steering while a turn signal is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlinkerSteer {
    /// Keep steering through the signal.
    #[default]
    Keep,
    /// Release steering so the driver can change lanes.
    Release,
}

/// Per-cycle behavior switches.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlOptions {
    /// Frames the blinker override stays active after the signal turns off.
    pub signal_off_delay_frames: u64,
    /// Leave the throttle to the stock system and suppress dashboard frames.
    pub auto_throttle_limit: bool,
    /// With `auto_throttle_limit`, keep own longitudinal frames but coast while
    /// stock cruise is not actually regulating.
    pub auto_throttle_limit_op_long: bool,
    /// Driver may use the gas without cancelling stock cruise.
    pub allow_gas: bool,
    /// Lateral control on. When false, steer is zeroed while enabled.
    pub lateral: bool,
    pub blinker_steer: BlinkerSteer,
    /// With `BlinkerSteer::Release`, keep steering during a signal at or above
    /// this speed (m/s).
    pub lane_change_assist_min_speed: Option<f32>,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            signal_off_delay_frames: 0,
            auto_throttle_limit: false,
            auto_throttle_limit_op_long: false,
            allow_gas: false,
            lateral: true,
            blinker_steer: BlinkerSteer::Keep,
            lane_change_assist_min_speed: None,
        }
    }
}

impl ControlOptions {
    /// Own longitudinal frames are sent, but forced to coast while stock
    /// cruise is not actually regulating.
    pub fn coast_override(&self, cruise_actual_enabled: bool) -> bool {
        self.auto_throttle_limit && self.auto_throttle_limit_op_long && !cruise_actual_enabled
    }

    /// Own longitudinal frames are skipped entirely.
    pub fn longitudinal_suppressed(&self) -> bool {
        self.auto_throttle_limit && !self.auto_throttle_limit_op_long
    }

    /// Apply the blinker override rule to `apply_steer`.
    ///
    /// `blinker_active` covers both a lit signal and the grace period after it.
    pub fn blinker_override(
        &self,
        enabled: bool,
        blinker_active: bool,
        apply_steer: i32,
        v_ego: f32,
    ) -> i32 {
        if !enabled {
            return apply_steer;
        }
        if !self.lateral {
            return 0;
        }
        if !blinker_active {
            return apply_steer;
        }
        match self.blinker_steer {
            BlinkerSteer::Keep => apply_steer,
            BlinkerSteer::Release => match self.lane_change_assist_min_speed {
                Some(min) if v_ego >= min => apply_steer,
                _ => 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keeps_steer_through_signal() {
        let o = ControlOptions::default();
        assert_eq!(o.blinker_override(true, true, 500, 20.0), 500);
    }

    #[test]
    fn release_zeroes_below_assist_speed() {
        let o = ControlOptions {
            blinker_steer: BlinkerSteer::Release,
            lane_change_assist_min_speed: Some(16.0),
            ..ControlOptions::default()
        };
        assert_eq!(o.blinker_override(true, true, 500, 10.0), 0);
        assert_eq!(o.blinker_override(true, true, 500, 20.0), 500);
        assert_eq!(o.blinker_override(true, false, 500, 10.0), 500);
    }

    #[test]
    fn lateral_off_zeroes_only_when_enabled() {
        let o = ControlOptions {
            lateral: false,
            ..ControlOptions::default()
        };
        assert_eq!(o.blinker_override(true, false, 500, 20.0), 0);
        assert_eq!(o.blinker_override(false, false, 500, 20.0), 500);
    }

    #[test]
    fn throttle_limit_modes() {
        let mut o = ControlOptions {
            auto_throttle_limit: true,
            ..ControlOptions::default()
        };
        assert!(o.longitudinal_suppressed());
        assert!(!o.coast_override(false));
        o.auto_throttle_limit_op_long = true;
        assert!(!o.longitudinal_suppressed());
        assert!(o.coast_override(false));
        assert!(!o.coast_override(true));
    }
}
