//! Per-cycle command synthesis.

use carctl_traits::{
    AccCommand, BrakeCommand, CanFrame, CommandEncoder, CruiseButton, HudData, SteeringCommand,
    UiCommand,
};

use crate::calibration::{
    CalibrationParams, DT_CTRL, LongitudinalArch, ResumePolicy, STOPPING_ACCEL,
};
use crate::config::{ControlOptions, PlatformConfig};
use crate::curve::interp;
use crate::error::{CarError, Report, Result};
use crate::filters::{
    BRAKE_RELEASE_RATE, brake_hysteresis, brake_pump_hysteresis, compute_gas_brake, rate_limit,
};
use crate::hud::{VisualAlert, hud_car, hud_lanes, pcm_speed_accel, process_hud_alert, wind_brake};
use crate::schedule;
use crate::state::ControllerState;
use crate::types::{ActuatorCommand, LongControlState, VehicleState};
use crate::util::{finite_or_zero, sanitize_speed};

/// Lead must pull this far past the stopped baseline (m) to allow a resume.
pub const RESUME_LEAD_GAP_M: f32 = 15.0;
/// Estimated lead speed above which a resume is allowed.
pub const RESUME_LEAD_SPEED: f32 = 0.1;
/// Lead status code meaning "lead visible" on the stock HUD.
pub const HUD_LEAD_VISIBLE: u8 = 1;

const INTERCEPTOR_GAIN_BP: [f32; 2] = [0.0, 10.0];
const INTERCEPTOR_GAIN_V: [f32; 2] = [0.4, 1.0];

/// Everything the caller supplies for one cycle.
#[derive(Debug, Clone, Copy)]
pub struct ControlInputs<'a> {
    pub enabled: bool,
    pub vehicle: &'a VehicleState,
    /// Monotonic, gap-free cycle counter.
    pub frame: u64,
    pub actuators: &'a ActuatorCommand,
    pub pcm_override: bool,
    pub pcm_cancel_cmd: bool,
    /// Set speed shown on the cluster, in display units.
    pub hud_v_cruise: f32,
    pub hud_show_lanes: bool,
    pub hud_show_car: bool,
    pub hud_alert: VisualAlert,
    pub options: &'a ControlOptions,
}

/// Translates actuator intent into the bus commands one platform accepts.
///
/// Owns all inter-cycle memory. `update` must be called once per control
/// period with a frame counter that increases by one each call.
#[derive(Debug, Clone)]
pub struct CarController {
    platform: PlatformConfig,
    params: CalibrationParams,
    state: ControllerState,
}

impl CarController {
    pub fn new(platform: PlatformConfig) -> Result<Self> {
        let params = CalibrationParams::for_variant(platform.variant).map_err(Report::new)?;
        Self::with_params(platform, params)
    }

    /// Build with an explicit calibration (tests, tuning).
    pub fn with_params(platform: PlatformConfig, params: CalibrationParams) -> Result<Self> {
        if params.variant != platform.variant {
            return Err(Report::new(CarError::Config(format!(
                "calibration for {} does not match platform {}",
                params.variant, platform.variant
            ))));
        }
        params.validate().map_err(Report::new)?;
        if platform.gas_interceptor && params.arch == LongitudinalArch::Bosch {
            return Err(Report::new(CarError::Config(format!(
                "gas interceptor is not supported on {}",
                platform.variant
            ))));
        }
        tracing::info!(
            variant = %platform.variant,
            own_longitudinal = platform.own_longitudinal,
            pcm_cruise = platform.pcm_cruise,
            gas_interceptor = platform.gas_interceptor,
            "car controller ready"
        );
        Ok(Self {
            platform,
            params,
            state: ControllerState::default(),
        })
    }

    pub fn platform(&self) -> &PlatformConfig {
        &self.platform
    }

    pub fn params(&self) -> &CalibrationParams {
        &self.params
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Run one control cycle and return the frames to send, in order.
    pub fn update<E: CommandEncoder + ?Sized>(
        &mut self,
        encoder: &mut E,
        input: &ControlInputs<'_>,
    ) -> Vec<CanFrame> {
        let p = &self.params;
        let cs = input.vehicle;
        let opts = input.options;
        let frame = input.frame;
        let enabled = input.enabled;
        let variant = self.platform.variant;

        let v_ego = sanitize_speed(cs.v_ego);
        let lead_distance = finite_or_zero(cs.lead_distance);
        let req_accel = sanitized(input.actuators.accel, "accel").clamp(p.accel_min, p.accel_max);
        let req_steer = sanitized(input.actuators.steer, "steer").clamp(-1.0, 1.0);

        let (mut accel, gas, brake) = if enabled {
            let (gas, brake) = compute_gas_brake(req_accel, v_ego, p.arch);
            (req_accel, gas, brake)
        } else {
            (0.0, 0.0, 0.0)
        };

        let (pre_limit_brake, hyst) = brake_hysteresis(brake, self.state.brake_hyst);
        self.state.brake_hyst = hyst;

        let mut pcm_cancel = input.pcm_cancel_cmd;
        if !enabled && cs.cruise_enabled {
            pcm_cancel = true;
        }
        // A cancel to a cruise stack that never engaged releases the brakes at standstill.
        pcm_cancel = pcm_cancel && self.platform.pcm_cruise;

        self.state.brake_last = rate_limit(
            pre_limit_brake,
            self.state.brake_last,
            -BRAKE_RELEASE_RATE * DT_CTRL,
            f32::INFINITY,
        );

        let lanes = hud_lanes(input.hud_show_lanes, cs.lk_mode);
        let car = hud_car(enabled, input.hud_show_car);
        let alerts = process_hud_alert(input.hud_alert);

        // Bus convention is positive when steering right.
        let steer_max = p.steer_max;
        let mut apply_steer =
            (p.steer_lookup.eval(-req_steer * steer_max as f32) as i32).clamp(-steer_max, steer_max);

        let lkas_active = enabled && !cs.steer_not_allowed && cs.lk_mode;

        let mut frames = Vec::with_capacity(8);

        if self.platform.own_longitudinal
            && p.arch == LongitudinalArch::Bosch
            && schedule::is_keep_alive_frame(frame)
        {
            frames.push(encoder.radar_keep_alive());
        }

        let blinker_on = cs.blinker_on();
        if !enabled {
            self.state.blinker_end_frame = 0;
        }
        if self.state.last_blinker_on && !blinker_on {
            self.state.blinker_end_frame = frame.saturating_add(opts.signal_off_delay_frames);
        }
        let blinker_active = blinker_on || frame < self.state.blinker_end_frame;
        apply_steer = opts.blinker_override(enabled, blinker_active, apply_steer, v_ego);
        self.state.last_blinker_on = blinker_on;

        frames.push(encoder.steering(&SteeringCommand {
            apply_steer,
            lkas_active,
            variant,
            idx: schedule::steering_counter(frame),
            radar_disabled: self.platform.own_longitudinal,
        }));

        let stopping = input.actuators.long_control_state == LongControlState::Stopping;
        let starting = input.actuators.long_control_state == LongControlState::Starting;
        if stopping {
            accel = STOPPING_ACCEL;
        }

        let (pcm_speed, pcm_accel) = pcm_speed_accel(p, v_ego, gas, brake, accel);

        if self.platform.own_longitudinal {
            if schedule::is_long_frame(frame) {
                let idx = schedule::long_counter(frame);
                let coast = opts.coast_override(cs.cruise_actual_enabled);
                if opts.longitudinal_suppressed() {
                    tracing::trace!(frame, "longitudinal left to stock throttle limit");
                } else {
                    match p.arch {
                        LongitudinalArch::Bosch => {
                            let (accel, bosch_gas) = if coast {
                                (0.0, 0.0)
                            } else {
                                (accel, p.gas_lookup.eval(accel))
                            };
                            frames.extend(encoder.acc(&AccCommand {
                                enabled,
                                accel,
                                gas: bosch_gas,
                                idx,
                                stopping,
                                starting,
                                variant,
                            }));
                        }
                        LongitudinalArch::Nidec => {
                            let ts = schedule::frame_ts(frame);
                            let apply_brake = if coast {
                                0
                            } else {
                                scale_brake(self.state.brake_last - wind_brake(v_ego), p.brake_max)
                            };
                            let (pump_on, pump) = brake_pump_hysteresis(
                                apply_brake,
                                self.state.apply_brake_last,
                                self.state.pump,
                                ts,
                            );
                            if pump.last_trigger_s != self.state.pump.last_trigger_s {
                                tracing::trace!(frame, apply_brake, "brake pump triggered");
                            }
                            self.state.pump = pump;
                            frames.push(encoder.brake(&BrakeCommand {
                                apply_brake,
                                pump_on,
                                pcm_override: input.pcm_override,
                                pcm_cancel,
                                fcw: alerts.fcw,
                                idx,
                                variant,
                                stock_brake: &cs.stock_brake,
                            }));
                            self.state.apply_brake_last = apply_brake;

                            if self.platform.gas_interceptor {
                                let apply_gas = if coast {
                                    0.0
                                } else {
                                    let gain =
                                        interp(v_ego, &INTERCEPTOR_GAIN_BP, &INTERCEPTOR_GAIN_V);
                                    (gain * gas).clamp(0.0, 1.0)
                                };
                                frames.push(encoder.gas(apply_gas, idx));
                            }
                        }
                    }
                }
            }
        } else {
            if schedule::is_long_frame(frame) {
                frames.push(encoder.acc_supplemental(variant, schedule::long_counter(frame)));
            }
            let idx = schedule::button_counter(frame);
            if !opts.allow_gas && pcm_cancel {
                tracing::trace!(frame, enabled, "cancelling stock cruise");
                frames.push(encoder.button(CruiseButton::Cancel, variant, idx));
            } else if cs.cruise_standstill {
                if self.resume_allowed(cs, lead_distance) {
                    tracing::trace!(frame, policy = ?self.params.resume, "resuming from standstill");
                    frames.push(encoder.button(CruiseButton::ResAccel, variant, idx));
                }
            } else {
                self.state.stopped_lead_distance = lead_distance;
                self.state.lead.rebase(lead_distance);
            }
        }

        let hud = HudData {
            pcm_accel,
            v_cruise: finite_or_zero(input.hud_v_cruise).round_ties_even() as i32,
            car,
            lanes,
            fcw: alerts.fcw,
            acc_alert: alerts.acc_alert,
            steer_required: alerts.steer_required,
            dashed_lanes: cs.lk_mode,
        };
        self.state.last_hud = hud;

        if !opts.auto_throttle_limit && schedule::is_hud_frame(frame) {
            frames.extend(encoder.ui(&UiCommand {
                pcm_speed,
                hud,
                variant,
                is_metric: cs.is_metric,
                idx: schedule::hud_counter(frame),
                own_longitudinal: self.platform.own_longitudinal,
                stock_hud: &cs.stock_hud,
            }));
        }

        frames
    }

    /// Whether stock cruise may be resumed from standstill this cycle.
    fn resume_allowed(&mut self, cs: &VehicleState, lead_distance: f32) -> bool {
        match self.params.resume {
            ResumePolicy::LeadDeparture => {
                let lead_speed = self.state.lead.update(lead_distance);
                let departed = lead_distance > self.state.stopped_lead_distance + RESUME_LEAD_GAP_M
                    || lead_speed > RESUME_LEAD_SPEED;
                if departed {
                    self.state.stopped_lead_distance = 0.0;
                }
                departed
            }
            ResumePolicy::LeadVisible => cs.hud_lead == HUD_LEAD_VISIBLE,
            ResumePolicy::Unconditional => true,
        }
    }
}

/// Brake fraction to bus units in `[0, brake_max - 1]`.
fn scale_brake(fraction: f32, brake_max: u16) -> u16 {
    let ceil = f32::from(brake_max.saturating_sub(1));
    (fraction.clamp(0.0, 1.0) * f32::from(brake_max)).clamp(0.0, ceil) as u16
}

fn sanitized(x: f32, what: &'static str) -> f32 {
    if x.is_finite() {
        x
    } else {
        tracing::warn!(input = what, value = %x, "non-finite actuator input replaced with 0");
        0.0
    }
}
