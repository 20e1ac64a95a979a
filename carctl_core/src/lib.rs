#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Honda/Acura actuator-to-bus command translation (hardware-agnostic).
//!
//! Once per 100 Hz control cycle `CarController::update` turns actuator intent
//! and a telemetry snapshot into the ordered bus commands one platform
//! accepts. Byte layout is delegated to a `carctl_traits::CommandEncoder`.
//!
//! ## Architecture
//!
//! - **Calibration**: per-variant curves and capability flags (`calibration`)
//! - **Filters**: gas/brake split, brake hysteresis, rate limit, pump timer
//! - **Lead estimate**: rough lead speed for resume gating (`lead`)
//! - **Schedule**: frame cadence and rotating counters (`schedule`)
//! - **HUD**: alert codes, icons and cluster pcm fields (`hud`)
//! - **Controller**: the per-cycle synthesizer (`controller`)

pub mod calibration;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod curve;
pub mod error;
pub mod filters;
pub mod hud;
pub mod lead;
pub mod mocks;
pub mod schedule;
pub mod state;
pub mod types;
pub mod util;

pub use calibration::{CalibrationParams, DT_CTRL, LongitudinalArch, ResumePolicy};
pub use config::{BlinkerSteer, ControlOptions, PlatformConfig};
pub use controller::{CarController, ControlInputs};
pub use conversions::TraceStep;
pub use error::{CarError, Result};
pub use hud::VisualAlert;
pub use state::ControllerState;
pub use types::{ActuatorCommand, LongControlState, VehicleState};
