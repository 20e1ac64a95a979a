#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and drive-trace parsing for the car controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The drive-trace CSV loader enforces headers and a gap-free frame counter.
use carctl_traits::Variant;
use serde::Deserialize;
use serde::de::{self, Deserializer};

/// Longest accepted blinker grace period (60 s at 100 Hz).
pub const MAX_SIGNAL_OFF_DELAY_FRAMES: u64 = 6_000;
/// Upper bound for speed settings, m/s.
pub const MAX_SPEED_SETTING: f32 = 70.0;

#[derive(Debug, Deserialize)]
pub struct Vehicle {
    /// Fingerprint name, e.g. "HONDA CIVIC 2016".
    pub variant: String,
    /// Stock cruise issues speed control.
    #[serde(default = "default_true")]
    pub pcm_cruise: bool,
    #[serde(default)]
    pub own_longitudinal: bool,
    #[serde(default)]
    pub gas_interceptor: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlinkerSteer {
    #[default]
    Keep,
    Release,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Options {
    pub signal_off_delay_frames: u64,
    pub auto_throttle_limit: bool,
    pub auto_throttle_limit_op_long: bool,
    pub allow_gas: bool,
    pub lateral: bool,
    pub blinker_steer: BlinkerSteer,
    /// m/s; only meaningful with `blinker_steer = "release"`.
    pub lane_change_assist_min_speed: Option<f32>,
}

impl Default for Options {
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hud {
    pub show_lanes: bool,
    pub show_car: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            show_lanes: true,
            show_car: false,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub vehicle: Vehicle,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub hud: Hud,
    #[serde(default)]
    pub logging: Logging,
}

fn default_true() -> bool {
    true
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Parsed vehicle variant.
    pub fn variant(&self) -> eyre::Result<Variant> {
        self.vehicle
            .variant
            .parse::<Variant>()
            .map_err(|e| eyre::eyre!("vehicle.variant: {e}"))
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Vehicle
        let variant = self.variant()?;
        if self.vehicle.gas_interceptor && variant.is_bosch() {
            eyre::bail!("vehicle.gas_interceptor is not supported on Bosch platform {variant}");
        }
        if self.vehicle.gas_interceptor && !self.vehicle.own_longitudinal {
            eyre::bail!("vehicle.gas_interceptor requires vehicle.own_longitudinal = true");
        }

        // Options
        if self.options.signal_off_delay_frames > MAX_SIGNAL_OFF_DELAY_FRAMES {
            eyre::bail!(
                "options.signal_off_delay_frames must be <= {MAX_SIGNAL_OFF_DELAY_FRAMES}"
            );
        }
        if self.options.auto_throttle_limit_op_long && !self.options.auto_throttle_limit {
            eyre::bail!("options.auto_throttle_limit_op_long requires options.auto_throttle_limit");
        }
        if let Some(v) = self.options.lane_change_assist_min_speed
            && !(v.is_finite() && (0.0..=MAX_SPEED_SETTING).contains(&v))
        {
            eyre::bail!(
                "options.lane_change_assist_min_speed must be in [0.0, {MAX_SPEED_SETTING}] m/s"
            );
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got '{rot}'");
        }
        if let Some(file) = self.logging.file.as_deref()
            && file.trim().is_empty()
        {
            eyre::bail!("logging.file must not be empty when set");
        }

        Ok(())
    }
}

/// Drive-trace CSV schema, one row per control frame.
///
/// Expected headers:
/// frame,enabled,v_ego,accel,steer,long_state,left_blinker,right_blinker,
/// cruise_enabled,cruise_standstill,cruise_actual_enabled,lk_mode,
/// lead_distance,hud_lead,hud_v_cruise,pcm_cancel,hud_alert
///
/// Flags accept `true`/`false` or `1`/`0`. `long_state` is one of
/// off|pid|stopping|starting; `hud_alert` may be empty.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TraceRow {
    pub frame: u64,
    #[serde(deserialize_with = "de_flag")]
    pub enabled: bool,
    pub v_ego: f32,
    pub accel: f32,
    pub steer: f32,
    pub long_state: String,
    #[serde(deserialize_with = "de_flag")]
    pub left_blinker: bool,
    #[serde(deserialize_with = "de_flag")]
    pub right_blinker: bool,
    #[serde(deserialize_with = "de_flag")]
    pub cruise_enabled: bool,
    #[serde(deserialize_with = "de_flag")]
    pub cruise_standstill: bool,
    #[serde(deserialize_with = "de_flag")]
    pub cruise_actual_enabled: bool,
    #[serde(deserialize_with = "de_flag")]
    pub lk_mode: bool,
    pub lead_distance: f32,
    pub hud_lead: u8,
    pub hud_v_cruise: f32,
    #[serde(deserialize_with = "de_flag")]
    pub pcm_cancel: bool,
    #[serde(default)]
    pub hud_alert: String,
}

pub const TRACE_HEADERS: [&str; 17] = [
    "frame",
    "enabled",
    "v_ego",
    "accel",
    "steer",
    "long_state",
    "left_blinker",
    "right_blinker",
    "cruise_enabled",
    "cruise_standstill",
    "cruise_actual_enabled",
    "lk_mode",
    "lead_distance",
    "hud_lead",
    "hud_v_cruise",
    "pcm_cancel",
    "hud_alert",
];

fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" | "" => Ok(false),
        other => Err(de::Error::custom(format!(
            "expected true/false or 1/0, got '{other}'"
        ))),
    }
}

/// Parse a drive trace from any reader.
pub fn read_trace<R: std::io::Read>(reader: R) -> eyre::Result<Vec<TraceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read trace CSV headers: {e}"))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != TRACE_HEADERS {
        eyre::bail!(
            "trace CSV must have headers '{}', got: {}",
            TRACE_HEADERS.join(","),
            actual.join(",")
        );
    }

    let mut rows: Vec<TraceRow> = Vec::new();
    for (idx, rec) in rdr.deserialize::<TraceRow>().enumerate() {
        let line = idx + 2;
        let row = rec.map_err(|e| eyre::eyre!("invalid trace row {line}: {e}"))?;
        if let Some(prev) = rows.last()
            && prev.frame.checked_add(1) != Some(row.frame)
        {
            eyre::bail!(
                "trace row {line}: frame {} does not follow frame {} (frames must be gap-free)",
                row.frame,
                prev.frame
            );
        }
        rows.push(row);
    }
    if rows.is_empty() {
        eyre::bail!("trace CSV has no rows");
    }
    Ok(rows)
}

pub fn load_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<TraceRow>> {
    let file =
        std::fs::File::open(path).map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;
    read_trace(std::io::BufReader::new(file))
        .map_err(|e| eyre::eyre!("{}: {}", path.display(), e))
}
