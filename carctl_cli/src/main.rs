#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod error_fmt;
mod replay;
mod rt;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use carctl_core::mocks::RecordingEncoder;
use carctl_core::{
    ActuatorCommand, CalibrationParams, CarController, ControlInputs, ControlOptions,
    LongControlState, PlatformConfig, VehicleState, VisualAlert,
};
use carctl_traits::Variant;
use clap::Parser;
use eyre::WrapErr;
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::replay::{ReplayOpts, run_replay};

/// Cycles driven through the controller by `self-check`.
const SELF_CHECK_FRAMES: u64 = 200;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let _ = color_eyre::install();

    if matches!(cli.cmd, Commands::Variants) {
        init_tracing(&cli, None)?;
        return print_variants(cli.json);
    }

    let cfg = load_config(&cli.config)?;
    init_tracing(&cli, Some(&cfg.logging))?;
    tracing::debug!(config = %cli.config.display(), variant = %cfg.vehicle.variant, "config loaded");

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }

    match cli.cmd {
        Commands::Replay {
            trace,
            realtime,
            summary,
            stats,
            rt,
            rt_prio,
            rt_lock,
        } => {
            let opts = ReplayOpts {
                realtime,
                summary,
                stats,
                rt,
                rt_prio,
                rt_lock,
            };
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let result = run_replay(&cfg, &trace, opts, &shutdown, &mut out)?;
            if result.interrupted {
                eyre::bail!("replay interrupted after {} frames", result.frames);
            }
            Ok(())
        }
        Commands::SelfCheck => self_check(&cfg, cli.json),
        Commands::Variants => print_variants(cli.json),
    }
}

fn load_config(path: &Path) -> eyre::Result<carctl_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = carctl_config::load_toml(&text)
        .map_err(|e| eyre::eyre!("parse config {}: {e}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

fn init_tracing(cli: &Cli, logging: Option<&carctl_config::Logging>) -> eyre::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .wrap_err_with(|| format!("invalid --log-level '{}'", cli.log_level))?;

    // Console goes to stderr so stdout stays machine-readable.
    let console: Box<dyn Layer<Registry> + Send + Sync> = if cli.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    };
    let mut layers = vec![console];

    if let Some(file) = logging.and_then(|l| l.file.as_deref()) {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file '{file}' has no file name"))?;
        let appender = match logging.and_then(|l| l.rotation.as_deref()) {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let level = logging.and_then(|l| l.level.as_deref()).unwrap_or("info");
        let file_filter = EnvFilter::try_new(level)
            .wrap_err_with(|| format!("invalid logging.level '{level}'"))?;
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}

fn print_variants(json_mode: bool) -> eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for v in Variant::ALL {
        let p = CalibrationParams::for_variant(v).map_err(eyre::Report::new)?;
        if json_mode {
            let line = json!({
                "name": v.name(),
                "arch": format!("{:?}", p.arch),
                "resume": format!("{:?}", p.resume),
                "steer_max": p.steer_max,
                "alt_pcm_accel": p.alt_pcm_accel,
                "gas_interceptor": !v.is_bosch(),
            });
            writeln!(out, "{line}")?;
        } else {
            writeln!(
                out,
                "{:<26} {:<6} resume={:<14} steer_max={}",
                v.name(),
                format!("{:?}", p.arch),
                format!("{:?}", p.resume),
                p.steer_max
            )?;
        }
    }
    Ok(())
}

/// Drive a short synthetic cruise through the configured platform and check
/// that every cycle steers and the long cadence holds.
fn self_check(cfg: &carctl_config::Config, json_mode: bool) -> eyre::Result<()> {
    let platform = PlatformConfig::try_from(&cfg.vehicle)?;
    let options = ControlOptions::from(&cfg.options);
    let mut ctl = CarController::new(platform)?;
    let mut enc = RecordingEncoder::new();
    let vehicle = VehicleState {
        v_ego: 20.0,
        lk_mode: true,
        cruise_enabled: true,
        cruise_actual_enabled: true,
        lead_distance: 40.0,
        ..VehicleState::default()
    };

    let mut can_frames = 0usize;
    for frame in 0..SELF_CHECK_FRAMES {
        let actuators = ActuatorCommand {
            accel: if frame < SELF_CHECK_FRAMES / 2 { 0.5 } else { -1.0 },
            steer: 0.1,
            long_control_state: LongControlState::Pid,
        };
        let input = ControlInputs {
            enabled: true,
            vehicle: &vehicle,
            frame,
            actuators: &actuators,
            pcm_override: false,
            pcm_cancel_cmd: false,
            hud_v_cruise: 72.0,
            hud_show_lanes: cfg.hud.show_lanes,
            hud_show_car: cfg.hud.show_car,
            hud_alert: VisualAlert::None,
            options: &options,
        };
        can_frames += ctl.update(&mut enc, &input).len();
    }

    let steering = enc.count("steering") as u64;
    if steering != SELF_CHECK_FRAMES {
        eyre::bail!("self-check: expected {SELF_CHECK_FRAMES} steering commands, got {steering}");
    }
    let ui = enc.count("ui") as u64;
    if !options.auto_throttle_limit && ui != SELF_CHECK_FRAMES / 10 {
        eyre::bail!("self-check: expected {} HUD updates, got {ui}", SELF_CHECK_FRAMES / 10);
    }

    tracing::info!(variant = %platform.variant, can_frames, "self-check ok");
    if json_mode {
        println!(
            "{}",
            json!({
                "status": "ok",
                "variant": platform.variant.name(),
                "frames": SELF_CHECK_FRAMES,
                "can_frames": can_frames,
            })
        );
    } else {
        println!(
            "self-check ok: {} ({:?}), {SELF_CHECK_FRAMES} cycles, {can_frames} frames",
            platform.variant,
            ctl.params().arch
        );
    }
    Ok(())
}
