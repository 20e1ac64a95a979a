//! Drive-trace replay: config mapping, controller assembly, and the paced frame loop.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use carctl_core::mocks::{RecordingEncoder, SentCommand};
use carctl_core::util::control_period_us;
use carctl_core::{CarController, ControlInputs, ControlOptions, PlatformConfig, TraceStep};
use eyre::WrapErr;
use serde_json::{Value, json};

use crate::cli::RtLock;
use crate::rt::setup_rt_once;

/// How the replay loop runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOpts {
    pub realtime: bool,
    pub summary: bool,
    pub stats: bool,
    pub rt: bool,
    pub rt_prio: Option<i32>,
    pub rt_lock: Option<RtLock>,
}

/// Totals over one replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: usize,
    pub can_frames: usize,
    pub commands: BTreeMap<&'static str, usize>,
    pub interrupted: bool,
}

impl ReplaySummary {
    pub fn to_json(&self) -> Value {
        json!({
            "frames": self.frames,
            "can_frames": self.can_frames,
            "commands": self.commands,
            "interrupted": self.interrupted,
        })
    }
}

/// One JSON object per encoder call.
pub fn command_json(cmd: &SentCommand) -> Value {
    let mut v = match cmd {
        SentCommand::Steering(s) => json!({
            "apply_steer": s.apply_steer,
            "lkas_active": s.lkas_active,
            "idx": s.idx,
            "radar_disabled": s.radar_disabled,
        }),
        SentCommand::Acc(a) => json!({
            "enabled": a.enabled,
            "accel": a.accel,
            "gas": a.gas,
            "idx": a.idx,
            "stopping": a.stopping,
            "starting": a.starting,
        }),
        SentCommand::Brake {
            apply_brake,
            pump_on,
            pcm_override,
            pcm_cancel,
            fcw,
            idx,
        } => json!({
            "apply_brake": apply_brake,
            "pump_on": pump_on,
            "pcm_override": pcm_override,
            "pcm_cancel": pcm_cancel,
            "fcw": fcw,
            "idx": idx,
        }),
        SentCommand::Gas { apply_gas, idx } => json!({ "apply_gas": apply_gas, "idx": idx }),
        SentCommand::Ui {
            pcm_speed,
            hud,
            idx,
        } => json!({
            "pcm_speed": pcm_speed,
            "pcm_accel": hud.pcm_accel,
            "v_cruise": hud.v_cruise,
            "car": hud.car,
            "lanes": hud.lanes,
            "fcw": hud.fcw,
            "acc_alert": hud.acc_alert,
            "steer_required": hud.steer_required,
            "idx": idx,
        }),
        SentCommand::AccSupplemental { idx } => json!({ "idx": idx }),
        SentCommand::RadarKeepAlive => json!({}),
        SentCommand::Button { button, idx } => {
            json!({ "button": format!("{button:?}"), "idx": idx })
        }
    };
    if let Value::Object(map) = &mut v {
        map.insert("kind".into(), Value::from(cmd.kind()));
    }
    v
}

fn record_sample(
    latencies: &mut Vec<u64>,
    missed_deadlines: &mut usize,
    period_us: u64,
    t_start: Instant,
) {
    let latency = t_start.elapsed().as_micros() as u64;
    latencies.push(latency);
    if latency > period_us {
        *missed_deadlines = missed_deadlines.saturating_add(1);
    }
}

pub fn run_replay(
    cfg: &carctl_config::Config,
    trace: &Path,
    opts: ReplayOpts,
    shutdown: &Arc<AtomicBool>,
    out: &mut impl Write,
) -> eyre::Result<ReplaySummary> {
    setup_rt_once(
        opts.rt,
        opts.rt_prio,
        opts.rt_lock.unwrap_or_else(RtLock::os_default),
    );

    let platform = PlatformConfig::try_from(&cfg.vehicle)?;
    let options = ControlOptions::from(&cfg.options);
    let rows = carctl_config::load_trace_csv(trace)?;
    let steps = rows
        .iter()
        .map(TraceStep::try_from)
        .collect::<eyre::Result<Vec<_>>>()?;

    let mut ctl = CarController::new(platform)?;
    let mut enc = RecordingEncoder::new();
    let mut summary = ReplaySummary::default();

    let period_us = control_period_us();
    let period = Duration::from_micros(period_us);
    let mut latencies = Vec::with_capacity(if opts.stats { steps.len() } else { 0 });
    let mut missed_deadlines = 0;

    tracing::info!(
        variant = %platform.variant,
        frames = steps.len(),
        trace = %trace.display(),
        "replay start"
    );
    let mut next_deadline = Instant::now();
    for step in &steps {
        if shutdown.load(Ordering::Relaxed) {
            tracing::warn!(frame = step.frame, "replay interrupted");
            summary.interrupted = true;
            break;
        }

        let t_start = Instant::now();
        let input = ControlInputs {
            enabled: step.enabled,
            vehicle: &step.vehicle,
            frame: step.frame,
            actuators: &step.actuators,
            pcm_override: false,
            pcm_cancel_cmd: step.pcm_cancel,
            hud_v_cruise: step.hud_v_cruise,
            hud_show_lanes: cfg.hud.show_lanes,
            hud_show_car: cfg.hud.show_car,
            hud_alert: step.hud_alert,
            options: &options,
        };
        let frames = ctl.update(&mut enc, &input);
        let sent = enc.take();
        if opts.stats {
            record_sample(&mut latencies, &mut missed_deadlines, period_us, t_start);
        }

        summary.frames += 1;
        summary.can_frames += frames.len();
        for cmd in &sent {
            *summary.commands.entry(cmd.kind()).or_insert(0) += 1;
        }
        if !opts.summary {
            let line = json!({
                "frame": step.frame,
                "can_frames": frames.len(),
                "commands": sent.iter().map(command_json).collect::<Vec<_>>(),
            });
            writeln!(out, "{line}").wrap_err("write replay output")?;
        }

        if opts.realtime {
            next_deadline += period;
            let now = Instant::now();
            if next_deadline > now {
                std::thread::sleep(next_deadline - now);
            } else {
                // fell behind: resync instead of bursting
                next_deadline = now;
            }
        }
    }

    if opts.summary {
        writeln!(out, "{}", summary.to_json()).wrap_err("write replay summary")?;
    }
    if opts.stats && !latencies.is_empty() {
        print_stats(&latencies, summary.frames, missed_deadlines, period_us);
    }
    tracing::info!(
        frames = summary.frames,
        can_frames = summary.can_frames,
        "replay complete"
    );
    Ok(summary)
}

/// Print latency/jitter stats to stderr.
fn print_stats(latencies: &[u64], cycle_count: usize, missed_deadlines: usize, period_us: u64) {
    let min = *latencies.iter().min().unwrap_or(&0);
    let max = *latencies.iter().max().unwrap_or(&0);
    let avg = latencies.iter().sum::<u64>() as f64 / latencies.len() as f64;
    let stdev = if latencies.len() > 1 {
        let var = latencies
            .iter()
            .map(|&x| (x as f64 - avg).powi(2))
            .sum::<f64>()
            / (latencies.len() as f64 - 1.0);
        var.sqrt()
    } else {
        0.0
    };
    eprintln!("\n--- Replay Stats ---");
    eprintln!("Cycles: {cycle_count}");
    eprintln!("Period (us): {period_us}");
    eprintln!("Latency min/avg/max/stdev (us): {min:.0} / {avg:.1} / {max:.0} / {stdev:.1}");
    eprintln!("Missed deadlines (> period): {missed_deadlines}");
    eprintln!("--------------------\n");
}
