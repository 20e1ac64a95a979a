use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::{TempDir, tempdir};

const TRACE_HEADER: &str = "frame,enabled,v_ego,accel,steer,long_state,left_blinker,right_blinker,cruise_enabled,cruise_standstill,cruise_actual_enabled,lk_mode,lead_distance,hud_lead,hud_v_cruise,pcm_cancel,hud_alert";

fn write_config(dir: &TempDir, vehicle: &str) -> PathBuf {
    let toml = format!(
        r#"
[vehicle]
{vehicle}

[options]
signal_off_delay_frames = 0

[hud]
show_lanes = true
show_car = true
"#
    );
    let path = dir.path().join("carctl.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn civic_config(dir: &TempDir) -> PathBuf {
    write_config(dir, r#"variant = "HONDA CIVIC 2016""#)
}

fn write_trace(dir: &TempDir, frames: impl IntoIterator<Item = u64>) -> PathBuf {
    let path = dir.path().join("trace.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "{TRACE_HEADER}").unwrap();
    for frame in frames {
        writeln!(f, "{frame},1,12.0,0.3,0.05,pid,0,0,1,0,1,1,35.0,1,60.0,0,").unwrap();
    }
    path
}

fn carctl() -> Command {
    Command::cargo_bin("carctl").unwrap()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["variants"], 0, "HONDA CIVIC 2016", "stdout")]
#[case(&["self-check"], 0, "self-check ok", "stdout")]
#[case(&["replay"], 2, "required", "stderr")]
#[case(&["bogus"], 2, "unrecognized subcommand", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = civic_config(&dir);

    let mut cmd = carctl();
    cmd.arg("--config").arg(&cfg).args(args);

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn variants_json_lists_every_platform() {
    let out = carctl().arg("--json").arg("variants").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 14);
    let civic = lines
        .iter()
        .find(|v| v["name"] == "HONDA CIVIC 2016")
        .unwrap();
    assert_eq!(civic["arch"], "Nidec");
    let accord = lines
        .iter()
        .find(|v| v["name"] == "HONDA ACCORD 2018")
        .unwrap();
    assert_eq!(accord["arch"], "Bosch");
    assert_eq!(accord["gas_interceptor"], false);
}

#[rstest]
fn replay_prints_one_json_line_per_frame() {
    let dir = tempdir().unwrap();
    let cfg = civic_config(&dir);
    let trace = write_trace(&dir, 0..20);

    let out = carctl()
        .arg("--config")
        .arg(&cfg)
        .arg("--log-level")
        .arg("warn")
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 20);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line["frame"], i as u64);
        let kinds: Vec<&str> = line["commands"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["kind"].as_str().unwrap())
            .collect();
        assert_eq!(kinds[0], "steering");
        assert_eq!(kinds.contains(&"ui"), i % 10 == 0, "frame {i}: {kinds:?}");
    }
    let steer = &lines[0]["commands"][0];
    assert_eq!(steer["lkas_active"], true);
    assert_eq!(steer["idx"], 0);
    assert_eq!(lines[5]["commands"][0]["idx"], 1);
}

#[rstest]
fn replay_summary_counts_commands() {
    let dir = tempdir().unwrap();
    let cfg = civic_config(&dir);
    let trace = write_trace(&dir, 0..30);

    let out = carctl()
        .arg("--config")
        .arg(&cfg)
        .arg("--log-level")
        .arg("error")
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .arg("--summary")
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    let v: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(v["frames"], 30);
    assert_eq!(v["commands"]["steering"], 30);
    assert_eq!(v["commands"]["ui"], 3);
    assert_eq!(v["interrupted"], false);
}

#[rstest]
fn replay_with_stats_reports_latency() {
    let dir = tempdir().unwrap();
    let cfg = civic_config(&dir);
    let trace = write_trace(&dir, 0..10);

    carctl()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .arg("--summary")
        .arg("--stats")
        .assert()
        .success()
        .stderr(predicate::str::contains("Missed deadlines"));
}

#[rstest]
fn replay_rejects_frame_gap() {
    let dir = tempdir().unwrap();
    let cfg = civic_config(&dir);
    let trace = write_trace(&dir, [0, 1, 3]);

    carctl()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not consecutive"));
}

#[rstest]
fn replay_reports_bad_trace_header() {
    let dir = tempdir().unwrap();
    let cfg = civic_config(&dir);
    let trace = dir.path().join("bad.csv");
    fs::write(&trace, "frame,accel\n0,0.0\n").unwrap();

    carctl()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid headers in trace CSV"));
}

#[rstest]
#[case(r#"variant = "HONDA JAZZ""#, "Unknown vehicle variant")]
#[case(
    "variant = \"HONDA ACCORD 2018\"\nown_longitudinal = true\ngas_interceptor = true",
    "Configuration is invalid"
)]
#[case(
    "variant = \"HONDA CIVIC 2016\"\ngas_interceptor = true",
    "requires vehicle.own_longitudinal"
)]
fn bad_config_exits_with_config_code(#[case] vehicle: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, vehicle);

    carctl()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(needle));
}

#[rstest]
fn missing_config_is_explained() {
    let dir = tempdir().unwrap();
    carctl()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("could not be loaded"));
}

#[rstest]
fn json_mode_emits_structured_error() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, r#"variant = "HONDA JAZZ""#);

    let out = carctl()
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8(out.stderr).unwrap();
    let last = stderr.lines().last().unwrap();
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["exit_code"], 2);
    assert!(v["message"].as_str().unwrap().contains("variant"));
}

#[rstest]
fn self_check_json_reports_variant() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        "variant = \"HONDA ACCORD 2018\"\nown_longitudinal = true",
    );
    let out = carctl()
        .arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value =
        serde_json::from_str(String::from_utf8(out.stdout).unwrap().trim()).unwrap();
    assert_eq!(v["status"], "ok");
    assert_eq!(v["variant"], "HONDA ACCORD 2018");
    assert_eq!(v["frames"], 200);
}
