use std::fs::File;
use std::io::Write;

use carctl_config::{TRACE_HEADERS, load_trace_csv, read_trace};
use rstest::rstest;
use tempfile::tempdir;

fn header() -> String {
    TRACE_HEADERS.join(",")
}

fn row(frame: u64) -> String {
    format!("{frame},1,10.0,0.5,0.1,pid,0,0,1,0,1,1,30.0,1,40.0,0,")
}

#[rstest]
fn loads_trace_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trace.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "{}", header()).unwrap();
    for i in 0..3 {
        writeln!(f, "{}", row(i)).unwrap();
    }
    drop(f);

    let rows = load_trace_csv(&path).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].frame, 2);
    assert!(rows[0].enabled);
    assert!(!rows[0].left_blinker);
    assert_eq!(rows[0].long_state, "pid");
    assert_eq!(rows[0].hud_alert, "");
    assert!((rows[0].lead_distance - 30.0).abs() < 1e-6);
}

#[rstest]
fn accepts_word_flags_and_alerts() {
    let csv = format!(
        "{}\n5,true,0.0,-1.0,0.0,stopping,false,true,true,true,false,true,12.5,0,0.0,false,steerRequired\n",
        header()
    );
    let rows = read_trace(csv.as_bytes()).unwrap();
    assert_eq!(rows[0].frame, 5);
    assert!(rows[0].right_blinker);
    assert!(rows[0].cruise_standstill);
    assert_eq!(rows[0].hud_alert, "steerRequired");
}

#[rstest]
fn rejects_wrong_headers() {
    let csv = "frame,enabled\n0,1\n";
    let err = read_trace(csv.as_bytes()).unwrap_err();
    assert!(format!("{err}").contains("must have headers"));
}

#[rstest]
fn rejects_frame_gap_with_row_number() {
    let csv = format!("{}\n{}\n{}\n", header(), row(0), row(2));
    let err = read_trace(csv.as_bytes()).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("row 3"), "{msg}");
    assert!(msg.contains("gap-free"), "{msg}");
}

#[rstest]
fn rejects_bad_flag_with_row_number() {
    let bad = "0,maybe,10.0,0.5,0.1,pid,0,0,1,0,1,1,30.0,1,40.0,0,";
    let csv = format!("{}\n{}\n", header(), bad);
    let err = read_trace(csv.as_bytes()).unwrap_err();
    assert!(format!("{err}").contains("invalid trace row 2"));
}

#[rstest]
fn rejects_empty_trace() {
    let err = read_trace(format!("{}\n", header()).as_bytes()).unwrap_err();
    assert!(format!("{err}").contains("no rows"));
}

#[rstest]
fn missing_file_names_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let err = load_trace_csv(&path).unwrap_err();
    assert!(format!("{err}").contains("absent.csv"));
}

#[rstest]
fn last_representable_frame_cannot_be_followed() {
    let csv = format!("{}\n{}\n{}\n", header(), row(u64::MAX), row(0));
    let err = read_trace(csv.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("gap-free"));
}
