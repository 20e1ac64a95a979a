//! Human-readable error descriptions and structured JSON error formatting.

use carctl_core::CarError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ce) = err.downcast_ref::<CarError>() {
        return match ce {
            CarError::UnknownVariant(name) => format!(
                "What happened: Unknown vehicle variant '{name}'.\nLikely causes: Typo in vehicle.variant or a platform this build does not support.\nHow to fix: Run `carctl variants` and copy one of the listed names into the config."
            ),
            CarError::Calibration { variant, reason } => format!(
                "What happened: Calibration table for {variant} is invalid ({reason}).\nLikely causes: A breakpoint table was edited out of order.\nHow to fix: Restore the calibration for this platform; this is a build defect, not a config problem."
            ),
            CarError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Options that do not apply to this platform.\nHow to fix: Edit the [vehicle] section of the config, then rerun."
            ),
            CarError::Trace(msg) => format!(
                "What happened: A drive-trace row could not be replayed ({msg}).\nLikely causes: Unknown long_state or hud_alert value.\nHow to fix: Use long_state off|pid|stopping|starting and a known alert name (or leave hud_alert empty)."
            ),
        };
    }

    // String-based heuristics for errors coming from config or CSV loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.starts_with("read config") || lower.starts_with("parse config") {
        return format!(
            "What happened: The config file could not be loaded.\nLikely causes: Wrong --config path or invalid TOML.\nHow to fix: Check the path (default etc/carctl.toml) and the TOML syntax. Original: {msg}"
        );
    }

    if lower.contains("trace csv must have headers") {
        return format!(
            "Invalid headers in trace CSV. Expected '{}'.",
            carctl_config::TRACE_HEADERS.join(",")
        );
    }

    if lower.contains("gap-free") {
        return format!(
            "What happened: Drive trace frames are not consecutive.\nLikely causes: Rows were dropped or reordered when the trace was exported.\nHow to fix: Re-export the trace with one row per control frame. Original: {msg}"
        );
    }

    if lower.contains("unknown vehicle variant") {
        return format!(
            "What happened: Unknown vehicle variant.\nLikely causes: Typo in vehicle.variant.\nHow to fix: Run `carctl variants` for the supported names. Original: {msg}"
        );
    }

    if lower.starts_with("vehicle.")
        || lower.starts_with("options.")
        || lower.starts_with("logging.")
    {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Out-of-range or conflicting values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable process exit codes: 2 config, 3 trace, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<CarError>() {
        Some(CarError::UnknownVariant(_) | CarError::Config(_)) => 2,
        Some(CarError::Trace(_)) => 3,
        Some(CarError::Calibration { .. }) => 1,
        None => {
            let lower = err.to_string().to_ascii_lowercase();
            if lower.starts_with("read config")
                || lower.starts_with("parse config")
                || lower.starts_with("vehicle.")
                || lower.starts_with("options.")
                || lower.starts_with("logging.")
            {
                2
            } else if lower.contains("trace csv") || lower.contains("trace row") {
                3
            } else {
                1
            }
        }
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<CarError>() {
        Some(CarError::UnknownVariant(_)) => "UnknownVariant",
        Some(CarError::Calibration { .. }) => "Calibration",
        Some(CarError::Config(_)) => "Config",
        Some(CarError::Trace(_)) => "Trace",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
