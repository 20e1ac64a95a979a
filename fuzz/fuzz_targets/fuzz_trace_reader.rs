#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Malformed rows, bad headers and frame gaps must come back as errors.
    if let Ok(rows) = carctl_config::read_trace(data) {
        assert!(!rows.is_empty());
        assert!(rows.windows(2).all(|w| w[0].frame.checked_add(1) == Some(w[1].frame)));
    }
});
