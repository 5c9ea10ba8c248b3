use std::{env, path::PathBuf, time::Duration};

// Runtime constants (not gameplay tuning).

pub fn frame_interval() -> Duration {
    let millis = env::var("FRAME_INTERVAL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|&millis| millis > 0)
        .unwrap_or(33);
    Duration::from_millis(millis)
}

pub fn input_poll() -> Duration {
    let millis = env::var("INPUT_POLL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|&millis| millis > 0)
        .unwrap_or(20);
    Duration::from_millis(millis)
}

pub fn log_file() -> Option<PathBuf> {
    env::var_os("LOG_FILE")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn json_logs() -> bool {
    matches!(env::var("LOG_FORMAT").as_deref(), Ok("json"))
}
