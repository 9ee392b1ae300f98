use std::time::{SystemTime, UNIX_EPOCH};

fn since_epoch() -> std::time::Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Get the current time in seconds since the UNIX epoch
pub fn current_time_secs() -> f64 {
    since_epoch().as_secs_f64()
}

/// Get a timestamp in milliseconds since the UNIX epoch
pub fn timestamp_millis() -> u128 {
    since_epoch().as_millis()
}
