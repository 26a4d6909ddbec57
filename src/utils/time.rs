use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current time in seconds since the Unix epoch
///
/// A clock set before the epoch reads as 0.
pub fn current_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Calculate seconds since a given timestamp
///
/// Returns 0 if the timestamp is in the future
pub fn time_since(timestamp: u64) -> u64 {
    current_time().saturating_sub(timestamp)
}

/// Format a departure timestamp relative to now, e.g. "in 3 hours"
pub fn format_departure(timestamp: u64) -> String {
    let now = current_time();
    let (diff, future) = if timestamp >= now {
        (timestamp - now, true)
    } else {
        (now - timestamp, false)
    };

    let span = if diff < 60 {
        return String::from("now");
    } else if diff < 3600 {
        format!("{} minutes", diff / 60)
    } else if diff < 86400 {
        format!("{} hours", diff / 3600)
    } else {
        format!("{} days", diff / 86400)
    };

    if future {
        format!("in {}", span)
    } else {
        format!("{} ago", span)
    }
}
