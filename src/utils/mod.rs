pub mod time;

// Re-export time utilities
pub use time::{current_time, format_departure, time_since};
