use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Countdown label, `m:ss`.
#[must_use]
pub fn format_countdown(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn formats_timestamps_and_countdowns() {
        assert_eq!(format_datetime(fixed_now()), "2023-11-14 22:13 UTC");
        assert_eq!(format_countdown(60), "1:00");
        assert_eq!(format_countdown(43), "0:43");
        assert_eq!(format_countdown(0), "0:00");
    }
}
