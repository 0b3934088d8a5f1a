//! Shared formatting helpers for the front ends.
//!
//! Pure functions only: no ratatui styles, no layout.

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};

const MIB: f64 = 1024.0 * 1024.0;

/// Bytes expressed in mebibytes, the unit network and memory charts use.
pub fn bytes_to_mib(bytes: u64) -> f64 {
    bytes as f64 / MIB
}

/// `"12.34 MB"`: mebibytes with two decimals.
pub fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes_to_mib(bytes))
}

/// `"42.5%"`. Non-finite values render as `"-"`.
pub fn format_percent(pct: f64) -> String {
    if pct.is_finite() {
        format!("{:.1}%", pct)
    } else {
        "-".to_string()
    }
}

/// Refresh interval as shown to the user: `"2s"`, `"1.5s"`.
pub fn format_interval(interval: Duration) -> String {
    let ms = interval.as_millis();
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{:.1}s", interval.as_secs_f64())
    }
}

/// Local wall-clock time of a Unix-millis timestamp, `"HH:MM:SS"`.
pub fn format_clock(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt: DateTime<Local>| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

/// Truncates to `max_len` characters, marking the cut with `~`.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_len - 1).collect();
    out.push('~');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mb_has_two_decimals() {
        assert_eq!(format_mb(0), "0.00 MB");
        assert_eq!(format_mb(10_485_760), "10.00 MB");
        assert_eq!(format_mb(1_572_864), "1.50 MB");
        assert!((bytes_to_mib(52_428_800) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn percent_and_interval() {
        assert_eq!(format_percent(42.46), "42.5%");
        assert_eq!(format_percent(f64::NAN), "-");
        assert_eq!(format_interval(Duration::from_secs(2)), "2s");
        assert_eq!(format_interval(Duration::from_millis(1500)), "1.5s");
    }

    #[test]
    fn clock_has_fixed_shape() {
        let s = format_clock(1_700_000_000_000);
        assert_eq!(s.len(), 8);
        assert_eq!(&s[2..3], ":");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("systemd", 10), "systemd");
        assert_eq!(truncate("kworker/u16:3", 8), "kworker~");
        assert_eq!(truncate("abc", 0), "");
    }
}
