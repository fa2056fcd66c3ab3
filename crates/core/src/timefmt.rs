//! Swim time notation.
//!
//! Times are stored as seconds (`f64`) and entered/displayed in the usual
//! `m:ss.xx` notation (`"1:05.30"` is 65.3 seconds).

use regex::Regex;

/// Parse swim time notation into seconds.
///
/// Accepts `"1:05.30"`, `"65.3"` and `"65"`; returns `None` for anything
/// else (including negative or non-finite values).
pub fn parse_swim_time(input: &str) -> Option<f64> {
    let input = input.trim();
    if let Ok(seconds) = input.parse::<f64>() {
        return (seconds.is_finite() && seconds >= 0.0).then_some(seconds);
    }

    let re = Regex::new(r"^(\d+):([0-5]?\d(?:\.\d{1,2})?)$").ok()?;
    let caps = re.captures(input)?;
    let minutes: f64 = caps.get(1)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(2)?.as_str().parse().ok()?;
    Some(minutes * 60.0 + seconds)
}

/// Format seconds in swim time notation.
///
/// Values under a minute render as `"48.21"`, longer ones as `"1:05.30"`.
pub fn format_swim_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "-".to_string();
    }
    if seconds < 60.0 {
        return format!("{seconds:.2}");
    }
    let minutes = (seconds / 60.0).floor();
    let rest = seconds - minutes * 60.0;
    format!("{}:{:05.2}", minutes as u64, rest)
}
