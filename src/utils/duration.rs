//! Human-friendly duration strings (`500ms`, `30s`, `5m`, `6h`, `1d`).

use crate::error::{Result, SbomGenError};
use std::time::Duration;

/// Parse a duration with a unit suffix.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let invalid = || SbomGenError::validation(format!("invalid duration '{s}'"));
    if s.is_empty() {
        return Err(invalid());
    }

    let (num_str, unit) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, "ms")
    } else if s.ends_with(['s', 'm', 'h', 'd']) {
        s.split_at(s.len() - 1)
    } else {
        return Err(invalid());
    };

    let value: u64 = num_str.parse().map_err(|_| invalid())?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 3600)),
        "d" => Ok(Duration::from_secs(value * 86400)),
        _ => Err(invalid()),
    }
}
