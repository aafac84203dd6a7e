//! Time conversion and formatting utilities.
//!
//! Media positions travel as `f64` seconds because that is what media
//! elements report. These helpers turn them into whole-second labels
//! without panicking on negative, NaN or huge values.

/// Convert a non-negative seconds value to whole seconds, flooring.
///
/// Negative and NaN inputs map to 0; values beyond `u64::MAX` saturate.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn floor_secs(seconds: f64) -> u64 {
    if seconds.is_nan() || seconds <= 0.0 {
        0
    } else {
        // Float-to-int `as` casts saturate.
        seconds.floor() as u64
    }
}

/// Format seconds as `M:SS` by integer floor; seconds are zero-padded.
#[must_use]
pub fn format_clock(seconds: f64) -> String {
    let total = floor_secs(seconds);
    format!("{}:{:02}", total / 60, total % 60)
}

/// Convert a millisecond duration to whole seconds, rounding half up.
///
/// Saturates at `u32::MAX`, which is far beyond any preview clip.
#[must_use]
pub fn millis_to_rounded_secs(millis: u64) -> u32 {
    let secs = millis.saturating_add(500) / 1000;
    u32::try_from(secs).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock_zero() {
        assert_eq!(format_clock(0.0), "0:00");
    }

    #[test]
    fn test_format_clock_floors_fraction() {
        assert_eq!(format_clock(65.9), "1:05");
        assert_eq!(format_clock(59.999), "0:59");
    }

    #[test]
    fn test_format_clock_long() {
        assert_eq!(format_clock(600.0), "10:00");
        assert_eq!(format_clock(3725.0), "62:05");
    }

    #[test]
    fn test_format_clock_invalid_input() {
        assert_eq!(format_clock(-3.0), "0:00");
        assert_eq!(format_clock(f64::NAN), "0:00");
    }

    #[test]
    fn test_millis_to_rounded_secs() {
        assert_eq!(millis_to_rounded_secs(0), 0);
        assert_eq!(millis_to_rounded_secs(1499), 1);
        assert_eq!(millis_to_rounded_secs(1500), 2);
        assert_eq!(millis_to_rounded_secs(29_980), 30);
    }

    #[test]
    fn test_millis_to_rounded_secs_saturates() {
        assert_eq!(millis_to_rounded_secs(u64::MAX), u32::MAX);
    }
}
