//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default one-shot recording length (10 seconds)
pub const DEFAULT_DURATION_SECS: u64 = 10;

/// Default safety limit for daemon recordings (5 minutes)
pub const DEFAULT_MAX_DURATION_SECS: u64 = 300;

/// Value object representing a recording length.
/// Always non-zero; validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Default one-shot recording length
    pub const fn default_duration() -> Self {
        Self::from_secs(DEFAULT_DURATION_SECS)
    }

    /// Default daemon safety limit
    pub const fn default_max_duration() -> Self {
        Self::from_secs(DEFAULT_MAX_DURATION_SECS)
    }

    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse strings such as "45s", "5m", "1h30m" or "2m30s".
    /// Units must appear at most once and in h, m, s order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_lowercase();
        if input.is_empty() {
            return Err(invalid());
        }

        let mut total_secs: u64 = 0;
        let mut digits_start: Option<usize> = None;
        // Index into UNITS of the last unit seen; enforces order and uniqueness
        let mut last_unit: Option<usize> = None;
        const UNITS: [(char, u64); 3] = [('h', 3600), ('m', 60), ('s', 1)];

        for (i, ch) in input.char_indices() {
            if ch.is_ascii_digit() {
                digits_start.get_or_insert(i);
                continue;
            }

            let start = digits_start.take().ok_or_else(invalid)?;
            let unit = UNITS
                .iter()
                .position(|(u, _)| *u == ch)
                .ok_or_else(invalid)?;
            if last_unit.is_some_and(|last| unit <= last) {
                return Err(invalid());
            }
            last_unit = Some(unit);

            let value: u64 = input[start..i].parse().map_err(|_| invalid())?;
            total_secs = value
                .checked_mul(UNITS[unit].1)
                .and_then(|v| total_secs.checked_add(v))
                .ok_or_else(invalid)?;
        }

        // Trailing digits without a unit
        if digits_start.is_some() || total_secs == 0 {
            return Err(invalid());
        }

        Ok(Self::from_secs(total_secs))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.as_secs();
        let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

        if hours > 0 {
            write!(f, "{}h", hours)?;
        }
        if minutes > 0 {
            write!(f, "{}m", minutes)?;
        }
        if seconds > 0 || total == 0 {
            write!(f, "{}s", seconds)?;
        }
        Ok(())
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seconds() {
        let d: Duration = "45s".parse().unwrap();
        assert_eq!(d.as_millis(), 45_000);
    }

    #[test]
    fn parse_compound() {
        assert_eq!("2m30s".parse::<Duration>().unwrap().as_secs(), 150);
        assert_eq!("1h30m".parse::<Duration>().unwrap().as_secs(), 5400);
        assert_eq!("1h0m5s".parse::<Duration>().unwrap().as_secs(), 3605);
    }

    #[test]
    fn parse_is_case_and_whitespace_insensitive() {
        assert_eq!(" 1M30S ".parse::<Duration>().unwrap().as_secs(), 90);
    }

    #[test]
    fn parse_rejects_zero_and_garbage() {
        for input in ["", "0s", "0m0s", "30", "abc", "30x", "s", "5s5m", "1m1m"] {
            assert!(input.parse::<Duration>().is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!("99999999999999999999h".parse::<Duration>().is_err());
    }

    #[test]
    fn display_normalizes() {
        assert_eq!(Duration::from_secs(30).to_string(), "30s");
        assert_eq!(Duration::from_secs(120).to_string(), "2m");
        assert_eq!(Duration::from_secs(150).to_string(), "2m30s");
        assert_eq!(Duration::from_secs(3660).to_string(), "1h1m");
    }

    #[test]
    fn defaults() {
        assert_eq!(Duration::default_duration().as_secs(), 10);
        assert_eq!(Duration::default_max_duration().to_string(), "5m");
        assert_eq!(Duration::from_secs(2).as_std(), StdDuration::from_secs(2));
    }
}
