//! Notarization timing configuration.

use std::time::Duration;

use crate::release::error::{Error, Result};

/// Overall notarization deadline when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Interval between status queries when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Longest accepted notarization deadline.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Shortest interval between status queries.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Parses `<integer>[s|m|h]` (unit defaults to seconds, case-insensitive).
///
/// Returns `None` for anything else, including overflow.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);
    if digits.is_empty() {
        return None;
    }
    let value: u64 = digits.parse().ok()?;
    let multiplier = match unit.to_ascii_lowercase().as_str() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => return None,
    };
    value.checked_mul(multiplier).map(Duration::from_secs)
}

/// Deadline and poll interval for [`super::Notarizer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotaryConfig {
    timeout: Duration,
    poll_interval: Duration,
}

impl Default for NotaryConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl NotaryConfig {
    /// Validated configuration.
    ///
    /// A zero timeout would skip polling entirely, so it is rejected, as is
    /// anything above [`MAX_TIMEOUT`]. The poll interval is clamped to
    /// [`MIN_POLL_INTERVAL`].
    pub fn new(timeout: Duration, poll_interval: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::config("notarization timeout must be greater than zero"));
        }
        if timeout > MAX_TIMEOUT {
            return Err(Error::config(format!(
                "notarization timeout of {}s exceeds the maximum of {}h",
                timeout.as_secs(),
                MAX_TIMEOUT.as_secs() / 3600
            )));
        }
        Ok(Self {
            timeout,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        })
    }

    /// Parses both values with [`parse_duration`].
    pub fn from_strs(timeout: &str, poll_interval: &str) -> Result<Self> {
        let parsed_timeout = parse_duration(timeout).ok_or_else(|| {
            Error::config(format!("invalid notarization timeout {timeout:?}, expected e.g. 2h"))
        })?;
        let parsed_poll = parse_duration(poll_interval).ok_or_else(|| {
            Error::config(format!(
                "invalid notarization poll interval {poll_interval:?}, expected e.g. 30s"
            ))
        })?;
        Self::new(parsed_timeout, parsed_poll)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_units() {
        assert_eq!(parse_duration("45"), Some(Duration::from_secs(45)));
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("2H"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_duration(" 10m "), Some(Duration::from_secs(600)));
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["", "m", "1.5h", "-3s", "10d", "1h30m", "abc"] {
            assert_eq!(parse_duration(input), None, "input {input:?}");
        }
    }

    #[test]
    fn zero_timeout_is_a_configuration_error() {
        let err = NotaryConfig::from_strs("0", "30s").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn invalid_strings_do_not_become_zero() {
        assert!(NotaryConfig::from_strs("soon", "30s").is_err());
        assert!(NotaryConfig::from_strs("2h", "often").is_err());
    }

    #[test]
    fn oversized_timeouts_are_rejected() {
        assert_eq!(
            NotaryConfig::from_strs("168h", "30s").unwrap().timeout(),
            MAX_TIMEOUT
        );
        for input in ["169h", "10000000000000000000s", "18446744073709551615"] {
            let err = NotaryConfig::from_strs(input, "30s").unwrap_err();
            assert!(matches!(err, Error::Config { .. }), "input {input:?}");
        }
        assert!(NotaryConfig::new(Duration::MAX, DEFAULT_POLL_INTERVAL).is_err());
    }

    #[test]
    fn poll_interval_is_clamped() {
        let config = NotaryConfig::from_strs("1h", "0s").unwrap();
        assert_eq!(config.poll_interval(), MIN_POLL_INTERVAL);
        assert_eq!(config.timeout(), Duration::from_secs(3600));
    }
}
