//! Monitor configuration.

use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration for a [`ProbeMonitor`](crate::ProbeMonitor).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorConfig {
    /// Additive correction in °F applied after Celsius to Fahrenheit conversion.
    pub calibration_offset_f: f64,
    /// Polling period.
    pub poll_interval: Duration,
    /// Extra wait after a poll finds the converter absent.
    pub absent_backoff: Duration,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl MonitorConfig {
    /// Default polling period (1 second).
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

    /// Default wait after the converter is found missing (5 seconds).
    pub const DEFAULT_ABSENT_BACKOFF: Duration = Duration::from_secs(5);

    /// Default event channel capacity.
    pub const DEFAULT_EVENT_CAPACITY: usize = 64;

    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            calibration_offset_f: 0.0,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            absent_backoff: Self::DEFAULT_ABSENT_BACKOFF,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Set the calibration offset in °F.
    pub fn with_calibration_offset(mut self, offset_f: f64) -> Self {
        self.calibration_offset_f = offset_f;
        self
    }

    /// Set the polling period.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the wait applied after the converter is found missing.
    pub fn with_absent_backoff(mut self, backoff: Duration) -> Self {
        self.absent_backoff = backoff;
        self
    }

    /// Set the event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Check the configuration for values the monitor cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a non-finite calibration offset,
    /// a zero polling period, or a zero channel capacity.
    pub fn validate(&self) -> Result<()> {
        if !self.calibration_offset_f.is_finite() {
            return Err(Error::InvalidParameter {
                name: "calibration_offset_f".to_string(),
                value: self.calibration_offset_f.to_string(),
            });
        }

        if self.poll_interval.is_zero() {
            return Err(Error::InvalidParameter {
                name: "poll_interval".to_string(),
                value: format!("{:?}", self.poll_interval),
            });
        }

        if self.event_capacity == 0 {
            return Err(Error::InvalidParameter {
                name: "event_capacity".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.calibration_offset_f, 0.0);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.absent_backoff, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = MonitorConfig::new()
            .with_calibration_offset(-1.5)
            .with_poll_interval(Duration::from_millis(250))
            .with_absent_backoff(Duration::ZERO)
            .with_event_capacity(8);
        assert_eq!(config.calibration_offset_f, -1.5);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.absent_backoff, Duration::ZERO);
        assert_eq!(config.event_capacity, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(MonitorConfig::new()
            .with_calibration_offset(f64::NAN)
            .validate()
            .is_err());
        assert!(MonitorConfig::new()
            .with_poll_interval(Duration::ZERO)
            .validate()
            .is_err());
        assert!(MonitorConfig::new()
            .with_event_capacity(0)
            .validate()
            .is_err());
    }
}
