//! Externally observable monitor state.

use chrono::{DateTime, Utc};

use crate::data::ProbeState;
use crate::protocol::Fault;

/// Snapshot of the probe monitor's state.
///
/// Callers receive copies; only the polling path mutates the original.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorSnapshot {
    /// Probe health.
    pub state: ProbeState,
    /// Calibrated probe temperature in °F, NaN when the last decode faulted.
    pub probe_temperature_f: f64,
    /// Internal reference (cold-junction) temperature in °C.
    pub internal_reference_celsius: f64,
    /// Fault from the last decoded frame.
    pub fault: Fault,
    /// Time of the last decoded frame.
    pub updated_at: Option<DateTime<Utc>>,
}

impl MonitorSnapshot {
    /// Create the initial snapshot.
    pub fn new() -> Self {
        Self {
            state: ProbeState::Disconnected,
            probe_temperature_f: f64::NAN,
            internal_reference_celsius: f64::NAN,
            fault: Fault::Ok,
            updated_at: None,
        }
    }

    /// Get the probe temperature if it is valid.
    pub fn temperature_f(&self) -> Option<f64> {
        if self.probe_temperature_f.is_nan() {
            None
        } else {
            Some(self.probe_temperature_f)
        }
    }

    /// Time elapsed since the last decoded frame.
    pub fn age(&self) -> Option<chrono::Duration> {
        self.updated_at.map(|t| Utc::now() - t)
    }
}

impl Default for MonitorSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot() {
        let snapshot = MonitorSnapshot::new();
        assert_eq!(snapshot.state, ProbeState::Disconnected);
        assert_eq!(snapshot.fault, Fault::Ok);
        assert!(snapshot.probe_temperature_f.is_nan());
        assert_eq!(snapshot.temperature_f(), None);
        assert!(snapshot.age().is_none());
    }

    #[test]
    fn test_temperature_f() {
        let snapshot = MonitorSnapshot {
            probe_temperature_f: 257.0,
            updated_at: Some(Utc::now()),
            ..MonitorSnapshot::new()
        };
        assert_eq!(snapshot.temperature_f(), Some(257.0));
        assert!(snapshot.age().is_some());
    }
}
