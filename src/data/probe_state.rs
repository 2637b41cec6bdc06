//! Probe health state.
//!
//! Combines the decoded fault with frame-source availability.

use crate::protocol::{Fault, Reading};

/// Monitor-level health of the thermocouple probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProbeState {
    /// No poll has completed yet.
    #[default]
    Disconnected,
    /// The frame source reported the converter is absent.
    DeviceNotFound,
    /// Healthy reading with no fault.
    Connected,
    /// Thermocouple is open, or reads exactly 0°C.
    OpenCircuit,
    /// Thermocouple is shorted to GND.
    GNDShort,
    /// Thermocouple is shorted to VCC.
    VCCShort,
    /// Unclassified fault.
    Faulted,
}

impl ProbeState {
    /// Derive the state for a decoded reading.
    ///
    /// A fault-free reading of exactly 0°C maps to [`ProbeState::OpenCircuit`].
    pub fn from_reading(reading: &Reading) -> Self {
        if reading.fault.is_ok() && reading.probe_celsius == 0.0 {
            return Self::OpenCircuit;
        }
        Self::from(reading.fault)
    }

    /// Check if the probe is delivering valid temperatures.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if this state reflects a thermocouple fault.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Self::OpenCircuit | Self::GNDShort | Self::VCCShort | Self::Faulted
        )
    }
}

impl From<Fault> for ProbeState {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Ok => Self::Connected,
            Fault::OpenCircuit => Self::OpenCircuit,
            Fault::ShortToGnd => Self::GNDShort,
            Fault::ShortToVcc => Self::VCCShort,
            Fault::GeneralFault => Self::Faulted,
        }
    }
}

impl std::fmt::Display for ProbeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::DeviceNotFound => write!(f, "Device not found"),
            Self::Connected => write!(f, "Connected"),
            Self::OpenCircuit => write!(f, "Open circuit"),
            Self::GNDShort => write!(f, "GND short"),
            Self::VCCShort => write!(f, "VCC short"),
            Self::Faulted => write!(f, "Faulted"),
        }
    }
}
