//! Fault classification from the converter's status bits.

/// Fault reported in the low three bits of a converter frame.
///
/// The device latches at most one of the three single-bit fault flags. Any
/// other pattern is reported as [`Fault::GeneralFault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fault {
    /// No faults detected.
    #[default]
    Ok,
    /// Thermocouple is short-circuited to VCC.
    ShortToVcc,
    /// Thermocouple is short-circuited to GND.
    ShortToGnd,
    /// Thermocouple is open (no connections).
    OpenCircuit,
    /// Status bits do not match a single known fault.
    GeneralFault,
}

impl Fault {
    /// Mask covering the fault field of a frame.
    pub const MASK: u32 = 0x07;

    /// Classify the fault field of a raw frame.
    ///
    /// Only the low three bits are inspected.
    pub fn from_status_bits(frame: u32) -> Self {
        match frame & Self::MASK {
            0b000 => Self::Ok,
            0b001 => Self::OpenCircuit,
            0b010 => Self::ShortToGnd,
            0b100 => Self::ShortToVcc,
            _ => Self::GeneralFault,
        }
    }

    /// Status bits the device sets for this fault.
    ///
    /// `GeneralFault` has no single encoding; `0b111` is returned for it.
    pub fn to_status_bits(&self) -> u32 {
        match self {
            Self::Ok => 0b000,
            Self::OpenCircuit => 0b001,
            Self::ShortToGnd => 0b010,
            Self::ShortToVcc => 0b100,
            Self::GeneralFault => 0b111,
        }
    }

    /// Check if no fault is latched.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::ShortToVcc => write!(f, "Short to VCC"),
            Self::ShortToGnd => write!(f, "Short to GND"),
            Self::OpenCircuit => write!(f, "Open circuit"),
            Self::GeneralFault => write!(f, "General fault"),
        }
    }
}
