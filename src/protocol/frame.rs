//! Converter frame decoding.
//!
//! The converter shifts out one 32-bit word per read. Layout, most
//! significant bit first:
//!
//! - Bits 18-31: Probe temperature, 14-bit two's complement, 0.25°C/LSB
//! - Bits 16-17: Reserved / fault summary (ignored)
//! - Bits 4-15: Internal reference temperature, 12-bit two's complement, 0.0625°C/LSB
//! - Bit 3: Reserved (ignored)
//! - Bits 0-2: Fault flags (see [`Fault`])
//!
//! When a fault is latched the temperature fields are undefined.

use tracing::trace;

use crate::error::{Error, Result};
use crate::protocol::Fault;
use crate::utils::celsius_to_calibrated_fahrenheit;

/// Internal reference resolution in °C per LSB.
pub const INTERNAL_RESOLUTION: f64 = 0.0625;

/// Probe resolution in °C per LSB.
pub const PROBE_RESOLUTION: f64 = 0.25;

const INTERNAL_MAGNITUDE_MASK: u32 = 0x7FF;
const INTERNAL_SIGN_BIT: u32 = 0x800;
const INTERNAL_SIGN_OFFSET: f64 = -128.0;

const PROBE_SHIFT: u32 = 14;
const PROBE_MAGNITUDE_MASK: u32 = 0x1FFF;
const PROBE_SIGN_BIT: u32 = 0x2000;
const PROBE_SIGN_OFFSET: f64 = -2048.0;

/// One decoded converter frame.
///
/// When `fault` is anything other than [`Fault::Ok`], both temperatures are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Fault classification from the status bits.
    pub fault: Fault,
    /// Cold-junction (internal reference) temperature in °C.
    pub internal_reference_celsius: f64,
    /// Thermocouple probe temperature in °C.
    pub probe_celsius: f64,
}

impl Reading {
    fn faulted(fault: Fault) -> Self {
        Self {
            fault,
            internal_reference_celsius: f64::NAN,
            probe_celsius: f64::NAN,
        }
    }

    /// Check if the frame carried valid temperatures.
    pub fn is_valid(&self) -> bool {
        self.fault.is_ok()
    }

    /// Check if the probe reads exactly 0°C.
    ///
    /// The monitor treats this as a disconnected thermocouple even though the
    /// device reports no fault.
    pub fn indicates_open_circuit(&self) -> bool {
        self.fault == Fault::OpenCircuit || (self.fault.is_ok() && self.probe_celsius == 0.0)
    }

    /// Probe temperature in °F with a calibration offset applied.
    ///
    /// NaN when the reading is faulted.
    pub fn probe_fahrenheit(&self, calibration_offset_f: f64) -> f64 {
        celsius_to_calibrated_fahrenheit(self.probe_celsius, calibration_offset_f)
    }
}

/// A raw 32-bit converter frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame(pub u32);

impl Frame {
    /// Size of a frame on the wire in bytes.
    pub const SIZE: usize = 4;

    /// Build a frame from bytes in the order they were shifted out of the device.
    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// Build a frame from a transport buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if the buffer is not exactly 4 bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let bytes: [u8; 4] = data.try_into().map_err(|_| Error::InvalidData {
            context: format!(
                "Frame must be {} bytes, got {}",
                Self::SIZE,
                data.len()
            ),
        })?;
        Ok(Self::from_be_bytes(bytes))
    }

    /// Pack temperatures into a fault-free frame.
    ///
    /// Values are rounded to the nearest step and clamped to the range
    /// each field can represent. Reserved bits are left clear.
    pub fn encode(internal_reference_celsius: f64, probe_celsius: f64) -> Self {
        let internal = (internal_reference_celsius / INTERNAL_RESOLUTION)
            .round()
            .clamp(-2048.0, 2047.0) as i32;
        let probe = (probe_celsius / PROBE_RESOLUTION)
            .round()
            .clamp(-8192.0, 8191.0) as i32;

        let internal_bits = (internal as u32) & 0x0FFF;
        let probe_bits = (probe as u32) & 0x3FFF;

        Self((probe_bits << 18) | (internal_bits << 4))
    }

    /// Build a frame carrying only the given fault flags.
    pub fn with_fault(fault: Fault) -> Self {
        Self(fault.to_status_bits())
    }

    /// Get the raw 32-bit value.
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Get the fault field.
    pub fn fault(&self) -> Fault {
        Fault::from_status_bits(self.0)
    }

    /// Decode this frame.
    pub fn decode(&self) -> Reading {
        decode(self.0)
    }
}

impl From<u32> for Frame {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Decode a raw converter frame.
///
/// Total over all inputs: fault patterns never error, they produce a
/// reading with NaN temperatures.
///
/// # Example
///
/// ```
/// use still_monitor::protocol::{decode, Fault};
///
/// let reading = decode(0x07D0_0000);
/// assert_eq!(reading.fault, Fault::Ok);
/// assert_eq!(reading.probe_celsius, 125.0);
/// assert_eq!(reading.internal_reference_celsius, 0.0);
///
/// let reading = decode(0x0000_0001);
/// assert_eq!(reading.fault, Fault::OpenCircuit);
/// assert!(reading.probe_celsius.is_nan());
/// ```
pub fn decode(frame: u32) -> Reading {
    let fault = Fault::from_status_bits(frame);
    if !fault.is_ok() {
        trace!("Frame {:#010X} latched fault: {}", frame, fault);
        return Reading::faulted(fault);
    }

    let mut data = frame >> 4;
    let mut internal = (data & INTERNAL_MAGNITUDE_MASK) as f64 * INTERNAL_RESOLUTION;
    if data & INTERNAL_SIGN_BIT != 0 {
        internal += INTERNAL_SIGN_OFFSET;
    }

    data >>= PROBE_SHIFT;
    let mut probe = (data & PROBE_MAGNITUDE_MASK) as f64 * PROBE_RESOLUTION;
    if data & PROBE_SIGN_BIT != 0 {
        probe += PROBE_SIGN_OFFSET;
    }

    trace!(
        "Frame {:#010X}: internal={:.4}°C probe={:.2}°C",
        frame,
        internal,
        probe
    );

    Reading {
        fault,
        internal_reference_celsius: internal,
        probe_celsius: probe,
    }
}
