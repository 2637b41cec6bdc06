//! Hardware seams.
//!
//! The monitor reaches the converter and the heater line only through the
//! traits in this module. Bus setup and device discovery live with the
//! application that implements them.

pub mod actuator;
pub mod frame_source;

pub use actuator::{BinaryActuator, HeaterLevel};
pub use frame_source::FrameSource;
