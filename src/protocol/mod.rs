//! Protocol module for the thermocouple converter's output register.
//!
//! This module contains the implementations for:
//! - Fault classification from the status bits
//! - Frame decoding into probe and internal reference temperatures

pub mod fault;
pub mod frame;

pub use fault::Fault;
pub use frame::{decode, Frame, Reading, INTERNAL_RESOLUTION, PROBE_RESOLUTION};
