// Allow derivable impls for clarity
#![allow(clippy::derivable_impls)]

//! # still-monitor
//!
//! Monitoring and heater control for a still driven by a MAX31855-style
//! thermocouple-to-digital converter.
//!
//! The converter is polled once a second. Each 32-bit frame is decoded into a
//! fault classification, an internal reference temperature and a probe
//! temperature; the [`ProbeMonitor`] turns that into a probe health state and
//! a calibrated Fahrenheit reading, and broadcasts changes. A [`Thermostat`]
//! follows those events and switches a heater line on below the preset and
//! off at or above it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use still_monitor::{
//!     BinaryActuator, FrameSource, HeaterLevel, MonitorConfig, ProbeMonitor, Result, Thermostat,
//! };
//!
//! struct Spi;
//!
//! #[async_trait]
//! impl FrameSource for Spi {
//!     fn is_present(&self) -> bool {
//!         true
//!     }
//!
//!     async fn read_frame(&self) -> Result<u32> {
//!         Ok(0x07D0_0000)
//!     }
//! }
//!
//! struct HeaterPin;
//!
//! impl BinaryActuator for HeaterPin {
//!     fn set_level(&self, level: HeaterLevel) {
//!         println!("heater {}", level);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let monitor = Arc::new(ProbeMonitor::new(Arc::new(Spi), MonitorConfig::default())?);
//!     let thermostat = Arc::new(Thermostat::with_preset(Arc::new(HeaterPin), 160.0)?);
//!
//!     let _attached = thermostat.attach(&monitor);
//!     let polling = monitor.spawn_polling();
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//!     println!("{:?}", monitor.snapshot());
//!
//!     polling.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for data types

// Public modules
pub mod data;
pub mod error;
pub mod heater;
pub mod hw;
pub mod monitor;
pub mod protocol;
pub mod utils;

// Re-exports for convenience
pub use data::{MonitorConfig, MonitorSnapshot, ProbeState};
pub use error::{Error, Result};
pub use heater::{HeaterController, Thermostat, DEFAULT_PRESET_F};
pub use hw::{BinaryActuator, FrameSource, HeaterLevel};
pub use monitor::{CallbackHandle, MonitorEvent, PollOutcome, PollTask, ProbeMonitor};
pub use protocol::{decode, Fault, Frame, Reading};
pub use utils::{celsius_to_fahrenheit, fahrenheit_to_celsius};
