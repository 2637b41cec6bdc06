//! Data structures for monitor state.
//!
//! This module contains the probe health state, the observable monitor
//! snapshot, and monitor configuration.

pub mod config;
pub mod probe_state;
pub mod snapshot;

pub use config::MonitorConfig;
pub use probe_state::ProbeState;
pub use snapshot::MonitorSnapshot;
