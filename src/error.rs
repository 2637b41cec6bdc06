//! Error types for the still-monitor crate.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The frame source could not complete a read.
    #[error("Transport error: {reason}")]
    Transport {
        /// Description of why the read failed.
        reason: String,
    },

    /// The converter device is not present on the bus.
    #[error("Thermocouple converter not found")]
    DeviceNotFound,

    /// Invalid data was received from the frame source.
    #[error("Invalid data received: {context}")]
    InvalidData {
        /// Description of what was invalid about the data.
        context: String,
    },

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter {
        /// The name of the parameter.
        name: String,
        /// The invalid value that was provided.
        value: String,
    },

    /// An I/O error from an underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a transport failure.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Check if this error originates from the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::DeviceNotFound | Self::Io(_))
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
