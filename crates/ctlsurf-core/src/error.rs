//! Error types for ctlsurf-core.

use thiserror::Error;

/// Error type for ctlsurf-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("Slot {slot} out of range (size {size})")]
    SlotOutOfRange { slot: usize, size: usize },

    #[error("Unknown bank: {0}")]
    UnknownBank(usize),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
