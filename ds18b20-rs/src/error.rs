use owm_protocol::OneWireError;
use std::fmt::Debug;
use thiserror::Error;

/// Why a sensor could not be read or the bus could not be enumerated.
///
/// Every kind is recoverable at the call site: a failed read leaves the sensor untouched
/// and the next read starts over with a reset pulse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("no presence pulse after reset, no device on the bus")]
    NoPresencePulse,
    #[error("addressed device did not acknowledge Match ROM")]
    RomMismatch,
    #[error("temperature conversion did not complete")]
    ConversionFailed,
    #[error("scratchpad read did not complete")]
    ScratchpadReadFailed,
    #[error("no device responded to the search")]
    SearchProtocolError,
    #[error("search found more devices than the peripheral can store")]
    SearchMemoryError,
    #[error("no registered sensor at bus slot {0}")]
    SensorNotFound(usize),
    #[error("deadline passed while waiting on the bus")]
    Cancelled,
    #[error("bus used without a fresh reset pulse")]
    BusNotReset,
    #[error("register access failed: {0}")]
    Register(String),
}

impl<E: Debug> From<OneWireError<E>> for ReadError {
    fn from(error: OneWireError<E>) -> Self {
        match error {
            OneWireError::Other(e) => Self::Register(format!("{e:?}")),
            OneWireError::NoPresencePulse => Self::NoPresencePulse,
            OneWireError::NotAcknowledged => Self::RomMismatch,
            OneWireError::ConversionIncomplete(_) => Self::ConversionFailed,
            OneWireError::ReadTimeout => Self::ScratchpadReadFailed,
            OneWireError::SearchProtocol => Self::SearchProtocolError,
            OneWireError::SearchMemory => Self::SearchMemoryError,
            OneWireError::BusUninitialized => Self::BusNotReset,
            OneWireError::Cancelled => Self::Cancelled,
        }
    }
}
