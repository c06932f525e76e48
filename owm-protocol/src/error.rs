#[allow(unused_imports)]
use crate::RegisterInterface;

/// 1-Wire bus master error type.
#[derive(Debug, PartialEq, Eq)]
pub enum OneWireError<E> {
    /// Encapsulates the error type of the [`RegisterInterface`] backend.
    Other(E),
    /// The reset-done bit never set: no presence pulse, so nothing is wired to the bus.
    NoPresencePulse,
    /// The write-done bit never set after a Match ROM: the addressed device did not acknowledge.
    NotAcknowledged,
    /// The status register did not read exactly command-done after a conversion.
    /// Carries the status word that was observed.
    ConversionIncomplete(u32),
    /// The read-done bit never set while generating read timeslots.
    ReadTimeout,
    /// No device responded to a search.
    SearchProtocol,
    /// The peripheral found more devices than its ROM table can store.
    SearchMemory,
    /// An earlier operation failed and the bus has not seen a reset pulse since.
    BusUninitialized,
    /// The cancel hook fired while waiting on the peripheral.
    Cancelled,
}

impl<E> From<E> for OneWireError<E> {
    fn from(other: E) -> Self {
        Self::Other(other)
    }
}
