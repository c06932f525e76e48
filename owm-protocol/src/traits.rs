/// Raw access to the register bank of a memory-mapped 1-Wire bus master.
///
/// Offsets are relative to the peripheral base (see [`consts`](crate::consts)); mapping
/// them onto physical memory is the implementor's job. Implementations carry no protocol
/// logic: every read and write goes straight to the peripheral.
pub trait RegisterInterface {
    /// Error reported by the backend, e.g. an I/O error on a memory device.
    /// Use [`Infallible`](core::convert::Infallible) for plain MMIO.
    type Error: core::fmt::Debug;

    /// Reads the 32-bit register at `offset`.
    ///
    /// # Errors
    /// Returns the backend error if the register could not be accessed.
    fn read(&mut self, offset: u32) -> Result<u32, Self::Error>;

    /// Writes `value` to the 32-bit register at `offset`.
    ///
    /// # Errors
    /// Returns the backend error if the register could not be accessed.
    fn write(&mut self, offset: u32, value: u32) -> Result<(), Self::Error>;
}

impl<T: RegisterInterface + ?Sized> RegisterInterface for &mut T {
    type Error = T::Error;

    fn read(&mut self, offset: u32) -> Result<u32, Self::Error> {
        T::read(self, offset)
    }

    fn write(&mut self, offset: u32, value: u32) -> Result<(), Self::Error> {
        T::write(self, offset, value)
    }
}

/// Hook consulted by a bus master before every re-poll of the status register and
/// around long fixed waits.
///
/// Once it reports `true` the running operation gives up with
/// [`OneWireError::Cancelled`](crate::OneWireError::Cancelled).
pub trait Cancel {
    /// Whether the current operation should be abandoned.
    fn cancelled(&self) -> bool;
}

/// A [`Cancel`] hook that never fires.
#[derive(Debug, Default, Clone, Copy)]
pub struct Never;

impl Cancel for Never {
    fn cancelled(&self) -> bool {
        false
    }
}
