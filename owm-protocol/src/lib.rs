#![no_std]
#![deny(missing_docs)]
//! # owm-protocol
//! A no-std description of a memory-mapped 1-Wire bus master.
//!
//! The electrical side of the bus (reset pulses, bit timeslots, CRC) is handled by the
//! peripheral itself. Software drives it by writing command bytes and control patterns
//! into a small register bank and watching the status register. This crate holds the
//! parts of that contract that do not depend on a particular driver:
//!
//! - [RegisterInterface], raw 32-bit access at peripheral-relative offsets.
//! - [Cancel], a hook consulted by drivers between polls of the status register.
//! - The register offset map, control-register patterns and status masks in [consts].
//! - [RomCommands], [FunctionCommands] and [FamilyConfig], the per-device-family tables.
//! - [RomCode], the 64-bit device identity, and [OneWireCrc] to validate it.
//! - [OneWireError], the error type shared by drivers built on these traits.

pub mod consts;
mod error;
mod family;
mod rom;
mod traits;
mod utils;
pub use error::OneWireError;
pub use family::{FamilyConfig, FunctionCommands, RomCommands};
pub use rom::{ParseRomCodeError, RomCode};
pub use traits::{Cancel, Never, RegisterInterface};
pub use utils::OneWireCrc;

/// Result of a 1-Wire bus operation.
pub type OneWireResult<T, E> = Result<T, OneWireError<E>>;

/// Type of search issued to the bus master.
///
/// The command byte for each kind comes from the bus's [`RomCommands`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// Enumerate every device on the bus.
    Normal,
    /// Enumerate only devices whose alarm flag is set.
    Alarmed,
}
