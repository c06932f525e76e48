//! # ds18b20
//! DS18B20 temperature sensors on an `ow_master` 1-Wire bus.
//!
//! - [`DeviceRegistry`] maps discovered ROM codes to [`Sensor`]s and sensors to plant
//!   [`Location`]s.
//! - [`TemperatureController`] runs the full read sequence for one sensor under the
//!   [`SharedBus`] lock, or a polling round over the whole registry.
//! - [`AlarmEvaluator`] turns a sensor's last reading into an [`AlarmSignal`].
//!
//! ```ignore
//! let bus = SharedBus::new(
//!     OwMasterBuilder::default()
//!         .with_cancel(Deadline::default())
//!         .build(regs, delay),
//! );
//! let mut registry = DeviceRegistry::new();
//! registry.discover(&bus, SearchKind::Normal)?;
//! let controller = TemperatureController::new(&bus);
//! for outcome in controller.poll_all(&mut registry, &AlarmEvaluator::default()) {
//!     // drive the heat sources
//! }
//! ```

mod alarm;
mod bus;
mod controller;
pub mod convert;
mod error;
mod location;
mod registry;
mod sensor;

pub use alarm::{AlarmEvaluator, AlarmSignal, DEFAULT_DISABLE_AT_OR_BELOW, HeatAction};
pub use bus::{Deadline, DeadlineBus, SharedBus};
pub use controller::{PollOutcome, TemperatureController};
pub use error::ReadError;
pub use location::{Component, Location, ParseLocationError};
pub use owm_axi::{RomCode, SearchKind};
pub use registry::DeviceRegistry;
pub use sensor::{DEFAULT_FLUX_C, DEFAULT_TARGET_C, Sensor};
