use crate::{
    AlarmEvaluator, AlarmSignal, DeviceRegistry, Location, ReadError, Sensor, SharedBus,
    convert::{celsius_from_raw, fahr_from_celsius},
};
use embedded_hal::delay::DelayNs;
use owm_axi::{Cancel, OwMaster, RegisterInterface, RomCode};
use std::time::Instant;

/// Result of reading one sensor during [`TemperatureController::poll_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    pub rom: RomCode,
    pub location: Location,
    /// Temperature in °C and °F, or why the read failed.
    pub reading: Result<(f64, f64), ReadError>,
    /// Only evaluated after a successful read.
    pub signal: Option<AlarmSignal>,
}

/// Reads DS18B20 temperatures over a shared bus.
pub struct TemperatureController<'a, R, D> {
    bus: &'a SharedBus<R, D>,
}

impl<'a, R: RegisterInterface, D: DelayNs> TemperatureController<'a, R, D> {
    pub fn new(bus: &'a SharedBus<R, D>) -> Self {
        Self { bus }
    }

    /// Reads one sensor and records the temperature as its last reading.
    ///
    /// The bus is held for the whole sequence: reset, Match ROM, Convert T, reset,
    /// Match ROM, Read Scratchpad. Any failing step aborts the sequence and leaves the
    /// sensor untouched; the next read starts over with a reset pulse.
    ///
    /// Returns the temperature in °C and °F.
    pub fn read(&self, sensor: &mut Sensor) -> Result<(f64, f64), ReadError> {
        let raw = {
            let mut bus = self.bus.lock();
            bus.cancel_mut().disarm();
            read_raw(&mut *bus, sensor.rom_code())
        };
        self.record(sensor, raw)
    }

    /// Like [`read`](Self::read), but gives up with [`ReadError::Cancelled`] once
    /// `deadline` passes while waiting on the bus.
    pub fn read_before(
        &self,
        sensor: &mut Sensor,
        deadline: Instant,
    ) -> Result<(f64, f64), ReadError> {
        let raw = {
            let mut bus = self.bus.lock();
            bus.cancel_mut().arm(deadline);
            let raw = read_raw(&mut *bus, sensor.rom_code());
            bus.cancel_mut().disarm();
            raw
        };
        self.record(sensor, raw)
    }

    fn record(
        &self,
        sensor: &mut Sensor,
        raw: Result<u32, ReadError>,
    ) -> Result<(f64, f64), ReadError> {
        let raw = raw.inspect_err(|e| log::warn!("{}: {e}", sensor.rom_code()))?;
        let celsius = celsius_from_raw(raw);
        sensor.last_read_temp_c = celsius;
        log::info!("{} at {}: {celsius}°C", sensor.rom_code(), sensor.location());
        Ok((celsius, fahr_from_celsius(celsius)))
    }

    /// Reads every registered sensor in turn and evaluates the alarms of those that
    /// answered. The bus is released between sensors. Failed reads are logged and
    /// reported in their outcome; the round carries on with the next sensor.
    pub fn poll_all(
        &self,
        registry: &mut DeviceRegistry,
        evaluator: &AlarmEvaluator,
    ) -> Vec<PollOutcome> {
        registry
            .all_sensors_mut()
            .map(|sensor| {
                let reading = self.read(sensor);
                let signal = match reading {
                    Ok(_) => Some(evaluator.evaluate(sensor)),
                    Err(_) => None,
                };
                PollOutcome {
                    rom: sensor.rom_code(),
                    location: sensor.location(),
                    reading,
                    signal,
                }
            })
            .collect()
    }
}

fn read_raw<R: RegisterInterface, D: DelayNs, C: Cancel>(
    bus: &mut OwMaster<R, D, C>,
    rom: RomCode,
) -> Result<u32, ReadError> {
    bus.reset_pulse()?;
    bus.match_rom(rom)?;
    bus.convert_temperature()?;
    // a fresh reset before addressing the device again
    bus.reset_pulse()?;
    bus.match_rom(rom)?;
    bus.read_scratchpad()?;
    Ok(bus.read_data_lo()?)
}
