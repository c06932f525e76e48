//! Temperature conversions.
//!
//! Every result is rounded to three decimal places, which is the precision readings are
//! reported and compared with.

use fixed::types::U12F4;

/// Lowest target or alarm bound the device range allows, in °C.
pub const MIN_CELSIUS: f64 = 0.0;
/// Highest target or alarm bound the device range allows, in °C.
pub const MAX_CELSIUS: f64 = 105.0;
/// [`MIN_CELSIUS`] in °F.
pub const MIN_FAHRENHEIT: f64 = 32.0;
/// [`MAX_CELSIUS`] in °F.
pub const MAX_FAHRENHEIT: f64 = 221.0;

/// Halfway cases go to the even digit, so 25.0625 reports as 25.062.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}

/// Decodes the first read-data word after a scratchpad read.
///
/// Only the low 16 bits carry the temperature, in sixteenths of a degree.
pub fn celsius_from_raw(raw: u32) -> f64 {
    let temp = U12F4::from_bits(raw as u16);
    round3(temp.to_num::<f64>())
}

/// Same as [`celsius_from_raw`], in °F.
pub fn fahr_from_raw(raw: u32) -> f64 {
    fahr_from_celsius(celsius_from_raw(raw))
}

/// Converts °C to °F.
pub fn fahr_from_celsius(celsius: f64) -> f64 {
    round3(celsius * 9.0 / 5.0 + 32.0)
}

/// Converts °F to °C.
pub fn celsius_from_fahr(fahrenheit: f64) -> f64 {
    round3((fahrenheit - 32.0) * 5.0 / 9.0)
}

/// Clamps a target or alarm bound into [`MIN_CELSIUS`]..=[`MAX_CELSIUS`].
pub fn clamp_celsius(celsius: f64) -> f64 {
    celsius.clamp(MIN_CELSIUS, MAX_CELSIUS)
}

/// Clamps a target or alarm bound into [`MIN_FAHRENHEIT`]..=[`MAX_FAHRENHEIT`].
pub fn clamp_fahrenheit(fahrenheit: f64) -> f64 {
    fahrenheit.clamp(MIN_FAHRENHEIT, MAX_FAHRENHEIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_is_sixteenths_of_a_degree() {
        assert_eq!(celsius_from_raw(0x0190), 25.0);
        assert_eq!(celsius_from_raw(0x0191), 25.062);
        assert_eq!(celsius_from_raw(0x0195), 25.312);
        assert_eq!(celsius_from_raw(0x0001), 0.062);
        assert_eq!(celsius_from_raw(0x0005), 0.312);
        assert_eq!(celsius_from_raw(0x0003), 0.188);
        assert_eq!(celsius_from_raw(0x0008), 0.5);
        // alarm bytes above the temperature are ignored
        assert_eq!(celsius_from_raw(0x4b46_0190), 25.0);
        assert_eq!(fahr_from_raw(0x0190), 77.0);
    }

    #[test]
    fn celsius_fahrenheit_round_trip() {
        assert_eq!(fahr_from_celsius(25.0), 77.0);
        assert_eq!(celsius_from_fahr(77.0), 25.0);
        assert_eq!(fahr_from_celsius(100.0), 212.0);
        assert_eq!(celsius_from_fahr(170.0), 76.667);
    }

    #[test]
    fn clamp_limits_to_device_range() {
        assert_eq!(clamp_celsius(-3.5), 0.0);
        assert_eq!(clamp_celsius(140.0), 105.0);
        assert_eq!(clamp_celsius(64.25), 64.25);
        assert_eq!(clamp_fahrenheit(0.0), 32.0);
        assert_eq!(clamp_fahrenheit(250.0), 221.0);
        assert_eq!(clamp_fahrenheit(150.0), 150.0);
        assert_eq!(fahr_from_celsius(MAX_CELSIUS), MAX_FAHRENHEIT);
    }
}
