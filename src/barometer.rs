//! Sea-level pressure adjustment for the trail-sensors library
//!
//! Station pressure falls with altitude, so readings taken at different
//! heights cannot be compared directly. These functions reduce station
//! pressure to the equivalent pressure at sea level.

use crate::types::{AltitudePressureReading, PressureReading};
use core::slice;
use log::debug;
use nalgebra::ComplexField;

/// Altitude scale of the standard atmosphere barometric formula (meters)
const ATMOSPHERE_SCALE_HEIGHT: f32 = 44330.0;
/// Exponent of the standard atmosphere barometric formula
const BAROMETRIC_EXPONENT: f32 = 5.255;
/// Temperature lapse rate of the standard atmosphere (kelvin per meter)
const LAPSE_RATE: f32 = 0.0065;
/// Exponent of the hypsometric formula
const HYPSOMETRIC_EXPONENT: f32 = 5.257;
const ZERO_CELSIUS: f32 = 273.15;
/// Top of the troposphere, the layer the standard-atmosphere formulas model (meters)
pub const MAX_ALTITUDE: f32 = 11000.0;

/// Reduce station pressure to sea level with the standard barometric formula
///
/// Returns `pressure` unchanged at altitude 0 and increases monotonically with
/// altitude. Altitudes above [`MAX_ALTITUDE`] are clamped to it, so the result
/// stays finite for any finite input.
///
/// # Arguments
/// * `pressure` - Station pressure in hPa
/// * `altitude` - Altitude in meters above sea level
///
/// # Example
/// ```
/// use trail_sensors::barometer::sea_level_pressure;
///
/// assert_eq!(sea_level_pressure(1000.0, 0.0), 1000.0);
/// assert!(sea_level_pressure(900.0, 1000.0) > 1000.0);
/// ```
pub fn sea_level_pressure(pressure: f32, altitude: f32) -> f32 {
    let altitude = altitude.min(MAX_ALTITUDE);
    pressure * (1.0 - altitude / ATMOSPHERE_SCALE_HEIGHT).powf(-BAROMETRIC_EXPONENT)
}

/// Reduce station pressure to sea level using the measured air temperature
///
/// Uses the hypsometric formula, which accounts for air density at the
/// station. Like [`sea_level_pressure`] it is the identity at altitude 0,
/// increases monotonically with altitude and clamps altitudes above
/// [`MAX_ALTITUDE`].
///
/// # Arguments
/// * `pressure` - Station pressure in hPa
/// * `altitude` - Altitude in meters above sea level
/// * `temperature` - Air temperature at the station in °C
pub fn sea_level_pressure_with_temperature(pressure: f32, altitude: f32, temperature: f32) -> f32 {
    let lapse = LAPSE_RATE * altitude.min(MAX_ALTITUDE);
    pressure * (1.0 - lapse / (temperature + lapse + ZERO_CELSIUS)).powf(-HYPSOMETRIC_EXPONENT)
}

/// Converts a history of station readings into the pressures used for trends
///
/// # Example
/// ```
/// use trail_sensors::{AltitudePressureReading, PressureConverter};
///
/// let readings = [
///     AltitudePressureReading::new(0, 1000.0, 0.0),
///     // Climbed 100 m in ten minutes: the drop is not weather
///     AltitudePressureReading::new(600, 988.0, 100.0),
/// ];
///
/// let converted: Vec<_> = PressureConverter::sea_level(3.0).convert(&readings).collect();
/// assert_eq!(converted[1].pressure, 1000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PressureConverter {
    /// Use station pressure as measured
    #[default]
    Station,
    /// Reduce to sea level, discarding changes faster than weather produces
    SeaLevel {
        /// Largest natural rate of change in hPa per hour
        max_natural_change: f32,
    },
}

impl PressureConverter {
    /// Sea-level converter with the given natural rate ceiling (hPa per hour)
    pub fn sea_level(max_natural_change: f32) -> Self {
        PressureConverter::SeaLevel { max_natural_change }
    }

    /// Convert readings, lazily and in order
    ///
    /// The sea-level converter adjusts the first reading with
    /// [`sea_level_pressure`] and then follows the station pressure changes
    /// between consecutive readings. A change faster than
    /// `max_natural_change` is attributed to a change in altitude and
    /// dropped, which keeps noisy GPS altitudes out of the history.
    pub fn convert<'a>(&self, readings: &'a [AltitudePressureReading]) -> ConvertedReadings<'a> {
        ConvertedReadings {
            readings: readings.iter(),
            converter: *self,
            previous: None,
        }
    }
}

/// Iterator returned by [`PressureConverter::convert`]
#[derive(Debug, Clone)]
pub struct ConvertedReadings<'a> {
    readings: slice::Iter<'a, AltitudePressureReading>,
    converter: PressureConverter,
    /// Last raw reading and the pressure it was converted to
    previous: Option<(AltitudePressureReading, f32)>,
}

impl Iterator for ConvertedReadings<'_> {
    type Item = PressureReading;

    fn next(&mut self) -> Option<PressureReading> {
        let reading = *self.readings.next()?;

        let pressure = match (self.converter, self.previous) {
            (PressureConverter::Station, _) => reading.pressure,
            (PressureConverter::SeaLevel { .. }, None) => {
                sea_level_pressure(reading.pressure, reading.altitude)
            }
            (PressureConverter::SeaLevel { max_natural_change }, Some((previous, adjusted))) => {
                adjusted + natural_change(&previous, &reading, max_natural_change)
            }
        };

        self.previous = Some((reading, pressure));
        Some(PressureReading {
            time: reading.time,
            pressure,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.readings.size_hint()
    }
}

impl ExactSizeIterator for ConvertedReadings<'_> {}

/// Station pressure change between two readings, or 0 if it is too fast to be weather
fn natural_change(
    previous: &AltitudePressureReading,
    current: &AltitudePressureReading,
    max_natural_change: f32,
) -> f32 {
    let change = current.pressure - previous.pressure;
    let hours = current.time.saturating_sub(previous.time).as_secs_f32() / 3600.0;

    let natural = if hours > 0.0 {
        (change / hours).abs() <= max_natural_change
    } else {
        change == 0.0
    };

    if natural {
        change
    } else {
        debug!(
            "discarding {change:.2} hPa change over {hours:.3} h as an altitude change ({:.1} m to {:.1} m)",
            previous.altitude, current.altitude
        );
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sea_level_identity_at_zero_altitude() {
        for pressure in [870.0, 950.5, 1013.25, 1084.0] {
            assert_eq!(sea_level_pressure(pressure, 0.0), pressure);
            assert_eq!(sea_level_pressure_with_temperature(pressure, 0.0, 15.0), pressure);
            assert_eq!(sea_level_pressure_with_temperature(pressure, 0.0, -20.0), pressure);
        }
    }

    #[test]
    fn test_sea_level_monotonic_in_altitude() {
        let pressure = 900.0;
        let mut previous = sea_level_pressure(pressure, -400.0);
        let mut previous_with_temperature = sea_level_pressure_with_temperature(pressure, -400.0, 10.0);

        for altitude in (-300..=8000).step_by(100) {
            let adjusted = sea_level_pressure(pressure, altitude as f32);
            let adjusted_with_temperature =
                sea_level_pressure_with_temperature(pressure, altitude as f32, 10.0);

            assert!(adjusted > previous, "Not monotonic at {altitude} m");
            assert!(adjusted_with_temperature > previous_with_temperature);

            previous = adjusted;
            previous_with_temperature = adjusted_with_temperature;
        }
    }

    #[test]
    fn test_sea_level_clamps_extreme_altitudes() {
        let at_limit = sea_level_pressure(200.0, MAX_ALTITUDE);
        assert!(at_limit.is_finite());

        for altitude in [20000.0, 44330.0, 50000.0, f32::INFINITY] {
            assert_eq!(sea_level_pressure(200.0, altitude), at_limit);

            let with_temperature = sea_level_pressure_with_temperature(200.0, altitude, -56.5);
            assert!(with_temperature.is_finite(), "got {with_temperature} at {altitude} m");
            assert_eq!(
                with_temperature,
                sea_level_pressure_with_temperature(200.0, MAX_ALTITUDE, -56.5)
            );
        }
    }

    #[test]
    fn test_sea_level_known_values() {
        // Standard atmosphere: 898.76 hPa at 1000 m
        let adjusted = sea_level_pressure(898.76, 1000.0);
        assert!((adjusted - 1013.25).abs() < 0.5, "got {adjusted}");

        // Both formulas agree closely near standard temperature
        let with_temperature = sea_level_pressure_with_temperature(898.76, 1000.0, 8.5);
        assert!((with_temperature - adjusted).abs() < 1.0, "got {with_temperature}");

        // Cold air is denser, so the same station pressure reduces to more
        let cold = sea_level_pressure_with_temperature(898.76, 1000.0, -20.0);
        assert!(cold > with_temperature);
    }

    #[test]
    fn test_station_converter_passes_through() {
        let readings = [
            AltitudePressureReading::new(0, 1000.0, 250.0),
            AltitudePressureReading::new(600, 980.0, 400.0),
            AltitudePressureReading::new(1200, 990.0, 300.0),
        ];

        let converter = PressureConverter::default();
        assert_eq!(converter.convert(&readings).len(), 3);
        for (converted, raw) in converter.convert(&readings).zip(readings.iter()) {
            assert_eq!(converted.time, raw.time);
            assert_eq!(converted.pressure, raw.pressure);
        }
    }

    #[test]
    fn test_sea_level_converter_adjusts_first_reading() {
        let readings = [AltitudePressureReading::new(0, 950.0, 500.0)];
        let mut converted = PressureConverter::sea_level(3.0).convert(&readings);

        let first = converted.next().unwrap();
        assert_eq!(first.pressure, sea_level_pressure(950.0, 500.0));
        assert!(converted.next().is_none());
    }

    #[test]
    fn test_sea_level_converter_ignores_altitude_jumps() {
        let readings = [
            AltitudePressureReading::new(0, 1000.0, 0.0),
            // -12 hPa in 10 minutes: a climb, not weather
            AltitudePressureReading::new(600, 988.0, 100.0),
            // -1 hPa over 50 minutes: weather
            AltitudePressureReading::new(3600, 987.0, 100.0),
            // Duplicate timestamp with a change
            AltitudePressureReading::new(3600, 985.0, 120.0),
        ];

        let mut converted = PressureConverter::sea_level(3.0).convert(&readings);
        assert_eq!(converted.next().unwrap().pressure, 1000.0);
        assert_eq!(converted.next().unwrap().pressure, 1000.0);
        assert!((converted.next().unwrap().pressure - 999.0).abs() < 1e-3);
        assert!((converted.next().unwrap().pressure - 999.0).abs() < 1e-3);
        assert!(converted.next().is_none());
    }

    #[test]
    fn test_sea_level_converter_keeps_natural_changes() {
        let readings = [
            AltitudePressureReading::new(0, 1010.0, 0.0),
            AltitudePressureReading::new(3600, 1008.0, 0.0),
            AltitudePressureReading::new(7200, 1005.5, 0.0),
            AltitudePressureReading::new(10800, 1003.0, 0.0),
        ];

        let converter = PressureConverter::sea_level(3.0);
        for (converted, raw) in converter.convert(&readings).zip(readings.iter()) {
            assert!((converted.pressure - raw.pressure).abs() < 1e-3);
        }
    }

    #[test]
    fn test_converter_empty_history() {
        assert_eq!(PressureConverter::sea_level(3.0).convert(&[]).count(), 0);
        assert_eq!(PressureConverter::Station.convert(&[]).count(), 0);
    }
}
