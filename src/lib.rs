#![no_std]

//! Trail Sensors - compass bearings and barometric weather trends for outdoor navigation
//!
//! This library holds the numeric core of an outdoors navigation app. It turns
//! raw phone sensor samples into values worth showing to a hiker:
//!
//! - Tilt-compensated compass bearing from accelerometer and magnetometer
//!   vectors, with a quality rating based on magnetic inclination
//! - Bearing smoothing, magnetic declination and compass directions
//! - Sea-level pressure adjustment with the barometric formula
//! - Pressure tendency (rising, falling, steady) and storm warnings from a
//!   history of barometer readings
//!
//! Every computation is a pure function of its inputs. Sensor polling,
//! persistence of pressure history and geomagnetic models belong to the
//! caller. `#![no_std]` compatible and allocation free.
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use trail_sensors::{AzimuthCalculator, PressureReading, PressureTrendEstimator};
//!
//! // Compass
//! let calculator = AzimuthCalculator::new();
//! let gravity = Vector3::new(0.0, 0.0, 9.81);          // m/s²
//! let magnetic_field = Vector3::new(-20.0, 0.0, -40.0); // µT
//!
//! if let Some(azimuth) = calculator.calculate(gravity, magnetic_field, 63.4) {
//!     println!("{} {} ({:?})", azimuth.bearing, azimuth.bearing.direction(), azimuth.quality);
//! }
//!
//! // Barometer
//! let estimator = PressureTrendEstimator::new();
//! let history = [
//!     PressureReading::new(0, 1013.0),
//!     PressureReading::new(5400, 1012.2),
//!     PressureReading::new(10800, 1011.1),
//! ];
//!
//! let analysis = estimator.analyze(&history);
//! println!("{}", analysis.characteristic.description());
//! ```

pub mod barometer;
pub mod compass;
mod error;
mod math;
pub mod smoothing;
mod types;
pub mod weather;

// Re-export all public types and functions
pub use barometer::{
    ConvertedReadings, MAX_ALTITUDE, PressureConverter, sea_level_pressure,
    sea_level_pressure_with_temperature,
};
pub use compass::{AzimuthCalculator, calculate_azimuth};
pub use error::SettingsError;
pub use math::{DEG_TO_RAD, MIN_VECTOR_MAGNITUDE, RAD_TO_DEG, Vector3Ext, delta_angle, wrap_degrees};
pub use smoothing::BearingSmoother;
pub use types::*;
pub use weather::{
    HistoryDuration, PressureAnalysis, PressureTrendEstimator, estimate_tendency,
    is_storm_incoming, rate_of_change,
};
