//! Tilt-compensated compass for the trail-sensors library
//!
//! Readings use the device frame of a phone: X to the right of the screen,
//! Y towards the top edge and Z out of the screen. Gravity is the
//! accelerometer's reaction vector, pointing up when the device lies flat.

use crate::error::SettingsError;
use crate::math::{RAD_TO_DEG, Vector3Ext, delta_angle};
use crate::types::{Azimuth, Bearing, CompassSettings, Quality};
use log::{debug, trace, warn};
use nalgebra::{ComplexField, RealField, Vector3};

/// Computes bearings from gravity and magnetic field vectors
///
/// Stateless apart from its settings, so a single calculator can be shared
/// between threads and called with any sequence of samples.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use trail_sensors::{AzimuthCalculator, Quality};
///
/// let calculator = AzimuthCalculator::new();
///
/// // Flat device with its top edge pointing at magnetic north
/// let gravity = Vector3::new(0.0, 0.0, 9.81);
/// let magnetic_field = Vector3::new(0.0, 20.0, -40.0); // µT
///
/// let azimuth = calculator.calculate(gravity, magnetic_field, 63.4).unwrap();
/// assert!(azimuth.bearing.value() < 0.1 || azimuth.bearing.value() > 359.9);
/// assert_eq!(azimuth.quality, Quality::Good);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AzimuthCalculator {
    settings: CompassSettings,
}

impl AzimuthCalculator {
    /// Create a calculator with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator with validated settings
    pub fn with_settings(settings: CompassSettings) -> Result<Self, SettingsError> {
        settings.validate().inspect_err(|error| {
            warn!("rejected compass settings: {error}");
        })?;
        Ok(Self { settings })
    }

    /// Current settings
    pub fn settings(&self) -> CompassSettings {
        self.settings
    }

    /// Calculate the tilt-compensated magnetic bearing
    ///
    /// # Arguments
    /// * `gravity` - Accelerometer reading (any units)
    /// * `magnetic_field` - Calibrated magnetometer reading (any units)
    /// * `expected_inclination` - Magnetic inclination in degrees predicted by a
    ///   geomagnetic model for the current location and time
    ///
    /// # Returns
    /// `None` when no meaningful bearing exists: a zero-length input, gravity
    /// and magnetic field too close to parallel, or non-finite input.
    pub fn calculate(
        &self,
        gravity: Vector3<f32>,
        magnetic_field: Vector3<f32>,
        expected_inclination: f32,
    ) -> Option<Azimuth> {
        let Some(unit_gravity) = gravity.try_unit() else {
            debug!("no bearing: gravity vector has zero length");
            return None;
        };
        let Some(unit_magnetic) = magnetic_field.try_unit() else {
            debug!("no bearing: magnetic field vector has zero length");
            return None;
        };

        // East is horizontal and perpendicular to the magnetic field
        let east = unit_magnetic.cross(&unit_gravity);
        let field_product = east.magnitude() * gravity.magnitude() * magnetic_field.magnitude();
        if field_product < self.settings.min_field_product {
            debug!("no bearing: gravity and magnetic field nearly parallel ({field_product})");
            return None;
        }
        let east = east.try_unit()?;

        let dot = unit_gravity.dot(&unit_magnetic).clamp(-1.0, 1.0);
        let inclination = -dot.asin() * RAD_TO_DEG;

        // Horizontal component of the field
        let north = unit_magnetic.reject_from(&unit_gravity).try_unit()?;

        let quality = self.quality(inclination, expected_inclination);

        let sin = east.y - north.x;
        let cos = east.x + north.y;
        let azimuth = if sin == 0.0 && cos == 0.0 {
            0.0
        } else {
            sin.atan2(cos) * RAD_TO_DEG
        };

        if azimuth.is_nan() {
            debug!("no bearing: azimuth is NaN");
            return None;
        }

        Some(Azimuth {
            bearing: Bearing::new(azimuth),
            quality,
            inclination,
        })
    }

    /// Rate a measured inclination against the expected one
    pub fn quality(&self, inclination: f32, expected_inclination: f32) -> Quality {
        let error = delta_angle(expected_inclination, inclination).abs();
        let quality = if error < self.settings.good_inclination_error {
            Quality::Good
        } else if error < self.settings.moderate_inclination_error {
            Quality::Moderate
        } else {
            Quality::Poor
        };
        trace!("inclination error {error:.2}° rated {quality:?}");
        quality
    }
}

/// Calculate a tilt-compensated magnetic bearing with default settings
///
/// See [`AzimuthCalculator::calculate`].
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use trail_sensors::compass::calculate_azimuth;
///
/// // Parallel vectors have no defined bearing
/// let gravity = Vector3::new(0.0, 0.0, 1.0);
/// assert!(calculate_azimuth(gravity, gravity * 50.0, 60.0).is_none());
/// ```
pub fn calculate_azimuth(
    gravity: Vector3<f32>,
    magnetic_field: Vector3<f32>,
    expected_inclination: f32,
) -> Option<Azimuth> {
    AzimuthCalculator::new().calculate(gravity, magnetic_field, expected_inclination)
}
