//! Angle helpers and nalgebra extensions shared by the compass and smoothing code

use nalgebra::Vector3;

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Vectors shorter than this cannot be normalized meaningfully
pub const MIN_VECTOR_MAGNITUDE: f32 = 1e-6;

/// Wrap an angle in degrees into the range [0, 360)
///
/// # Example
/// ```
/// use trail_sensors::wrap_degrees;
///
/// assert_eq!(wrap_degrees(-90.0), 270.0);
/// assert_eq!(wrap_degrees(720.0), 0.0);
/// ```
pub fn wrap_degrees(angle: f32) -> f32 {
    let mut wrapped = angle % 360.0;
    if wrapped < 0.0 {
        wrapped += 360.0;
    }
    // -1e-8 + 360.0 rounds to 360.0 in f32
    if wrapped >= 360.0 {
        wrapped = 0.0;
    }
    // Adding +0.0 turns -0.0 into +0.0
    wrapped + 0.0
}

/// Signed smallest difference `to - from` in degrees, in the range (-180, 180]
///
/// # Example
/// ```
/// use trail_sensors::delta_angle;
///
/// assert_eq!(delta_angle(350.0, 10.0), 20.0);
/// assert_eq!(delta_angle(10.0, 350.0), -20.0);
/// ```
pub fn delta_angle(from: f32, to: f32) -> f32 {
    let delta = wrap_degrees(to - from);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Normalize the vector, or `None` if it is shorter than [`MIN_VECTOR_MAGNITUDE`]
    fn try_unit(&self) -> Option<Vector3<f32>>;

    /// Remove the component along `unit_axis`, leaving the part perpendicular to it
    fn reject_from(&self, unit_axis: &Vector3<f32>) -> Vector3<f32>;
}

impl Vector3Ext for Vector3<f32> {
    fn try_unit(&self) -> Option<Vector3<f32>> {
        self.try_normalize(MIN_VECTOR_MAGNITUDE)
    }

    fn reject_from(&self, unit_axis: &Vector3<f32>) -> Vector3<f32> {
        *self - *unit_axis * self.dot(unit_axis)
    }
}
