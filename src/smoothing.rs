//! Bearing smoothing for the trail-sensors library

use crate::math::{DEG_TO_RAD, RAD_TO_DEG};
use crate::types::Bearing;
use nalgebra::{ComplexField, RealField, Vector2};

/// Smoothing level limits
pub const MIN_SMOOTHING: u8 = 1;
pub const MAX_SMOOTHING: u8 = 100;

/// Exponential smoothing of compass bearings
///
/// Bearings are averaged as points on the unit circle so that readings on
/// either side of north average to north rather than south. Each update
/// moves the estimate `1 / smoothing` of the way towards the new reading,
/// so a smoothing level of 1 passes readings straight through.
///
/// # Example
/// ```
/// use trail_sensors::{Bearing, BearingSmoother};
///
/// let mut smoother = BearingSmoother::new(4);
/// smoother.update(Bearing::new(350.0));
/// let smoothed = smoother.update(Bearing::new(10.0));
///
/// // Moves a quarter of the way from 350° towards 10°
/// assert!((smoothed.value() - 355.0).abs() < 0.5);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BearingSmoother {
    /// Smoothing level in [MIN_SMOOTHING, MAX_SMOOTHING]
    smoothing: u8,
    /// Filter coefficient, the reciprocal of the smoothing level
    alpha: f32,
    /// Smoothed unit-circle point, `None` until the first update
    state: Option<Vector2<f32>>,
}

impl BearingSmoother {
    /// Create a smoother; `smoothing` is clamped to [1, 100]
    pub fn new(smoothing: u8) -> Self {
        let smoothing = smoothing.clamp(MIN_SMOOTHING, MAX_SMOOTHING);
        Self {
            smoothing,
            alpha: 1.0 / smoothing as f32,
            state: None,
        }
    }

    /// Feed a new bearing and return the smoothed bearing
    pub fn update(&mut self, bearing: Bearing) -> Bearing {
        let radians = bearing.value() * DEG_TO_RAD;
        let point = Vector2::new(radians.sin(), radians.cos());

        let smoothed = match self.state {
            Some(previous) => previous + (point - previous) * self.alpha,
            None => point,
        };
        self.state = Some(smoothed);

        Self::to_bearing(smoothed).unwrap_or(bearing)
    }

    /// Current smoothed bearing, `None` before the first update
    ///
    /// Also `None` while the averaged point sits at the circle's center,
    /// which happens only for exactly opposing readings.
    pub fn value(&self) -> Option<Bearing> {
        self.state.and_then(Self::to_bearing)
    }

    /// Forget all previous readings
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Smoothing level in use
    pub fn smoothing(&self) -> u8 {
        self.smoothing
    }

    /// Change the smoothing level, keeping the current estimate
    pub fn set_smoothing(&mut self, smoothing: u8) {
        let state = self.state;
        *self = Self::new(smoothing);
        self.state = state;
    }

    fn to_bearing(point: Vector2<f32>) -> Option<Bearing> {
        if point.x == 0.0 && point.y == 0.0 {
            return None;
        }
        Some(Bearing::new(point.x.atan2(point.y) * RAD_TO_DEG))
    }
}

impl Default for BearingSmoother {
    fn default() -> Self {
        Self::new(MIN_SMOOTHING)
    }
}
