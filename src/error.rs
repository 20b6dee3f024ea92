//! Settings validation errors

use thiserror::Error;

/// Reasons a settings struct was rejected
///
/// The computations themselves never fail with an error: degenerate sensor
/// input yields `None` or a steady default. Only configuration is validated.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SettingsError {
    /// Threshold is negative, NaN or infinite
    #[error("threshold `{name}` must be finite and non-negative, got {value}")]
    InvalidThreshold { name: &'static str, value: f32 },

    /// Two thresholds that must be ordered are not
    #[error("threshold `{lower}` must not exceed `{upper}`")]
    ThresholdOrder {
        lower: &'static str,
        upper: &'static str,
    },

    /// Trend lookback window has zero length
    #[error("trend lookback window must be longer than zero")]
    EmptyLookback,
}
