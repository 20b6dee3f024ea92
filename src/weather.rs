//! Barometric pressure trend estimation for the trail-sensors library
//!
//! Readings must be ordered by time with non-decreasing timestamps. This is a
//! precondition, not a runtime check: out-of-order readings give undefined
//! (but never panicking) results. Rates are in hPa per hour.

use crate::error::SettingsError;
use crate::types::{
    PressureReading, PressureTendency, TendencyCharacteristic, Trend, TrendMethod, WeatherSettings,
};
use core::fmt;
use core::time::Duration;
use log::{trace, warn};

const SECONDS_PER_HOUR: f32 = 3600.0;

/// Estimate the pressure tendency across a whole history
///
/// Uses the two-endpoint slope: the change between the first and last
/// reading divided by the hours between them. Fewer than two readings, or
/// readings that span no time, are steady with a zero rate.
///
/// # Arguments
/// * `readings` - Pressure history ordered by time
/// * `sensitivity` - Rates beyond ± this (hPa per hour) are rising or falling
///
/// # Example
/// ```
/// use trail_sensors::{PressureReading, Trend, estimate_tendency};
///
/// let readings = [PressureReading::new(0, 1000.0), PressureReading::new(3600, 995.0)];
/// let tendency = estimate_tendency(&readings, 2.0);
///
/// assert_eq!(tendency.trend, Trend::Falling);
/// assert_eq!(tendency.rate, -5.0);
/// ```
pub fn estimate_tendency(readings: &[PressureReading], sensitivity: f32) -> PressureTendency {
    let rate = rate_of_change(readings, TrendMethod::Endpoints);
    PressureTendency {
        trend: classify(rate, sensitivity),
        rate,
    }
}

/// Whether the history shows a storm-like pressure drop
///
/// True when pressure is falling faster than `storm_threshold` hPa per hour
/// between the first and last reading. Pass only the lookback window of
/// interest, or use [`PressureTrendEstimator::is_storm_incoming`] which
/// applies its own window.
pub fn is_storm_incoming(readings: &[PressureReading], storm_threshold: f32) -> bool {
    rate_of_change(readings, TrendMethod::Endpoints) < -storm_threshold
}

/// Rate of pressure change in hPa per hour
///
/// Zero for fewer than two readings or when no time elapses.
pub fn rate_of_change(readings: &[PressureReading], method: TrendMethod) -> f32 {
    match readings {
        [] | [_] => 0.0,
        [first, .., last] => match method {
            TrendMethod::Endpoints => endpoint_rate(first, last),
            TrendMethod::Regression => regression_rate(readings),
        },
    }
}

fn classify(rate: f32, sensitivity: f32) -> Trend {
    if rate > sensitivity {
        Trend::Rising
    } else if rate < -sensitivity {
        Trend::Falling
    } else {
        Trend::Steady
    }
}

fn hours_between(from: Duration, to: Duration) -> f32 {
    to.saturating_sub(from).as_secs_f32() / SECONDS_PER_HOUR
}

fn endpoint_rate(first: &PressureReading, last: &PressureReading) -> f32 {
    let hours = hours_between(first.time, last.time);
    if hours > 0.0 {
        (last.pressure - first.pressure) / hours
    } else {
        0.0
    }
}

/// Least-squares slope of pressure against time
fn regression_rate(readings: &[PressureReading]) -> f32 {
    let origin = readings[0].time;
    let count = readings.len() as f32;

    // Center both axes first; absolute pressures near 1000 hPa lose
    // precision in f32 sums of squares
    let (sum_hours, sum_pressure) = readings.iter().fold((0.0, 0.0), |(t, p), reading| {
        (t + hours_between(origin, reading.time), p + reading.pressure)
    });
    let mean_hours = sum_hours / count;
    let mean_pressure = sum_pressure / count;

    let (covariance, variance) = readings.iter().fold((0.0, 0.0), |(cov, var), reading| {
        let dt = hours_between(origin, reading.time) - mean_hours;
        let dp = reading.pressure - mean_pressure;
        (cov + dt * dp, var + dt * dt)
    });

    if variance > 0.0 { covariance / variance } else { 0.0 }
}

/// Summary of a pressure history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureAnalysis {
    /// Tendency over the lookback window
    pub tendency: PressureTendency,
    /// Tendency split by speed of change
    pub characteristic: TendencyCharacteristic,
    /// Whether the drop over the lookback window signals a storm
    pub storm_incoming: bool,
}

/// Pressure trend estimation over a recent window of history
///
/// Holds only its settings; every method is a pure function of the readings
/// passed in.
///
/// # Example
/// ```
/// use trail_sensors::{PressureReading, PressureTrendEstimator, TendencyCharacteristic};
///
/// let estimator = PressureTrendEstimator::new();
/// let readings = [
///     PressureReading::new(0, 1012.0),
///     PressureReading::new(3600, 1009.5),
///     PressureReading::new(7200, 1007.0),
///     PressureReading::new(10800, 1004.5),
/// ];
///
/// let analysis = estimator.analyze(&readings);
/// assert!(analysis.tendency.is_falling());
/// assert_eq!(analysis.characteristic, TendencyCharacteristic::FallingFast);
/// assert!(analysis.storm_incoming);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PressureTrendEstimator {
    settings: WeatherSettings,
}

impl PressureTrendEstimator {
    /// Create an estimator with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an estimator with validated settings
    pub fn with_settings(settings: WeatherSettings) -> Result<Self, SettingsError> {
        settings.validate().inspect_err(|error| {
            warn!("rejected weather settings: {error}");
        })?;
        Ok(Self { settings })
    }

    /// Current settings
    pub fn settings(&self) -> WeatherSettings {
        self.settings
    }

    /// Readings within the lookback window ending at the latest reading
    pub fn window<'a>(&self, readings: &'a [PressureReading]) -> &'a [PressureReading] {
        let Some(last) = readings.last() else {
            return readings;
        };
        let start = last.time.saturating_sub(self.settings.lookback);
        let index = readings.partition_point(|reading| reading.time < start);
        &readings[index..]
    }

    /// Tendency over the lookback window
    pub fn tendency(&self, readings: &[PressureReading]) -> PressureTendency {
        let rate = rate_of_change(self.window(readings), self.settings.method);
        PressureTendency {
            trend: classify(rate, self.settings.sensitivity),
            rate,
        }
    }

    /// Tendency over the lookback window, split by speed of change
    pub fn characteristic(&self, readings: &[PressureReading]) -> TendencyCharacteristic {
        self.characterize(self.tendency(readings))
    }

    /// Whether pressure over the lookback window is falling faster than the
    /// storm threshold
    pub fn is_storm_incoming(&self, readings: &[PressureReading]) -> bool {
        rate_of_change(self.window(readings), self.settings.method) < -self.settings.storm_threshold
    }

    /// Tendency, characteristic and storm flag in one pass
    pub fn analyze(&self, readings: &[PressureReading]) -> PressureAnalysis {
        let tendency = self.tendency(readings);
        let analysis = PressureAnalysis {
            tendency,
            characteristic: self.characterize(tendency),
            storm_incoming: tendency.rate < -self.settings.storm_threshold,
        };
        trace!(
            "pressure {:?} at {:.2} hPa/h, storm incoming: {}",
            analysis.characteristic, tendency.rate, analysis.storm_incoming
        );
        analysis
    }

    /// Time span of the whole history
    pub fn history_duration(&self, readings: &[PressureReading]) -> HistoryDuration {
        HistoryDuration::of(readings)
    }

    fn characterize(&self, tendency: PressureTendency) -> TendencyCharacteristic {
        let fast = tendency.rate.abs() > self.settings.fast_change_threshold;
        match (tendency.trend, fast) {
            (Trend::Steady, _) => TendencyCharacteristic::Steady,
            (Trend::Falling, true) => TendencyCharacteristic::FallingFast,
            (Trend::Falling, false) => TendencyCharacteristic::FallingSlow,
            (Trend::Rising, true) => TendencyCharacteristic::RisingFast,
            (Trend::Rising, false) => TendencyCharacteristic::RisingSlow,
        }
    }
}

/// Time covered by a pressure history, formatted for display
///
/// Shown in minutes below one hour, otherwise in hours rounded to the
/// nearest hour.
///
/// # Example
/// ```
/// use core::time::Duration;
/// use trail_sensors::HistoryDuration;
///
/// assert_eq!(HistoryDuration(Duration::from_secs(60)).to_string(), "1 minute");
/// assert_eq!(HistoryDuration(Duration::from_secs(95 * 60)).to_string(), "2 hours");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HistoryDuration(pub Duration);

impl HistoryDuration {
    /// Span between the first and last reading
    pub fn of(readings: &[PressureReading]) -> Self {
        match readings {
            [first, .., last] => Self(last.time.saturating_sub(first.time)),
            _ => Self(Duration::ZERO),
        }
    }
}

impl fmt::Display for HistoryDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_minutes = self.0.as_secs() / 60;
        let hours = total_minutes / 60;
        let minutes = total_minutes % 60;

        let (value, unit) = match hours {
            0 => (minutes, "minute"),
            _ if minutes >= 30 => (hours + 1, "hour"),
            _ => (hours, "hour"),
        };
        let plural = if value == 1 { "" } else { "s" };
        write!(f, "{value} {unit}{plural}")
    }
}
