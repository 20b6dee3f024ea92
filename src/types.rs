//! Core types, units and settings for the trail-sensors library

use core::fmt;
use core::time::Duration;

use crate::error::SettingsError;
use crate::math::{delta_angle, wrap_degrees};
use nalgebra::ComplexField;

/// Compass bearing in degrees
///
/// Always held in the range [0, 360), where 0° is north and angles
/// increase clockwise. Every constructor wraps its input into range.
///
/// # Example
/// ```
/// use trail_sensors::Bearing;
///
/// let bearing = Bearing::new(-90.0);
/// assert_eq!(bearing.value(), 270.0);
///
/// // Magnetic to true north with 10° east declination
/// let true_bearing = Bearing::new(355.0).with_declination(10.0);
/// assert!((true_bearing.value() - 5.0).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Bearing(f32);

impl Bearing {
    /// Create a bearing, wrapping `degrees` into [0, 360)
    pub fn new(degrees: f32) -> Self {
        Self(wrap_degrees(degrees))
    }

    /// Bearing in degrees, in [0, 360)
    pub fn value(&self) -> f32 {
        self.0
    }

    /// Apply a magnetic declination (east positive)
    ///
    /// Converts a magnetic bearing to a true-north bearing. Pass the negated
    /// declination to go the other way.
    pub fn with_declination(&self, declination: f32) -> Self {
        Self::new(self.0 + declination)
    }

    /// Signed smallest rotation from `self` to `other`, in (-180, 180]
    pub fn delta(&self, other: Bearing) -> f32 {
        delta_angle(self.0, other.0)
    }

    /// Nearest of the eight principal compass directions
    pub fn direction(&self) -> CompassDirection {
        // Sectors are 45° wide and centered on each direction
        let sector = (wrap_degrees(self.0 + 22.5) / 45.0) as usize;
        CompassDirection::ALL[sector % 8]
    }
}

impl From<Bearing> for f32 {
    fn from(bearing: Bearing) -> Self {
        bearing.0
    }
}

impl fmt::Display for Bearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(0);

        // Values that would round up to 360 print as 0
        let half_step = 0.5 * 10.0f32.powi(-(precision as i32));
        let degrees = if self.0 >= 360.0 - half_step { 0.0 } else { self.0 };

        write!(f, "{:.*}°", precision, degrees)
    }
}

/// Eight-point compass rose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompassDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CompassDirection {
    /// All directions in clockwise order starting at north
    pub const ALL: [CompassDirection; 8] = [
        CompassDirection::North,
        CompassDirection::NorthEast,
        CompassDirection::East,
        CompassDirection::SouthEast,
        CompassDirection::South,
        CompassDirection::SouthWest,
        CompassDirection::West,
        CompassDirection::NorthWest,
    ];

    /// Center of the direction's sector
    pub fn bearing(&self) -> Bearing {
        let degrees = match self {
            CompassDirection::North => 0.0,
            CompassDirection::NorthEast => 45.0,
            CompassDirection::East => 90.0,
            CompassDirection::SouthEast => 135.0,
            CompassDirection::South => 180.0,
            CompassDirection::SouthWest => 225.0,
            CompassDirection::West => 270.0,
            CompassDirection::NorthWest => 315.0,
        };
        Bearing(degrees)
    }

    /// Short label, e.g. "NE"
    pub fn abbreviation(&self) -> &'static str {
        match self {
            CompassDirection::North => "N",
            CompassDirection::NorthEast => "NE",
            CompassDirection::East => "E",
            CompassDirection::SouthEast => "SE",
            CompassDirection::South => "S",
            CompassDirection::SouthWest => "SW",
            CompassDirection::West => "W",
            CompassDirection::NorthWest => "NW",
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Confidence in a computed bearing
///
/// Derived from how far the measured magnetic inclination strays from the
/// inclination predicted by a geomagnetic model. Local magnetic interference
/// distorts the field direction, which shows up as an inclination error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quality {
    Poor,
    Moderate,
    Good,
}

/// Result of a compass calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Azimuth {
    /// Tilt-compensated magnetic bearing
    pub bearing: Bearing,
    /// Confidence derived from the inclination error
    pub quality: Quality,
    /// Measured magnetic inclination (dip) in degrees, positive downward
    pub inclination: f32,
}

/// A single barometer sample
///
/// `time` is an offset from any fixed epoch the caller chooses; only
/// differences between readings matter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureReading {
    /// Time of the sample
    pub time: Duration,
    /// Pressure in hectopascals
    pub pressure: f32,
}

impl PressureReading {
    /// Create a reading from seconds since the caller's epoch and hPa
    pub fn new(seconds: u64, pressure: f32) -> Self {
        Self {
            time: Duration::from_secs(seconds),
            pressure,
        }
    }
}

/// A barometer sample paired with the altitude it was taken at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudePressureReading {
    /// Time of the sample
    pub time: Duration,
    /// Station pressure in hectopascals
    pub pressure: f32,
    /// Altitude in meters above sea level
    pub altitude: f32,
}

impl AltitudePressureReading {
    /// Create a reading from seconds since the caller's epoch, hPa and meters
    pub fn new(seconds: u64, pressure: f32, altitude: f32) -> Self {
        Self {
            time: Duration::from_secs(seconds),
            pressure,
            altitude,
        }
    }
}

/// Direction of pressure change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Trend {
    Rising,
    Falling,
    #[default]
    Steady,
}

/// Pressure trend and its rate of change
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PressureTendency {
    /// Classified direction
    pub trend: Trend,
    /// Rate of change in hPa per hour (negative when falling)
    pub rate: f32,
}

impl PressureTendency {
    /// Steady tendency with zero rate
    pub const STEADY: PressureTendency = PressureTendency {
        trend: Trend::Steady,
        rate: 0.0,
    };

    pub fn is_rising(&self) -> bool {
        self.trend == Trend::Rising
    }

    pub fn is_falling(&self) -> bool {
        self.trend == Trend::Falling
    }

    pub fn is_steady(&self) -> bool {
        self.trend == Trend::Steady
    }
}

/// Pressure tendency split by speed of change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TendencyCharacteristic {
    FallingFast,
    FallingSlow,
    Steady,
    RisingSlow,
    RisingFast,
}

impl TendencyCharacteristic {
    /// Short weather interpretation of the tendency
    pub fn description(&self) -> &'static str {
        match self {
            TendencyCharacteristic::FallingFast => "Weather is likely to worsen soon",
            TendencyCharacteristic::FallingSlow => "Weather may worsen",
            TendencyCharacteristic::Steady => "Weather is not changing",
            TendencyCharacteristic::RisingSlow => "Weather may improve",
            TendencyCharacteristic::RisingFast => "Weather is likely to improve soon",
        }
    }
}

/// Units for displaying pressure
///
/// All computation happens in hectopascals; these units only apply to
/// presentation.
///
/// # Example
/// ```
/// use trail_sensors::PressureUnits;
///
/// let formatted = PressureUnits::Inhg.format(1013.25);
/// assert_eq!(formatted.to_string(), "29.92 in");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PressureUnits {
    #[default]
    Hpa,
    Mbar,
    Inhg,
    Psi,
}

impl PressureUnits {
    /// Convert a pressure in hPa into these units
    pub fn convert(&self, hpa: f32) -> f32 {
        match self {
            PressureUnits::Hpa | PressureUnits::Mbar => hpa,
            PressureUnits::Inhg => hpa * 0.02953,
            PressureUnits::Psi => hpa * 0.014_503_8,
        }
    }

    /// Unit symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            PressureUnits::Hpa => "hPa",
            PressureUnits::Mbar => "mbar",
            PressureUnits::Inhg => "in",
            PressureUnits::Psi => "psi",
        }
    }

    /// Decimal places worth showing for these units
    pub fn decimal_places(&self) -> usize {
        match self {
            PressureUnits::Hpa | PressureUnits::Mbar => 1,
            PressureUnits::Inhg => 2,
            PressureUnits::Psi => 3,
        }
    }

    /// Displayable pressure in these units
    pub fn format(&self, hpa: f32) -> FormattedPressure {
        FormattedPressure { hpa, units: *self }
    }
}

/// Pressure value paired with its display units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormattedPressure {
    hpa: f32,
    units: PressureUnits,
}

impl fmt::Display for FormattedPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.*} {}",
            self.units.decimal_places(),
            self.units.convert(self.hpa),
            self.units.symbol()
        )
    }
}

/// How the rate of pressure change is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendMethod {
    /// Difference between the first and last reading over the elapsed time
    #[default]
    Endpoints,
    /// Least-squares slope across every reading
    Regression,
}

/// Compass settings
///
/// # Example
/// ```
/// use trail_sensors::CompassSettings;
///
/// let settings = CompassSettings {
///     good_inclination_error: 3.0,
///     ..Default::default()
/// };
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompassSettings {
    /// Inclination errors below this (degrees) rate the bearing as good
    pub good_inclination_error: f32,
    /// Inclination errors below this (degrees) rate the bearing as moderate
    pub moderate_inclination_error: f32,
    /// Minimum `|east| * |gravity| * |magnetic field|` before the vectors
    /// are treated as parallel
    pub min_field_product: f32,
}

impl Default for CompassSettings {
    fn default() -> Self {
        Self {
            good_inclination_error: 5.0,
            moderate_inclination_error: 10.0,
            min_field_product: 0.1,
        }
    }
}

impl CompassSettings {
    /// Check that every threshold is finite, non-negative and ordered
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_threshold("good_inclination_error", self.good_inclination_error)?;
        check_threshold("moderate_inclination_error", self.moderate_inclination_error)?;
        check_threshold("min_field_product", self.min_field_product)?;
        check_order(
            "good_inclination_error",
            self.good_inclination_error,
            "moderate_inclination_error",
            self.moderate_inclination_error,
        )
    }
}

/// Pressure trend settings
///
/// All rates are in hPa per hour. The defaults correspond to 0.5 hPa,
/// 2 hPa and 6 hPa changes over a three hour period, the usual
/// thresholds for a barometric tendency.
///
/// # Example
/// ```
/// use core::time::Duration;
/// use trail_sensors::{TrendMethod, WeatherSettings};
///
/// let settings = WeatherSettings {
///     lookback: Duration::from_secs(6 * 3600),
///     method: TrendMethod::Regression,
///     ..Default::default()
/// };
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSettings {
    /// Rates beyond ± this are rising or falling
    pub sensitivity: f32,
    /// Rates beyond ± this change fast rather than slowly
    pub fast_change_threshold: f32,
    /// Falling rates beyond this signal an incoming storm
    pub storm_threshold: f32,
    /// Window of history, ending at the latest reading, used for trends
    pub lookback: Duration,
    /// Rate measurement
    pub method: TrendMethod,
    /// Largest rate weather alone produces; faster changes between
    /// readings are attributed to altitude changes
    pub max_natural_pressure_change: f32,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            sensitivity: 0.5 / 3.0,
            fast_change_threshold: 2.0 / 3.0,
            storm_threshold: 6.0 / 3.0,
            lookback: Duration::from_secs(3 * 3600),
            method: TrendMethod::default(),
            max_natural_pressure_change: 3.0,
        }
    }
}

impl WeatherSettings {
    /// Check that every threshold is finite, non-negative and ordered
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_threshold("sensitivity", self.sensitivity)?;
        check_threshold("fast_change_threshold", self.fast_change_threshold)?;
        check_threshold("storm_threshold", self.storm_threshold)?;
        check_threshold("max_natural_pressure_change", self.max_natural_pressure_change)?;
        check_order(
            "sensitivity",
            self.sensitivity,
            "fast_change_threshold",
            self.fast_change_threshold,
        )?;
        check_order(
            "sensitivity",
            self.sensitivity,
            "storm_threshold",
            self.storm_threshold,
        )?;
        if self.lookback.is_zero() {
            return Err(SettingsError::EmptyLookback);
        }
        Ok(())
    }
}

fn check_threshold(name: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::InvalidThreshold { name, value })
    }
}

fn check_order(
    lower: &'static str,
    lower_value: f32,
    upper: &'static str,
    upper_value: f32,
) -> Result<(), SettingsError> {
    if lower_value <= upper_value {
        Ok(())
    } else {
        Err(SettingsError::ThresholdOrder { lower, upper })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_bearing_wraps() {
        assert_eq!(Bearing::new(360.0).value(), 0.0);
        assert_eq!(Bearing::new(-45.0).value(), 315.0);
        assert!((Bearing::new(400.0).value() - 40.0).abs() < 1e-4);
        assert_eq!(f32::from(Bearing::new(90.0)), 90.0);
    }

    #[test]
    fn test_bearing_declination() {
        let magnetic = Bearing::new(10.0);
        assert!((magnetic.with_declination(-15.0).value() - 355.0).abs() < 1e-4);
        assert!((magnetic.with_declination(15.0).value() - 25.0).abs() < 1e-4);

        // Round trip
        let back = magnetic.with_declination(12.5).with_declination(-12.5);
        assert!((back.value() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_bearing_delta() {
        assert!((Bearing::new(350.0).delta(Bearing::new(10.0)) - 20.0).abs() < 1e-4);
        assert!((Bearing::new(10.0).delta(Bearing::new(350.0)) + 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_compass_directions() {
        assert_eq!(Bearing::new(0.0).direction(), CompassDirection::North);
        assert_eq!(Bearing::new(22.0).direction(), CompassDirection::North);
        assert_eq!(Bearing::new(23.0).direction(), CompassDirection::NorthEast);
        assert_eq!(Bearing::new(90.0).direction(), CompassDirection::East);
        assert_eq!(Bearing::new(180.0).direction(), CompassDirection::South);
        assert_eq!(Bearing::new(250.0).direction(), CompassDirection::West);
        assert_eq!(Bearing::new(330.0).direction(), CompassDirection::NorthWest);
        assert_eq!(Bearing::new(345.0).direction(), CompassDirection::North);

        for (index, direction) in CompassDirection::ALL.into_iter().enumerate() {
            assert_eq!(direction.bearing().value(), index as f32 * 45.0);
            assert_eq!(direction.bearing().direction(), direction);
        }
        assert_eq!(CompassDirection::SouthWest.to_string(), "SW");
    }

    #[test]
    fn test_bearing_display() {
        assert_eq!(Bearing::new(45.4).to_string(), "45°");
        assert_eq!(std::format!("{:.1}", Bearing::new(45.26)), "45.3°");
    }

    #[test]
    fn test_bearing_display_near_north() {
        assert_eq!(Bearing::new(359.4).to_string(), "359°");
        assert_eq!(Bearing::new(359.7).to_string(), "0°");
        assert_eq!(Bearing::new(-0.0).to_string(), "0°");
        assert_eq!(std::format!("{:.1}", Bearing::new(359.93)), "359.9°");
        assert_eq!(std::format!("{:.1}", Bearing::new(359.97)), "0.0°");
    }

    #[test]
    fn test_quality_ordering() {
        assert!(Quality::Good > Quality::Moderate);
        assert!(Quality::Moderate > Quality::Poor);
    }

    #[test]
    fn test_pressure_units() {
        assert_eq!(PressureUnits::Hpa.convert(1000.0), 1000.0);
        assert_eq!(PressureUnits::Mbar.convert(1000.0), 1000.0);
        assert!((PressureUnits::Inhg.convert(1013.25) - 29.921).abs() < 0.01);
        assert!((PressureUnits::Psi.convert(1013.25) - 14.696).abs() < 0.01);

        assert_eq!(PressureUnits::Hpa.format(1013.27).to_string(), "1013.3 hPa");
        assert_eq!(PressureUnits::Psi.format(1000.0).to_string(), "14.504 psi");
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(CompassSettings::default().validate().is_ok());
        assert!(WeatherSettings::default().validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let negative = WeatherSettings {
            sensitivity: -1.0,
            ..Default::default()
        };
        assert_eq!(
            negative.validate(),
            Err(SettingsError::InvalidThreshold {
                name: "sensitivity",
                value: -1.0
            })
        );

        let storm_below_sensitivity = WeatherSettings {
            sensitivity: 1.0,
            fast_change_threshold: 1.5,
            storm_threshold: 0.5,
            ..Default::default()
        };
        assert_eq!(
            storm_below_sensitivity.validate(),
            Err(SettingsError::ThresholdOrder {
                lower: "sensitivity",
                upper: "storm_threshold"
            })
        );

        let empty_window = WeatherSettings {
            lookback: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(empty_window.validate(), Err(SettingsError::EmptyLookback));

        let inverted = CompassSettings {
            good_inclination_error: 12.0,
            ..Default::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(SettingsError::ThresholdOrder { .. })
        ));

        let nan = CompassSettings {
            min_field_product: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            nan.validate(),
            Err(SettingsError::InvalidThreshold { .. })
        ));
    }
}
