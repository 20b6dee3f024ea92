use nalgebra::Vector3;
use trail_sensors::{AzimuthCalculator, BearingSmoother, PressureReading, PressureTrendEstimator};

const EXPECTED_INCLINATION: f32 = 64.0; // replace with the local value from a geomagnetic model

fn main() {
    let calculator = AzimuthCalculator::new();
    let mut smoother = BearingSmoother::new(10);

    for _ in 0..10 {
        // this loop should repeat each time new sensor data is available
        let gravity = Vector3::new(0.0, 0.0, 9.81); // replace this with actual accelerometer data in m/s²
        let magnetic_field = Vector3::new(0.0, 22.0, -45.0); // replace this with actual magnetometer data in µT

        if let Some(azimuth) = calculator.calculate(gravity, magnetic_field, EXPECTED_INCLINATION) {
            let bearing = smoother.update(azimuth.bearing);
            println!(
                "Bearing: {} {}, Quality: {:?}",
                bearing,
                bearing.direction(),
                azimuth.quality
            );
        }
    }

    // replace these with stored barometer readings: seconds, hPa
    let history = [
        PressureReading::new(0, 1013.2),
        PressureReading::new(3600, 1012.6),
        PressureReading::new(7200, 1011.9),
        PressureReading::new(10800, 1011.1),
    ];

    let analysis = PressureTrendEstimator::new().analyze(&history);
    println!(
        "Pressure: {:?} at {:.2} hPa/h, {}",
        analysis.tendency.trend,
        analysis.tendency.rate,
        analysis.characteristic.description()
    );
}
