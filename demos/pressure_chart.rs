//! Pressure history demonstration
//!
//! Loads a recorded pressure history, reduces it to sea level and replays it
//! through the trend estimator as if each reading had just arrived.
//!
//! Features demonstrated:
//! - Station and sea-level pressure conversion
//! - Altitude jumps filtered out of the history
//! - Windowed tendency, fast/slow characteristic and storm flag
//! - Pressure units for display
//!
//! Run with: `cargo run --example pressure_chart`

use plotters::prelude::*;
use serde::Deserialize;
use std::error::Error;
use trail_sensors::{
    AltitudePressureReading, PressureConverter, PressureReading, PressureTrendEstimator,
    PressureUnits, WeatherSettings,
};

#[derive(Debug, Deserialize)]
struct PressureData {
    #[serde(rename = "Time (s)")]
    time: u64,
    #[serde(rename = "Pressure (hPa)")]
    pressure: f32,
    #[serde(rename = "Altitude (m)")]
    altitude: f32,
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("Pressure chart example - sea-level conversion and storm detection");

    let mut reader = csv::Reader::from_path("testdata/pressure_history.csv")?;
    let mut readings = Vec::new();

    for result in reader.deserialize() {
        let record: PressureData = result?;
        readings.push(AltitudePressureReading::new(
            record.time,
            record.pressure,
            record.altitude,
        ));
    }

    let settings = WeatherSettings::default();
    let estimator = PressureTrendEstimator::with_settings(settings)?;

    let station: Vec<PressureReading> = PressureConverter::Station.convert(&readings).collect();
    let sea_level: Vec<PressureReading> =
        PressureConverter::sea_level(settings.max_natural_pressure_change)
            .convert(&readings)
            .collect();

    // Replay the history one reading at a time
    let mut rates = Vec::with_capacity(sea_level.len());
    let mut storms = Vec::with_capacity(sea_level.len());
    let units = PressureUnits::Inhg;

    for i in 0..sea_level.len() {
        let history = &sea_level[..=i];
        let analysis = estimator.analyze(history);
        rates.push(analysis.tendency.rate);
        storms.push(if analysis.storm_incoming { 1.0 } else { 0.0 });

        if i % 4 == 0 || analysis.storm_incoming {
            println!(
                "{:>9}: {} ({:+.2} hPa/h) {}{}",
                estimator.history_duration(history).to_string(),
                units.format(history[i].pressure),
                analysis.tendency.rate,
                analysis.characteristic.description(),
                if analysis.storm_incoming { " - storm incoming!" } else { "" }
            );
        }
    }

    println!("Generating pressure plots...");
    create_plots(&station, &sea_level, &rates, &storms)?;
    println!("✓ Plots saved to pressure_plots.png");
    Ok(())
}

fn hours(reading: &PressureReading) -> f32 {
    reading.time.as_secs_f32() / 3600.0
}

/// Three panels: pressures, tendency rate and storm flag
fn create_plots(
    station: &[PressureReading],
    sea_level: &[PressureReading],
    rates: &[f32],
    storms: &[f32],
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new("pressure_plots.png", (1000, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let (upper, lower) = root.split_vertically(500);
    let (middle, bottom) = lower.split_vertically(250);

    let first = sea_level.first().ok_or("empty history")?;
    let last = sea_level.last().ok_or("empty history")?;
    let time_range = hours(first)..hours(last);

    let (low, high) = station
        .iter()
        .chain(sea_level.iter())
        .fold((f32::MAX, f32::MIN), |(low, high), r| {
            (low.min(r.pressure), high.max(r.pressure))
        });

    // 1. Station and sea-level pressure
    let mut pressure_chart = ChartBuilder::on(&upper)
        .caption("Pressure history", ("sans-serif", 20))
        .margin(5)
        .x_label_area_size(0)
        .y_label_area_size(60)
        .build_cartesian_2d(time_range.clone(), (low - 5.0)..(high + 5.0))?;

    pressure_chart.configure_mesh().y_desc("hPa").draw()?;

    pressure_chart
        .draw_series(LineSeries::new(
            station.iter().map(|r| (hours(r), r.pressure)),
            &BLUE,
        ))?
        .label("Station")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], BLUE));

    pressure_chart
        .draw_series(LineSeries::new(
            sea_level.iter().map(|r| (hours(r), r.pressure)),
            &RED,
        ))?
        .label("Sea level")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], RED));

    pressure_chart.configure_series_labels().draw()?;

    // 2. Tendency rate
    let mut rate_chart = ChartBuilder::on(&middle)
        .margin(5)
        .x_label_area_size(0)
        .y_label_area_size(60)
        .build_cartesian_2d(time_range.clone(), -4f32..4f32)?;

    rate_chart.configure_mesh().y_desc("hPa/h").draw()?;

    rate_chart
        .draw_series(LineSeries::new(
            sea_level.iter().zip(rates.iter()).map(|(r, &rate)| (hours(r), rate)),
            &GREEN,
        ))?
        .label("Tendency")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], GREEN));

    rate_chart.configure_series_labels().draw()?;

    // 3. Storm flag
    let mut storm_chart = ChartBuilder::on(&bottom)
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(time_range, -0.1f32..1.1f32)?;

    storm_chart
        .configure_mesh()
        .x_desc("Time (h)")
        .y_label_formatter(&|y| {
            if *y < 0.5 {
                "False".to_string()
            } else {
                "True".to_string()
            }
        })
        .draw()?;

    storm_chart
        .draw_series(LineSeries::new(
            sea_level.iter().zip(storms.iter()).map(|(r, &s)| (hours(r), s)),
            &MAGENTA,
        ))?
        .label("Storm incoming")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], MAGENTA));

    storm_chart.configure_series_labels().draw()?;

    root.present()?;
    Ok(())
}
