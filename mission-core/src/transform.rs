//! Pure conversions from raw telemetry to what the widgets show.

use chrono::{DateTime, Duration, Utc};
use link::{StreamSample, TelemetrySample};
use screen::{Settings, Signal, TemperatureUnit};
use std::collections::BTreeMap;

pub fn fahrenheit_to_celsius(value: f64) -> f64 {
    (value - 32.0) * 5.0 / 9.0
}

pub fn celsius_to_fahrenheit(value: f64) -> f64 {
    value * 9.0 / 5.0 + 32.0
}

/// Calibration is added in device units (Fahrenheit) before converting.
pub fn to_display_temperature(raw: f64, settings: &Settings) -> f64 {
    let adjusted = raw + settings.calibration_offset;
    match settings.unit {
        TemperatureUnit::Fahrenheit => adjusted,
        TemperatureUnit::Celsius => fahrenheit_to_celsius(adjusted),
    }
}

/// Re-expresses a user-entered threshold in another unit. Thresholds are
/// already display values, so no calibration is involved.
pub fn convert_threshold_on_unit_switch(
    threshold: f64,
    from: TemperatureUnit,
    to: TemperatureUnit,
) -> f64 {
    match (from, to) {
        (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => fahrenheit_to_celsius(threshold),
        (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => celsius_to_fahrenheit(threshold),
        _ => threshold,
    }
}

pub fn to_display_value(signal: Signal, raw: f64, settings: &Settings) -> f64 {
    match signal {
        Signal::Temperature => to_display_temperature(raw, settings),
        Signal::Pressure | Signal::Voltage => raw,
    }
}

pub fn parse_sample_time(time: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(time)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// True when there is no usable timestamp or it is older than the timeout.
pub fn is_stale(
    last_sample_time: Option<&str>,
    stale_timeout_seconds: f64,
    now: DateTime<Utc>,
) -> bool {
    let Some(sampled_at) = last_sample_time.and_then(parse_sample_time) else {
        return true;
    };
    let elapsed = (now - sampled_at).num_milliseconds() as f64 / 1000.0;
    elapsed > stale_timeout_seconds
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdState {
    Normal,
    BelowLow,
    AboveHigh,
}

/// Compares a display temperature with the thresholds, both in
/// `settings.unit`.
pub fn threshold_state(display_temp: f64, settings: &Settings) -> ThresholdState {
    if display_temp > settings.temp_threshold_high {
        ThresholdState::AboveHigh
    } else if display_temp < settings.temp_threshold_low {
        ThresholdState::BelowLow
    } else {
        ThresholdState::Normal
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub time: DateTime<Utc>,
    pub values: BTreeMap<Signal, f64>,
}

/// Points inside the configured time window for the selected signals,
/// oldest first. Samples with unreadable timestamps are skipped. A window
/// reaching past the representable date range keeps every sample.
pub fn chart_series(
    samples: &[TelemetrySample],
    settings: &Settings,
    now: DateTime<Utc>,
) -> Vec<ChartPoint> {
    let window_ms = (settings.time_range_minutes * 60_000.0) as i64;
    let window_start =
        Duration::try_milliseconds(window_ms).and_then(|window| now.checked_sub_signed(window));

    let mut points: Vec<ChartPoint> = samples
        .iter()
        .filter_map(|sample| {
            let time = parse_sample_time(&sample.time)?;
            if window_start.is_some_and(|start| time < start) {
                return None;
            }
            let values = settings
                .selected_signals
                .iter()
                .filter_map(|&signal| {
                    let raw = sample.value(signal.as_str())?;
                    Some((signal, to_display_value(signal, raw, settings)))
                })
                .collect();
            Some(ChartPoint { time, values })
        })
        .collect();
    points.sort_by_key(|point| point.time);
    points
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadoutView {
    pub signal: Signal,
    pub value: Option<f64>,
    pub unit: TemperatureUnit,
    pub status: String,
    pub stale: bool,
    pub threshold: ThresholdState,
}

/// What a readout widget shows for the latest pushed sample.
pub fn readout(
    latest: Option<&StreamSample>,
    signal: Signal,
    settings: &Settings,
    now: DateTime<Utc>,
) -> ReadoutView {
    let value = latest
        .and_then(|s| s.sample.value(signal.as_str()))
        .map(|raw| to_display_value(signal, raw, settings));
    let threshold = match (signal, value) {
        (Signal::Temperature, Some(display)) => threshold_state(display, settings),
        _ => ThresholdState::Normal,
    };
    ReadoutView {
        signal,
        value,
        unit: settings.unit,
        status: latest.map(|s| s.status.clone()).unwrap_or_default(),
        stale: is_stale(
            latest.map(|s| s.sample.time.as_str()),
            settings.stale_timeout_seconds,
            now,
        ),
        threshold,
    }
}
