use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_STALE_TIMEOUT_SECONDS: f64 = 5.0;
pub const DEFAULT_TEMP_THRESHOLD_LOW: f64 = 50.0;
pub const DEFAULT_TEMP_THRESHOLD_HIGH: f64 = 75.0;
pub const DEFAULT_TIME_RANGE_MINUTES: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[serde(rename = "F", alias = "Fahrenheit")]
    Fahrenheit,
    #[serde(rename = "C", alias = "Celsius")]
    Celsius,
}

impl TemperatureUnit {
    pub fn parse(input: &str) -> Result<Self, String> {
        match input.trim().to_ascii_lowercase().as_str() {
            "f" | "fahrenheit" => Ok(Self::Fahrenheit),
            "c" | "celsius" => Ok(Self::Celsius),
            other => Err(format!(
                "Invalid unit '{other}'. Valid values: F, C"
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fahrenheit => "F",
            Self::Celsius => "C",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Fahrenheit => "°F",
            Self::Celsius => "°C",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "temp", alias = "temperature")]
    Temperature,
    #[serde(rename = "pressure")]
    Pressure,
    #[serde(rename = "voltage")]
    Voltage,
}

impl Signal {
    pub const ALL: [Signal; 3] = [Signal::Temperature, Signal::Pressure, Signal::Voltage];

    pub fn parse(input: &str) -> Result<Self, String> {
        match input.trim().to_ascii_lowercase().as_str() {
            "temp" | "temperature" => Ok(Self::Temperature),
            "pressure" => Ok(Self::Pressure),
            "voltage" => Ok(Self::Voltage),
            other => Err(format!(
                "Invalid signal '{other}'. Valid values: temp, pressure, voltage"
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temp",
            Self::Pressure => "pressure",
            Self::Voltage => "voltage",
        }
    }
}

/// How raw telemetry is interpreted and displayed.
///
/// Thresholds are expressed in `unit`. The calibration offset is always in
/// device units and is added to the raw reading before any conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(alias = "staleTimeout")]
    pub stale_timeout_seconds: f64,
    pub temp_threshold_low: f64,
    #[serde(alias = "tempThreshold")]
    pub temp_threshold_high: f64,
    #[serde(alias = "timeRange")]
    pub time_range_minutes: f64,
    pub unit: TemperatureUnit,
    #[serde(alias = "calibration")]
    pub calibration_offset: f64,
    pub selected_signals: BTreeSet<Signal>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stale_timeout_seconds: DEFAULT_STALE_TIMEOUT_SECONDS,
            temp_threshold_low: DEFAULT_TEMP_THRESHOLD_LOW,
            temp_threshold_high: DEFAULT_TEMP_THRESHOLD_HIGH,
            time_range_minutes: DEFAULT_TIME_RANGE_MINUTES,
            unit: TemperatureUnit::Fahrenheit,
            calibration_offset: 0.0,
            selected_signals: BTreeSet::from([Signal::Temperature]),
        }
    }
}

impl Settings {
    pub fn is_selected(&self, signal: Signal) -> bool {
        self.selected_signals.contains(&signal)
    }
}
