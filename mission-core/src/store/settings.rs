use crate::transform::convert_threshold_on_unit_switch;
use screen::{Settings, Signal, TemperatureUnit};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

pub const MIN_TIME_RANGE_MINUTES: f64 = 1.0;
pub const MIN_STALE_TIMEOUT_SECONDS: f64 = 0.0;

const PATCH_FIELDS: [&str; 7] = [
    "staleTimeoutSeconds",
    "tempThresholdLow",
    "tempThresholdHigh",
    "timeRangeMinutes",
    "unit",
    "calibrationOffset",
    "selectedSignals",
];

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("Settings patch must be a JSON object")]
    NotAnObject,
    #[error("{field} must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[error("unknown settings field `{0}`")]
    UnknownField(String),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
}

/// A partial settings update. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub stale_timeout_seconds: Option<f64>,
    pub temp_threshold_low: Option<f64>,
    pub temp_threshold_high: Option<f64>,
    pub time_range_minutes: Option<f64>,
    pub unit: Option<TemperatureUnit>,
    pub calibration_offset: Option<f64>,
    pub selected_signals: Option<BTreeSet<Signal>>,
}

fn number_field(
    obj: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, SettingsError> {
    obj.get(field)
        .map(|value| {
            value.as_f64().ok_or(SettingsError::InvalidField {
                field,
                expected: "a number",
            })
        })
        .transpose()
}

impl SettingsPatch {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(patch: &Value) -> Result<Self, SettingsError> {
        let obj = patch.as_object().ok_or(SettingsError::NotAnObject)?;
        if let Some(key) = obj.keys().find(|k| !PATCH_FIELDS.contains(&k.as_str())) {
            return Err(SettingsError::UnknownField(key.clone()));
        }

        let unit = obj
            .get("unit")
            .map(|value| {
                value
                    .as_str()
                    .and_then(|unit| TemperatureUnit::parse(unit).ok())
                    .ok_or(SettingsError::InvalidField {
                        field: "unit",
                        expected: "'F' or 'C'",
                    })
            })
            .transpose()?;

        let selected_signals = match obj.get("selectedSignals") {
            None => None,
            Some(value) => {
                let invalid = SettingsError::InvalidField {
                    field: "selectedSignals",
                    expected: "an array of 'temp', 'pressure' or 'voltage'",
                };
                let Some(array) = value.as_array() else {
                    return Err(invalid);
                };
                let mut signals = BTreeSet::new();
                for item in array {
                    let signal = item
                        .as_str()
                        .and_then(|name| Signal::parse(name).ok());
                    match signal {
                        Some(signal) => {
                            signals.insert(signal);
                        }
                        None => return Err(invalid),
                    }
                }
                Some(signals)
            }
        };

        Ok(Self {
            stale_timeout_seconds: number_field(obj, "staleTimeoutSeconds")?,
            temp_threshold_low: number_field(obj, "tempThresholdLow")?,
            temp_threshold_high: number_field(obj, "tempThresholdHigh")?,
            time_range_minutes: number_field(obj, "timeRangeMinutes")?,
            unit,
            calibration_offset: number_field(obj, "calibrationOffset")?,
            selected_signals,
        })
    }
}

fn finite(field: &str, value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() => Some(v),
        Some(v) => {
            log::warn!("Ignoring non-finite {field}: {v}");
            None
        }
        None => None,
    }
}

/// Produces the settings that result from applying `patch` to `current`.
///
/// A unit change re-expresses the stored thresholds in the new unit, except
/// for thresholds supplied by the same patch, which are taken as already
/// being in the new unit. The calibration offset stays in device units.
pub fn apply_patch(current: &Settings, patch: SettingsPatch) -> Settings {
    let mut next = current.clone();

    if let Some(unit) = patch.unit {
        if unit != current.unit {
            next.temp_threshold_low =
                convert_threshold_on_unit_switch(current.temp_threshold_low, current.unit, unit);
            next.temp_threshold_high =
                convert_threshold_on_unit_switch(current.temp_threshold_high, current.unit, unit);
        }
        next.unit = unit;
    }
    if let Some(v) = finite("staleTimeoutSeconds", patch.stale_timeout_seconds) {
        next.stale_timeout_seconds = v.max(MIN_STALE_TIMEOUT_SECONDS);
    }
    if let Some(v) = finite("tempThresholdLow", patch.temp_threshold_low) {
        next.temp_threshold_low = v;
    }
    if let Some(v) = finite("tempThresholdHigh", patch.temp_threshold_high) {
        next.temp_threshold_high = v;
    }
    if let Some(v) = finite("timeRangeMinutes", patch.time_range_minutes) {
        next.time_range_minutes = v.max(MIN_TIME_RANGE_MINUTES);
    }
    if let Some(v) = finite("calibrationOffset", patch.calibration_offset) {
        next.calibration_offset = v;
    }
    if let Some(signals) = patch.selected_signals {
        next.selected_signals = signals;
    }
    next
}

pub fn normalize_settings(mut settings: Settings) -> Settings {
    let defaults = Settings::default();
    let or_default = |value: f64, fallback: f64| if value.is_finite() { value } else { fallback };
    settings.stale_timeout_seconds = or_default(
        settings.stale_timeout_seconds,
        defaults.stale_timeout_seconds,
    )
    .max(MIN_STALE_TIMEOUT_SECONDS);
    settings.time_range_minutes =
        or_default(settings.time_range_minutes, defaults.time_range_minutes)
            .max(MIN_TIME_RANGE_MINUTES);
    settings.temp_threshold_low =
        or_default(settings.temp_threshold_low, defaults.temp_threshold_low);
    settings.temp_threshold_high =
        or_default(settings.temp_threshold_high, defaults.temp_threshold_high);
    settings.calibration_offset =
        or_default(settings.calibration_offset, defaults.calibration_offset);
    settings
}

pub fn load_settings_file(path: &Path) -> Result<Settings, SettingsError> {
    let data = std::fs::read(path)?;
    let settings: Settings = serde_json::from_slice(&data)?;
    Ok(normalize_settings(settings))
}

pub fn save_settings_file(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(settings)?;
    std::fs::write(path, data)?;
    Ok(())
}
