use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub mod settings;
pub use settings::{Settings, Signal, TemperatureUnit};

/// Top-level keys of a persisted screen file. Anything else is rejected.
pub const DOCUMENT_KEYS: [&str; 2] = ["layout", "components"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetKind {
    #[serde(rename = "TelemetryBox", alias = "Readout")]
    Readout,
    #[serde(rename = "ChartBox", alias = "Chart")]
    Chart,
    #[serde(rename = "CommandBox", alias = "CommandIssuer")]
    CommandIssuer,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 3] = [
        WidgetKind::Readout,
        WidgetKind::CommandIssuer,
        WidgetKind::Chart,
    ];

    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Readout => "telemetry",
            Self::Chart => "chart",
            Self::CommandIssuer => "command",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Readout => "Telemetry",
            Self::Chart => "Historical Telemetry",
            Self::CommandIssuer => "Command Box",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadoutProps {
    pub signal: Signal,
}

impl Default for ReadoutProps {
    fn default() -> Self {
        Self {
            signal: Signal::Temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartProps {
    pub show_thresholds: bool,
}

impl Default for ChartProps {
    fn default() -> Self {
        Self {
            show_thresholds: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationRule {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ValidationRule {
    /// Pattern, treating an empty string as no pattern.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref().filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandParameter {
    pub key: String,
    pub value: String,
    #[serde(rename = "validation", alias = "rule")]
    pub rule: ValidationRule,
}

/// Editable state of a command issuer widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandDraft {
    pub command: String,
    #[serde(alias = "params")]
    pub parameters: Vec<CommandParameter>,
    pub is_hazardous: bool,
    pub confirmation_required: bool,
    #[serde(alias = "twoFACode")]
    pub two_factor_code: String,
}

/// Body accepted by the device command endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPayload {
    pub name: String,
    pub code: String,
    pub hazardous: bool,
    pub params: Vec<PayloadParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadParam {
    pub key: String,
    pub value: String,
}

impl CommandDraft {
    pub fn to_payload(&self) -> CommandPayload {
        CommandPayload {
            name: self.command.trim().to_string(),
            code: self.two_factor_code.clone(),
            hazardous: self.is_hazardous,
            params: self
                .parameters
                .iter()
                .map(|p| PayloadParam {
                    key: p.key.clone(),
                    value: p.value.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetProps {
    Readout(ReadoutProps),
    Chart(ChartProps),
    CommandIssuer(CommandDraft),
}

impl WidgetProps {
    pub fn default_for(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Readout => Self::Readout(ReadoutProps::default()),
            WidgetKind::Chart => Self::Chart(ChartProps::default()),
            WidgetKind::CommandIssuer => Self::CommandIssuer(CommandDraft::default()),
        }
    }

    pub fn kind(&self) -> WidgetKind {
        match self {
            Self::Readout(_) => WidgetKind::Readout,
            Self::Chart(_) => WidgetKind::Chart,
            Self::CommandIssuer(_) => WidgetKind::CommandIssuer,
        }
    }

    fn from_value(kind: WidgetKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            WidgetKind::Readout => Self::Readout(serde_json::from_value(value)?),
            WidgetKind::Chart => Self::Chart(serde_json::from_value(value)?),
            WidgetKind::CommandIssuer => Self::CommandIssuer(serde_json::from_value(value)?),
        })
    }

    fn to_value(&self) -> Option<Value> {
        match self {
            Self::Readout(props) => serde_json::to_value(props).ok(),
            Self::Chart(props) => serde_json::to_value(props).ok(),
            Self::CommandIssuer(props) => serde_json::to_value(props).ok(),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("widget `{id}` is a {expected:?}, props are for {found:?}")]
pub struct PropsKindMismatch {
    pub id: String,
    pub expected: WidgetKind,
    pub found: WidgetKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWidget", into = "RawWidget")]
pub struct WidgetInstance {
    id: String,
    props: WidgetProps,
}

impl WidgetInstance {
    pub fn new(id: impl Into<String>, props: WidgetProps) -> Self {
        Self {
            id: id.into(),
            props,
        }
    }

    pub fn with_default_props(id: impl Into<String>, kind: WidgetKind) -> Self {
        Self::new(id, WidgetProps::default_for(kind))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> WidgetKind {
        self.props.kind()
    }

    pub fn props(&self) -> &WidgetProps {
        &self.props
    }

    /// Swaps in new props of the same kind, returning the old ones.
    pub fn replace_props(&mut self, props: WidgetProps) -> Result<WidgetProps, PropsKindMismatch> {
        if props.kind() != self.kind() {
            return Err(PropsKindMismatch {
                id: self.id.clone(),
                expected: self.kind(),
                found: props.kind(),
            });
        }
        Ok(std::mem::replace(&mut self.props, props))
    }
}

#[derive(Serialize, Deserialize)]
struct RawWidget {
    id: String,
    #[serde(rename = "type")]
    kind: WidgetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    props: Option<Value>,
}

impl TryFrom<RawWidget> for WidgetInstance {
    type Error = String;

    fn try_from(raw: RawWidget) -> Result<Self, Self::Error> {
        if raw.id.trim().is_empty() {
            return Err("widget id must not be empty".to_string());
        }
        let props = match raw.props {
            None | Some(Value::Null) => WidgetProps::default_for(raw.kind),
            Some(value) => WidgetProps::from_value(raw.kind, value)
                .map_err(|e| format!("invalid props for widget `{}`: {e}", raw.id))?,
        };
        Ok(Self { id: raw.id, props })
    }
}

impl From<WidgetInstance> for RawWidget {
    fn from(widget: WidgetInstance) -> Self {
        Self {
            kind: widget.kind(),
            props: widget.props.to_value(),
            id: widget.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    #[serde(rename = "i", alias = "widgetId")]
    pub widget_id: String,
    pub x: u32,
    pub y: u32,
    #[serde(rename = "w", alias = "width")]
    pub width: u32,
    #[serde(rename = "h", alias = "height")]
    pub height: u32,
    #[serde(rename = "static", alias = "locked", default)]
    pub locked: bool,
}

impl LayoutEntry {
    pub fn new(widget_id: impl Into<String>, placement: Placement) -> Self {
        Self {
            widget_id: widget_id.into(),
            x: placement.x,
            y: placement.y,
            width: placement.width,
            height: placement.height,
            locked: false,
        }
    }

    pub fn placement(&self) -> Placement {
        Placement {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Drops every entry placed for `widget_id`, returning how many went.
pub fn remove_widget_layout(layout: &mut Vec<LayoutEntry>, widget_id: &str) -> usize {
    let before = layout.len();
    layout.retain(|entry| entry.widget_id != widget_id);
    before - layout.len()
}

pub fn duplicate_widget_id(widgets: &[WidgetInstance]) -> Option<&str> {
    let mut seen = HashSet::new();
    widgets
        .iter()
        .map(WidgetInstance::id)
        .find(|id| !seen.insert(*id))
}

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("failed to read screen document: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed screen document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("screen document must be a JSON object")]
    NotAnObject,
    #[error("screen document is missing `{0}`")]
    MissingKey(&'static str),
    #[error("`{0}` must be an array")]
    NotAnArray(&'static str),
    #[error("unexpected top-level key `{0}`")]
    UnexpectedKey(String),
    #[error("invalid {section} entry: {message}")]
    InvalidEntry {
        section: &'static str,
        message: String,
    },
    #[error("duplicate widget id `{0}`")]
    DuplicateWidgetId(String),
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

#[derive(thiserror::Error, Debug)]
pub enum ScreenError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// The persisted form of a screen: widgets and where they sit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenDocument {
    pub layout: Vec<LayoutEntry>,
    pub components: Vec<WidgetInstance>,
}

fn take_array(
    map: &mut serde_json::Map<String, Value>,
    key: &'static str,
) -> Result<Vec<Value>, ShapeError> {
    match map.remove(key) {
        None => Err(ShapeError::MissingKey(key)),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ShapeError::NotAnArray(key)),
    }
}

fn decode_entries<T: serde::de::DeserializeOwned>(
    section: &'static str,
    items: Vec<Value>,
) -> Result<Vec<T>, ShapeError> {
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| ShapeError::InvalidEntry {
                section,
                message: e.to_string(),
            })
        })
        .collect()
}

impl ScreenDocument {
    /// Strict decode: malformed JSON is a [`ParseError`], anything that is
    /// JSON but not exactly `{layout, components}` is a [`ShapeError`].
    pub fn from_json_slice(data: &[u8]) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_slice(data).map_err(ParseError::from)?;
        let Value::Object(mut map) = value else {
            return Err(ShapeError::NotAnObject.into());
        };
        let layout = take_array(&mut map, "layout")?;
        let components = take_array(&mut map, "components")?;
        if let Some(key) = map.keys().next() {
            return Err(ShapeError::UnexpectedKey(key.clone()).into());
        }

        let layout: Vec<LayoutEntry> = decode_entries("layout", layout)?;
        let components: Vec<WidgetInstance> = decode_entries("components", components)?;
        if let Some(id) = duplicate_widget_id(&components) {
            return Err(ShapeError::DuplicateWidgetId(id.to_string()).into());
        }
        Ok(Self { layout, components })
    }

    pub fn to_json_vec_pretty(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ScreenError> {
        let data = self.to_json_vec_pretty()?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScreenError> {
        let data = fs::read(path)?;
        Ok(Self::from_json_slice(&data)?)
    }
}
