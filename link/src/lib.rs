use serde::{Deserialize, Serialize};
use std::future::Future;

pub mod mailbox;
pub mod poller;

pub use mailbox::LatestSample;
pub use poller::{
    consume_stream, start_polling, TaskHandle, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL,
};

/// One telemetry reading in raw device units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
}

impl TelemetrySample {
    /// Raw reading by its wire name (`temp`, `pressure`, `voltage`).
    pub fn value(&self, name: &str) -> Option<f64> {
        match name {
            "temp" => self.temp,
            "pressure" => self.pressure,
            "voltage" => self.voltage,
            _ => None,
        }
    }
}

/// A push-stream message: a sample plus the source's status text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSample {
    #[serde(flatten)]
    pub sample: TelemetrySample,
    #[serde(default)]
    pub status: String,
}

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("undecodable payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("rejected: {0}")]
    Rejected(String),
}

pub fn decode_batch(data: &[u8]) -> Result<Vec<TelemetrySample>, TransportError> {
    Ok(serde_json::from_slice(data)?)
}

pub fn decode_stream_message(text: &str) -> Result<StreamSample, TransportError> {
    Ok(serde_json::from_str(text)?)
}

/// Pull-style telemetry endpoint: each call returns the current history.
pub trait TelemetryFetch: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Vec<TelemetrySample>, TransportError>> + Send;
}

/// Push-style endpoint delivering one encoded sample per message.
pub trait MessageStream: Send + 'static {
    /// `None` once the stream has ended.
    fn next_message(
        &mut self,
    ) -> impl Future<Output = Option<Result<String, TransportError>>> + Send;
}
