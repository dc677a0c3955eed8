use crate::{
    decode_stream_message, LatestSample, MessageStream, StreamSample, TelemetryFetch,
    TelemetrySample,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Owns a background task for as long as the consuming view is mounted.
/// Dropping the handle aborts the task.
#[derive(Debug)]
pub struct TaskHandle {
    task: JoinHandle<()>,
}

impl TaskHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Fetches from `source` immediately and then on every `interval` tick,
/// publishing each successful batch into `slot`. Each fetch runs on its own
/// task, so a slow response never pushes back later ticks. Failures are
/// logged and the schedule carries on unchanged. A zero interval is raised
/// to [`MIN_POLL_INTERVAL`].
pub fn start_polling<S: TelemetryFetch>(
    source: S,
    interval: Duration,
    slot: LatestSample<Vec<TelemetrySample>>,
) -> TaskHandle {
    let interval = if interval.is_zero() {
        log::warn!("Poll interval must be positive, using {MIN_POLL_INTERVAL:?}");
        MIN_POLL_INTERVAL
    } else {
        interval
    };
    let source = Arc::new(source);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // dropped with this task, which aborts fetches still in flight
        let mut in_flight = JoinSet::new();
        loop {
            ticker.tick().await;
            while in_flight.try_join_next().is_some() {}

            let source = Arc::clone(&source);
            let slot = slot.clone();
            in_flight.spawn(async move {
                match source.fetch().await {
                    Ok(batch) => {
                        log::debug!("telemetry poll returned {} samples", batch.len());
                        slot.publish(batch);
                    }
                    Err(err) => log::warn!("Failed to fetch telemetry data: {err}"),
                }
            });
        }
    });
    TaskHandle { task }
}

/// Drains `stream` into `slot`, one sample per message. Undecodable messages
/// and transport errors are logged and skipped.
pub fn consume_stream<M: MessageStream>(
    mut stream: M,
    slot: LatestSample<StreamSample>,
) -> TaskHandle {
    let task = tokio::spawn(async move {
        while let Some(message) = stream.next_message().await {
            let decoded = message.and_then(|text| decode_stream_message(&text));
            match decoded {
                Ok(sample) => slot.publish(sample),
                Err(err) => log::warn!("Dropping telemetry message: {err}"),
            }
        }
        log::info!("telemetry stream closed");
    });
    TaskHandle { task }
}
