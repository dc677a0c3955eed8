use link::TransportError;
use screen::CommandPayload;
use std::future::Future;
use std::time::Duration;

pub const SIMULATED_SEND_LATENCY: Duration = Duration::from_secs(1);

/// Delivers a validated command. `Ok` means the device accepted it.
pub trait CommandTransport: Send + Sync {
    fn send(
        &self,
        payload: &CommandPayload,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Accepts every command after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    pub latency: Duration,
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self {
            latency: SIMULATED_SEND_LATENCY,
        }
    }
}

impl CommandTransport for SimulatedTransport {
    async fn send(&self, payload: &CommandPayload) -> Result<(), TransportError> {
        tokio::time::sleep(self.latency).await;
        log::info!(
            "simulated send of `{}` with {} params",
            payload.name,
            payload.params.len()
        );
        Ok(())
    }
}
