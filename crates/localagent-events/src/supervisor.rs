//! Reconnecting wrapper around [`EventsConnection`].

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::connection::{ConnectionState, EventsConfig, EventsConnection};
use crate::error::{EventsError, Result};
use crate::event::ServerEvent;

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Consecutive failed connects tolerated before giving up. The
    /// counter resets after every successful connect.
    pub max_retries: u32,
    /// Delay before attempt `n` is `base_delay * n`.
    pub base_delay: Duration,
    pub events: EventsConfig,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            events: EventsConfig::default(),
        }
    }
}

/// Keeps one event stream alive across connection drops, forwarding
/// every [`ServerEvent`] to the caller's channel.
pub struct EventsSupervisor {
    url: String,
    config: SupervisorConfig,
}

impl EventsSupervisor {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_config(url, SupervisorConfig::default())
    }

    pub fn with_config(url: impl Into<String>, config: SupervisorConfig) -> Self {
        Self {
            url: url.into(),
            config,
        }
    }

    /// Runs until the receiver side of `events` is dropped or the retry
    /// budget is exhausted.
    pub async fn run(&self, events: mpsc::UnboundedSender<ServerEvent>) -> Result<()> {
        let mut attempts: u32 = 0;
        loop {
            let connection =
                EventsConnection::with_config(&self.url, self.config.events.clone())?;
            match connection.connect().await {
                Ok(()) => {
                    debug!("connected to {}", self.url);
                    attempts = 0;
                    if !forward_until_closed(&connection, &events).await {
                        // Receiver gone; nothing left to supervise.
                        let _ = connection.disconnect().await;
                        return Ok(());
                    }
                    warn!("event stream to {} dropped", self.url);
                }
                Err(error) => {
                    warn!("connect to {} failed: {}", self.url, error);
                }
            }

            attempts += 1;
            if attempts > self.config.max_retries {
                return Err(EventsError::RetriesExhausted(self.config.max_retries));
            }
            sleep(self.config.base_delay * attempts).await;
        }
    }
}

/// Forwards events while the connection is up. Returns false when the
/// receiver side of the channel has been dropped.
async fn forward_until_closed(
    connection: &EventsConnection,
    events: &mpsc::UnboundedSender<ServerEvent>,
) -> bool {
    while connection.state().await == ConnectionState::Connected {
        match timeout(Duration::from_millis(250), connection.recv()).await {
            Ok(Some(event)) => {
                if events.send(event).is_err() {
                    return false;
                }
            }
            Ok(None) => break,
            // Idle tick; re-check the connection state.
            Err(_) => {}
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gives_up_after_the_retry_budget() {
        let supervisor = EventsSupervisor::with_config(
            "ws://127.0.0.1:9/ws",
            SupervisorConfig {
                max_retries: 2,
                base_delay: Duration::from_millis(5),
                events: EventsConfig {
                    connect_timeout: Duration::from_millis(200),
                },
            },
        );

        let (tx, _rx) = mpsc::unbounded_channel();
        let result = supervisor.run(tx).await;
        assert!(matches!(result, Err(EventsError::RetriesExhausted(2))));
    }

    #[tokio::test]
    async fn invalid_url_fails_before_any_retry() {
        let supervisor = EventsSupervisor::new("http://localhost:8000/ws");
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = supervisor.run(tx).await;
        assert!(matches!(result, Err(EventsError::InvalidUrl(_))));
    }
}
