//! Single WebSocket connection to the backend event stream.

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, warn};
use url::Url;

use crate::error::{EventsError, Result};
use crate::event::{ServerEvent, parse_server_event};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone)]
pub struct EventsConfig {
    pub connect_timeout: Duration,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// One connection to the `/ws` endpoint. A background read task parses
/// incoming frames into [`ServerEvent`]s on an unbounded channel.
pub struct EventsConnection {
    url: Url,
    config: EventsConfig,
    state: Arc<RwLock<ConnectionState>>,
    writer: Arc<Mutex<Option<WsWriter>>>,
    incoming_tx: mpsc::UnboundedSender<ServerEvent>,
    incoming_rx: Arc<Mutex<mpsc::UnboundedReceiver<ServerEvent>>>,
    recv_task: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
}

impl EventsConnection {
    pub fn new(url: &str) -> Result<Self> {
        Self::with_config(url, EventsConfig::default())
    }

    pub fn with_config(url: &str, config: EventsConfig) -> Result<Self> {
        let parsed_url = Url::parse(url)?;
        if parsed_url.scheme() != "ws" && parsed_url.scheme() != "wss" {
            return Err(EventsError::InvalidUrl(format!(
                "URL must use ws:// or wss:// scheme, got: {}",
                parsed_url.scheme()
            )));
        }

        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();

        Ok(Self {
            url: parsed_url,
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            writer: Arc::new(Mutex::new(None)),
            incoming_tx,
            incoming_rx: Arc::new(Mutex::new(incoming_rx)),
            recv_task: Arc::new(Mutex::new(None)),
        })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Connect and start the background read loop.
    pub async fn connect(&self) -> Result<()> {
        let mut state_guard = self.state.write().await;
        if *state_guard == ConnectionState::Connected {
            return Err(EventsError::AlreadyConnected);
        }
        *state_guard = ConnectionState::Connecting;
        drop(state_guard);

        let connect_result = timeout(
            self.config.connect_timeout,
            connect_async(self.url.as_str()),
        )
        .await;
        let stream = match connect_result {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(error)) => {
                *self.state.write().await = ConnectionState::Disconnected;
                return Err(EventsError::WebSocket(error.to_string()));
            }
            Err(_) => {
                *self.state.write().await = ConnectionState::Disconnected;
                return Err(EventsError::Timeout(format!(
                    "connection timeout after {:?}",
                    self.config.connect_timeout
                )));
            }
        };

        let (writer, mut reader) = stream.split();
        *self.writer.lock().await = Some(writer);
        *self.state.write().await = ConnectionState::Connected;

        let incoming_tx = self.incoming_tx.clone();
        let state = Arc::clone(&self.state);
        let endpoint = self.url.to_string();

        let task = tokio::spawn(async move {
            while let Some(frame) = reader.next().await {
                match frame {
                    Ok(Message::Text(text)) => match parse_server_event(text.as_str()) {
                        Ok(event) => {
                            if incoming_tx.send(event).is_err() {
                                break;
                            }
                        }
                        Err(error) => {
                            warn!("event parse error on {}: {}", endpoint, error);
                        }
                    },
                    Ok(Message::Ping(payload)) => {
                        debug!("received ping from {} ({} bytes)", endpoint, payload.len());
                    }
                    Ok(Message::Pong(_)) => {}
                    Ok(Message::Close(_)) => break,
                    Ok(Message::Binary(_)) => {}
                    Ok(Message::Frame(_)) => {}
                    Err(error) => {
                        warn!("websocket read error on {}: {}", endpoint, error);
                        break;
                    }
                }
            }

            *state.write().await = ConnectionState::Disconnected;
        });

        *self.recv_task.lock().await = Some(task);
        Ok(())
    }

    /// Close the socket and stop the background read task.
    pub async fn disconnect(&self) -> Result<()> {
        if let Some(mut writer) = self.writer.lock().await.take() {
            writer
                .send(Message::Close(None))
                .await
                .map_err(|error| EventsError::WebSocket(error.to_string()))?;
        }

        if let Some(task) = self.recv_task.lock().await.take() {
            task.abort();
        }

        *self.state.write().await = ConnectionState::Disconnected;
        Ok(())
    }

    /// Send a client frame, for example a subscription filter.
    pub async fn send(&self, value: &Value) -> Result<()> {
        if self.state().await != ConnectionState::Connected {
            return Err(EventsError::NotConnected);
        }
        let text = serde_json::to_string(value)?;
        let mut writer_guard = self.writer.lock().await;
        let writer = writer_guard.as_mut().ok_or(EventsError::NotConnected)?;
        writer
            .send(Message::Text(text.into()))
            .await
            .map_err(|error| EventsError::WebSocket(error.to_string()))
    }

    /// Next event from the stream; `None` once the read task has stopped
    /// and the channel drained.
    pub async fn recv(&self) -> Option<ServerEvent> {
        self.incoming_rx.lock().await.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_websocket_schemes() {
        let result = EventsConnection::new("http://localhost:8000/ws");
        assert!(matches!(result, Err(EventsError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn send_requires_a_connection() {
        let connection = EventsConnection::new("ws://localhost:8000/ws").expect("connection");
        assert_eq!(connection.state().await, ConnectionState::Disconnected);

        let result = connection.send(&serde_json::json!({"subscribe": "tasks"})).await;
        assert!(matches!(result, Err(EventsError::NotConnected)));
    }

    #[tokio::test]
    async fn failed_connect_returns_to_disconnected() {
        let connection = EventsConnection::with_config(
            "ws://127.0.0.1:9/ws",
            EventsConfig {
                connect_timeout: Duration::from_millis(500),
            },
        )
        .expect("connection");

        assert!(connection.connect().await.is_err());
        assert_eq!(connection.state().await, ConnectionState::Disconnected);
    }
}
