//! WebSocket push channel for LocalAgent server events.
//!
//! [`EventsConnection`] manages one socket and parses incoming frames
//! into typed [`ServerEvent`]s; [`EventsSupervisor`] keeps the stream
//! alive across drops with a capped, escalating reconnect.

pub mod connection;
pub mod error;
pub mod event;
pub mod supervisor;

pub use connection::{ConnectionState, EventsConfig, EventsConnection};
pub use error::{EventsError, Result};
pub use event::{ServerEvent, parse_server_event};
pub use supervisor::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_RETRIES, EventsSupervisor, SupervisorConfig,
};
