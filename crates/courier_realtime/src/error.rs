use thiserror::Error;

use crate::message::MessageType;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {kind} payload: {source}")]
    Payload {
        kind: MessageType,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Connection refused: {0}")]
    Refused(String),

    #[error("Connection closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Already connecting")]
    AlreadyConnecting,

    #[error("Unable to connect: {0}")]
    Transport(#[from] TransportError),

    #[error("Connection attempt cancelled by disconnect")]
    Cancelled,

    #[error("Connection manager has shut down")]
    Shutdown,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Heartbeat interval must be greater than zero")]
    ZeroHeartbeatInterval,
}
