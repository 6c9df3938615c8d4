//! Error types shared across the zone server.
//!
//! Handlers in the message path never surface these to the caller; they log
//! and carry on. Only startup (configuration, broker connect) treats them as
//! fatal.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("character sheet `{character}` references unknown weapon `{weapon}`")]
    UnknownWeapon { character: String, weapon: String },

    #[error("weapon `{0}` is ranged but has no [ranged] table")]
    MissingRangedProfile(String),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode message: {0}")]
    Decode(#[source] bincode::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("character store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("character store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker connection failed: {0}")]
    Connect(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("broker frame could not be serialized: {0}")]
    Frame(#[from] serde_json::Error),

    #[error("broker runtime could not start: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("broker writer task ended abnormally: {0}")]
    Writer(String),
}
