use std::path::PathBuf;

use bevy::prelude::*;
use clap::Parser;

/// Process-level settings. Every flag can also come from the environment.
#[derive(Resource, Parser, Debug, Clone)]
#[command(name = "zone_server", about = "Authoritative zone simulation server")]
pub struct ServerConfig {
    /// Zone definition to load from `<data_root>/zones/<zone>.toml`
    #[arg(long, env = "NK_ZONE", default_value = "1")]
    pub zone: String,

    /// Root directory for zone, character and weapon data
    #[arg(long, env = "NK_DATA_ROOT", default_value = "data")]
    pub data_root: PathBuf,

    /// Websocket endpoint of the pub/sub broker
    #[arg(long, env = "NK_BROKER_URL", default_value = "ws://127.0.0.1:6380")]
    pub broker_url: String,

    /// Channel the zone consumes inbound messages from
    #[arg(long, env = "NK_SUBSCRIBE_CHANNEL", default_value = "zone")]
    pub subscribe_channel: String,

    /// Global broadcast channel for world events
    #[arg(long, env = "NK_PUBLISH_CHANNEL", default_value = "api")]
    pub publish_channel: String,

    /// Fixed simulation rate
    #[arg(long, env = "NK_TICK_HZ", default_value_t = 60.0)]
    pub tick_hz: f64,

    /// JSON file holding last known character positions
    #[arg(long, env = "NK_STORE_PATH", default_value = "characters.json")]
    pub store_path: PathBuf,

    /// Seconds between full-state broadcasts
    #[arg(long, default_value_t = 5.0)]
    pub full_sync_interval: f32,

    /// Seconds between debug summaries
    #[arg(long, default_value_t = 1.0)]
    pub debug_interval: f32,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "NK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            zone: "1".to_string(),
            data_root: PathBuf::from("data"),
            broker_url: "ws://127.0.0.1:6380".to_string(),
            subscribe_channel: "zone".to_string(),
            publish_channel: "api".to_string(),
            tick_hz: 60.0,
            store_path: PathBuf::from("characters.json"),
            full_sync_interval: 5.0,
            debug_interval: 1.0,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
