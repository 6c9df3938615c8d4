pub mod plugin;
pub mod resources;
pub mod systems;

pub use plugin::ZonePlugin;
pub use resources::{DEFAULT_FULL_SYNC_INTERVAL, DEFAULT_PUBLISH_CHANNEL, WorldSummary, ZoneWorld};
