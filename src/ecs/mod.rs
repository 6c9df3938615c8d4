pub mod core;
pub mod plugins;

pub use core::CorePlugin;
pub use plugins::{BrokerPlugin, DebugPlugin, ZonePlugin};
