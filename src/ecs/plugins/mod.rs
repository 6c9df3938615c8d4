pub mod ai;
pub mod broker;
pub mod character;
pub mod combat;
pub mod debug;
pub mod medical;
pub mod messages;
pub mod persistence;
pub mod physics;
pub mod world;

pub use broker::BrokerPlugin;
pub use debug::DebugPlugin;
pub use world::ZonePlugin;
