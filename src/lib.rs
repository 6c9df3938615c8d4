//! Authoritative zone simulation: characters, AI, combat and the message
//! pipeline between the zone and the pub/sub broker.

pub mod ecs;
pub mod error;

pub use ecs::plugins::world::ZoneWorld;
