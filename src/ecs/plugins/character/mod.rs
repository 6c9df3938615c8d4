pub mod components;
pub mod systems;

pub use components::{Character, CharacterKind, EnemyExtras, OutboundQueue, PlayerExtras};
