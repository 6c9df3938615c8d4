pub mod components;
pub mod incrementals;
pub mod spawner;
pub mod systems;

pub use components::{SpawnOrder, SpawnerStruct};
pub use incrementals::{REMOTE_UPDATE_THRESHOLD, RemoteStateTracker};
pub use spawner::SpawnerScheduler;
pub use systems::{Ai, UPDATE_FREQUENCY, closest_player, update_enemy_behavior};
