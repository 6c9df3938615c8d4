pub mod components;
pub mod data;
pub mod plugin;
pub mod resources;

pub use components::{CharacterType, Direction};
pub use data::{
    AttackType, CharacterProperties, CharacterSheet, EnemyGroup, EnvironmentFeature, GameData,
    Medic, Obstacle, RangedProfile, Spawner, Weapon, Zone,
};
pub use plugin::CorePlugin;
pub use resources::ServerConfig;
