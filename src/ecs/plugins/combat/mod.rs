pub mod components;
pub mod systems;

pub use components::Projectile;
pub use systems::{MELEE_DAMAGE, PROJECTILE_DAMAGE, ProjectileManager, resolve_melee};
