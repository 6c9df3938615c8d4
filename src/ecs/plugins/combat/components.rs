use std::sync::Arc;

use glam::Vec2;

use crate::ecs::core::Weapon;
use crate::ecs::plugins::physics::Geometry;

/// A shot in flight. Projectiles have no body of their own; each tick they
/// ask the spatial index what their circle overlaps.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub uuid: String,
    pub position: Vec2,
    pub velocity: Vec2,
    /// The shooter, exempt from its own projectile.
    pub origin_uuid: String,
    pub weapon: Arc<Weapon>,
    pub radius: f32,
}

impl Projectile {
    pub fn update(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    pub fn shape(&self) -> Geometry {
        Geometry::circle(self.position, self.radius)
    }
}
