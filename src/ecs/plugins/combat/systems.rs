use glam::Vec2;
use tracing::debug;

use crate::ecs::plugins::broker::Broadcaster;
use crate::ecs::plugins::character::Character;
use crate::ecs::plugins::combat::components::Projectile;
use crate::ecs::plugins::messages::builders;
use crate::ecs::plugins::physics::{BodyOwner, SpatialIndex};

pub const MELEE_DAMAGE: f32 = 1.0;
pub const PROJECTILE_DAMAGE: f32 = 1.0;

/// Apply a melee hit from `attacker` to every living target its hitbox
/// overlaps. Returns how many targets were hit.
pub fn resolve_melee(
    attacker: &Character,
    targets: &mut [Character],
    space: &mut dyn SpatialIndex,
    broadcast: &Broadcaster,
) -> usize {
    let hitbox = attacker.hitbox();
    let mut hits = 0;
    for target in targets.iter_mut().filter(|target| target.alive()) {
        if !hitbox.overlaps(&target.collision_shape()) {
            continue;
        }
        target.handle_damage_received(MELEE_DAMAGE, space);
        broadcast.publish(builders::build_character_damaged(target, MELEE_DAMAGE));
        hits += 1;
    }
    hits
}

/// Every projectile in flight in the zone.
#[derive(Debug, Default)]
pub struct ProjectileManager {
    projectiles: Vec<Projectile>,
}

impl ProjectileManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Fire `character`'s ranged weapon along its attack bearing.
    ///
    /// Returns `None` for melee weapons.
    pub fn create_projectile(&mut self, character: &Character) -> Option<&Projectile> {
        let ranged = character.weapon.ranged()?;
        let heading = Vec2::from_angle(character.attack_direction);
        let emitter_offset = Vec2::new(ranged.emitter_offset_x, ranged.emitter_offset_y);
        self.projectiles.push(Projectile {
            uuid: uuid::Uuid::new_v4().to_string(),
            position: character.position + heading.rotate(emitter_offset),
            velocity: heading * ranged.projectile_speed,
            origin_uuid: character.uuid.clone(),
            weapon: character.weapon.clone(),
            radius: ranged.projectile_radius,
        });
        self.projectiles.last()
    }

    /// Advance every projectile and resolve what it ran into.
    ///
    /// The first overlapping body other than the shooter or a corpse decides:
    /// a character takes damage, terrain just stops the shot. Either way the projectile is
    /// destroyed. Projectiles touching nothing keep flying.
    pub fn update(
        &mut self,
        dt: f32,
        space: &mut dyn SpatialIndex,
        players: &mut [Character],
        enemies: &mut [Character],
        broadcast: &Broadcaster,
    ) {
        self.projectiles.retain_mut(|projectile| {
            projectile.update(dt);

            let blocker = space
                .query_shape(&projectile.shape())
                .into_iter()
                .map(|hit| hit.owner)
                .find(|owner| match owner {
                    BodyOwner::Character(uuid) => {
                        *uuid != projectile.origin_uuid
                            && !players
                                .iter()
                                .chain(enemies.iter())
                                .any(|character| character.uuid == *uuid && !character.alive())
                    }
                    _ => true,
                });
            let Some(blocker) = blocker else {
                return true;
            };

            if let BodyOwner::Character(uuid) = blocker {
                let target = players
                    .iter_mut()
                    .chain(enemies.iter_mut())
                    .find(|character| character.uuid == uuid && character.alive());
                if let Some(target) = target {
                    target.handle_damage_received(PROJECTILE_DAMAGE, space);
                    broadcast.publish(builders::build_character_damaged(target, PROJECTILE_DAMAGE));
                }
            }

            debug!(projectile = %projectile.uuid, "projectile destroyed");
            broadcast.publish(builders::build_projectile_destroyed(&projectile.uuid));
            false
        });
    }
}
