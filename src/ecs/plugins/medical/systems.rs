use std::collections::HashMap;

use glam::Vec2;
use tracing::{info, warn};

use crate::ecs::core::Medic;
use crate::ecs::plugins::broker::Broadcaster;
use crate::ecs::plugins::character::Character;
use crate::ecs::plugins::messages::builders;
use crate::ecs::plugins::physics::SpatialIndex;

/// Squared distance from a medic within which players heal.
pub const HEAL_DST_SQ: f32 = 5.0;
/// Health restored per second next to a medic.
pub const HEAL_AMT: f32 = 10.0;
/// Seconds a dead player waits before respawning.
pub const RESPAWN_TIME: f32 = 5.0;

/// Healing beacons and pending player respawns.
#[derive(Debug, Default)]
pub struct MedicalManager {
    medics: Vec<Medic>,
    respawns: HashMap<String, f32>,
    /// Used when the zone has no medics.
    fallback_spawn: Vec2,
}

impl MedicalManager {
    pub fn new(medics: Vec<Medic>, fallback_spawn: Vec2) -> Self {
        Self {
            medics,
            respawns: HashMap::new(),
            fallback_spawn,
        }
    }

    pub fn medics(&self) -> &[Medic] {
        &self.medics
    }

    pub fn pending_respawns(&self) -> usize {
        self.respawns.len()
    }

    pub fn respawn_pending(&self, uuid: &str) -> bool {
        self.respawns.contains_key(uuid)
    }

    pub fn update(
        &mut self,
        dt: f32,
        players: &mut [Character],
        space: &mut dyn SpatialIndex,
        broadcast: &Broadcaster,
    ) {
        for player in players.iter_mut().filter(|player| player.alive()) {
            self.update_medic(dt, player, space);
        }
        self.update_respawns(dt, players, space, broadcast);
    }

    /// Heal `player` if it stands near any medic. Medics do not stack.
    fn update_medic(&self, dt: f32, player: &mut Character, space: &mut dyn SpatialIndex) {
        let near_medic = self
            .medics
            .iter()
            .any(|medic| player.position.distance_squared(Vec2::new(medic.x, medic.y)) < HEAL_DST_SQ);
        if near_medic {
            player.handle_healing_received(HEAL_AMT * dt, space);
        }
    }

    fn update_respawns(
        &mut self,
        dt: f32,
        players: &mut [Character],
        space: &mut dyn SpatialIndex,
        broadcast: &Broadcaster,
    ) {
        let mut due = Vec::new();
        self.respawns.retain(|uuid, remaining| {
            *remaining -= dt;
            if *remaining <= 0.0 {
                due.push(uuid.clone());
                return false;
            }
            true
        });

        for uuid in due {
            match players.iter_mut().find(|player| player.uuid == uuid) {
                Some(player) => self.respawn(player, space, broadcast),
                None => warn!(%uuid, "respawn timer fired for a player no longer in the zone"),
            }
        }
    }

    /// Bring `player` back at the nearest medic.
    pub fn respawn(&self, player: &mut Character, space: &mut dyn SpatialIndex, broadcast: &Broadcaster) {
        let spawn_point = self.nearest_medic(player.position).unwrap_or(self.fallback_spawn);
        player.revive_at(spawn_point, space);
        info!(uuid = %player.uuid, x = spawn_point.x, y = spawn_point.y, "player respawned");
        broadcast.publish(builders::build_player_respawned(player));
    }

    pub fn nearest_medic(&self, position: Vec2) -> Option<Vec2> {
        self.medics
            .iter()
            .map(|medic| Vec2::new(medic.x, medic.y))
            .min_by(|a, b| {
                a.distance_squared(position)
                    .total_cmp(&b.distance_squared(position))
            })
    }

    pub fn schedule_respawn(&mut self, uuid: &str) {
        self.respawns.insert(uuid.to_string(), RESPAWN_TIME);
    }

    /// Drop a pending respawn, e.g. when the player disconnects while dead.
    pub fn cancel_respawn(&mut self, uuid: &str) -> bool {
        self.respawns.remove(uuid).is_some()
    }
}
