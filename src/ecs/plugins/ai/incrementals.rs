/*!
# Incremental Enemy Replication

Remotes dead-reckon enemies from the last position update they saw. The
tracker runs the same extrapolation and only emits a new update once the
real state has drifted past a threshold, so a steadily moving enemy costs
nothing on the wire.
*/

use std::collections::HashMap;

use glam::Vec2;

use crate::ecs::core::Direction;
use crate::ecs::plugins::character::Character;
use crate::ecs::plugins::messages::{Message, builders};

/// Squared drift, in position or velocity, that forces a fresh update.
pub const REMOTE_UPDATE_THRESHOLD: f32 = 1.0;

#[derive(Debug, Clone, Copy)]
struct RemotePosition {
    position: Vec2,
    velocity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RemoteDirection {
    facing: Direction,
    moving: Option<Direction>,
}

/// What remotes currently believe about each enemy.
#[derive(Debug, Default)]
pub struct RemoteStateTracker {
    positions: HashMap<String, RemotePosition>,
    directions: HashMap<String, RemoteDirection>,
}

impl RemoteStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position update for `enemy` if remotes have drifted too far from it
    /// after `dt` seconds of extrapolation.
    pub fn update_position(&mut self, dt: f32, enemy: &Character) -> Option<Message> {
        if let Some(remote) = self.positions.get_mut(&enemy.uuid) {
            remote.position += remote.velocity * dt;
            let close = enemy.position.distance_squared(remote.position) < REMOTE_UPDATE_THRESHOLD
                && enemy.velocity.distance_squared(remote.velocity) < REMOTE_UPDATE_THRESHOLD;
            if close {
                return None;
            }
        }
        self.positions.insert(
            enemy.uuid.clone(),
            RemotePosition {
                position: enemy.position,
                velocity: enemy.velocity,
            },
        );
        Some(builders::build_character_position_updated(enemy))
    }

    /// Direction update for `enemy` if its facing or heading changed.
    pub fn update_direction(&mut self, enemy: &Character) -> Option<Message> {
        let current = RemoteDirection {
            facing: enemy.facing_direction,
            moving: enemy.moving_direction,
        };
        if self.directions.get(&enemy.uuid) == Some(&current) {
            return None;
        }
        self.directions.insert(enemy.uuid.clone(), current);
        Some(builders::build_character_direction_updated(enemy))
    }

    pub fn forget(&mut self, uuid: &str) {
        self.positions.remove(uuid);
        self.directions.remove(uuid);
    }

    pub fn tracked(&self) -> usize {
        self.positions.len().max(self.directions.len())
    }
}
