use std::cmp::Ordering;
use std::sync::Arc;

use glam::Vec2;

use crate::ecs::core::{CharacterType, EnvironmentFeature, Spawner};

/// A spawner waiting in the scheduler heap.
#[derive(Debug, Clone)]
pub struct SpawnerStruct {
    pub spawner: Spawner,
    pub parent_feature: Arc<EnvironmentFeature>,
    pub next_spawn_time_s: f32,
    /// Position in zone order; breaks ties between spawners due together.
    pub index: usize,
}

impl SpawnerStruct {
    /// Absolute spawn point: feature center plus spawner offset.
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(
            (self.parent_feature.center_x + self.spawner.offset_x) as f32,
            (self.parent_feature.center_y + self.spawner.offset_y) as f32,
        )
    }
}

// BinaryHeap is a max-heap; reverse so the earliest spawn sits on top.
impl Ord for SpawnerStruct {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .next_spawn_time_s
            .total_cmp(&self.next_spawn_time_s)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for SpawnerStruct {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SpawnerStruct {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SpawnerStruct {}

/// An enemy the scheduler wants created this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnOrder {
    pub character_type: CharacterType,
    pub position: Vec2,
}
