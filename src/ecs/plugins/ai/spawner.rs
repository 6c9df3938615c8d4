use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::ecs::core::EnvironmentFeature;
use crate::ecs::plugins::ai::components::{SpawnOrder, SpawnerStruct};

/// Min-heap of spawners keyed by their next due time.
///
/// Rescheduling pops and re-pushes rather than mutating a key in place.
#[derive(Debug, Default)]
pub struct SpawnerScheduler {
    spawners: BinaryHeap<SpawnerStruct>,
    current_time: f32,
}

impl SpawnerScheduler {
    pub fn new(environment_features: &[EnvironmentFeature]) -> Self {
        let mut spawners = BinaryHeap::new();
        for feature in environment_features {
            let parent_feature = Arc::new(feature.clone());
            for spawner in &feature.spawners {
                let index = spawners.len();
                spawners.push(SpawnerStruct {
                    next_spawn_time_s: spawner.spawn_frequency_s,
                    spawner: spawner.clone(),
                    parent_feature: parent_feature.clone(),
                    index,
                });
            }
        }
        Self { spawners, current_time: 0.0 }
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn len(&self) -> usize {
        self.spawners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawners.is_empty()
    }

    /// Due time of the next spawner to fire.
    pub fn next_due(&self) -> Option<f32> {
        self.spawners.peek().map(|top| top.next_spawn_time_s)
    }

    /// Advance the clock and collect every spawn that came due.
    ///
    /// Each due spawner fires once and is rescheduled relative to the current
    /// time, so a long gap never produces a burst from one spawner.
    pub fn update(&mut self, dt: f32) -> Vec<SpawnOrder> {
        self.current_time += dt;

        let mut fired = Vec::new();
        while self
            .spawners
            .peek()
            .is_some_and(|top| top.next_spawn_time_s <= self.current_time)
        {
            let Some(mut due) = self.spawners.pop() else {
                break;
            };
            due.next_spawn_time_s = self.current_time + due.spawner.spawn_frequency_s;
            fired.push(due);
        }

        let orders = fired
            .iter()
            .map(|due| SpawnOrder {
                character_type: due.spawner.character_type,
                position: due.spawn_point(),
            })
            .collect();
        self.spawners.extend(fired);
        orders
    }
}
