pub mod systems;

use bevy::prelude::*;
use systems::{DebugTimer, debug_system};

pub struct DebugPlugin {
    /// Seconds between summaries.
    pub interval: f32,
}

impl Default for DebugPlugin {
    fn default() -> Self {
        Self { interval: 1.0 }
    }
}

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(DebugTimer::new(self.interval))
            .add_systems(Update, debug_system);
    }
}
