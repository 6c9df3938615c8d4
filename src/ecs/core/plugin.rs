use bevy::prelude::*;

use crate::ecs::core::resources::ServerConfig;

/// Process configuration and the fixed simulation rate.
pub struct CorePlugin {
    pub config: ServerConfig,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(Time::<Fixed>::from_hz(self.config.tick_hz));
    }
}
