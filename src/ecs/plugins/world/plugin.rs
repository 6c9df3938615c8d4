use bevy::prelude::*;

use crate::ecs::plugins::broker::BrokerConnections;
use crate::ecs::plugins::world::systems::*;

/// Runs the zone: fixed-step simulation plus the inbound mailbox.
///
/// Expects `ZoneWorld` to be inserted by the caller.
pub struct ZonePlugin;

impl Plugin for ZonePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BrokerConnections>()
            .add_systems(FixedUpdate, world_tick_system)
            .add_systems(Update, inbound_message_system);
    }
}
