use bevy::prelude::*;
use tracing::{error, warn};

use crate::ecs::plugins::broker::{BrokerConnections, BrokerEvent};
use crate::ecs::plugins::messages::decode;
use crate::ecs::plugins::world::resources::ZoneWorld;

/// Advance the simulation by one fixed step.
pub fn world_tick_system(time: Res<Time>, mut world: ResMut<ZoneWorld>) {
    world.update(time.delta_secs());
}

/// Drain the broker mailbox into the world. Malformed bytes stop here; a
/// closed link shuts the whole app down.
pub fn inbound_message_system(
    connections: Res<BrokerConnections>,
    mut world: ResMut<ZoneWorld>,
    mut exit: EventWriter<AppExit>,
) {
    for event in connections.incoming.try_iter() {
        match event {
            BrokerEvent::Delivered(bytes) => match decode(&bytes) {
                Ok(message) => {
                    world.handle_message(&message);
                }
                Err(err) => warn!(len = bytes.len(), "dropping inbound message: {err}"),
            },
            BrokerEvent::Closed { reason } => {
                error!(%reason, "broker link closed, shutting down zone");
                exit.send(AppExit::error());
                return;
            }
        }
    }
}
