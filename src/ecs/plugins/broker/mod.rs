pub mod components;
pub mod systems;

use bevy::prelude::*;

pub use components::{
    BrokerConnections, BrokerEvent, BrokerFrame, BrokerPublisher, Broadcaster, OutboundFrame,
    Publisher, RecordingPublisher, player_channel,
};
use systems::setup_broker_link;

/// Connects the zone to the pub/sub broker.
pub struct BrokerPlugin {
    pub url: String,
    pub subscribe_channel: String,
}

impl Default for BrokerPlugin {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:6380".to_string(),
            subscribe_channel: "zone".to_string(),
        }
    }
}

impl Plugin for BrokerPlugin {
    fn build(&self, app: &mut App) {
        let url = self.url.clone();
        let subscribe_channel = self.subscribe_channel.clone();
        app.init_resource::<BrokerConnections>()
            .add_systems(Startup, move |connections: Res<BrokerConnections>| {
                setup_broker_link(connections, url.clone(), subscribe_channel.clone());
            });
    }
}
