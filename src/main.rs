/*!
# Zone Server

Authoritative simulation for one zone of the game world, built on Bevy's
minimal app runner.

## Architecture Overview

- **CorePlugin**: process configuration and the fixed tick rate
- **BrokerPlugin**: websocket link to the pub/sub broker on its own thread
- **ZonePlugin**: fixed-step world update plus the inbound message mailbox
- **DebugPlugin**: periodic world summary in the logs

The world itself (`ZoneWorld`) is a single resource. The tick system and the
mailbox system both take it mutably, so every mutation happens with nothing
else running against it.
*/

use std::sync::Arc;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zone_server::ecs::core::{GameData, ServerConfig, Zone};
use zone_server::ecs::plugins::broker::BrokerConnections;
use zone_server::ecs::plugins::persistence::JsonFileStore;
use zone_server::ecs::plugins::physics::Space;
use zone_server::ecs::{BrokerPlugin, CorePlugin, DebugPlugin, ZonePlugin};
use zone_server::ZoneWorld;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();
    init_tracing(&config);

    info!(zone = %config.zone, data_root = %config.data_root.display(), "starting zone server");

    let data = GameData::load(&config.data_root)?;
    let zone = Zone::load(&config.data_root, &config.zone)?;
    let store = JsonFileStore::open(&config.store_path)?;

    let connections = BrokerConnections::default();
    let world = ZoneWorld::new(
        zone,
        data,
        Arc::new(connections.publisher()),
        Box::new(store),
        Box::new(Space::new()),
    )
    .with_publish_channel(config.publish_channel.clone())
    .with_full_sync_interval(config.full_sync_interval);

    let exit = App::new()
        // No window, no renderer; spin the schedule a little faster than the tick.
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / (config.tick_hz * 2.0),
        ))))
        .insert_resource(connections)
        .insert_resource(world)
        .add_plugins(CorePlugin { config: config.clone() })
        .add_plugins(BrokerPlugin {
            url: config.broker_url.clone(),
            subscribe_channel: config.subscribe_channel.clone(),
        })
        .add_plugins(ZonePlugin)
        .add_plugins(DebugPlugin { interval: config.debug_interval })
        .run();

    match exit {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(format!("zone exited with code {code}").into()),
    }
}

fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    if config.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_names(true)
            .compact()
            .init();
    }
}
