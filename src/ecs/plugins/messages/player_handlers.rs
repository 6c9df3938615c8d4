//! Players entering and leaving the zone.

use glam::Vec2;
use tracing::{error, info, warn};

use crate::ecs::core::CharacterType;
use crate::ecs::plugins::character::Character;
use crate::ecs::plugins::messages::proto::*;
use crate::ecs::plugins::messages::{HandleOutcome, MessageHandler, builders};
use crate::ecs::plugins::world::ZoneWorld;

/// Every connected account plays this character.
pub const PLAYER_CHARACTER_TYPE: CharacterType = CharacterType::Pigsassin;

pub struct PlayerMessageHandler;

impl MessageHandler for PlayerMessageHandler {
    fn handle_message(&self, world: &mut ZoneWorld, message: &Message) -> HandleOutcome {
        match &message.payload {
            Payload::PlayerConnected(details) => handle_player_connected(world, details),
            Payload::PlayerDisconnected(details) => handle_player_disconnected(world, details),
            _ => return HandleOutcome::NotHandled,
        }
        HandleOutcome::Handled
    }
}

/// Provision the player at its stored position (or the zone start), reply
/// privately, bring it up to date on everyone else, then announce it.
pub fn handle_player_connected(world: &mut ZoneWorld, details: &PlayerConnected) {
    let uuid = details.uuid.as_str();
    if let Some(existing) = world.player(uuid) {
        info!(%uuid, "player reconnected while present");
        let response = join_response(existing);
        world.publish_to_player(uuid, response);
        return;
    }

    let position = match world.store().find_character(uuid) {
        Some((x, y)) => Vec2::new(x, y),
        None => world.start_position(),
    };
    let sheet = world.data().sheet(PLAYER_CHARACTER_TYPE).clone();
    let player = world.add_player(Character::player(uuid, &sheet, position));
    info!(%uuid, x = position.x, y = position.y, "player joined");
    let response = join_response(player);

    world.publish_to_player(uuid, response);
    send_player_full_character_updates(world, uuid);
    world.publish(Message::new(PlayerJoined { uuid: uuid.to_string() }));
}

fn join_response(player: &Character) -> Message {
    Message::new(PlayerJoinResponse {
        uuid: player.uuid.clone(),
        x: player.position.x,
        y: player.position.y,
    })
    .with_destination(player.uuid.clone())
}

/// Send the joining player the current state of every other character.
pub fn send_player_full_character_updates(world: &ZoneWorld, player_uuid: &str) {
    let updates: Vec<Message> = world
        .enemies()
        .iter()
        .chain(world.players())
        .filter(|character| character.uuid != player_uuid)
        .map(builders::build_character_updated)
        .collect();
    for update in updates {
        world.publish_to_player(player_uuid, update);
    }
}

/// Persist the final position, drop the player, and announce the departure.
pub fn handle_player_disconnected(world: &mut ZoneWorld, details: &PlayerDisconnected) {
    let uuid = details.uuid.as_str();
    let Some(player) = world.remove_player(uuid) else {
        warn!(%uuid, "disconnect for a player not in the zone");
        return;
    };
    if let Err(err) = world
        .store()
        .upsert_character(uuid, player.position.x, player.position.y)
    {
        error!(%uuid, "failed to persist character position: {err}");
    }
    info!(%uuid, "player left");
    world.publish(Message::new(PlayerLeft { uuid: uuid.to_string() }));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ecs::core::{GameData, Zone};
    use crate::ecs::plugins::broker::RecordingPublisher;
    use crate::ecs::plugins::persistence::MemoryStore;
    use crate::ecs::plugins::physics::Space;

    fn world_with_store(store: MemoryStore) -> (ZoneWorld, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::new());
        let zone = Zone {
            start_x: 2.0,
            start_y: 3.0,
            ..Default::default()
        };
        let world = ZoneWorld::new(
            zone,
            GameData::builtin(),
            publisher.clone(),
            Box::new(store),
            Box::new(Space::new()),
        );
        (world, publisher)
    }

    fn connect(world: &mut ZoneWorld, uuid: &str) {
        let message = Message::new(PlayerConnected { uuid: uuid.to_string() });
        assert_eq!(
            PlayerMessageHandler.handle_message(world, &message),
            HandleOutcome::Handled
        );
    }

    #[test]
    fn new_player_starts_at_zone_start_and_gets_private_reply() {
        let (mut world, publisher) = world_with_store(MemoryStore::new());

        connect(&mut world, "u1");

        let player = world.player("u1").unwrap();
        assert_eq!(player.position, Vec2::new(2.0, 3.0));
        assert!(player.body.is_some());

        let private = publisher.on_channel("player-u1");
        assert_eq!(private.len(), 1);
        assert_eq!(private[0].destination_uuid.as_deref(), Some("u1"));
        assert!(matches!(private[0].payload, Payload::PlayerJoinResponse(_)));
        assert_eq!(player.outbound().unwrap().len(), 1);

        let global = publisher.on_channel("api");
        assert_eq!(global.len(), 1);
        assert!(matches!(global[0].payload, Payload::PlayerJoined(_)));
    }

    #[test]
    fn returning_player_starts_at_stored_position() {
        let store = MemoryStore::new().with_character("u1", 9.0, -1.0);
        let (mut world, _) = world_with_store(store);

        connect(&mut world, "u1");

        assert_eq!(world.player("u1").unwrap().position, Vec2::new(9.0, -1.0));
    }

    #[test]
    fn joining_player_receives_everyone_else() {
        let (mut world, publisher) = world_with_store(MemoryStore::new());
        world.spawn_enemies(2, CharacterType::ShadowGuardian, Vec2::new(20.0, 20.0));
        connect(&mut world, "u1");
        publisher.clear();

        connect(&mut world, "u2");

        let updates = publisher
            .on_channel("player-u2")
            .into_iter()
            .filter_map(|message| match message.payload {
                Payload::CharacterUpdated(updated) => Some(updated.uuid),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(updates.len(), 3);
        assert!(updates.contains(&"u1".to_string()));
        assert!(!updates.contains(&"u2".to_string()));
    }

    #[test]
    fn reconnect_does_not_duplicate_player() {
        let (mut world, publisher) = world_with_store(MemoryStore::new());
        connect(&mut world, "u1");
        publisher.clear();

        connect(&mut world, "u1");

        assert_eq!(world.players().len(), 1);
        assert_eq!(world.space().body_count(), 1);
        assert_eq!(publisher.on_channel("player-u1").len(), 1);
        assert!(publisher.on_channel("api").is_empty());
    }

    #[test]
    fn unknown_disconnect_is_a_no_op() {
        let (mut world, publisher) = world_with_store(MemoryStore::new());
        let message = Message::new(PlayerDisconnected { uuid: "ghost".to_string() });

        assert_eq!(
            PlayerMessageHandler.handle_message(&mut world, &message),
            HandleOutcome::Handled
        );
        assert!(publisher.published().is_empty());
    }
}
