//! Client intents about an existing character. Each one is applied to the
//! live character and republished with the character as origin, so the
//! sender can ignore its own echo.

use glam::Vec2;
use tracing::warn;

use crate::ecs::plugins::messages::proto::*;
use crate::ecs::plugins::messages::{HandleOutcome, MessageHandler};
use crate::ecs::plugins::world::ZoneWorld;

pub struct CharacterMessageHandler;

impl MessageHandler for CharacterMessageHandler {
    fn handle_message(&self, world: &mut ZoneWorld, message: &Message) -> HandleOutcome {
        match &message.payload {
            Payload::CharacterAttacked(details) => handle_character_attacked(world, details),
            Payload::CharacterUpdated(details) => handle_character_updated(world, details),
            Payload::CharacterPositionUpdated(details) => handle_character_position_updated(world, details),
            Payload::CharacterReloaded(details) => handle_character_reloaded(world, details),
            Payload::CharacterDirectionUpdated(details) => handle_character_direction_updated(world, details),
            _ => return HandleOutcome::NotHandled,
        }
        HandleOutcome::Handled
    }
}

fn unknown(uuid: &str) {
    warn!(%uuid, "no character matching uuid");
}

pub fn handle_character_attacked(world: &mut ZoneWorld, details: &CharacterAttacked) {
    let Some((character, _)) = world.character_with_space(&details.uuid) else {
        return unknown(&details.uuid);
    };
    if !character.alive() || !character.attack(details.direction) {
        return;
    }
    let uuid = character.uuid.clone();
    world.publish(Message::new(details.clone()).with_origin(uuid));
}

pub fn handle_character_position_updated(world: &mut ZoneWorld, details: &CharacterPositionUpdated) {
    let Some((character, space)) = world.character_with_space(&details.uuid) else {
        return unknown(&details.uuid);
    };
    character.teleport(
        Vec2::new(details.x, details.y),
        Vec2::new(details.dx, details.dy),
        space,
    );
    let uuid = character.uuid.clone();
    world.publish(Message::new(details.clone()).with_origin(uuid));
}

pub fn handle_character_reloaded(world: &mut ZoneWorld, details: &CharacterReloaded) {
    let Some((character, _)) = world.character_with_space(&details.uuid) else {
        return unknown(&details.uuid);
    };
    character.reload();
    let uuid = character.uuid.clone();
    world.publish(Message::new(details.clone()).with_origin(uuid));
}

pub fn handle_character_direction_updated(world: &mut ZoneWorld, details: &CharacterDirectionUpdated) {
    let Some((character, _)) = world.character_with_space(&details.uuid) else {
        return unknown(&details.uuid);
    };
    character.moving_direction = details.moving_direction;
    character.facing_direction = details.facing_direction;
    let uuid = character.uuid.clone();
    world.publish(Message::new(details.clone()).with_origin(uuid));
}

/// Full client-side state: position, velocity and headings. Health stays
/// server-authoritative.
pub fn handle_character_updated(world: &mut ZoneWorld, details: &CharacterUpdated) {
    let Some((character, space)) = world.character_with_space(&details.uuid) else {
        return unknown(&details.uuid);
    };
    character.teleport(
        Vec2::new(details.x, details.y),
        Vec2::new(details.dx, details.dy),
        space,
    );
    character.moving_direction = details.moving_direction;
    character.facing_direction = details.facing_direction;
    let uuid = character.uuid.clone();
    world.publish(Message::new(details.clone()).with_origin(uuid));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ecs::core::{CharacterType, Direction, GameData, Zone};
    use crate::ecs::plugins::broker::RecordingPublisher;
    use crate::ecs::plugins::character::Character;
    use crate::ecs::plugins::persistence::MemoryStore;
    use crate::ecs::plugins::physics::Space;

    fn world() -> (ZoneWorld, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::new());
        let mut world = ZoneWorld::new(
            Zone::default(),
            GameData::builtin(),
            publisher.clone(),
            Box::new(MemoryStore::new()),
            Box::new(Space::new()),
        );
        let player = Character::player("p1", world.data().sheet(CharacterType::Pigsassin), Vec2::ZERO);
        world.add_player(player);
        (world, publisher)
    }

    #[test]
    fn position_update_moves_body_and_republishes_with_origin() {
        let (mut world, publisher) = world();
        let details = CharacterPositionUpdated {
            uuid: "p1".to_string(),
            x: 3.0,
            y: 4.0,
            dx: 1.0,
            dy: 0.0,
        };

        let outcome = CharacterMessageHandler.handle_message(&mut world, &Message::new(details.clone()));

        assert_eq!(outcome, HandleOutcome::Handled);
        let player = world.player("p1").unwrap();
        assert_eq!(player.position, Vec2::new(3.0, 4.0));
        let body = world.space().body(player.body.unwrap()).unwrap();
        assert_eq!(body.position, Vec2::new(3.0, 4.0));

        let published = publisher.on_channel("api");
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].origin_uuid.as_deref(), Some("p1"));
        assert_eq!(published[0].payload, Payload::CharacterPositionUpdated(details));
    }

    #[test]
    fn unknown_uuid_is_handled_without_effect() {
        let (mut world, publisher) = world();
        let message = Message::new(CharacterReloaded { uuid: "ghost".to_string() });

        let outcome = CharacterMessageHandler.handle_message(&mut world, &message);

        assert_eq!(outcome, HandleOutcome::Handled);
        assert!(publisher.published().is_empty());
    }

    #[test]
    fn direction_update_sets_headings() {
        let (mut world, _) = world();
        let message = Message::new(CharacterDirectionUpdated {
            uuid: "p1".to_string(),
            facing_direction: Direction::NW,
            moving_direction: None,
        });

        CharacterMessageHandler.handle_message(&mut world, &message);

        let player = world.player("p1").unwrap();
        assert_eq!(player.facing_direction, Direction::NW);
        assert_eq!(player.moving_direction, None);
    }

    #[test]
    fn attack_starts_the_attack_and_is_echoed() {
        let (mut world, publisher) = world();
        let message = Message::new(CharacterAttacked {
            uuid: "p1".to_string(),
            direction: 1.0,
        });

        CharacterMessageHandler.handle_message(&mut world, &message);

        let player = world.player("p1").unwrap();
        assert!(player.attacking);
        assert_eq!(player.attack_direction, 1.0);
        assert_eq!(publisher.on_channel("api").len(), 1);
    }

    #[test]
    fn dead_character_cannot_attack() {
        let (mut world, publisher) = world();
        let (player, space) = world.character_with_space("p1").unwrap();
        player.handle_damage_received(100.0, space);
        let message = Message::new(CharacterAttacked {
            uuid: "p1".to_string(),
            direction: 1.0,
        });

        let outcome = CharacterMessageHandler.handle_message(&mut world, &message);

        assert_eq!(outcome, HandleOutcome::Handled);
        let player = world.player("p1").unwrap();
        assert!(!player.attacking);
        assert_eq!(player.rounds_remaining, player.weapon.ranged().unwrap().clip_size);
        assert!(publisher.published().is_empty());
    }

    #[test]
    fn other_payloads_pass_through() {
        let (mut world, _) = world();
        let message = Message::new(TextMessage { text: "hi".to_string() });
        assert_eq!(
            CharacterMessageHandler.handle_message(&mut world, &message),
            HandleOutcome::NotHandled
        );
    }
}
