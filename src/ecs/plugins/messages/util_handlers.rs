use glam::Vec2;
use tracing::info;

use crate::ecs::plugins::messages::proto::*;
use crate::ecs::plugins::messages::{HandleOutcome, MessageHandler, builders};
use crate::ecs::plugins::world::ZoneWorld;

pub struct UtilMessageHandler;

impl MessageHandler for UtilMessageHandler {
    fn handle_message(&self, world: &mut ZoneWorld, message: &Message) -> HandleOutcome {
        match &message.payload {
            Payload::TextMessage(details) => handle_text_message(world, details),
            Payload::SpawnRequested(details) => handle_spawn_requested(world, details),
            _ => return HandleOutcome::NotHandled,
        }
        HandleOutcome::Handled
    }
}

pub fn handle_text_message(world: &mut ZoneWorld, details: &TextMessage) {
    world.publish(Message::new(details.clone()));
}

pub fn handle_spawn_requested(world: &mut ZoneWorld, details: &SpawnRequested) {
    info!(
        count = details.count,
        character_type = %details.character_type,
        x = details.x,
        y = details.y,
        "spawn requested"
    );
    let updates: Vec<Message> = world
        .spawn_enemies(details.count, details.character_type, Vec2::new(details.x, details.y))
        .iter()
        .map(builders::build_character_updated)
        .collect();
    for update in updates {
        world.publish(update);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ecs::core::{CharacterType, GameData, Zone};
    use crate::ecs::plugins::broker::RecordingPublisher;
    use crate::ecs::plugins::persistence::MemoryStore;
    use crate::ecs::plugins::physics::Space;

    fn world() -> (ZoneWorld, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::new());
        let world = ZoneWorld::new(
            Zone::default(),
            GameData::builtin(),
            publisher.clone(),
            Box::new(MemoryStore::new()),
            Box::new(Space::new()),
        );
        (world, publisher)
    }

    #[test]
    fn text_is_relayed_on_the_global_channel() {
        let (mut world, publisher) = world();
        let message = builders::build_text_message("hello zone");

        assert_eq!(
            UtilMessageHandler.handle_message(&mut world, &message),
            HandleOutcome::Handled
        );
        assert_eq!(publisher.on_channel("api"), vec![message]);
    }

    #[test]
    fn spawn_request_announces_each_enemy() {
        let (mut world, publisher) = world();
        let message = Message::new(SpawnRequested {
            x: 4.0,
            y: 5.0,
            count: 3,
            character_type: CharacterType::DroidAssassin,
        });

        UtilMessageHandler.handle_message(&mut world, &message);

        assert_eq!(world.enemies().len(), 3);
        assert!(world.enemies().iter().all(|enemy| enemy.position == Vec2::new(4.0, 5.0)));
        let announced = publisher
            .on_channel("api")
            .into_iter()
            .filter(|message| matches!(message.payload, Payload::CharacterUpdated(_)))
            .count();
        assert_eq!(announced, 3);
    }
}
