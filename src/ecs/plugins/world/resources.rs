/*!
# Zone World

The zone's authoritative state: players, enemies (owned by the AI),
projectiles, medics and the spatial index. Everything that mutates it goes
through `update` (the fixed tick) or `handle_message` (the inbound mailbox),
and bevy never runs those two at the same time.

## Tick Order

1. AI decisions and spawns
2. Players advance, then enemies; pending attacks resolve
3. Newly dead characters lose their body (once) and are announced
4. Medics heal, respawn timers run
5. Projectiles move and collide
6. Physics steps; cached positions refresh
7. Periodic full-state broadcast
*/

use std::sync::Arc;

use bevy::prelude::*;
use glam::Vec2;
use tracing::info;

use crate::ecs::core::{AttackType, CharacterType, GameData, Zone};
use crate::ecs::plugins::ai::Ai;
use crate::ecs::plugins::broker::{Broadcaster, Publisher, player_channel};
use crate::ecs::plugins::character::Character;
use crate::ecs::plugins::combat::{ProjectileManager, resolve_melee};
use crate::ecs::plugins::medical::MedicalManager;
use crate::ecs::plugins::messages::{HandleOutcome, Message, builders, dispatch};
use crate::ecs::plugins::persistence::CharacterStore;
use crate::ecs::plugins::physics::{Body, SpatialIndex};

pub const DEFAULT_PUBLISH_CHANNEL: &str = "api";
pub const DEFAULT_FULL_SYNC_INTERVAL: f32 = 5.0;

/// Counts for periodic diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldSummary {
    pub players: usize,
    pub enemies: usize,
    pub projectiles: usize,
    pub bodies: usize,
    pub pending_respawns: usize,
}

#[derive(Resource)]
pub struct ZoneWorld {
    zone: Zone,
    data: GameData,
    publisher: Arc<dyn Publisher>,
    publish_channel: String,
    store: Box<dyn CharacterStore>,
    space: Box<dyn SpatialIndex + Send + Sync>,
    players: Vec<Character>,
    ai: Ai,
    projectiles: ProjectileManager,
    medical: MedicalManager,
    full_sync_interval: f32,
    full_sync_remaining: f32,
}

impl ZoneWorld {
    /// Build the zone: terrain goes into the spatial index and enemy groups
    /// are placed.
    pub fn new(
        zone: Zone,
        data: GameData,
        publisher: Arc<dyn Publisher>,
        store: Box<dyn CharacterStore>,
        mut space: Box<dyn SpatialIndex + Send + Sync>,
    ) -> Self {
        for obstacle in &zone.obstacles {
            let min = Vec2::new(obstacle.x, obstacle.y);
            let max = min + Vec2::new(obstacle.width, obstacle.height);
            space.add_body(Body::terrain(min, max));
        }

        let mut ai = Ai::new(&zone.environment_features);
        ai.init_enemy_groups(&zone.enemy_groups, &data, space.as_mut());

        let start = Vec2::new(zone.start_x, zone.start_y);
        let medical = MedicalManager::new(zone.medics.clone(), start);
        info!(
            obstacles = zone.obstacles.len(),
            medics = zone.medics.len(),
            spawners = ai.spawner().len(),
            "zone loaded"
        );

        Self {
            zone,
            data,
            publisher,
            publish_channel: DEFAULT_PUBLISH_CHANNEL.to_string(),
            store,
            space,
            players: Vec::new(),
            ai,
            projectiles: ProjectileManager::new(),
            medical,
            full_sync_interval: DEFAULT_FULL_SYNC_INTERVAL,
            full_sync_remaining: DEFAULT_FULL_SYNC_INTERVAL,
        }
    }

    pub fn with_publish_channel(mut self, channel: impl Into<String>) -> Self {
        self.publish_channel = channel.into();
        self
    }

    pub fn with_full_sync_interval(mut self, seconds: f32) -> Self {
        self.full_sync_interval = seconds;
        self.full_sync_remaining = seconds;
        self
    }

    // ========================================================================
    // TICK
    // ========================================================================

    pub fn update(&mut self, dt: f32) {
        let broadcast = Broadcaster::new(self.publisher.as_ref(), &self.publish_channel);
        let space: &mut dyn SpatialIndex = self.space.as_mut();

        self.ai.update(dt, &self.players, &self.data, space, &broadcast);

        advance_characters(dt, &mut self.players, self.ai.enemies_mut(), space, &mut self.projectiles, &broadcast);
        advance_characters(dt, self.ai.enemies_mut(), &mut self.players, space, &mut self.projectiles, &broadcast);

        for player in self.players.iter_mut() {
            if !player.alive() && player.detach_body(space) {
                info!(uuid = %player.uuid, "player killed");
                broadcast.publish(builders::build_character_updated(player));
                self.medical.schedule_respawn(&player.uuid);
            }
        }
        let mut removed = Vec::new();
        self.ai.enemies_mut().retain_mut(|enemy| {
            if enemy.alive() {
                return true;
            }
            if enemy.detach_body(space) {
                broadcast.publish(builders::build_character_updated(enemy));
            }
            removed.push(enemy.uuid.clone());
            false
        });
        for uuid in removed {
            self.ai.forget_remote(&uuid);
        }

        self.medical.update(dt, &mut self.players, space, &broadcast);

        self.projectiles.update(dt, space, &mut self.players, self.ai.enemies_mut(), &broadcast);

        space.step(dt);
        for character in self.players.iter_mut().chain(self.ai.enemies_mut().iter_mut()) {
            character.sync_from_body(space);
        }

        self.full_sync_remaining -= dt;
        if self.full_sync_remaining <= 0.0 {
            self.full_sync_remaining = self.full_sync_interval;
            for character in self.players.iter().chain(self.ai.enemies()) {
                if character.alive() {
                    broadcast.publish(builders::build_character_updated(character));
                }
            }
        }
    }

    pub fn handle_message(&mut self, message: &Message) -> HandleOutcome {
        dispatch(self, message)
    }

    // ========================================================================
    // PUBLISHING
    // ========================================================================

    /// Publish on the global channel.
    pub fn publish(&self, message: Message) {
        self.publisher.publish(&self.publish_channel, &message);
    }

    /// Publish on a player's private channel and queue it for the player's
    /// connection handler.
    pub fn publish_to_player(&self, uuid: &str, message: Message) {
        self.publisher.publish(&player_channel(uuid), &message);
        if let Some(outbound) = self.player(uuid).and_then(Character::outbound) {
            outbound.push(message);
        }
    }

    // ========================================================================
    // CHARACTERS
    // ========================================================================

    pub fn players(&self) -> &[Character] {
        &self.players
    }

    pub fn enemies(&self) -> &[Character] {
        self.ai.enemies()
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.players.iter().chain(self.ai.enemies())
    }

    pub fn character(&self, uuid: &str) -> Option<&Character> {
        self.characters().find(|character| character.uuid == uuid)
    }

    pub fn player(&self, uuid: &str) -> Option<&Character> {
        self.players.iter().find(|player| player.uuid == uuid)
    }

    /// A live character together with the spatial index, for handlers that
    /// move or hurt it.
    pub fn character_with_space(&mut self, uuid: &str) -> Option<(&mut Character, &mut dyn SpatialIndex)> {
        let character = self
            .players
            .iter_mut()
            .chain(self.ai.enemies_mut().iter_mut())
            .find(|character| character.uuid == uuid)?;
        let space: &mut dyn SpatialIndex = self.space.as_mut();
        Some((character, space))
    }

    /// Give `player` a body and add it to the zone.
    pub fn add_player(&mut self, mut player: Character) -> &Character {
        player.attach_body(self.space.as_mut());
        self.players.push(player);
        &self.players[self.players.len() - 1]
    }

    /// Take a player out of the zone along with its body and any pending
    /// respawn.
    pub fn remove_player(&mut self, uuid: &str) -> Option<Character> {
        let index = self.players.iter().position(|player| player.uuid == uuid)?;
        let mut player = self.players.remove(index);
        if let Some(handle) = player.body.take() {
            self.space.remove_body(handle);
        }
        self.medical.cancel_respawn(uuid);
        Some(player)
    }

    /// Spawn `count` enemies at `center`; returns the new ones.
    pub fn spawn_enemies(
        &mut self,
        count: u32,
        character_type: CharacterType,
        center: Vec2,
    ) -> &[Character] {
        self.ai.spawn_enemies(count, character_type, center, &self.data, self.space.as_mut())
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn store(&self) -> &dyn CharacterStore {
        self.store.as_ref()
    }

    pub fn space(&self) -> &dyn SpatialIndex {
        self.space.as_ref()
    }

    pub fn projectiles(&self) -> &ProjectileManager {
        &self.projectiles
    }

    pub fn medical(&self) -> &MedicalManager {
        &self.medical
    }

    pub fn ai(&self) -> &Ai {
        &self.ai
    }

    pub fn publish_channel(&self) -> &str {
        &self.publish_channel
    }

    /// Where new players appear when the store has no position for them.
    pub fn start_position(&self) -> Vec2 {
        Vec2::new(self.zone.start_x, self.zone.start_y)
    }

    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            players: self.players.len(),
            enemies: self.ai.enemies().len(),
            projectiles: self.projectiles.len(),
            bodies: self.space.body_count(),
            pending_respawns: self.medical.pending_respawns(),
        }
    }
}

/// Tick `characters` and resolve any attack whose damage frame arrived
/// against `targets`.
fn advance_characters(
    dt: f32,
    characters: &mut [Character],
    targets: &mut [Character],
    space: &mut dyn SpatialIndex,
    projectiles: &mut ProjectileManager,
    broadcast: &Broadcaster,
) {
    for character in characters.iter_mut() {
        character.update(dt, space);
        if !character.should_process_attack {
            continue;
        }
        character.should_process_attack = false;
        match character.weapon.attack_type {
            AttackType::Melee => {
                resolve_melee(character, targets, space, broadcast);
            }
            AttackType::Ranged => {
                if let Some(projectile) = projectiles.create_projectile(character) {
                    broadcast.publish(builders::build_projectile_created(character, projectile));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::core::{EnemyGroup, EnvironmentFeature, Medic, Obstacle, Spawner};
    use crate::ecs::plugins::broker::RecordingPublisher;
    use crate::ecs::plugins::messages::Payload;
    use crate::ecs::plugins::persistence::MemoryStore;
    use crate::ecs::plugins::physics::Space;

    fn world_with(zone: Zone) -> (ZoneWorld, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::new());
        let world = ZoneWorld::new(
            zone,
            GameData::builtin(),
            publisher.clone(),
            Box::new(MemoryStore::new()),
            Box::new(Space::new()),
        );
        (world, publisher)
    }

    fn player(world: &ZoneWorld, uuid: &str, at: Vec2) -> Character {
        Character::player(uuid, world.data().sheet(CharacterType::Pigsassin), at)
    }

    #[test]
    fn construction_places_terrain_and_groups() {
        let zone = Zone {
            obstacles: vec![Obstacle { x: 0.0, y: 0.0, width: 2.0, height: 2.0 }],
            enemy_groups: vec![EnemyGroup {
                character_type: CharacterType::ShadowGuardian,
                count: 3,
                center_x: 10,
                center_y: 10,
            }],
            ..Default::default()
        };
        let (world, _) = world_with(zone);

        assert_eq!(world.enemies().len(), 3);
        assert_eq!(world.space().body_count(), 4);
    }

    #[test]
    fn killed_enemy_is_removed_once_and_announced() {
        let (mut world, publisher) = world_with(Zone::default());
        world.spawn_enemies(1, CharacterType::ShadowGuardian, Vec2::new(50.0, 50.0));
        let uuid = world.enemies()[0].uuid.clone();
        let (enemy, space) = world.character_with_space(&uuid).unwrap();
        enemy.handle_damage_received(100.0, space);

        world.update(1.0 / 60.0);
        world.update(1.0 / 60.0);

        assert!(world.enemies().is_empty());
        assert_eq!(world.space().body_count(), 0);
        let deaths = publisher
            .on_channel("api")
            .into_iter()
            .filter(|message| matches!(&message.payload, Payload::CharacterUpdated(updated) if updated.uuid == uuid))
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn killed_player_stays_and_respawns() {
        let zone = Zone {
            medics: vec![Medic { x: 4.0, y: 4.0 }],
            ..Default::default()
        };
        let (mut world, publisher) = world_with(zone);
        let p = player(&world, "p1", Vec2::ZERO);
        world.add_player(p);
        let (player, space) = world.character_with_space("p1").unwrap();
        player.handle_damage_received(1000.0, space);

        world.update(0.1);
        assert_eq!(world.players().len(), 1);
        assert_eq!(world.space().body_count(), 0);
        assert_eq!(world.medical().pending_respawns(), 1);

        for _ in 0..60 {
            world.update(0.1);
        }
        let player = world.player("p1").unwrap();
        assert!(player.alive());
        assert_eq!(world.space().body_count(), 1);
        assert!(
            publisher
                .on_channel("api")
                .iter()
                .any(|message| matches!(message.payload, Payload::PlayerRespawned(_)))
        );
    }

    #[test]
    fn ranged_attack_spawns_a_projectile_once() {
        let (mut world, publisher) = world_with(Zone::default());
        let p = player(&world, "p1", Vec2::ZERO);
        world.add_player(p);
        let (shooter, _) = world.character_with_space("p1").unwrap();
        assert!(shooter.attack(0.0));

        for _ in 0..30 {
            world.update(1.0 / 60.0);
        }

        let created = publisher
            .on_channel("api")
            .into_iter()
            .filter(|message| matches!(message.payload, Payload::ProjectileCreated(_)))
            .count();
        assert_eq!(created, 1);
        assert_eq!(world.projectiles().len(), 1);
    }

    #[test]
    fn full_sync_broadcasts_living_characters_on_interval() {
        let (world, publisher) = world_with(Zone::default());
        let mut world = world.with_full_sync_interval(1.0);
        let p = player(&world, "p1", Vec2::ZERO);
        world.add_player(p);

        world.update(0.5);
        publisher.clear();
        world.update(0.5);

        let synced = publisher
            .on_channel("api")
            .into_iter()
            .filter(|message| matches!(message.payload, Payload::CharacterUpdated(_)))
            .count();
        assert_eq!(synced, 1);
    }

    #[test]
    fn spawner_adds_enemy_only_with_players_present() {
        let zone = Zone {
            environment_features: vec![EnvironmentFeature {
                tmx_name: "factory".to_string(),
                center_x: 30,
                center_y: 30,
                spawners: vec![Spawner {
                    character_type: CharacterType::ShadowGuardian,
                    offset_x: 0,
                    offset_y: 0,
                    spawn_frequency_s: 10.0,
                }],
            }],
            ..Default::default()
        };
        let (mut world, _) = world_with(zone);
        world.update(10.0);
        assert!(world.enemies().is_empty());

        let p = player(&world, "p1", Vec2::ZERO);
        world.add_player(p);
        world.update(10.0);
        assert_eq!(world.enemies().len(), 1);
    }
}
