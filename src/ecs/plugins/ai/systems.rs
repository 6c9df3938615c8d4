/*!
# Enemy AI

Enemies chase the nearest living player and attack once in weapon range.
Decisions are throttled to `UPDATE_FREQUENCY`; between decisions enemies keep
whatever heading they last chose and the character state machine carries
them along.

The spawner scheduler only advances while somebody is connected, so an empty
zone does not fill up with enemies.
*/

use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};

use crate::ecs::core::{CharacterType, Direction, EnemyGroup, EnvironmentFeature, GameData};
use crate::ecs::plugins::ai::incrementals::RemoteStateTracker;
use crate::ecs::plugins::ai::spawner::SpawnerScheduler;
use crate::ecs::plugins::broker::Broadcaster;
use crate::ecs::plugins::character::Character;
use crate::ecs::plugins::messages::builders;
use crate::ecs::plugins::physics::SpatialIndex;

/// Seconds between enemy decision passes.
pub const UPDATE_FREQUENCY: f32 = 0.1;

/// Nearest living player to `position`, by squared distance.
///
/// Linear scan over every player. Splitting the zone into chunks would bound
/// this per enemy; at current player counts it does not matter.
pub fn closest_player(players: &[Character], position: Vec2) -> Option<&Character> {
    players
        .iter()
        .filter(|player| player.alive())
        .min_by(|a, b| {
            a.position
                .distance_squared(position)
                .total_cmp(&b.position.distance_squared(position))
        })
}

#[derive(Debug)]
pub struct Ai {
    enemies: Vec<Character>,
    spawner: SpawnerScheduler,
    next_update_time: f32,
    since_last_decision: f32,
    remote: RemoteStateTracker,
}

impl Ai {
    pub fn new(environment_features: &[EnvironmentFeature]) -> Self {
        Self {
            enemies: Vec::new(),
            spawner: SpawnerScheduler::new(environment_features),
            next_update_time: 0.0,
            since_last_decision: 0.0,
            remote: RemoteStateTracker::new(),
        }
    }

    pub fn enemies(&self) -> &[Character] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut Vec<Character> {
        &mut self.enemies
    }

    pub fn spawner(&self) -> &SpawnerScheduler {
        &self.spawner
    }

    /// Place every configured enemy group, jittered around its center by up
    /// to `1 + count / 2` tiles.
    pub fn init_enemy_groups(
        &mut self,
        enemy_groups: &[EnemyGroup],
        data: &GameData,
        space: &mut dyn SpatialIndex,
    ) {
        let mut rng = rand::thread_rng();
        for group in enemy_groups {
            let r = 1 + (group.count / 2) as i32;
            for _ in 0..group.count {
                let center = Vec2::new(
                    (group.center_x + rng.gen_range(-r..=r)) as f32,
                    (group.center_y + rng.gen_range(-r..=r)) as f32,
                );
                self.spawn_enemy(group.character_type, center, data, space);
            }
        }
        info!(enemies = self.enemies.len(), "enemy groups placed");
    }

    pub fn update(
        &mut self,
        dt: f32,
        players: &[Character],
        data: &GameData,
        space: &mut dyn SpatialIndex,
        broadcast: &Broadcaster,
    ) {
        if !players.is_empty() {
            for order in self.spawner.update(dt) {
                let enemy = self.spawn_enemy(order.character_type, order.position, data, space);
                debug!(uuid = %enemy.uuid, character_type = %order.character_type, "spawner fired");
                broadcast.publish(builders::build_character_updated(enemy));
            }
        }

        self.since_last_decision += dt;
        self.next_update_time -= dt;
        if self.next_update_time > 0.0 {
            return;
        }
        self.next_update_time = UPDATE_FREQUENCY;
        let elapsed = std::mem::take(&mut self.since_last_decision);

        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.alive()) {
            update_enemy_behavior(enemy, players, broadcast);
            if let Some(message) = self.remote.update_position(elapsed, enemy) {
                broadcast.publish(message);
            }
            if let Some(message) = self.remote.update_direction(enemy) {
                broadcast.publish(message);
            }
        }
    }

    pub fn spawn_enemy(
        &mut self,
        character_type: CharacterType,
        center: Vec2,
        data: &GameData,
        space: &mut dyn SpatialIndex,
    ) -> &Character {
        let mut enemy = Character::enemy(data.sheet(character_type), center);
        enemy.attach_body(space);
        self.enemies.push(enemy);
        &self.enemies[self.enemies.len() - 1]
    }

    /// Spawn `count` enemies stacked on one point; returns the new ones.
    pub fn spawn_enemies(
        &mut self,
        count: u32,
        character_type: CharacterType,
        center: Vec2,
        data: &GameData,
        space: &mut dyn SpatialIndex,
    ) -> &[Character] {
        let first = self.enemies.len();
        for _ in 0..count {
            self.spawn_enemy(character_type, center, data, space);
        }
        &self.enemies[first..]
    }

    /// Drop replication state for an enemy that left the world.
    pub fn forget_remote(&mut self, uuid: &str) {
        self.remote.forget(uuid);
    }
}

/// One decision for one enemy: pick a heading toward the nearest player in
/// chase range and swing when in weapon reach.
pub fn update_enemy_behavior(enemy: &mut Character, players: &[Character], broadcast: &Broadcaster) {
    enemy.moving_direction = None;
    let Some(player) = closest_player(players, enemy.position) else {
        return;
    };

    let distance_sq = enemy.position.distance_squared(player.position);
    if distance_sq < enemy.properties.chase_distance.powi(2) {
        enemy.moving_direction = Some(Direction::toward(enemy.position, player.position));
    }

    if distance_sq < enemy.weapon.attack_distance.powi(2) && !enemy.attacking {
        let delta = player.position - enemy.position;
        let direction = delta.y.atan2(delta.x);
        if enemy.attack(direction) {
            broadcast.publish(builders::build_character_attacked(enemy, direction));
        } else if enemy.rounds_remaining == 0 && enemy.reload() {
            broadcast.publish(builders::build_character_reloaded(enemy));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::core::Spawner;
    use crate::ecs::plugins::broker::RecordingPublisher;
    use crate::ecs::plugins::messages::Payload;
    use crate::ecs::plugins::physics::Space;

    fn player(uuid: &str, at: Vec2) -> Character {
        let data = GameData::builtin();
        Character::player(uuid, data.sheet(CharacterType::Pigsassin), at)
    }

    #[test]
    fn closest_player_ignores_the_dead() {
        let mut space = Space::new();
        let near = player("near", Vec2::new(1.0, 0.0));
        let mut dead = player("dead", Vec2::new(0.5, 0.0));
        dead.handle_damage_received(1000.0, &mut space);
        let far = player("far", Vec2::new(5.0, 5.0));
        let players = vec![far, dead, near];

        let closest = closest_player(&players, Vec2::ZERO).unwrap();
        assert_eq!(closest.uuid, "near");
        assert!(closest_player(&[], Vec2::ZERO).is_none());
    }

    #[test]
    fn enemy_groups_are_jittered_within_radius() {
        let data = GameData::builtin();
        let mut space = Space::new();
        let mut ai = Ai::new(&[]);
        let group = EnemyGroup {
            character_type: CharacterType::ShadowGuardian,
            count: 4,
            center_x: 10,
            center_y: -3,
        };

        ai.init_enemy_groups(&[group], &data, &mut space);

        assert_eq!(ai.enemies().len(), 4);
        assert_eq!(space.body_count(), 4);
        for enemy in ai.enemies() {
            assert!((enemy.position.x - 10.0).abs() <= 3.0);
            assert!((enemy.position.y + 3.0).abs() <= 3.0);
        }
    }

    #[test]
    fn enemy_chases_and_attacks_player_in_reach() {
        let data = GameData::builtin();
        let mut space = Space::new();
        let mut ai = Ai::new(&[]);
        ai.spawn_enemy(CharacterType::ShadowGuardian, Vec2::ZERO, &data, &mut space);
        let players = vec![player("p", Vec2::new(1.0, 0.0))];

        let publisher = RecordingPublisher::new();
        ai.update(0.016, &players, &data, &mut space, &Broadcaster::new(&publisher, "api"));

        let enemy = &ai.enemies()[0];
        assert_eq!(enemy.moving_direction, Some(Direction::E));
        assert!(enemy.attacking);
        assert!(
            publisher
                .on_channel("api")
                .iter()
                .any(|message| matches!(message.payload, Payload::CharacterAttacked(_)))
        );
    }

    #[test]
    fn decisions_are_throttled() {
        let data = GameData::builtin();
        let mut space = Space::new();
        let mut ai = Ai::new(&[]);
        ai.spawn_enemy(CharacterType::ShadowGuardian, Vec2::ZERO, &data, &mut space);
        let players = vec![player("p", Vec2::new(5.0, 0.0))];
        let publisher = RecordingPublisher::new();
        let broadcast = Broadcaster::new(&publisher, "api");

        ai.update(0.016, &players, &data, &mut space, &broadcast);
        assert_eq!(ai.enemies()[0].moving_direction, Some(Direction::E));

        ai.enemies_mut()[0].moving_direction = None;
        ai.update(0.016, &players, &data, &mut space, &broadcast);
        assert_eq!(ai.enemies()[0].moving_direction, None, "no decision before the throttle elapses");
    }

    #[test]
    fn out_of_range_enemy_idles() {
        let data = GameData::builtin();
        let mut space = Space::new();
        let mut ai = Ai::new(&[]);
        ai.spawn_enemy(CharacterType::ShadowGuardian, Vec2::ZERO, &data, &mut space);
        let players = vec![player("p", Vec2::new(100.0, 0.0))];

        let publisher = RecordingPublisher::new();
        ai.update(0.016, &players, &data, &mut space, &Broadcaster::new(&publisher, "api"));

        assert_eq!(ai.enemies()[0].moving_direction, None);
        assert!(!ai.enemies()[0].attacking);
    }

    #[test]
    fn spawner_waits_for_players() {
        let data = GameData::builtin();
        let mut space = Space::new();
        let feature = EnvironmentFeature {
            tmx_name: "camp".to_string(),
            center_x: 0,
            center_y: 0,
            spawners: vec![Spawner {
                character_type: CharacterType::DroidAssassin,
                offset_x: 0,
                offset_y: 0,
                spawn_frequency_s: 1.0,
            }],
        };
        let mut ai = Ai::new(&[feature]);
        let publisher = RecordingPublisher::new();
        let broadcast = Broadcaster::new(&publisher, "api");

        ai.update(5.0, &[], &data, &mut space, &broadcast);
        assert!(ai.enemies().is_empty());

        let players = vec![player("p", Vec2::new(50.0, 50.0))];
        ai.update(1.0, &players, &data, &mut space, &broadcast);
        assert_eq!(ai.enemies().len(), 1);
        assert!(
            publisher
                .on_channel("api")
                .iter()
                .any(|message| matches!(message.payload, Payload::CharacterUpdated(_)))
        );
    }
}
