use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use glam::Vec2;

use crate::ecs::core::{CharacterProperties, CharacterSheet, CharacterType, Direction, Weapon};
use crate::ecs::plugins::messages::Message;
use crate::ecs::plugins::physics::BodyHandle;

// ============================================================================
// PLAYER / ENEMY EXTRAS
// ============================================================================

/// Messages waiting for a player's connection handler.
///
/// The zone only pushes; whoever holds a receiver drains.
#[derive(Debug, Clone)]
pub struct OutboundQueue {
    sender: Sender<Message>,
    receiver: Receiver<Message>,
}

impl Default for OutboundQueue {
    fn default() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }
}

impl OutboundQueue {
    pub fn push(&self, message: Message) {
        // The queue owns a receiver, so the channel cannot be disconnected.
        let _ = self.sender.send(message);
    }

    /// Handle for the connection handler that drains this queue.
    pub fn receiver(&self) -> Receiver<Message> {
        self.receiver.clone()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PlayerExtras {
    pub user_id: String,
    pub outbound: OutboundQueue,
}

#[derive(Debug, Clone, Copy)]
pub struct EnemyExtras {
    pub spawn_center: Vec2,
}

#[derive(Debug, Clone)]
pub enum CharacterKind {
    Player(PlayerExtras),
    Enemy(EnemyExtras),
}

// ============================================================================
// CHARACTER
// ============================================================================

/// Any simulated character, player or AI.
///
/// Position and velocity are cached from the spatial index body; the body
/// stays authoritative while one is attached.
#[derive(Debug, Clone)]
pub struct Character {
    pub uuid: String,
    pub character_type: CharacterType,
    pub kind: CharacterKind,
    pub properties: CharacterProperties,
    pub weapon: Arc<Weapon>,

    pub position: Vec2,
    pub velocity: Vec2,
    pub facing_direction: Direction,
    pub moving_direction: Option<Direction>,
    pub body: Option<BodyHandle>,

    pub dashing: bool,
    pub dash_time_remaining: f32,
    pub dash_cooldown_remaining: f32,

    pub attacking: bool,
    pub attack_time_remaining: f32,
    pub attack_damage_time_remaining: f32,
    /// Continuous bearing of the current attack, radians.
    pub attack_direction: f32,
    pub should_process_attack: bool,

    pub reloading: bool,
    pub reload_time_remaining: f32,
    pub rounds_remaining: u32,

    pub(crate) hp: f32,
    pub body_removal_processed: bool,
}

impl Character {
    pub fn new(uuid: String, sheet: &CharacterSheet, position: Vec2, kind: CharacterKind) -> Self {
        let rounds_remaining = sheet.weapon.ranged().map_or(0, |ranged| ranged.clip_size);
        Self {
            uuid,
            character_type: sheet.character_type,
            kind,
            properties: sheet.properties.clone(),
            weapon: sheet.weapon.clone(),
            position,
            velocity: Vec2::ZERO,
            facing_direction: Direction::S,
            moving_direction: None,
            body: None,
            dashing: false,
            dash_time_remaining: 0.0,
            dash_cooldown_remaining: 0.0,
            attacking: false,
            attack_time_remaining: 0.0,
            attack_damage_time_remaining: 0.0,
            attack_direction: 0.0,
            should_process_attack: false,
            reloading: false,
            reload_time_remaining: 0.0,
            rounds_remaining,
            hp: sheet.properties.hp_max,
            body_removal_processed: false,
        }
    }

    /// A connected player; the account id doubles as the character uuid.
    pub fn player(user_id: &str, sheet: &CharacterSheet, position: Vec2) -> Self {
        let kind = CharacterKind::Player(PlayerExtras {
            user_id: user_id.to_string(),
            outbound: OutboundQueue::default(),
        });
        Self::new(user_id.to_string(), sheet, position, kind)
    }

    pub fn enemy(sheet: &CharacterSheet, spawn_center: Vec2) -> Self {
        let kind = CharacterKind::Enemy(EnemyExtras { spawn_center });
        Self::new(uuid::Uuid::new_v4().to_string(), sheet, spawn_center, kind)
    }

    pub fn hp(&self) -> f32 {
        self.hp
    }

    pub fn hp_max(&self) -> f32 {
        self.properties.hp_max
    }

    pub fn alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, CharacterKind::Player(_))
    }

    pub fn outbound(&self) -> Option<&OutboundQueue> {
        match &self.kind {
            CharacterKind::Player(extras) => Some(&extras.outbound),
            CharacterKind::Enemy(_) => None,
        }
    }
}
