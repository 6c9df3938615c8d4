/*!
# Wire Messages

Everything the zone exchanges with the broker is a `Message`: routing
metadata plus exactly one `Payload` variant. Absence of a payload kind is
unrepresentable, so an all-zero payload can never be confused with one that
was never set.

The `Payload` variant order is the wire tag. Append new variants at the end.
*/

use serde::{Deserialize, Serialize};

use crate::ecs::core::{CharacterType, Direction};
use crate::error::CodecError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Character whose action produced this message; remotes use it to skip
    /// echoes of their own input.
    pub origin_uuid: Option<String>,
    /// Set on directed replies.
    pub destination_uuid: Option<String>,
    pub payload: Payload,
}

impl Message {
    pub fn new(payload: impl Into<Payload>) -> Self {
        Self {
            origin_uuid: None,
            destination_uuid: None,
            payload: payload.into(),
        }
    }

    pub fn with_origin(mut self, uuid: impl Into<String>) -> Self {
        self.origin_uuid = Some(uuid.into());
        self
    }

    pub fn with_destination(mut self, uuid: impl Into<String>) -> Self {
        self.destination_uuid = Some(uuid.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    TextMessage(TextMessage),
    PlayerJoined(PlayerJoined),
    PlayerLeft(PlayerLeft),
    PlayerJoinResponse(PlayerJoinResponse),
    PlayerConnected(PlayerConnected),
    PlayerDisconnected(PlayerDisconnected),
    PlayerRespawned(PlayerRespawned),
    CharacterUpdated(CharacterUpdated),
    CharacterPositionUpdated(CharacterPositionUpdated),
    CharacterDirectionUpdated(CharacterDirectionUpdated),
    CharacterAttacked(CharacterAttacked),
    CharacterDamaged(CharacterDamaged),
    CharacterReloaded(CharacterReloaded),
    ProjectileCreated(ProjectileCreated),
    ProjectileDestroyed(ProjectileDestroyed),
    SpawnRequested(SpawnRequested),
}

impl Payload {
    /// Variant name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::TextMessage(_) => "text_message",
            Payload::PlayerJoined(_) => "player_joined",
            Payload::PlayerLeft(_) => "player_left",
            Payload::PlayerJoinResponse(_) => "player_join_response",
            Payload::PlayerConnected(_) => "player_connected",
            Payload::PlayerDisconnected(_) => "player_disconnected",
            Payload::PlayerRespawned(_) => "player_respawned",
            Payload::CharacterUpdated(_) => "character_updated",
            Payload::CharacterPositionUpdated(_) => "character_position_updated",
            Payload::CharacterDirectionUpdated(_) => "character_direction_updated",
            Payload::CharacterAttacked(_) => "character_attacked",
            Payload::CharacterDamaged(_) => "character_damaged",
            Payload::CharacterReloaded(_) => "character_reloaded",
            Payload::ProjectileCreated(_) => "projectile_created",
            Payload::ProjectileDestroyed(_) => "projectile_destroyed",
            Payload::SpawnRequested(_) => "spawn_requested",
        }
    }
}

macro_rules! payload_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Payload {
                fn from(details: $variant) -> Self {
                    Payload::$variant(details)
                }
            }
        )*
    };
}

payload_from!(
    TextMessage,
    PlayerJoined,
    PlayerLeft,
    PlayerJoinResponse,
    PlayerConnected,
    PlayerDisconnected,
    PlayerRespawned,
    CharacterUpdated,
    CharacterPositionUpdated,
    CharacterDirectionUpdated,
    CharacterAttacked,
    CharacterDamaged,
    CharacterReloaded,
    ProjectileCreated,
    ProjectileDestroyed,
    SpawnRequested,
);

// ============================================================================
// PAYLOADS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerJoined {
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLeft {
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerJoinResponse {
    pub uuid: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConnected {
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDisconnected {
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRespawned {
    pub uuid: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterUpdated {
    pub uuid: String,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub character_type: CharacterType,
    pub facing_direction: Direction,
    /// `None` while standing still.
    pub moving_direction: Option<Direction>,
    pub hp: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterPositionUpdated {
    pub uuid: String,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDirectionUpdated {
    pub uuid: String,
    pub facing_direction: Direction,
    pub moving_direction: Option<Direction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterAttacked {
    pub uuid: String,
    /// Bearing in radians.
    pub direction: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDamaged {
    pub uuid: String,
    pub damage: f32,
    pub hp: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterReloaded {
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileState {
    pub uuid: String,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub weapon_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileCreated {
    pub origin_uuid: String,
    pub projectile: ProjectileState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileDestroyed {
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequested {
    pub x: f32,
    pub y: f32,
    pub count: u32,
    pub character_type: CharacterType,
}

// ============================================================================
// CODEC
// ============================================================================

pub fn encode(message: &Message) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(message).map_err(CodecError::Encode)
}

pub fn decode(bytes: &[u8]) -> Result<Message, CodecError> {
    bincode::deserialize(bytes).map_err(CodecError::Decode)
}
