//! Outbound event constructors from live entity state.

use crate::ecs::plugins::character::Character;
use crate::ecs::plugins::combat::Projectile;
use crate::ecs::plugins::messages::proto::*;

pub fn build_character_updated(character: &Character) -> Message {
    Message::new(CharacterUpdated {
        uuid: character.uuid.clone(),
        x: character.position.x,
        y: character.position.y,
        dx: character.velocity.x,
        dy: character.velocity.y,
        character_type: character.character_type,
        facing_direction: character.facing_direction,
        moving_direction: character.moving_direction,
        hp: character.hp(),
    })
    .with_origin(character.uuid.clone())
}

pub fn build_character_position_updated(character: &Character) -> Message {
    Message::new(CharacterPositionUpdated {
        uuid: character.uuid.clone(),
        x: character.position.x,
        y: character.position.y,
        dx: character.velocity.x,
        dy: character.velocity.y,
    })
    .with_origin(character.uuid.clone())
}

pub fn build_character_direction_updated(character: &Character) -> Message {
    Message::new(CharacterDirectionUpdated {
        uuid: character.uuid.clone(),
        facing_direction: character.facing_direction,
        moving_direction: character.moving_direction,
    })
    .with_origin(character.uuid.clone())
}

pub fn build_character_attacked(character: &Character, direction: f32) -> Message {
    Message::new(CharacterAttacked {
        uuid: character.uuid.clone(),
        direction,
    })
    .with_origin(character.uuid.clone())
}

pub fn build_character_damaged(character: &Character, damage: f32) -> Message {
    Message::new(CharacterDamaged {
        uuid: character.uuid.clone(),
        damage,
        hp: character.hp(),
    })
}

pub fn build_character_reloaded(character: &Character) -> Message {
    Message::new(CharacterReloaded {
        uuid: character.uuid.clone(),
    })
    .with_origin(character.uuid.clone())
}

pub fn build_player_respawned(character: &Character) -> Message {
    Message::new(PlayerRespawned {
        uuid: character.uuid.clone(),
        x: character.position.x,
        y: character.position.y,
    })
}

pub fn build_projectile_created(origin: &Character, projectile: &Projectile) -> Message {
    Message::new(ProjectileCreated {
        origin_uuid: origin.uuid.clone(),
        projectile: build_projectile(projectile),
    })
}

pub fn build_projectile_destroyed(uuid: &str) -> Message {
    Message::new(ProjectileDestroyed { uuid: uuid.to_string() })
}

pub fn build_projectile(projectile: &Projectile) -> ProjectileState {
    ProjectileState {
        uuid: projectile.uuid.clone(),
        x: projectile.position.x,
        y: projectile.position.y,
        dx: projectile.velocity.x,
        dy: projectile.velocity.y,
        weapon_name: projectile.weapon.name.clone(),
    }
}

pub fn build_text_message(contents: &str) -> Message {
    Message::new(TextMessage {
        text: contents.to_string(),
    })
}
