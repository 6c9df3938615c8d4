/*!
# Character State Machine

Per-tick update for a single character. Moving, dashing, attacking and
reloading are tracked independently, each with its own countdown.

Attacks are two-phase: `attack()` arms the timers, and when the damage delay
runs out `should_process_attack` is raised so the world can resolve the hit
(melee overlap test or projectile spawn). The world clears the flag.
*/

use glam::Vec2;

use crate::ecs::plugins::character::components::Character;
use crate::ecs::plugins::physics::{Body, BodyOwner, BodyType, Geometry, ShapeDef, SpatialIndex};

/// Velocity multiplier applied each tick while coasting.
const COAST_DECAY: f32 = 0.7;

/// Thickness of the melee hit capsule.
const HITBOX_RADIUS: f32 = 0.25;

impl Character {
    // ========================================================================
    // TICK
    // ========================================================================

    pub fn update(&mut self, dt: f32, space: &mut dyn SpatialIndex) {
        self.update_movement(dt, space);
        if !self.alive() {
            return;
        }
        self.update_timers(dt);
    }

    /// Advance dash, attack and reload countdowns without touching physics.
    pub fn update_timers(&mut self, dt: f32) {
        self.update_dashing(dt);
        self.update_attacking(dt);
        self.update_reloading(dt);
    }

    fn update_movement(&mut self, dt: f32, space: &mut dyn SpatialIndex) {
        let Some(body) = self.body.and_then(|handle| space.body_mut(handle)) else {
            return;
        };
        self.position = body.position;
        self.velocity = body.velocity;

        match self.moving_direction {
            Some(direction) if self.alive() => {
                self.facing_direction = direction;
                body.angle = direction.angle();

                let dash_scalar = if self.dashing { self.properties.dash_scalar } else { 1.0 };
                body.apply_force(direction.to_vector() * self.properties.run_force * dash_scalar * dt);

                let max_speed = self.properties.max_velocity * dash_scalar;
                if self.velocity.length() > max_speed {
                    self.velocity = self.velocity.clamp_length_max(max_speed);
                    body.velocity = self.velocity;
                }
            }
            _ => {
                if self.velocity.length_squared() > self.properties.running_stop_threshold {
                    self.velocity *= COAST_DECAY;
                } else {
                    self.velocity = Vec2::ZERO;
                }
                body.velocity = self.velocity;
            }
        }
    }

    fn update_dashing(&mut self, dt: f32) {
        if self.dashing {
            self.dash_time_remaining -= dt;
            if self.dash_time_remaining <= 0.0 {
                self.dashing = false;
                self.dash_time_remaining = 0.0;
                self.dash_cooldown_remaining = self.properties.dash_cooldown;
            }
        } else if self.dash_cooldown_remaining > 0.0 {
            self.dash_cooldown_remaining = (self.dash_cooldown_remaining - dt).max(0.0);
        }
    }

    fn update_attacking(&mut self, dt: f32) {
        if !self.attacking {
            return;
        }
        self.attack_time_remaining -= dt;
        if self.attack_damage_time_remaining > 0.0 {
            self.attack_damage_time_remaining -= dt;
            if self.attack_damage_time_remaining <= 0.0 {
                self.attack_damage_time_remaining = 0.0;
                self.should_process_attack = true;
            }
        }
        if self.attack_time_remaining <= 0.0 {
            self.attacking = false;
        }
    }

    fn update_reloading(&mut self, dt: f32) {
        if !self.reloading {
            return;
        }
        self.reload_time_remaining -= dt;
        if self.reload_time_remaining <= 0.0 {
            self.reloading = false;
            self.reload_time_remaining = 0.0;
            if let Some(ranged) = self.weapon.ranged() {
                self.rounds_remaining = ranged.clip_size;
            }
        }
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// Start a dash. Fails while dashing or cooling down.
    pub fn dash(&mut self) -> bool {
        if self.dashing || self.dash_cooldown_remaining > 0.0 {
            return false;
        }
        self.dashing = true;
        self.dash_time_remaining = self.properties.dash_duration;
        true
    }

    /// Start an attack toward `direction` (radians). Fails while attacking,
    /// while reloading, or with an empty clip.
    pub fn attack(&mut self, direction: f32) -> bool {
        let ranged = self.weapon.ranged().is_some();
        if self.attacking || self.reloading || (ranged && self.rounds_remaining == 0) {
            return false;
        }
        self.attacking = true;
        self.attack_time_remaining = self.weapon.attack_duration;
        self.attack_damage_time_remaining = self.weapon.attack_time_until_damage;
        self.attack_direction = direction;
        if let Some(moving) = self.moving_direction {
            self.facing_direction = moving;
        }
        if ranged {
            self.rounds_remaining -= 1;
        }
        true
    }

    /// Start reloading a ranged weapon. Melee weapons never reload.
    pub fn reload(&mut self) -> bool {
        let Some(ranged) = self.weapon.ranged() else {
            return false;
        };
        if self.reloading {
            return false;
        }
        self.reloading = true;
        self.reload_time_remaining = ranged.reload_time;
        true
    }

    // ========================================================================
    // HEALTH
    // ========================================================================

    pub fn handle_damage_received(&mut self, damage: f32, space: &mut dyn SpatialIndex) {
        if self.properties.invincible {
            return;
        }
        self.hp = (self.hp - damage).max(0.0);
        if !self.alive() {
            self.set_body_type(BodyType::Static, space);
        }
    }

    pub fn handle_healing_received(&mut self, amount: f32, space: &mut dyn SpatialIndex) {
        self.hp = (self.hp + amount).min(self.properties.hp_max);
        if self.alive() {
            self.set_body_type(BodyType::Dynamic, space);
        }
    }

    fn set_body_type(&self, body_type: BodyType, space: &mut dyn SpatialIndex) {
        if let Some(body) = self.body.and_then(|handle| space.body_mut(handle)) {
            body.body_type = body_type;
        }
    }

    // ========================================================================
    // BODY LIFECYCLE
    // ========================================================================

    /// Insert a fresh body at the cached position.
    pub fn attach_body(&mut self, space: &mut dyn SpatialIndex) {
        let mut body = Body::dynamic(
            BodyOwner::Character(self.uuid.clone()),
            self.position,
            self.properties.mass,
        )
        .with_shape(ShapeDef::solid(Geometry::circle(Vec2::ZERO, self.properties.radius)));
        body.velocity = self.velocity;
        body.angle = self.facing_direction.angle();
        self.body = Some(space.add_body(body));
        self.body_removal_processed = false;
    }

    /// Remove the body once per death. Returns false if already processed.
    pub fn detach_body(&mut self, space: &mut dyn SpatialIndex) -> bool {
        if self.body_removal_processed {
            return false;
        }
        self.body_removal_processed = true;
        if let Some(handle) = self.body.take() {
            space.remove_body(handle);
        }
        true
    }

    /// Pull position and velocity from the body after a physics step.
    pub fn sync_from_body(&mut self, space: &dyn SpatialIndex) {
        if let Some(body) = self.body.and_then(|handle| space.body(handle)) {
            self.position = body.position;
            self.velocity = body.velocity;
        }
    }

    /// Overwrite position and velocity, e.g. from a client update.
    pub fn teleport(&mut self, position: Vec2, velocity: Vec2, space: &mut dyn SpatialIndex) {
        self.position = position;
        self.velocity = velocity;
        if let Some(body) = self.body.and_then(|handle| space.body_mut(handle)) {
            body.position = position;
            body.velocity = velocity;
        }
    }

    /// Bring a dead character back at `position` with full health, a full
    /// clip and no attack, dash or reload in progress.
    pub fn revive_at(&mut self, position: Vec2, space: &mut dyn SpatialIndex) {
        self.hp = self.properties.hp_max;
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.moving_direction = None;
        self.dashing = false;
        self.dash_time_remaining = 0.0;
        self.dash_cooldown_remaining = 0.0;
        self.attacking = false;
        self.attack_time_remaining = 0.0;
        self.attack_damage_time_remaining = 0.0;
        self.should_process_attack = false;
        self.reloading = false;
        self.reload_time_remaining = 0.0;
        self.rounds_remaining = self.weapon.ranged().map_or(0, |ranged| ranged.clip_size);
        if let Some(handle) = self.body.take() {
            space.remove_body(handle);
        }
        self.attach_body(space);
    }

    /// World-space melee hit area: a capsule from the character along its
    /// attack bearing, as long as the weapon's reach.
    pub fn hitbox(&self) -> Geometry {
        let reach = Vec2::from_angle(self.attack_direction) * self.weapon.attack_distance;
        Geometry::Capsule {
            a: self.position,
            b: self.position + reach,
            radius: HITBOX_RADIUS,
        }
    }

    /// World-space collision circle.
    pub fn collision_shape(&self) -> Geometry {
        Geometry::circle(self.position, self.properties.radius)
    }
}
