/*!
# Debug Systems

Periodic world summary for operators. Logged at `debug` level, so it costs
nothing unless the filter asks for it.
*/

use bevy::prelude::*;
use tracing::debug;

use crate::ecs::plugins::world::ZoneWorld;

/// Tracks when the last summary went out.
#[derive(Resource)]
pub struct DebugTimer {
    pub interval: f32,
    last_print_time: f32,
}

impl DebugTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            last_print_time: 0.0,
        }
    }

    /// True once per `interval` of elapsed time.
    pub fn tick(&mut self, current_time: f32) -> bool {
        if current_time - self.last_print_time > self.interval {
            self.last_print_time = current_time;
            return true;
        }
        false
    }
}

pub fn debug_system(world: Res<ZoneWorld>, time: Res<Time>, mut debug_timer: ResMut<DebugTimer>) {
    if !debug_timer.tick(time.elapsed_secs()) {
        return;
    }
    let summary = world.summary();
    debug!(
        players = summary.players,
        enemies = summary.enemies,
        projectiles = summary.projectiles,
        bodies = summary.bodies,
        pending_respawns = summary.pending_respawns,
        server_time = time.elapsed_secs(),
        "zone state"
    );
    for player in world.players() {
        debug!(
            uuid = %player.uuid,
            x = player.position.x,
            y = player.position.y,
            dx = player.velocity.x,
            dy = player.velocity.y,
            hp = player.hp(),
            "player"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_fires_once_per_interval() {
        let mut timer = DebugTimer::new(1.0);
        assert!(!timer.tick(0.5));
        assert!(timer.tick(1.1));
        assert!(!timer.tick(1.5));
        assert!(timer.tick(2.2));
    }
}
