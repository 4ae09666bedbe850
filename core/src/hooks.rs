//! Narrow interfaces to collaborators living outside the encounter core.
//!
//! Every call is fire-and-forget. The orchestrator holds each collaborator as
//! an optional boxed trait object; an absent collaborator turns the matching
//! calls into no-ops.

use std::time::Duration;

use glam::Vec2;

use crate::{Facing, PlayerState};

/// Cue flashed on the health bar when goal gaslighting fakes feedback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HealthCue {
    /// A hit that was silently discarded.
    FakeMiss,
    /// Displayed health dropped without real damage.
    FakeDamage,
    /// Displayed health rose without real healing.
    FakeHeal,
}

/// Single projectile fired by the boss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    /// Spawn position.
    pub origin: Vec2,
    /// Normalized travel direction.
    pub direction: Vec2,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Damage dealt to the player on contact.
    pub damage: f32,
}

/// Instant radial burst around the boss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaBurst {
    /// Burst center.
    pub center: Vec2,
    /// Burst radius in world units.
    pub radius: f32,
    /// Damage dealt to the player inside the radius.
    pub damage: f32,
}

/// Player avatar interface.
pub trait PlayerHooks {
    /// Current position, facing and horizontal velocity of the player.
    fn state(&self) -> PlayerState;

    /// Forces the player to face the provided direction.
    fn set_forced_facing(&mut self, facing: Facing);

    /// Stops the player from reacting to input.
    fn disable_input(&mut self);

    /// Restores normal input handling.
    fn restore_input(&mut self);

    /// Plays a brief appearance glitch on the avatar.
    fn glitch_appearance(&mut self, duration: Duration);

    /// Notifies progress tracking that the boss was beaten.
    fn boss_beaten(&mut self);
}

/// Heads-up display interface.
pub trait HudHooks {
    /// Redraws the health bar at `fraction`; `honest` is false while the value may be fake.
    fn update_health_bar(&mut self, fraction: f32, honest: bool);

    /// Shows a dialog line for `duration`.
    fn show_dialog(&mut self, text: &str, duration: Duration);

    /// Shows a debug-style system message for `duration`.
    fn show_debug_message(&mut self, text: &str, duration: Duration);

    /// Flashes a visual cue on the health bar.
    fn flash_health_bar(&mut self, cue: HealthCue) {
        let _ = cue;
    }
}

/// Exit door interface.
pub trait ExitHooks {
    /// Unlocks the exit once the boss has been defeated.
    fn enable_exit(&mut self);
}

/// Boss animator interface.
pub trait AnimatorHooks {
    /// Fires a one-shot trigger.
    fn trigger(&mut self, name: &str);

    /// Sets a boolean parameter.
    fn set_bool(&mut self, name: &str, value: bool);

    /// Sets a float parameter.
    fn set_float(&mut self, name: &str, value: f32);
}

/// Arena interface used for direct damage attacks.
pub trait ArenaHooks {
    /// Spawns a projectile.
    fn spawn_projectile(&mut self, projectile: Projectile);

    /// Detonates an area burst.
    fn area_burst(&mut self, burst: AreaBurst);
}
