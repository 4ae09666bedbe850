use std::time::Duration;

use boss_room_system_defeat_sequencer::DefeatStep;

/// Deferred work carried by timeline tasks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Directive {
    /// Shows the phase two update announcement.
    AnnounceUpdate,
    /// Applies the phase two parameter set and resumes attacks.
    ApplyPhase2,
    /// Opens the micro-desync chained after a collision paradox.
    ChainDesync {
        /// Length of the desync window.
        duration: Duration,
    },
    /// Fires one projectile at the player.
    FireProjectile {
        /// Travel speed.
        speed: f32,
        /// Damage on contact.
        damage: f32,
    },
    /// Rolls for a player glitch and schedules the next roll.
    GlitchRoll,
    /// Executes one defeat step.
    Defeat(DefeatStep),
    /// Gives input back to the player after an interrupted defeat script.
    RestoreInput,
}
