//! Fight configuration loaded from TOML.

use std::{
    fs,
    path::{Path, PathBuf},
};

use boss_room_core::Span;
use boss_room_system_attack_scheduler::{AttackPool, AttackTuning, CadenceTuning};
use boss_room_system_bug_intensity::IntensityTuning;
use boss_room_system_goal_gaslighting::GaslightTuning;
use boss_room_system_input_desync::DesyncTuning;
use boss_room_world::FightRules;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`FightConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration text is not valid TOML for this schema.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
}

/// Knobs owned by the orchestrator itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorTuning {
    /// Boss movement speed at fight start, in units per second.
    pub base_move_speed: f32,
    /// Speed added on every escalation step.
    pub escalation_speed_step: f32,
    /// Intensity added on every escalation step.
    pub escalation_intensity_step: f32,
    /// Minimum speed multiplier applied once phase two settles.
    pub phase2_speed_factor: f32,
    /// Seconds the update announcement stays on screen.
    pub phase2_announce_secs: f32,
    /// Seconds attacks stay suspended while the update installs.
    pub phase2_pause_secs: f32,
    /// Seconds the completion message stays on screen.
    pub phase2_complete_secs: f32,
    /// Chance per second of picking a new destination while idle.
    pub retarget_rate: f32,
    /// Distance under which the boss counts as arrived.
    pub arrive_distance: f32,
    /// Distance kept from the player when no anchor is configured.
    pub player_offset: Span,
    /// Fixed destinations the boss prefers over player-relative ones.
    pub anchors: Vec<[f32; 2]>,
    /// Boss position at fight start.
    pub boss_start: [f32; 2],
    /// Seconds between player glitch rolls in phase two.
    pub glitch_interval: Span,
    /// Chance that a glitch roll succeeds.
    pub glitch_chance: f32,
    /// Seconds a player glitch lasts.
    pub glitch_duration: Span,
    /// Window length of a randomly triggered collision paradox.
    pub collision_bug_secs: f32,
    /// Window length range of a randomly triggered input desync.
    pub input_bug: Span,
}

impl Default for OrchestratorTuning {
    fn default() -> Self {
        Self {
            base_move_speed: 2.5,
            escalation_speed_step: 0.08,
            escalation_intensity_step: 0.1,
            phase2_speed_factor: 1.15,
            phase2_announce_secs: 2.5,
            phase2_pause_secs: 2.1,
            phase2_complete_secs: 1.7,
            retarget_rate: 0.12,
            arrive_distance: 0.5,
            player_offset: Span::new(3.0, 6.0),
            anchors: Vec::new(),
            boss_start: [0.0, 0.0],
            glitch_interval: Span::new(3.0, 6.0),
            glitch_chance: 0.35,
            glitch_duration: Span::new(0.8, 1.8),
            collision_bug_secs: 5.0,
            input_bug: Span::new(0.3, 1.5),
        }
    }
}

/// Complete configuration of one encounter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FightConfig {
    /// Seed every subsystem stream is derived from.
    pub seed: u64,
    /// Phase timing and health rules.
    pub fight: FightRules,
    /// Attack scheduling.
    pub attacks: AttackTuning,
    /// Ambient projectile fire.
    pub cadence: CadenceTuning,
    /// Random-bug trigger.
    pub intensity: IntensityTuning,
    /// Input desync.
    pub desync: DesyncTuning,
    /// Goal gaslighting.
    pub gaslighting: GaslightTuning,
    /// Orchestrator behaviour.
    pub orchestrator: OrchestratorTuning,
}

impl FightConfig {
    /// Parses a configuration from TOML text. Missing tables and keys take
    /// their default values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Returns a copy with unusable values replaced, logging each correction.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let rules = self.fight.sanitized();
        if rules != self.fight {
            tracing::warn!(target: "boss_room::config", ?rules, "fight rules corrected");
            self.fight = rules;
        }

        let attacks = &mut self.attacks;
        fix_span("attacks.base_interval", &mut attacks.base_interval);
        fix_span("attacks.phase2_jitter", &mut attacks.phase2_jitter);
        fix_span("attacks.chain_delay", &mut attacks.chain_delay);
        fix_positive("attacks.escalation_factor", &mut attacks.escalation_factor, 0.92);
        check_pool("attacks.phase1_pool", &attacks.phase1_pool);
        check_pool("attacks.phase2_pool", &attacks.phase2_pool);

        fix_span("cadence.phase1_interval", &mut self.cadence.phase1_interval);
        fix_span("cadence.phase2_interval", &mut self.cadence.phase2_interval);

        let defaults = IntensityTuning::default();
        fix_positive(
            "intensity.mild_interval_secs",
            &mut self.intensity.mild_interval_secs,
            defaults.mild_interval_secs,
        );
        fix_positive(
            "intensity.aggressive_interval_secs",
            &mut self.intensity.aggressive_interval_secs,
            defaults.aggressive_interval_secs,
        );

        fix_span("desync.action_delay", &mut self.desync.action_delay);
        fix_span("gaslighting.event_interval", &mut self.gaslighting.event_interval);

        let orchestrator = &mut self.orchestrator;
        let defaults = OrchestratorTuning::default();
        fix_positive(
            "orchestrator.base_move_speed",
            &mut orchestrator.base_move_speed,
            defaults.base_move_speed,
        );
        fix_positive(
            "orchestrator.arrive_distance",
            &mut orchestrator.arrive_distance,
            defaults.arrive_distance,
        );
        fix_span("orchestrator.player_offset", &mut orchestrator.player_offset);
        fix_span("orchestrator.glitch_interval", &mut orchestrator.glitch_interval);
        fix_span("orchestrator.glitch_duration", &mut orchestrator.glitch_duration);
        fix_span("orchestrator.input_bug", &mut orchestrator.input_bug);
        self
    }
}

fn fix_span(field: &'static str, span: &mut Span) {
    let mut fixed = span.sanitized();
    fixed.min = fixed.min.max(0.0);
    fixed.max = fixed.max.max(fixed.min);
    if fixed != *span {
        tracing::warn!(target: "boss_room::config", field, ?fixed, "range corrected");
        *span = fixed;
    }
}

fn fix_positive(field: &'static str, value: &mut f32, fallback: f32) {
    if !value.is_finite() || *value <= 0.0 {
        tracing::warn!(
            target: "boss_room::config",
            field,
            value = *value,
            fallback,
            "value corrected"
        );
        *value = fallback;
    }
}

fn check_pool(field: &'static str, pool: &AttackPool) {
    if pool.is_empty() {
        tracing::warn!(
            target: "boss_room::config",
            field,
            "attack pool is empty; this phase fires no attacks"
        );
    } else if pool.total_weight() == 0 {
        tracing::warn!(
            target: "boss_room::config",
            field,
            "attack pool has no weight; the first entry always fires"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_ranges_are_reordered() {
        let mut config = FightConfig::default();
        config.attacks.base_interval = Span::new(5.0, 2.5);
        config.orchestrator.glitch_interval = Span::new(-2.0, 1.0);
        let config = config.sanitized();
        assert_eq!(config.attacks.base_interval, Span::new(2.5, 5.0));
        assert_eq!(config.orchestrator.glitch_interval, Span::new(0.0, 1.0));
    }

    #[test]
    fn defaults_survive_sanitizing() {
        assert_eq!(FightConfig::default().sanitized(), FightConfig::default());
    }
}
