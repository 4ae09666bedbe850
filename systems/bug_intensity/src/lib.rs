#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bug intensity controller and periodic random-bug trigger.
//!
//! Intensity is a single continuous value with an explicit pause flag; the
//! tier is always derived from it. While not paused, the controller rolls for
//! a random deception every interpolated interval and reports at most one
//! subsystem to activate.

use std::time::Duration;

use boss_room_core::{lerp, seconds, DeceptionKind, IntensityState, IntensityTier};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Adjustable knobs of the intensity controller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntensityTuning {
    /// Seconds between random-bug rolls at intensity zero.
    pub mild_interval_secs: f32,
    /// Seconds between random-bug rolls at intensity one.
    pub aggressive_interval_secs: f32,
    /// Chance that a roll includes a collision paradox.
    pub collision_chance: f32,
    /// Chance that a roll includes an input desync.
    pub input_chance: f32,
    /// Chance that a roll includes goal gaslighting.
    pub gaslight_chance: f32,
    /// Chance that a roll includes a UI bug; only rolled in the aggressive tier.
    pub ui_chance: f32,
}

impl Default for IntensityTuning {
    fn default() -> Self {
        Self {
            mild_interval_secs: 5.0,
            aggressive_interval_secs: 2.0,
            collision_chance: 0.3,
            input_chance: 0.4,
            gaslight_chance: 0.5,
            ui_chance: 0.2,
        }
    }
}

/// Counts of random bugs triggered per subsystem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BugStats {
    /// Collision paradox activations.
    pub collision: u32,
    /// Input desync activations.
    pub input_desync: u32,
    /// Goal gaslighting activations.
    pub gaslight: u32,
    /// UI betrayal activations.
    pub ui_betrayal: u32,
}

impl BugStats {
    /// Total activations across every subsystem.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.collision
            .saturating_add(self.input_desync)
            .saturating_add(self.gaslight)
            .saturating_add(self.ui_betrayal)
    }

    /// Activations of `kind`.
    #[must_use]
    pub const fn count(&self, kind: DeceptionKind) -> u32 {
        match kind {
            DeceptionKind::Collision => self.collision,
            DeceptionKind::InputDesync => self.input_desync,
            DeceptionKind::Gaslight => self.gaslight,
            DeceptionKind::UiBetrayal => self.ui_betrayal,
        }
    }

    fn record(&mut self, kind: DeceptionKind) {
        let slot = match kind {
            DeceptionKind::Collision => &mut self.collision,
            DeceptionKind::InputDesync => &mut self.input_desync,
            DeceptionKind::Gaslight => &mut self.gaslight,
            DeceptionKind::UiBetrayal => &mut self.ui_betrayal,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Owns the intensity state and drives the periodic random-bug trigger.
#[derive(Debug)]
pub struct BugIntensity {
    tuning: IntensityTuning,
    state: IntensityState,
    since_last_roll: Duration,
    rng: ChaCha8Rng,
    stats: BugStats,
}

impl BugIntensity {
    /// Creates a controller at mild intensity.
    #[must_use]
    pub fn new(tuning: IntensityTuning, seed: u64) -> Self {
        Self {
            tuning,
            state: IntensityState::default(),
            since_last_roll: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(seed),
            stats: BugStats::default(),
        }
    }

    /// Current intensity state.
    #[must_use]
    pub const fn state(&self) -> IntensityState {
        self.state
    }

    /// Tier derived from the current state.
    #[must_use]
    pub fn tier(&self) -> IntensityTier {
        self.state.tier()
    }

    /// Counts of triggered random bugs.
    #[must_use]
    pub const fn stats(&self) -> BugStats {
        self.stats
    }

    /// Snaps intensity to the tier's canonical value. Returns the new tier.
    pub fn set_tier(&mut self, tier: IntensityTier) -> IntensityTier {
        match tier {
            IntensityTier::Mild => self.state = IntensityState::new(0.0, false),
            IntensityTier::Aggressive => self.state = IntensityState::new(1.0, false),
            IntensityTier::Paused => self.pause(),
        }
        tracing::info!(
            target: "boss_room::intensity",
            value = self.state.value(),
            tier = ?self.tier(),
            "intensity tier set"
        );
        self.tier()
    }

    /// Raises intensity by `delta`, clamped to `[0, 1]`. Returns the new tier
    /// when the derived tier changed.
    pub fn increase_by(&mut self, delta: f32) -> Option<IntensityTier> {
        let before = self.tier();
        let delta = if delta.is_finite() { delta } else { 0.0 };
        self.state = self.state.with_value(self.state.value() + delta);
        let after = self.tier();
        tracing::debug!(
            target: "boss_room::intensity",
            value = self.state.value(),
            interval_ms = self.bug_interval().as_millis() as u64,
            "intensity increased"
        );
        (after != before).then_some(after)
    }

    /// Suspends the random-bug trigger.
    pub fn pause(&mut self) {
        self.state = self.state.with_paused(true);
        self.since_last_roll = Duration::ZERO;
    }

    /// Lifts a pause; the tier is derived from the retained value again.
    pub fn resume(&mut self) -> IntensityTier {
        self.state = self.state.with_paused(false);
        self.since_last_roll = Duration::ZERO;
        self.tier()
    }

    /// Interval between random-bug rolls at the current intensity.
    #[must_use]
    pub fn bug_interval(&self) -> Duration {
        seconds(lerp(
            self.tuning.mild_interval_secs,
            self.tuning.aggressive_interval_secs,
            self.state.value(),
        ))
    }

    /// Accumulates `dt` and, once the interval elapsed, rolls for a random bug.
    pub fn advance(&mut self, dt: Duration) -> Option<DeceptionKind> {
        if self.state.is_paused() {
            return None;
        }
        self.since_last_roll = self.since_last_roll.saturating_add(dt);
        let interval = self.bug_interval();
        if interval.is_zero() || self.since_last_roll < interval {
            return None;
        }
        self.since_last_roll = Duration::ZERO;

        let kind = self.roll()?;
        self.stats.record(kind);
        tracing::debug!(target: "boss_room::intensity", ?kind, "random bug triggered");
        Some(kind)
    }

    fn roll(&mut self) -> Option<DeceptionKind> {
        let aggressive = self.tier() == IntensityTier::Aggressive;
        let mut passing = Vec::with_capacity(DeceptionKind::ALL.len());
        for kind in DeceptionKind::ALL {
            let chance = match kind {
                DeceptionKind::Collision => self.tuning.collision_chance,
                DeceptionKind::InputDesync => self.tuning.input_chance,
                DeceptionKind::Gaslight => self.tuning.gaslight_chance,
                DeceptionKind::UiBetrayal if aggressive => self.tuning.ui_chance,
                DeceptionKind::UiBetrayal => continue,
            };
            if self.rng.gen::<f32>() < chance {
                passing.push(kind);
            }
        }
        if passing.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..passing.len());
        Some(passing[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_interpolates_with_value() {
        let mut intensity = BugIntensity::new(IntensityTuning::default(), 1);
        assert_eq!(intensity.bug_interval(), Duration::from_secs(5));
        let _ = intensity.increase_by(0.5);
        assert_eq!(intensity.bug_interval(), Duration::from_millis(3_500));
        let _ = intensity.set_tier(IntensityTier::Aggressive);
        assert_eq!(intensity.bug_interval(), Duration::from_secs(2));
    }

    #[test]
    fn mild_tier_never_rolls_ui_bugs() {
        let tuning = IntensityTuning {
            collision_chance: 0.0,
            input_chance: 0.0,
            gaslight_chance: 0.0,
            ui_chance: 1.0,
            ..IntensityTuning::default()
        };
        let mut intensity = BugIntensity::new(tuning, 2);
        for _ in 0..50 {
            assert_eq!(intensity.roll(), None);
        }
        let _ = intensity.set_tier(IntensityTier::Aggressive);
        assert_eq!(intensity.roll(), Some(DeceptionKind::UiBetrayal));
    }
}
