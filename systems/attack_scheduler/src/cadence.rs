use std::time::Duration;

use boss_room_core::{seconds, Phase, Span};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Volley of projectiles fired in quick succession.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Volley {
    /// Number of projectiles in the volley.
    pub count: u32,
    /// Delay between consecutive projectiles.
    pub spacing: Duration,
    /// Travel speed of each projectile.
    pub speed: f32,
    /// Damage dealt by each projectile.
    pub damage: f32,
}

/// Timing and shape of the ambient projectile fire.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceTuning {
    /// Seconds between volleys in phase one.
    pub phase1_interval: Span,
    /// Projectiles per volley in phase one.
    pub phase1_count: u32,
    /// Projectile speed in phase one.
    pub phase1_speed: f32,
    /// Seconds between volleys in phase two.
    pub phase2_interval: Span,
    /// Projectiles per volley in phase two.
    pub phase2_count: u32,
    /// Projectile speed in phase two.
    pub phase2_speed: f32,
    /// Seconds between projectiles inside a phase two volley.
    pub phase2_spacing_secs: f32,
    /// Damage dealt by each projectile.
    pub projectile_damage: f32,
}

impl Default for CadenceTuning {
    fn default() -> Self {
        Self {
            phase1_interval: Span::new(2.2, 3.2),
            phase1_count: 1,
            phase1_speed: 6.0,
            phase2_interval: Span::new(1.0, 1.6),
            phase2_count: 3,
            phase2_speed: 9.0,
            phase2_spacing_secs: 0.15,
            projectile_damage: 1.0,
        }
    }
}

impl CadenceTuning {
    /// Volley shape used in `phase`.
    #[must_use]
    pub fn volley(&self, phase: Phase) -> Volley {
        match phase {
            Phase::Phase2 => Volley {
                count: self.phase2_count,
                spacing: seconds(self.phase2_spacing_secs),
                speed: self.phase2_speed,
                damage: self.projectile_damage,
            },
            Phase::Phase1 | Phase::Defeated => Volley {
                count: self.phase1_count,
                spacing: Duration::ZERO,
                speed: self.phase1_speed,
                damage: self.projectile_damage,
            },
        }
    }
}

/// Fires ambient projectile volleys independently of scheduled attacks.
#[derive(Debug)]
pub struct ProjectileCadence {
    tuning: CadenceTuning,
    next_volley_at: Duration,
    rng: ChaCha8Rng,
}

impl ProjectileCadence {
    /// Creates a cadence whose first volley is scheduled on [`Self::reset`].
    #[must_use]
    pub fn new(tuning: CadenceTuning, seed: u64) -> Self {
        Self {
            tuning,
            next_volley_at: Duration::MAX,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Schedules the first volley of a fresh fight.
    pub fn reset(&mut self, now: Duration) {
        self.schedule(now, Phase::Phase1);
    }

    /// Clock value at which the next volley fires.
    #[must_use]
    pub const fn next_volley_at(&self) -> Duration {
        self.next_volley_at
    }

    /// Returns a volley when one is due in `phase`.
    pub fn maybe_fire(&mut self, now: Duration, phase: Phase) -> Option<Volley> {
        if phase == Phase::Defeated || now < self.next_volley_at {
            return None;
        }
        self.schedule(now, phase);
        let volley = self.tuning.volley(phase);
        (volley.count > 0).then_some(volley)
    }

    fn schedule(&mut self, now: Duration, phase: Phase) {
        let interval = match phase {
            Phase::Phase2 => self.tuning.phase2_interval,
            Phase::Phase1 | Phase::Defeated => self.tuning.phase1_interval,
        };
        self.next_volley_at = now.saturating_add(interval.sample_duration(&mut self.rng));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_two_volleys_are_denser() {
        let mut cadence = ProjectileCadence::new(CadenceTuning::default(), 3);
        cadence.reset(Duration::ZERO);
        assert!(cadence.next_volley_at() >= Duration::from_millis(2_200));

        let now = Duration::from_secs(10);
        let volley = cadence
            .maybe_fire(now, Phase::Phase2)
            .expect("volley due after interval");
        assert_eq!(volley.count, 3);
        assert_eq!(volley.speed, 9.0);
        let gap = cadence.next_volley_at() - now;
        assert!(gap >= Duration::from_secs(1) && gap < Duration::from_millis(1_600));
    }

    #[test]
    fn defeated_fight_fires_nothing() {
        let mut cadence = ProjectileCadence::new(CadenceTuning::default(), 3);
        cadence.reset(Duration::ZERO);
        assert!(cadence
            .maybe_fire(Duration::from_secs(60), Phase::Defeated)
            .is_none());
    }
}
