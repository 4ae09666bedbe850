#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted attack scheduling for the boss.
//!
//! The scheduler owns the attack interval bounds, which escalation and the
//! phase two entry tighten, and decides at most one attack per call. Each
//! fired attack carries the window it should open, an optional chained
//! micro-desync and an optional paired direct strike.

mod cadence;
mod pool;

use std::time::Duration;

use boss_room_core::{seconds, AttackKind, Phase, Span};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub use crate::cadence::{CadenceTuning, ProjectileCadence, Volley};
pub use crate::pool::{AttackPool, PoolEntry};

/// Window length ranges, in seconds, for each windowed attack.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackWindows {
    /// Collision paradox window.
    pub collision_paradox: Span,
    /// Input delay window.
    pub input_desync: Span,
    /// Goal gaslighting window.
    pub goal_gaslight: Span,
    /// UI shuffle window.
    pub ui_shuffle: Span,
    /// Lifetime hint for fake popups.
    pub fake_popup: Span,
    /// Control swap window.
    pub control_swap: Span,
}

impl Default for AttackWindows {
    fn default() -> Self {
        Self {
            collision_paradox: Span::new(4.0, 8.0),
            input_desync: Span::new(0.6, 2.2),
            goal_gaslight: Span::new(3.0, 6.0),
            ui_shuffle: Span::new(5.0, 9.0),
            fake_popup: Span::new(4.0, 8.0),
            control_swap: Span::new(6.0, 12.0),
        }
    }
}

impl AttackWindows {
    fn for_kind(&self, kind: AttackKind) -> Option<Span> {
        match kind {
            AttackKind::CollisionParadox => Some(self.collision_paradox),
            AttackKind::InputDesync => Some(self.input_desync),
            AttackKind::GoalGaslight => Some(self.goal_gaslight),
            AttackKind::UiShuffle => Some(self.ui_shuffle),
            AttackKind::FakePopup => Some(self.fake_popup),
            AttackKind::ControlSwap => Some(self.control_swap),
            AttackKind::ProjectileBurst | AttackKind::AreaBurst => None,
        }
    }
}

/// Every adjustable knob of the attack scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackTuning {
    /// Starting bounds, in seconds, of the interval between attacks.
    pub base_interval: Span,
    /// Multiplier applied to both bounds on every escalation.
    pub escalation_factor: f32,
    /// Lowest value escalation may push the lower bound to.
    pub min_interval_floor: f32,
    /// Lowest value escalation may push the upper bound to.
    pub max_interval_floor: f32,
    /// Multiplier applied to the base bounds on phase two entry.
    pub phase2_interval_factor: f32,
    /// Floor of the phase two lower bound.
    pub phase2_min_floor: f32,
    /// Floor of the phase two upper bound.
    pub phase2_max_floor: f32,
    /// Extra multiplier drawn per attack in phase two.
    pub phase2_jitter: Span,
    /// Attacks available in phase one.
    pub phase1_pool: AttackPool,
    /// Attacks available in phase two.
    pub phase2_pool: AttackPool,
    /// Chance of a paired direct strike in phase one.
    pub phase1_pairing_chance: f32,
    /// Chance of a paired direct strike in phase two.
    pub phase2_pairing_chance: f32,
    /// Share of paired strikes that are single projectiles rather than area bursts.
    pub pairing_projectile_share: f32,
    /// Chance that a collision paradox chains a micro-desync in phase one.
    pub phase1_chain_chance: f32,
    /// Chance that a collision paradox chains a micro-desync in phase two.
    pub phase2_chain_chance: f32,
    /// Delay, in seconds, before the chained micro-desync.
    pub chain_delay: Span,
    /// Length, in seconds, of the chained micro-desync.
    pub micro_desync_secs: f32,
    /// Window lengths per attack.
    pub windows: AttackWindows,
    /// Projectiles in a projectile burst attack.
    pub burst_count: u32,
    /// Seconds between projectiles in a burst attack.
    pub burst_spacing_secs: f32,
    /// Speed of attack projectiles.
    pub burst_speed: f32,
    /// Damage of attack projectiles.
    pub projectile_damage: f32,
    /// Radius of the area burst.
    pub area_radius: f32,
    /// Damage of the area burst.
    pub area_damage: f32,
}

impl Default for AttackTuning {
    fn default() -> Self {
        Self {
            base_interval: Span::new(2.5, 5.0),
            escalation_factor: 0.92,
            min_interval_floor: 0.6,
            max_interval_floor: 1.1,
            phase2_interval_factor: 0.8,
            phase2_min_floor: 0.9,
            phase2_max_floor: 1.5,
            phase2_jitter: Span::new(0.7, 0.95),
            phase1_pool: AttackPool::phase1(),
            phase2_pool: AttackPool::phase2(),
            phase1_pairing_chance: 0.4,
            phase2_pairing_chance: 0.7,
            pairing_projectile_share: 0.6,
            phase1_chain_chance: 0.25,
            phase2_chain_chance: 0.6,
            chain_delay: Span::new(0.5, 1.2),
            micro_desync_secs: 0.4,
            windows: AttackWindows::default(),
            burst_count: 3,
            burst_spacing_secs: 0.12,
            burst_speed: 7.0,
            projectile_damage: 1.0,
            area_radius: 3.0,
            area_damage: 4.0,
        }
    }
}

impl AttackTuning {
    /// Shape of a projectile burst attack.
    #[must_use]
    pub fn burst(&self) -> Volley {
        Volley {
            count: self.burst_count,
            spacing: seconds(self.burst_spacing_secs),
            speed: self.burst_speed,
            damage: self.projectile_damage,
        }
    }

    fn pool(&self, phase: Phase) -> &AttackPool {
        match phase {
            Phase::Phase2 => &self.phase2_pool,
            Phase::Phase1 | Phase::Defeated => &self.phase1_pool,
        }
    }
}

/// Input micro-desync chained after a collision paradox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainedDesync {
    /// Delay after the primary attack.
    pub delay: Duration,
    /// Length of the desync window.
    pub duration: Duration,
}

/// Direct strike paired with a primary attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairedStrike {
    /// One projectile aimed at the player.
    Projectile,
    /// An area burst around the boss.
    AreaBurst,
}

/// Attack decided by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiredAttack {
    /// Attack selected from the phase pool.
    pub kind: AttackKind,
    /// Window the attack opens; zero for direct strikes.
    pub window: Duration,
    /// Optional chained micro-desync.
    pub chain: Option<ChainedDesync>,
    /// Optional paired direct strike.
    pub pairing: Option<PairedStrike>,
}

/// Decides when the boss attacks and with what.
#[derive(Debug)]
pub struct AttackScheduler {
    tuning: AttackTuning,
    min_interval: f32,
    max_interval: f32,
    next_attack_at: Duration,
    rng: ChaCha8Rng,
}

impl AttackScheduler {
    /// Creates a scheduler; the first attack is scheduled on [`Self::reset`].
    #[must_use]
    pub fn new(tuning: AttackTuning, seed: u64) -> Self {
        let base = tuning.base_interval.sanitized();
        Self {
            tuning,
            min_interval: base.min,
            max_interval: base.max,
            next_attack_at: Duration::MAX,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Tuning the scheduler was created with.
    #[must_use]
    pub fn tuning(&self) -> &AttackTuning {
        &self.tuning
    }

    /// Restores base intervals and schedules the first attack after `now`.
    pub fn reset(&mut self, now: Duration) {
        let base = self.tuning.base_interval.sanitized();
        self.min_interval = base.min;
        self.max_interval = base.max;
        self.schedule(now, Phase::Phase1);
    }

    /// Reschedules the next attack from `now` using the current bounds.
    pub fn reschedule(&mut self, now: Duration, phase: Phase) {
        self.schedule(now, phase);
    }

    /// Current `(min, max)` interval bounds in seconds.
    #[must_use]
    pub const fn intervals(&self) -> (f32, f32) {
        (self.min_interval, self.max_interval)
    }

    /// Clock value at which the next attack fires.
    #[must_use]
    pub const fn next_attack_at(&self) -> Duration {
        self.next_attack_at
    }

    /// Fires at most one attack when `now` reached the scheduled time.
    pub fn maybe_fire(&mut self, now: Duration, phase: Phase) -> Option<FiredAttack> {
        if phase == Phase::Defeated || now < self.next_attack_at {
            return None;
        }
        self.schedule(now, phase);

        let kind = self.tuning.pool(phase).draw(&mut self.rng)?;
        let window = self
            .tuning
            .windows
            .for_kind(kind)
            .map_or(Duration::ZERO, |span| span.sample_duration(&mut self.rng));
        let chain = self.roll_chain(kind, phase);
        let pairing = self.roll_pairing(phase);

        tracing::debug!(
            target: "boss_room::attacks",
            ?kind,
            ?phase,
            window_ms = window.as_millis() as u64,
            chained = chain.is_some(),
            paired = ?pairing,
            "attack fired"
        );

        Some(FiredAttack {
            kind,
            window,
            chain,
            pairing,
        })
    }

    /// Tightens both interval bounds by the escalation factor, never below the floors.
    pub fn escalate(&mut self) {
        let factor = self.tuning.escalation_factor;
        self.min_interval = (self.min_interval * factor).max(self.tuning.min_interval_floor);
        self.max_interval = (self.max_interval * factor)
            .max(self.tuning.max_interval_floor)
            .max(self.min_interval);
    }

    /// Applies the phase two interval set. Bounds only ever tighten.
    pub fn apply_phase2(&mut self) {
        let base = self.tuning.base_interval.sanitized();
        let factor = self.tuning.phase2_interval_factor;
        let target_min = (base.min * factor).max(self.tuning.phase2_min_floor);
        let target_max = (base.max * factor).max(self.tuning.phase2_max_floor);
        self.min_interval = self.min_interval.min(target_min);
        self.max_interval = self.max_interval.min(target_max).max(self.min_interval);
    }

    fn schedule(&mut self, now: Duration, phase: Phase) {
        let mut delay = Span::new(self.min_interval, self.max_interval).sample(&mut self.rng);
        if phase == Phase::Phase2 {
            delay *= self.tuning.phase2_jitter.sample(&mut self.rng);
        }
        self.next_attack_at = now.saturating_add(seconds(delay));
    }

    fn roll_chain(&mut self, kind: AttackKind, phase: Phase) -> Option<ChainedDesync> {
        if kind != AttackKind::CollisionParadox {
            return None;
        }
        let chance = match phase {
            Phase::Phase2 => self.tuning.phase2_chain_chance,
            Phase::Phase1 | Phase::Defeated => self.tuning.phase1_chain_chance,
        };
        roll(&mut self.rng, chance).then(|| ChainedDesync {
            delay: self.tuning.chain_delay.sample_duration(&mut self.rng),
            duration: seconds(self.tuning.micro_desync_secs),
        })
    }

    fn roll_pairing(&mut self, phase: Phase) -> Option<PairedStrike> {
        let chance = match phase {
            Phase::Phase2 => self.tuning.phase2_pairing_chance,
            Phase::Phase1 | Phase::Defeated => self.tuning.phase1_pairing_chance,
        };
        if !roll(&mut self.rng, chance) {
            return None;
        }
        if roll(&mut self.rng, self.tuning.pairing_projectile_share) {
            Some(PairedStrike::Projectile)
        } else {
            Some(PairedStrike::AreaBurst)
        }
    }
}

fn roll(rng: &mut ChaCha8Rng, chance: f32) -> bool {
    rng.gen::<f32>() < chance
}
