#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative fight state for the Boss Room encounter.
//!
//! The world owns the phase machine, the fight clock and the dual health
//! record. All mutations flow through [`apply`]; reads go through [`query`].

mod health;

use std::time::Duration;

use boss_room_core::{seconds, Command, Event, Phase, PhaseCause};
use serde::{Deserialize, Serialize};

use crate::health::HealthState;

/// Timing and health rules governing a single fight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FightRules {
    /// Maximum and starting health of the boss.
    pub max_health: f32,
    /// Elapsed seconds after which phase two begins regardless of health.
    pub phase1_duration_secs: f32,
    /// Elapsed seconds after which the boss is forcibly defeated.
    pub total_fight_duration_secs: f32,
    /// Seconds between escalation steps; zero disables escalation.
    pub escalation_interval_secs: f32,
    /// Fraction of maximum health at or below which phase two begins.
    pub phase2_health_fraction: f32,
}

impl Default for FightRules {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            phase1_duration_secs: 150.0,
            total_fight_duration_secs: 420.0,
            escalation_interval_secs: 30.0,
            phase2_health_fraction: 0.6,
        }
    }
}

impl FightRules {
    /// Returns a copy with every field forced into a usable range.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        let total = positive(
            self.total_fight_duration_secs,
            defaults.total_fight_duration_secs,
        );
        Self {
            max_health: positive(self.max_health, defaults.max_health),
            phase1_duration_secs: positive(self.phase1_duration_secs, defaults.phase1_duration_secs)
                .min(total),
            total_fight_duration_secs: total,
            escalation_interval_secs: if self.escalation_interval_secs.is_finite() {
                self.escalation_interval_secs.max(0.0)
            } else {
                defaults.escalation_interval_secs
            },
            phase2_health_fraction: if self.phase2_health_fraction.is_finite() {
                self.phase2_health_fraction.clamp(0.0, 1.0)
            } else {
                defaults.phase2_health_fraction
            },
        }
    }

    fn phase1_duration(&self) -> Duration {
        seconds(self.phase1_duration_secs)
    }

    fn total_duration(&self) -> Duration {
        seconds(self.total_fight_duration_secs)
    }

    fn escalation_interval(&self) -> Duration {
        seconds(self.escalation_interval_secs)
    }
}

#[derive(Clone, Copy, Debug)]
struct FightState {
    phase: Phase,
    elapsed: Duration,
    next_escalation: Duration,
    escalation_level: u32,
    active: bool,
}

impl FightState {
    fn idle() -> Self {
        Self {
            phase: Phase::Phase1,
            elapsed: Duration::ZERO,
            next_escalation: Duration::ZERO,
            escalation_level: 0,
            active: false,
        }
    }

    fn started(rules: &FightRules) -> Self {
        Self {
            phase: Phase::Phase1,
            elapsed: Duration::ZERO,
            next_escalation: rules.escalation_interval(),
            escalation_level: 0,
            active: true,
        }
    }
}

/// Represents the authoritative state of one boss encounter.
#[derive(Debug)]
pub struct World {
    rules: FightRules,
    fight: FightState,
    health: HealthState,
}

impl World {
    /// Creates an idle world governed by `rules`.
    #[must_use]
    pub fn new(rules: FightRules) -> Self {
        let rules = rules.sanitized();
        Self {
            rules,
            fight: FightState::idle(),
            health: HealthState::full(rules.max_health),
        }
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.fight.elapsed = self.fight.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced {
            dt,
            elapsed: self.fight.elapsed,
        });

        let interval = self.rules.escalation_interval();
        if interval.is_zero() {
            return;
        }
        while self.fight.elapsed >= self.fight.next_escalation {
            self.fight.escalation_level = self.fight.escalation_level.saturating_add(1);
            self.fight.next_escalation = self.fight.next_escalation.saturating_add(interval);
            out_events.push(Event::EscalationDue {
                level: self.fight.escalation_level,
            });
        }
    }

    fn check_time_limits(&mut self, out_events: &mut Vec<Event>) {
        if self.fight.elapsed >= self.rules.total_duration() {
            self.health.deplete();
            self.transition(Phase::Defeated, PhaseCause::SafetyTimeout, out_events);
            return;
        }
        if self.fight.phase == Phase::Phase1 && self.fight.elapsed >= self.rules.phase1_duration()
        {
            self.transition(Phase::Phase2, PhaseCause::TimeLimit, out_events);
        }
        self.check_health(out_events);
    }

    fn check_health(&mut self, out_events: &mut Vec<Event>) {
        if self.health.real() <= 0.0 {
            self.health.deplete();
            self.transition(Phase::Defeated, PhaseCause::HealthDepleted, out_events);
        } else if self.fight.phase == Phase::Phase1
            && self.health.real() <= self.health.max() * self.rules.phase2_health_fraction
        {
            self.transition(Phase::Phase2, PhaseCause::HealthThreshold, out_events);
        }
    }

    fn transition(&mut self, to: Phase, cause: PhaseCause, out_events: &mut Vec<Event>) {
        let from = self.fight.phase;
        if to <= from {
            return;
        }
        self.fight.phase = to;
        if to == Phase::Defeated {
            self.fight.active = false;
        }
        out_events.push(Event::PhaseChanged { from, to, cause });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(FightRules::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartFight => {
            world.fight = FightState::started(&world.rules);
            world.health = HealthState::full(world.rules.max_health);
            out_events.push(Event::FightStarted {
                max_health: world.health.max(),
            });
        }
        Command::Tick { dt } => {
            if !world.fight.active {
                return;
            }
            world.advance_clock(dt, out_events);
            world.check_time_limits(out_events);
        }
        Command::ApplyDamage { amount } => {
            if !world.fight.active {
                out_events.push(Event::DamageIgnored { requested: amount });
                return;
            }
            let applied = world.health.apply_damage(amount);
            out_events.push(Event::DamageApplied {
                requested: amount,
                applied,
                remaining: world.health.real(),
            });
            world.check_health(out_events);
        }
        Command::SetDisplayedHealth { value } => world.health.set_displayed(value),
        Command::NudgeDisplayedHealth { delta } => world.health.nudge_displayed(delta),
        Command::StopFight => {
            if world.fight.active {
                world.fight.active = false;
                out_events.push(Event::FightStopped);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use boss_room_core::{FightSnapshot, HealthSnapshot, Phase};

    use super::{FightRules, World};

    /// Captures the fight progress record.
    #[must_use]
    pub fn fight(world: &World) -> FightSnapshot {
        FightSnapshot::new(
            world.fight.phase,
            world.fight.elapsed,
            world.fight.next_escalation,
            world.fight.escalation_level,
            world.fight.active,
        )
    }

    /// Current phase of the fight.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.fight.phase
    }

    /// Reports whether a fight is running.
    #[must_use]
    pub fn is_active(world: &World) -> bool {
        world.fight.active
    }

    /// Fight time elapsed since the last start.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.fight.elapsed
    }

    /// Captures the dual health record.
    #[must_use]
    pub fn health(world: &World) -> HealthSnapshot {
        world.health.snapshot()
    }

    /// Rules the world was created with, after sanitization.
    #[must_use]
    pub fn rules(world: &World) -> &FightRules {
        &world.rules
    }
}
