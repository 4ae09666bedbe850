#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Goal gaslighting: lies about progress.
//!
//! While a window is open the subsystem may discard incoming hits, fake damage
//! or healing on the displayed health bar and move the correct hit marker.
//! Real health is never touched here; the orchestrator owns it and only asks
//! this subsystem whether a hit should count and what the bar should show.

use std::time::Duration;

use boss_room_core::{seconds, DeceptionWindow, HealthSnapshot, IntensityTier, Span};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Per-tier probabilities of each lie.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaslightChances {
    /// Weight of a fake damage event.
    pub fake_damage: f32,
    /// Chance a hit is discarded.
    pub prevent_damage: f32,
    /// Weight of a fake heal event.
    pub fake_heal: f32,
    /// Weight of a marker shuffle, and chance a wrong-marker hit fakes damage.
    pub wrong_marker: f32,
}

impl Default for GaslightChances {
    fn default() -> Self {
        Self {
            fake_damage: 0.3,
            prevent_damage: 0.2,
            fake_heal: 0.4,
            wrong_marker: 0.5,
        }
    }
}

/// Adjustable knobs of the goal gaslighting subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaslightTuning {
    /// Chances used in the mild tier.
    pub mild: GaslightChances,
    /// Chances used in the aggressive tier.
    pub aggressive: GaslightChances,
    /// Seconds between deceptive events while a window is open.
    pub event_interval: Span,
    /// Fake damage as a fraction of maximum health.
    pub fake_damage_fraction: Span,
    /// Fake healing as a fraction of maximum health.
    pub fake_heal_fraction: Span,
    /// Fraction of maximum health per second the bar drifts back toward truth.
    pub reconcile_rate: f32,
    /// Fraction of maximum health within which the bar snaps back to truth.
    pub reconcile_epsilon: f32,
    /// Chance a discarded hit still drops the displayed bar.
    pub fake_miss_drop_chance: f32,
    /// Multiplier range applied to the discarded amount for that drop.
    pub fake_miss_drop_scale: Span,
    /// Window length used by the periodic trigger in the mild tier.
    pub mild_window_secs: f32,
    /// Window length used by the periodic trigger in the aggressive tier.
    pub aggressive_window_secs: f32,
}

impl Default for GaslightTuning {
    fn default() -> Self {
        Self {
            mild: GaslightChances::default(),
            aggressive: GaslightChances {
                fake_damage: 0.5,
                prevent_damage: 0.3,
                fake_heal: 0.6,
                wrong_marker: 0.8,
            },
            event_interval: Span::new(1.0, 3.0),
            fake_damage_fraction: Span::new(0.05, 0.15),
            fake_heal_fraction: Span::new(0.03, 0.08),
            reconcile_rate: 0.3,
            reconcile_epsilon: 0.01,
            fake_miss_drop_chance: 0.6,
            fake_miss_drop_scale: Span::new(0.6, 1.2),
            mild_window_secs: 5.0,
            aggressive_window_secs: 8.0,
        }
    }
}

/// Lie told during a deceptive event.
#[derive(Clone, Debug, PartialEq)]
pub enum GaslightEffect {
    /// Displayed health should drop by `amount`.
    FakeDamage {
        /// Health removed from the display.
        amount: f32,
    },
    /// Displayed health should rise by `amount` and `notice` should be shown.
    FakeHeal {
        /// Health added to the display.
        amount: f32,
        /// Patch notice shown to the player.
        notice: String,
    },
    /// The correct hit marker moved.
    MarkersShuffled {
        /// Index of the new correct marker.
        correct: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EventKind {
    FakeDamage,
    FakeHeal,
    MarkerShuffle,
}

/// Owns the gaslighting window, the fake health flag and the hit markers.
#[derive(Debug)]
pub struct GoalGaslighting {
    tuning: GaslightTuning,
    tier: IntensityTier,
    window: Option<DeceptionWindow>,
    next_event_at: Duration,
    showing_fake: bool,
    markers: usize,
    correct_marker: usize,
    rng: ChaCha8Rng,
}

impl GoalGaslighting {
    /// Creates an inactive subsystem at the mild tier.
    #[must_use]
    pub fn new(tuning: GaslightTuning, seed: u64) -> Self {
        Self {
            tuning,
            tier: IntensityTier::Mild,
            window: None,
            next_event_at: Duration::ZERO,
            showing_fake: false,
            markers: 0,
            correct_marker: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Updates the tier used for chances and window length.
    pub fn set_tier(&mut self, tier: IntensityTier) {
        self.tier = tier;
    }

    /// Window length the periodic trigger should use at the current tier.
    #[must_use]
    pub fn window_for_tier(&self) -> Duration {
        match self.tier {
            IntensityTier::Aggressive => seconds(self.tuning.aggressive_window_secs),
            IntensityTier::Mild | IntensityTier::Paused => seconds(self.tuning.mild_window_secs),
        }
    }

    /// Opens (or restarts) a window; the first deceptive event is due immediately.
    pub fn activate(&mut self, now: Duration, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        self.window = Some(DeceptionWindow::new(now, duration));
        self.next_event_at = now;
        tracing::debug!(
            target: "boss_room::gaslight",
            duration_ms = duration.as_millis() as u64,
            tier = ?self.tier,
            "goal gaslighting active"
        );
    }

    /// Reports whether a window is open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.window.is_some()
    }

    /// Reports whether the display currently diverges on purpose.
    #[must_use]
    pub const fn is_showing_fake(&self) -> bool {
        self.showing_fake
    }

    /// Rolls whether the current hit is discarded. Never blocks outside a window.
    pub fn should_block_damage(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        let chance = self.chances().prevent_damage;
        self.rng.gen::<f32>() < chance
    }

    /// Displayed-health drop accompanying a discarded hit of `amount`, if any.
    pub fn fake_miss_drop(&mut self, amount: f32) -> Option<f32> {
        if !self.is_active() || !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        if self.rng.gen::<f32>() >= self.tuning.fake_miss_drop_chance {
            return None;
        }
        self.showing_fake = true;
        Some(amount * self.tuning.fake_miss_drop_scale.sample(&mut self.rng))
    }

    /// Health the bar should show after `dt`. Outside a fake display this is
    /// exactly the real value.
    pub fn displayed_health(&mut self, health: HealthSnapshot, dt: Duration) -> f32 {
        let real = health.real();
        if !self.is_active() || !self.showing_fake {
            self.showing_fake = false;
            return real;
        }

        let max = health.max();
        let step = self.tuning.reconcile_rate * max * dt.as_secs_f32();
        let displayed = health.displayed();
        let next = if displayed > real {
            (displayed - step).max(real)
        } else {
            (displayed + step).min(real)
        };
        if (next - real).abs() <= self.tuning.reconcile_epsilon * max {
            self.showing_fake = false;
            return real;
        }
        next.clamp(0.0, max)
    }

    /// Closes an elapsed window and emits a deceptive event when one is due.
    pub fn advance(
        &mut self,
        now: Duration,
        health: HealthSnapshot,
        out: &mut Vec<GaslightEffect>,
    ) {
        let Some(window) = self.window else {
            return;
        };
        if !window.is_open_at(now) {
            self.clear();
            return;
        }
        if now < self.next_event_at {
            return;
        }
        self.next_event_at =
            now.saturating_add(self.tuning.event_interval.sample_duration(&mut self.rng));
        if let Some(effect) = self.roll_event(health) {
            out.push(effect);
        }
    }

    /// Registers `count` hit markers; the first one starts as correct.
    pub fn register_markers(&mut self, count: usize) {
        self.markers = count;
        self.correct_marker = 0;
    }

    /// Index of the currently correct hit marker.
    #[must_use]
    pub const fn correct_marker(&self) -> usize {
        self.correct_marker
    }

    /// Reports whether hitting `index` counts as a correct hit.
    #[must_use]
    pub fn is_marker_correct(&self, index: usize) -> bool {
        index < self.markers && index == self.correct_marker
    }

    /// Reacts to the player striking `marker`; wrong markers may fake damage.
    pub fn on_player_attack(&mut self, marker: usize, max_health: f32) -> Option<GaslightEffect> {
        if !self.is_active() || self.is_marker_correct(marker) {
            return None;
        }
        if self.rng.gen::<f32>() >= self.chances().wrong_marker || self.showing_fake {
            return None;
        }
        Some(self.fake_damage(max_health))
    }

    /// Closes the window and stops lying; markers return to their original order.
    pub fn clear(&mut self) {
        self.window = None;
        self.showing_fake = false;
        self.correct_marker = 0;
    }

    fn chances(&self) -> GaslightChances {
        match self.tier {
            IntensityTier::Aggressive => self.tuning.aggressive,
            IntensityTier::Mild | IntensityTier::Paused => self.tuning.mild,
        }
    }

    fn roll_event(&mut self, health: HealthSnapshot) -> Option<GaslightEffect> {
        let chances = self.chances();
        let mut eligible: Vec<(EventKind, f32)> = Vec::with_capacity(3);
        if !self.showing_fake {
            eligible.push((EventKind::FakeDamage, chances.fake_damage));
        }
        eligible.push((EventKind::FakeHeal, chances.fake_heal));
        if self.markers >= 2 {
            eligible.push((EventKind::MarkerShuffle, chances.wrong_marker));
        }

        let total: f32 = eligible.iter().map(|(_, weight)| weight.max(0.0)).sum();
        if total <= 0.0 {
            return None;
        }
        let mut pick = self.rng.gen_range(0.0..total);
        let mut chosen = eligible[0].0;
        for (kind, weight) in &eligible {
            let weight = weight.max(0.0);
            if pick < weight {
                chosen = *kind;
                break;
            }
            pick -= weight;
        }

        let effect = match chosen {
            EventKind::FakeDamage => self.fake_damage(health.max()),
            EventKind::FakeHeal => self.fake_heal(health.max()),
            EventKind::MarkerShuffle => self.shuffle_markers(),
        };
        tracing::debug!(target: "boss_room::gaslight", ?effect, "deceptive event");
        Some(effect)
    }

    fn fake_damage(&mut self, max: f32) -> GaslightEffect {
        self.showing_fake = true;
        GaslightEffect::FakeDamage {
            amount: max * self.tuning.fake_damage_fraction.sample(&mut self.rng),
        }
    }

    fn fake_heal(&mut self, max: f32) -> GaslightEffect {
        self.showing_fake = true;
        let amount = max * self.tuning.fake_heal_fraction.sample(&mut self.rng);
        GaslightEffect::FakeHeal {
            amount,
            notice: format!("Auto-Heal Patch Applied (+{} HP)", amount.round() as i64),
        }
    }

    fn shuffle_markers(&mut self) -> GaslightEffect {
        let offset = self.rng.gen_range(1..self.markers);
        self.correct_marker = (self.correct_marker + offset) % self.markers;
        GaslightEffect::MarkersShuffled {
            correct: self.correct_marker,
        }
    }
}
