#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Boss Room encounter engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative fight world, and the deception systems. The orchestrator
//! submits [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values that systems and adapters react to deterministically. Collaborators
//! outside the core (player avatar, HUD, exit door, animator, arena) are
//! reached exclusively through the narrow traits in [`hooks`].

use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod hooks;

/// Intensity value at or above which the derived tier becomes aggressive.
pub const AGGRESSIVE_THRESHOLD: f32 = 0.5;

/// RNG stream mixed into the fight seed for the attack scheduler.
pub const RNG_STREAM_SCHEDULER: u64 = 0x5c4e_d11e_a77a_c4e5;
/// RNG stream mixed into the fight seed for the bug intensity controller.
pub const RNG_STREAM_INTENSITY: u64 = 0x1b7e_0f3a_9d2c_6e41;
/// RNG stream mixed into the fight seed for the collision paradox system.
pub const RNG_STREAM_COLLISION: u64 = 0x2f95_32c8_2a36_ffc1;
/// RNG stream mixed into the fight seed for the input desync system.
pub const RNG_STREAM_INPUT: u64 = 0x5847_ff07_d4a5_3c21;
/// RNG stream mixed into the fight seed for the goal gaslighting system.
pub const RNG_STREAM_GASLIGHT: u64 = 0x42f0_e1eb_0bad_f00d;
/// RNG stream mixed into the fight seed for the UI betrayal system.
pub const RNG_STREAM_UI: u64 = 0x7a3d_91c0_55e2_8b14;
/// RNG stream mixed into the fight seed for the orchestrator itself.
pub const RNG_STREAM_ORCHESTRATOR: u64 = 0x0dd5_ea7e_e1f1_3a5b;

/// Derives an independent seed for a subsystem from the fight seed.
#[must_use]
pub const fn derive_seed(seed: u64, stream: u64) -> u64 {
    let mut z = (seed ^ stream).wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Converts a number of seconds into a duration, treating non-finite and
/// non-positive inputs as zero.
#[must_use]
pub fn seconds(value: f32) -> Duration {
    if !value.is_finite() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(value).unwrap_or(Duration::MAX)
}

/// Linearly interpolates between `from` and `to` with `t` clamped to `[0, 1]`.
#[must_use]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    from + (to - from) * t
}

/// Coarse stage of the encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Opening stage with the mild attack pool.
    Phase1,
    /// Escalated stage entered by time or health threshold.
    Phase2,
    /// Terminal stage once real health reached zero.
    Defeated,
}

/// Reason recorded alongside a phase transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseCause {
    /// Elapsed fight time reached the phase one duration.
    TimeLimit,
    /// Real health dropped to the phase two threshold.
    HealthThreshold,
    /// Real health reached zero through damage.
    HealthDepleted,
    /// Total fight duration elapsed and the boss was forcibly defeated.
    SafetyTimeout,
}

/// Discrete projection of the continuous bug intensity value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityTier {
    /// Low-aggression deception.
    Mild,
    /// High-aggression deception.
    Aggressive,
    /// Deception suspended entirely.
    Paused,
}

/// Continuous intensity knob paired with an explicit pause flag.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntensityState {
    value: f32,
    paused: bool,
}

impl IntensityState {
    /// Creates a new intensity state, clamping the value into `[0, 1]`.
    #[must_use]
    pub fn new(value: f32, paused: bool) -> Self {
        Self {
            value: clamp_unit(value),
            paused,
        }
    }

    /// Current intensity value in `[0, 1]`.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Reports whether deception is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Tier derived from the value and pause flag.
    #[must_use]
    pub fn tier(&self) -> IntensityTier {
        if self.paused {
            IntensityTier::Paused
        } else if self.value >= AGGRESSIVE_THRESHOLD {
            IntensityTier::Aggressive
        } else {
            IntensityTier::Mild
        }
    }

    /// Returns a copy with the value replaced and clamped.
    #[must_use]
    pub fn with_value(self, value: f32) -> Self {
        Self {
            value: clamp_unit(value),
            ..self
        }
    }

    /// Returns a copy with the pause flag replaced.
    #[must_use]
    pub const fn with_paused(self, paused: bool) -> Self {
        Self { paused, ..self }
    }
}

impl Default for IntensityState {
    fn default() -> Self {
        Self::new(0.0, false)
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Attacks the scheduler may select from a phase pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    /// Makes a few obstacles conditionally passable.
    CollisionParadox,
    /// Delays selected player actions.
    InputDesync,
    /// Opens a goal gaslighting window.
    GoalGaslight,
    /// Scrambles HUD panel positions.
    UiShuffle,
    /// Spawns a fake dialog popup.
    FakePopup,
    /// Remaps the player's controls temporarily.
    ControlSwap,
    /// Fires a short burst of projectiles.
    ProjectileBurst,
    /// Detonates an area burst around the boss.
    AreaBurst,
}

/// Deception subsystems reachable from the periodic random-bug trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeceptionKind {
    /// Collision paradox subsystem.
    Collision,
    /// Input desync subsystem.
    InputDesync,
    /// Goal gaslighting subsystem.
    Gaslight,
    /// UI betrayal subsystem.
    UiBetrayal,
}

impl DeceptionKind {
    /// Every deception kind in trigger order.
    pub const ALL: [DeceptionKind; 4] = [
        DeceptionKind::Collision,
        DeceptionKind::InputDesync,
        DeceptionKind::Gaslight,
        DeceptionKind::UiBetrayal,
    ];
}

/// Groups used to cancel related timed tasks together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskGroup {
    /// Tasks driving deception windows and attack follow-ups.
    Deception,
    /// Scripted dialog sequences such as the phase two entry and defeat.
    Narrative,
}

/// Inclusive-exclusive numeric range sampled uniformly.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Lower bound of the range.
    pub min: f32,
    /// Upper bound of the range.
    pub max: f32,
}

impl Span {
    /// Creates a new range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Creates a range containing a single value.
    #[must_use]
    pub const fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Reports whether both bounds are finite and ordered.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Returns an ordered, finite copy of the range.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let min = if self.min.is_finite() { self.min } else { 0.0 };
        let max = if self.max.is_finite() { self.max } else { min };
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Draws a value uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let span = self.sanitized();
        if span.max > span.min {
            rng.gen_range(span.min..span.max)
        } else {
            span.min
        }
    }

    /// Draws a duration in seconds uniformly from the range.
    pub fn sample_duration<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        seconds(self.sample(rng))
    }
}

/// Bounded activation of one deception subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeceptionWindow {
    started_at: Duration,
    duration: Duration,
}

impl DeceptionWindow {
    /// Opens a window at `started_at` lasting `duration`.
    #[must_use]
    pub const fn new(started_at: Duration, duration: Duration) -> Self {
        Self {
            started_at,
            duration,
        }
    }

    /// Clock value at which the window opened.
    #[must_use]
    pub const fn started_at(&self) -> Duration {
        self.started_at
    }

    /// Total length of the window.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Clock value at which the window closes.
    #[must_use]
    pub fn ends_at(&self) -> Duration {
        self.started_at.saturating_add(self.duration)
    }

    /// Reports whether the window is still open at `now`.
    #[must_use]
    pub fn is_open_at(&self, now: Duration) -> bool {
        now < self.ends_at()
    }

    /// Time elapsed since the window opened.
    #[must_use]
    pub fn elapsed_at(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }
}

/// Horizontal direction an actor faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Facing toward negative x.
    Left,
    /// Facing toward positive x.
    Right,
}

impl Facing {
    /// Unit sign of the facing along the x axis.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// The opposite facing.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Snapshot of the player avatar exposed by the player collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerState {
    position: Vec2,
    facing: Facing,
    velocity_x: f32,
}

impl PlayerState {
    /// Creates a new player snapshot.
    #[must_use]
    pub const fn new(position: Vec2, facing: Facing, velocity_x: f32) -> Self {
        Self {
            position,
            facing,
            velocity_x,
        }
    }

    /// World-space position of the player.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Direction the player faces.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Horizontal velocity of the player.
    #[must_use]
    pub const fn velocity_x(&self) -> f32 {
        self.velocity_x
    }
}

/// Read-only copy of the dual health record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HealthSnapshot {
    real: f32,
    displayed: f32,
    max: f32,
}

impl HealthSnapshot {
    /// Creates a new snapshot.
    #[must_use]
    pub const fn new(real: f32, displayed: f32, max: f32) -> Self {
        Self {
            real,
            displayed,
            max,
        }
    }

    /// Authoritative health used for defeat checks.
    #[must_use]
    pub const fn real(&self) -> f32 {
        self.real
    }

    /// Health shown to the player.
    #[must_use]
    pub const fn displayed(&self) -> f32 {
        self.displayed
    }

    /// Maximum health.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Real health as a fraction of the maximum.
    #[must_use]
    pub fn real_fraction(&self) -> f32 {
        fraction(self.real, self.max)
    }

    /// Displayed health as a fraction of the maximum.
    #[must_use]
    pub fn displayed_fraction(&self) -> f32 {
        fraction(self.displayed, self.max)
    }
}

fn fraction(value: f32, max: f32) -> f32 {
    if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Read-only copy of the fight progress record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FightSnapshot {
    phase: Phase,
    elapsed: Duration,
    next_escalation: Duration,
    escalation_level: u32,
    active: bool,
}

impl FightSnapshot {
    /// Creates a new snapshot.
    #[must_use]
    pub const fn new(
        phase: Phase,
        elapsed: Duration,
        next_escalation: Duration,
        escalation_level: u32,
        active: bool,
    ) -> Self {
        Self {
            phase,
            elapsed,
            next_escalation,
            escalation_level,
            active,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Fight time elapsed since the fight started.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time at which the next escalation fires.
    #[must_use]
    pub const fn next_escalation(&self) -> Duration {
        self.next_escalation
    }

    /// Number of escalations applied so far.
    #[must_use]
    pub const fn escalation_level(&self) -> u32 {
        self.escalation_level
    }

    /// Reports whether the fight is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

/// Commands that express all permissible fight world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Starts a fresh fight with full health in phase one.
    StartFight,
    /// Advances the fight clock.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Applies damage to the real health pool.
    ApplyDamage {
        /// Requested damage; negative and non-finite values are treated as zero.
        amount: f32,
    },
    /// Replaces the displayed health value, clamped into range.
    SetDisplayedHealth {
        /// New displayed health.
        value: f32,
    },
    /// Shifts the displayed health value, clamped into range.
    NudgeDisplayedHealth {
        /// Signed change applied to displayed health.
        delta: f32,
    },
    /// Halts the fight without defeating the boss.
    StopFight,
}

/// Events broadcast by the world and the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Announces that a fresh fight started.
    FightStarted {
        /// Maximum health of the boss.
        max_health: f32,
    },
    /// Indicates that the fight clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Total fight time elapsed after the tick.
        elapsed: Duration,
    },
    /// Signals that an escalation interval elapsed.
    EscalationDue {
        /// One-based escalation counter.
        level: u32,
    },
    /// Announces a phase transition.
    PhaseChanged {
        /// Phase before the transition.
        from: Phase,
        /// Phase after the transition.
        to: Phase,
        /// Reason for the transition.
        cause: PhaseCause,
    },
    /// Confirms that damage reached the real health pool.
    DamageApplied {
        /// Damage requested by the caller.
        requested: f32,
        /// Damage actually subtracted from real health.
        applied: f32,
        /// Real health remaining afterwards.
        remaining: f32,
    },
    /// Reports that a damage request arrived while no fight was active.
    DamageIgnored {
        /// Damage requested by the caller.
        requested: f32,
    },
    /// Reports that goal gaslighting discarded a damage request.
    DamageBlocked {
        /// Damage requested by the caller.
        requested: f32,
    },
    /// Announces that the fight was stopped externally.
    FightStopped,
    /// Reports that the scheduler launched an attack.
    AttackLaunched {
        /// Attack that fired.
        kind: AttackKind,
        /// Phase the attack fired in.
        phase: Phase,
    },
    /// Reports that the periodic random-bug trigger activated a subsystem.
    BugTriggered {
        /// Subsystem that was activated.
        kind: DeceptionKind,
    },
    /// Reports a change to the intensity state.
    IntensityChanged {
        /// New intensity value.
        value: f32,
        /// Tier derived from the new state.
        tier: IntensityTier,
    },
    /// Announces that the defeat script began.
    DefeatSequenceStarted,
    /// Announces that the defeat script finished.
    DefeatSequenceCompleted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn tier_is_a_projection_of_value_and_pause() {
        assert_eq!(IntensityState::new(0.0, false).tier(), IntensityTier::Mild);
        assert_eq!(IntensityState::new(0.49, false).tier(), IntensityTier::Mild);
        assert_eq!(
            IntensityState::new(0.5, false).tier(),
            IntensityTier::Aggressive
        );
        assert_eq!(
            IntensityState::new(1.0, false).tier(),
            IntensityTier::Aggressive
        );
        assert_eq!(IntensityState::new(1.0, true).tier(), IntensityTier::Paused);
    }

    #[test]
    fn intensity_value_is_clamped() {
        assert_eq!(IntensityState::new(3.0, false).value(), 1.0);
        assert_eq!(IntensityState::new(-1.0, false).value(), 0.0);
        assert_eq!(IntensityState::new(f32::NAN, false).value(), 0.0);
        assert_eq!(IntensityState::default().with_value(0.75).value(), 0.75);
    }

    #[test]
    fn span_samples_stay_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let span = Span::new(4.0, 8.0);
        for _ in 0..1_000 {
            let value = span.sample(&mut rng);
            assert!((4.0..8.0).contains(&value), "sample {value} out of range");
        }
    }

    #[test]
    fn inverted_span_is_reordered() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let span = Span::new(3.0, 1.0);
        assert_eq!(span.sanitized(), Span::new(1.0, 3.0));
        let value = span.sample(&mut rng);
        assert!((1.0..3.0).contains(&value));
        assert_eq!(Span::fixed(2.0).sample(&mut rng), 2.0);
    }

    #[test]
    fn window_closes_at_its_end() {
        let window = DeceptionWindow::new(Duration::from_secs(10), Duration::from_secs(5));
        assert!(window.is_open_at(Duration::from_secs(10)));
        assert!(window.is_open_at(Duration::from_millis(14_999)));
        assert!(!window.is_open_at(Duration::from_secs(15)));
        assert_eq!(
            window.elapsed_at(Duration::from_secs(12)),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn seconds_rejects_invalid_inputs() {
        assert_eq!(seconds(-1.0), Duration::ZERO);
        assert_eq!(seconds(f32::NAN), Duration::ZERO);
        assert_eq!(seconds(1.5), Duration::from_millis(1_500));
    }

    #[test]
    fn derived_seeds_differ_per_stream() {
        let seed = 0x1234;
        assert_ne!(
            derive_seed(seed, RNG_STREAM_SCHEDULER),
            derive_seed(seed, RNG_STREAM_INTENSITY)
        );
        assert_eq!(
            derive_seed(seed, RNG_STREAM_UI),
            derive_seed(seed, RNG_STREAM_UI)
        );
    }

    #[test]
    fn span_deserializes_from_toml_table() {
        let span: Span = toml::from_str("min = 0.5\nmax = 1.25").expect("valid span");
        assert_eq!(span, Span::new(0.5, 1.25));
    }
}
