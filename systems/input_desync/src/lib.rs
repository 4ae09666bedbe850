#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input desync: per-action delays, temporary control remapping, input
//! freezing and triple-tap forced turning.
//!
//! Delay mode and swap mode are independent windows. Either may be open
//! without the other, and closing one never touches the other.

use std::time::Duration;

use boss_room_core::{seconds, DeceptionWindow, Facing, IntensityTier, Span};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Logical actions the player can perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Move toward negative x.
    MoveLeft,
    /// Move toward positive x.
    MoveRight,
    /// Jump.
    Jump,
    /// Crouch.
    Crouch,
    /// Primary attack.
    Attack,
    /// Interact with the environment.
    Interact,
}

/// Actions that receive a random delay while a desync window is open.
pub const DELAYED_ACTIONS: [Action; 3] = [Action::MoveLeft, Action::MoveRight, Action::Attack];

/// Physical keys reported by the input device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Left direction key.
    Left,
    /// Right direction key.
    Right,
    /// Up direction key.
    Up,
    /// Down direction key.
    Down,
    /// Primary button.
    Primary,
    /// Secondary button.
    Secondary,
}

/// Mapping from physical keys to logical actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlScheme {
    /// Unmodified mapping.
    Standard,
    /// Movement axes mirrored, jump/crouch and attack/interact swapped.
    Mirrored,
    /// Movement axes rotated a quarter turn, attack/interact swapped.
    Rotated,
}

impl ControlScheme {
    /// Resolves `key` to the action it triggers under this scheme.
    #[must_use]
    pub const fn action_for(self, key: Key) -> Action {
        match (self, key) {
            (ControlScheme::Standard, Key::Left) => Action::MoveLeft,
            (ControlScheme::Standard, Key::Right) => Action::MoveRight,
            (ControlScheme::Standard, Key::Up) => Action::Jump,
            (ControlScheme::Standard, Key::Down) => Action::Crouch,
            (ControlScheme::Standard, Key::Primary) => Action::Attack,
            (ControlScheme::Standard, Key::Secondary) => Action::Interact,
            (ControlScheme::Mirrored, Key::Left) => Action::MoveRight,
            (ControlScheme::Mirrored, Key::Right) => Action::MoveLeft,
            (ControlScheme::Mirrored, Key::Up) => Action::Crouch,
            (ControlScheme::Mirrored, Key::Down) => Action::Jump,
            (ControlScheme::Rotated, Key::Left) => Action::Jump,
            (ControlScheme::Rotated, Key::Up) => Action::MoveRight,
            (ControlScheme::Rotated, Key::Right) => Action::Crouch,
            (ControlScheme::Rotated, Key::Down) => Action::MoveLeft,
            (ControlScheme::Mirrored | ControlScheme::Rotated, Key::Primary) => Action::Interact,
            (ControlScheme::Mirrored | ControlScheme::Rotated, Key::Secondary) => Action::Attack,
        }
    }
}

/// Adjustable knobs of the input desync subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesyncTuning {
    /// Range, in seconds, of each action's delay.
    pub action_delay: Span,
    /// Seconds allowed between consecutive taps of a triple tap.
    pub tap_window_secs: f32,
    /// Taps of the same direction needed to force a turn.
    pub taps_to_turn: u32,
}

impl Default for DesyncTuning {
    fn default() -> Self {
        Self {
            action_delay: Span::new(0.3, 1.0),
            tap_window_secs: 0.3,
            taps_to_turn: 3,
        }
    }
}

#[derive(Clone, Debug)]
struct DelayWindow {
    window: DeceptionWindow,
    delays: Vec<(Action, Duration)>,
}

#[derive(Clone, Copy, Debug)]
struct SwapWindow {
    window: DeceptionWindow,
    scheme: ControlScheme,
}

#[derive(Clone, Copy, Debug, Default)]
struct TapTracker {
    direction: Option<Facing>,
    count: u32,
    last_at: Duration,
}

/// Owns the desync and swap windows.
#[derive(Debug)]
pub struct InputDesync {
    tuning: DesyncTuning,
    tier: IntensityTier,
    delay: Option<DelayWindow>,
    swap: Option<SwapWindow>,
    frozen: bool,
    taps: TapTracker,
    rng: ChaCha8Rng,
}

impl InputDesync {
    /// Creates a subsystem with immediate input and the standard scheme.
    #[must_use]
    pub fn new(tuning: DesyncTuning, seed: u64) -> Self {
        Self {
            tuning,
            tier: IntensityTier::Mild,
            delay: None,
            swap: None,
            frozen: false,
            taps: TapTracker::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Updates the tier reported by [`Self::tier`].
    pub fn set_tier(&mut self, tier: IntensityTier) {
        self.tier = tier;
    }

    /// Tier last pushed by the intensity controller.
    #[must_use]
    pub const fn tier(&self) -> IntensityTier {
        self.tier
    }

    /// Opens a delay window. Ignored, returning `false`, while one is already open.
    pub fn activate(&mut self, now: Duration, duration: Duration) -> bool {
        if self.delay.is_some() || duration.is_zero() {
            return false;
        }
        let delays = DELAYED_ACTIONS
            .iter()
            .map(|&action| (action, self.tuning.action_delay.sample_duration(&mut self.rng)))
            .collect();
        self.delay = Some(DelayWindow {
            window: DeceptionWindow::new(now, duration),
            delays,
        });
        tracing::debug!(
            target: "boss_room::input",
            duration_ms = duration.as_millis() as u64,
            "input desync active"
        );
        true
    }

    /// Reports whether `action` responds at `now`.
    #[must_use]
    pub fn is_ready_now(&self, action: Action, now: Duration) -> bool {
        if self.frozen {
            return false;
        }
        let Some(delay) = &self.delay else {
            return true;
        };
        if !delay.window.is_open_at(now) {
            return true;
        }
        delay
            .delays
            .iter()
            .find(|(delayed, _)| *delayed == action)
            .map_or(true, |(_, offset)| {
                now >= delay.window.started_at().saturating_add(*offset)
            })
    }

    /// Delay assigned to `action` in the open window.
    #[must_use]
    pub fn delay_of(&self, action: Action) -> Option<Duration> {
        self.delay.as_ref().and_then(|delay| {
            delay
                .delays
                .iter()
                .find(|(delayed, _)| *delayed == action)
                .map(|(_, offset)| *offset)
        })
    }

    /// Remaps the controls for `duration`, returning the scheme now in effect.
    pub fn swap_temporarily(&mut self, now: Duration, duration: Duration) -> ControlScheme {
        if duration.is_zero() {
            return self.scheme_at(now);
        }
        let scheme = if self.rng.gen_bool(0.5) {
            ControlScheme::Mirrored
        } else {
            ControlScheme::Rotated
        };
        self.swap = Some(SwapWindow {
            window: DeceptionWindow::new(now, duration),
            scheme,
        });
        tracing::debug!(target: "boss_room::input", ?scheme, "controls swapped");
        scheme
    }

    /// Scheme in effect at `now`.
    #[must_use]
    pub fn scheme_at(&self, now: Duration) -> ControlScheme {
        match self.swap {
            Some(swap) if swap.window.is_open_at(now) => swap.scheme,
            _ => ControlScheme::Standard,
        }
    }

    /// Resolves a physical key to the action it triggers at `now`.
    #[must_use]
    pub fn action_for(&self, key: Key, now: Duration) -> Action {
        self.scheme_at(now).action_for(key)
    }

    /// Reports whether a delay window is open.
    #[must_use]
    pub fn is_delaying(&self) -> bool {
        self.delay.is_some()
    }

    /// Reports whether a swap window is open.
    #[must_use]
    pub fn is_swapped(&self) -> bool {
        self.swap.is_some()
    }

    /// Closes windows that elapsed.
    pub fn advance(&mut self, now: Duration) {
        if self
            .delay
            .as_ref()
            .is_some_and(|delay| !delay.window.is_open_at(now))
        {
            self.clear_desync();
        }
        if self.swap.is_some_and(|swap| !swap.window.is_open_at(now)) {
            self.restore_control_scheme();
        }
    }

    /// Restores immediate input.
    pub fn clear_desync(&mut self) {
        self.delay = None;
    }

    /// Restores the standard mapping.
    pub fn restore_control_scheme(&mut self) {
        self.swap = None;
    }

    /// Closes both windows and forgets partial taps.
    pub fn reset(&mut self) {
        self.clear_desync();
        self.restore_control_scheme();
        self.taps = TapTracker::default();
    }

    /// Blocks every action until [`Self::unfreeze`].
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Lifts a freeze.
    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Reports whether input is frozen.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Records a directional tap. Returns the facing to force once enough
    /// quick taps of the same direction arrive and the player faces elsewhere.
    pub fn register_tap(
        &mut self,
        direction: Facing,
        now: Duration,
        current: Facing,
    ) -> Option<Facing> {
        let window = seconds(self.tuning.tap_window_secs);
        let continues = self.taps.direction == Some(direction)
            && self.taps.count > 0
            && now.saturating_sub(self.taps.last_at) <= window;
        self.taps.count = if continues { self.taps.count + 1 } else { 1 };
        self.taps.direction = Some(direction);
        self.taps.last_at = now;

        if self.taps.count < self.tuning.taps_to_turn.max(1) {
            return None;
        }
        self.taps = TapTracker::default();
        (current != direction).then_some(direction)
    }
}
