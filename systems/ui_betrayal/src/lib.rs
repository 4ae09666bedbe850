#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! UI betrayal: a HUD that moves, lies and refuses to finish loading.
//!
//! Panel positions are derived from the clock, so a shuffle never needs a
//! per-frame animation task: asking for a position at `now` interpolates
//! between the recorded origin and the shuffled target. Text shown to the
//! player is queued as [`UiNotice`] values for the HUD collaborator.

mod copy;

use std::time::Duration;

use boss_room_core::{seconds, DeceptionWindow, IntensityTier, Span};
use glam::Vec2;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use crate::copy::{FAKE_ERRORS, LOADING_MESSAGES, MISLEADING_TOOLTIPS};

const SHUFFLE_IN: Duration = Duration::from_millis(500);
const SHUFFLE_OUT: Duration = Duration::from_millis(300);
const POPUP_LIFETIME: Span = Span::new(8.0, 15.0);
const FAKE_ERROR_DURATION: Span = Span::new(3.0, 6.0);
const TOOLTIP_DURATION: Duration = Duration::from_secs(4);
const POPUP_ANCHORS: [Vec2; 4] = [
    Vec2::new(0.0, 100.0),
    Vec2::new(-150.0, 0.0),
    Vec2::new(150.0, 0.0),
    Vec2::new(0.0, -50.0),
];

/// Identifier of a HUD panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(u32);

impl PanelId {
    /// Creates a new panel identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

/// Identifier of a transient popup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupId(u64);

/// False dialog floating over the HUD.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Popup {
    /// Identifier used to dismiss the popup.
    pub id: PopupId,
    /// Screen-space anchor of the popup.
    pub anchor: Vec2,
    /// Clock value at which the popup closes by itself.
    pub expires_at: Duration,
}

/// Text the HUD collaborator should display.
#[derive(Clone, Debug, PartialEq)]
pub enum UiNotice {
    /// Dialog line.
    Dialog {
        /// Text of the line.
        text: String,
        /// How long the line stays up.
        duration: Duration,
    },
    /// Debug-style system message.
    Debug {
        /// Text of the message.
        text: String,
        /// How long the message stays up.
        duration: Duration,
    },
}

/// Random UI bug picked by [`UiBetrayal::trigger_random_bug`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiBug {
    /// Panels shuffled.
    Shuffle,
    /// Popup spawned.
    Popup,
    /// Misleading tooltip shown.
    Tooltip,
    /// Fake error shown.
    FakeError,
}

#[derive(Clone, Copy, Debug)]
struct Panel {
    id: PanelId,
    origin: Vec2,
}

#[derive(Clone, Debug)]
struct ShuffleState {
    window: DeceptionWindow,
    from: Vec<Vec2>,
    targets: Vec<Vec2>,
}

impl ShuffleState {
    fn position(&self, index: usize, origin: Vec2, now: Duration) -> Vec2 {
        let elapsed = self.window.elapsed_at(now);
        let total = self.window.duration();
        let hold_end = total.saturating_sub(SHUFFLE_OUT);
        let target = self.targets[index];
        if elapsed < SHUFFLE_IN {
            let t = smoothstep(elapsed.as_secs_f32() / SHUFFLE_IN.as_secs_f32());
            self.from[index].lerp(target, t)
        } else if elapsed < hold_end {
            target
        } else if elapsed < total {
            let t = smoothstep((elapsed - hold_end).as_secs_f32() / SHUFFLE_OUT.as_secs_f32());
            target.lerp(origin, t)
        } else {
            origin
        }
    }
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Clone, Debug)]
struct TimedText {
    text: String,
    until: Duration,
}

/// Owns HUD panels, popups, messages and the persistent loading display.
#[derive(Debug)]
pub struct UiBetrayal {
    tier: IntensityTier,
    betrayal_active: bool,
    panels: Vec<Panel>,
    shuffle: Option<ShuffleState>,
    popups: Vec<Popup>,
    next_popup: u64,
    message: Option<TimedText>,
    debug_message: Option<TimedText>,
    loading_since: Option<Duration>,
    notices: Vec<UiNotice>,
    rng: ChaCha8Rng,
}

impl UiBetrayal {
    /// Creates an honest HUD with no panels registered.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            tier: IntensityTier::Mild,
            betrayal_active: false,
            panels: Vec::new(),
            shuffle: None,
            popups: Vec::new(),
            next_popup: 0,
            message: None,
            debug_message: None,
            loading_since: None,
            notices: Vec::new(),
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

    /// Records a panel and its original position.
    pub fn register_panel(&mut self, id: PanelId, position: Vec2) {
        self.reset_panels();
        self.panels.retain(|panel| panel.id != id);
        self.panels.push(Panel {
            id,
            origin: position,
        });
    }

    /// Position of `id` at `now`.
    #[must_use]
    pub fn panel_position(&self, id: PanelId, now: Duration) -> Option<Vec2> {
        let index = self.panels.iter().position(|panel| panel.id == id)?;
        Some(self.position_at(index, now))
    }

    /// Positions of every panel at `now`, in registration order.
    #[must_use]
    pub fn panel_positions(&self, now: Duration) -> Vec<(PanelId, Vec2)> {
        (0..self.panels.len())
            .map(|index| (self.panels[index].id, self.position_at(index, now)))
            .collect()
    }

    /// Reports whether a shuffle window is open.
    #[must_use]
    pub fn is_shuffling(&self) -> bool {
        self.shuffle.is_some()
    }

    /// Moves panels to a random permutation of their current positions, holds
    /// and moves them home, the whole window lasting `duration`. Needs at
    /// least two panels.
    pub fn shuffle(&mut self, now: Duration, duration: Duration) -> bool {
        if self.panels.len() < 2 {
            return false;
        }
        let from: Vec<Vec2> = (0..self.panels.len())
            .map(|index| self.position_at(index, now))
            .collect();
        let mut targets = from.clone();
        targets.shuffle(&mut self.rng);
        let duration = duration.max(SHUFFLE_IN + SHUFFLE_OUT);
        self.shuffle = Some(ShuffleState {
            window: DeceptionWindow::new(now, duration),
            from,
            targets,
        });
        tracing::debug!(
            target: "boss_room::ui",
            panels = self.panels.len(),
            duration_ms = duration.as_millis() as u64,
            "ui shuffle"
        );
        true
    }

    /// Opens a popup at a random anchor; it closes by itself after 8-15 s.
    pub fn spawn_transient_popup(&mut self, now: Duration) -> PopupId {
        let id = PopupId(self.next_popup);
        self.next_popup = self.next_popup.wrapping_add(1);
        let anchor = POPUP_ANCHORS[self.rng.gen_range(0..POPUP_ANCHORS.len())];
        let expires_at = now.saturating_add(POPUP_LIFETIME.sample_duration(&mut self.rng));
        self.popups.push(Popup {
            id,
            anchor,
            expires_at,
        });
        id
    }

    /// Closes a popup early. Returns `false` when it no longer exists.
    pub fn dismiss_popup(&mut self, id: PopupId) -> bool {
        let before = self.popups.len();
        self.popups.retain(|popup| popup.id != id);
        self.popups.len() != before
    }

    /// Open popups.
    #[must_use]
    pub fn popups(&self) -> &[Popup] {
        &self.popups
    }

    /// Shows a dialog line for `duration`.
    pub fn show_message(&mut self, now: Duration, text: &str, duration: Duration) {
        self.message = Some(TimedText {
            text: text.to_owned(),
            until: now.saturating_add(duration),
        });
        self.notices.push(UiNotice::Dialog {
            text: text.to_owned(),
            duration,
        });
    }

    /// Shows a debug-style system message for `duration`.
    pub fn show_debug_message(&mut self, now: Duration, text: &str, duration: Duration) {
        self.debug_message = Some(TimedText {
            text: text.to_owned(),
            until: now.saturating_add(duration),
        });
        self.notices.push(UiNotice::Debug {
            text: text.to_owned(),
            duration,
        });
    }

    /// Dialog line currently up.
    #[must_use]
    pub fn current_message(&self) -> Option<&str> {
        self.message.as_ref().map(|message| message.text.as_str())
    }

    /// Debug message currently up.
    #[must_use]
    pub fn current_debug_message(&self) -> Option<&str> {
        self.debug_message.as_ref().map(|message| message.text.as_str())
    }

    /// Shows a piece of deliberately wrong advice.
    pub fn show_misleading_tooltip(&mut self, now: Duration) {
        let text = MISLEADING_TOOLTIPS[self.rng.gen_range(0..MISLEADING_TOOLTIPS.len())];
        self.show_debug_message(now, text, TOOLTIP_DURATION);
    }

    /// Shows an error that did not happen.
    pub fn show_fake_error(&mut self, now: Duration) {
        let text = FAKE_ERRORS[self.rng.gen_range(0..FAKE_ERRORS.len())];
        let duration = FAKE_ERROR_DURATION.sample_duration(&mut self.rng);
        self.show_message(now, text, duration);
    }

    /// Starts the loading display that never finishes.
    pub fn show_persistent_loading(&mut self, now: Duration) {
        if self.loading_since.is_none() {
            self.loading_since = Some(now);
        }
    }

    /// Removes the loading display.
    pub fn hide_loading(&mut self) {
        self.loading_since = None;
    }

    /// Loading text at `now`, if the loading display is up.
    #[must_use]
    pub fn loading_text(&self, now: Duration) -> Option<&'static str> {
        self.loading_since
            .map(|since| copy::loading_message_at(now.saturating_sub(since)))
    }

    /// Enables random UI bugs.
    pub fn start_betrayal(&mut self) {
        self.betrayal_active = true;
    }

    /// Reports whether random UI bugs are enabled.
    #[must_use]
    pub const fn is_betrayal_active(&self) -> bool {
        self.betrayal_active
    }

    /// Plays one of four UI bugs, chosen uniformly. Does nothing until
    /// [`Self::start_betrayal`] was called.
    pub fn trigger_random_bug(&mut self, now: Duration) -> Option<UiBug> {
        if !self.betrayal_active {
            return None;
        }
        let bug = match self.rng.gen_range(0..4) {
            0 => UiBug::Shuffle,
            1 => UiBug::Popup,
            2 => UiBug::Tooltip,
            _ => UiBug::FakeError,
        };
        match bug {
            UiBug::Shuffle => {
                let duration = seconds(self.rng.gen_range(5.0..9.0));
                let _ = self.shuffle(now, duration);
            }
            UiBug::Popup => {
                let _ = self.spawn_transient_popup(now);
            }
            UiBug::Tooltip => self.show_misleading_tooltip(now),
            UiBug::FakeError => self.show_fake_error(now),
        }
        tracing::debug!(target: "boss_room::ui", ?bug, "random ui bug");
        Some(bug)
    }

    /// Closes elapsed windows, popups and messages.
    pub fn advance(&mut self, now: Duration) {
        if self
            .shuffle
            .as_ref()
            .is_some_and(|shuffle| !shuffle.window.is_open_at(now))
        {
            self.shuffle = None;
        }
        self.popups.retain(|popup| popup.expires_at > now);
        if self.message.as_ref().is_some_and(|message| message.until <= now) {
            self.message = None;
        }
        if self
            .debug_message
            .as_ref()
            .is_some_and(|message| message.until <= now)
        {
            self.debug_message = None;
        }
    }

    /// Drains notices queued for the HUD collaborator.
    pub fn take_notices(&mut self) -> Vec<UiNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Returns every panel home, closes popups and messages and disables
    /// random UI bugs. The loading display is left to [`Self::hide_loading`].
    pub fn reset_all(&mut self) {
        self.reset_panels();
        self.popups.clear();
        self.message = None;
        self.debug_message = None;
        self.betrayal_active = false;
    }

    fn reset_panels(&mut self) {
        self.shuffle = None;
    }

    fn position_at(&self, index: usize, now: Duration) -> Vec2 {
        let origin = self.panels[index].origin;
        match &self.shuffle {
            Some(shuffle) => shuffle.position(index, origin, now),
            None => origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_is_clamped_and_symmetric() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(2.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
    }

    #[test]
    fn registering_a_panel_cancels_a_running_shuffle() {
        let mut ui = UiBetrayal::new(1);
        ui.register_panel(PanelId::new(0), Vec2::ZERO);
        ui.register_panel(PanelId::new(1), Vec2::ONE);
        assert!(ui.shuffle(Duration::ZERO, Duration::from_secs(5)));
        ui.register_panel(PanelId::new(2), Vec2::X);
        assert!(!ui.is_shuffling());
    }
}
