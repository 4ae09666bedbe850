#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Terminal script played once the boss is beaten.
//!
//! The sequencer only decides *whether* the script may start and *what* it
//! contains. Timing is left to whoever executes the steps, which keeps the
//! script a plain list of `(step, then_wait)` pairs.

use std::time::Duration;

use boss_room_core::seconds;

/// Line shown when the sequence starts.
pub const OPENING_LINE: &str = "Initiating Emergency Compliance Protocol...";
/// Line shown while the fake patch "loads".
pub const PATCH_LINE: &str = "Loading patch 1.8.2...";
/// Line shown once the exit is open.
pub const CRASH_LINE: &str = "System.exe has stopped responding.";

/// One step of the defeat script.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DefeatStep {
    /// Shows a dialog line.
    ShowMessage {
        /// Text of the line.
        text: &'static str,
        /// How long the line stays on screen.
        duration: Duration,
    },
    /// Brings up the loading display that never completes.
    ShowPersistentLoading,
    /// Cancels deception tasks and pauses the random-bug trigger.
    PauseDeception,
    /// Blocks player input.
    FreezeInput,
    /// Opens the arena exit.
    EnableExit,
    /// Gives control back to the player.
    RestoreInput,
    /// Marks the sequence finished and tells the player it won.
    Complete,
}

/// Ordered defeat steps, each followed by a wait.
#[derive(Clone, Debug, PartialEq)]
pub struct DefeatScript {
    steps: Vec<(DefeatStep, Duration)>,
}

impl DefeatScript {
    /// Builds the standard script.
    #[must_use]
    pub fn standard() -> Self {
        let opening = seconds(2.5);
        let patch = seconds(1.5);
        let steps = vec![
            (
                DefeatStep::ShowMessage {
                    text: OPENING_LINE,
                    duration: opening,
                },
                opening,
            ),
            (
                DefeatStep::ShowMessage {
                    text: PATCH_LINE,
                    duration: patch,
                },
                patch,
            ),
            (DefeatStep::ShowPersistentLoading, Duration::ZERO),
            (DefeatStep::PauseDeception, Duration::ZERO),
            (DefeatStep::FreezeInput, seconds(0.4)),
            (DefeatStep::EnableExit, Duration::from_secs(3)),
            (
                DefeatStep::ShowMessage {
                    text: CRASH_LINE,
                    duration: Duration::from_secs(4),
                },
                Duration::from_secs(2),
            ),
            (DefeatStep::RestoreInput, Duration::ZERO),
            (DefeatStep::Complete, Duration::ZERO),
        ];
        Self { steps }
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[(DefeatStep, Duration)] {
        &self.steps
    }

    /// Sum of every wait in the script.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|(_, wait)| *wait).sum()
    }
}

impl IntoIterator for DefeatScript {
    type Item = (DefeatStep, Duration);
    type IntoIter = std::vec::IntoIter<(DefeatStep, Duration)>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Stage {
    #[default]
    Armed,
    Running,
    Finished,
}

/// Hands out the defeat script at most once per fight.
#[derive(Debug, Default)]
pub struct DefeatSequencer {
    stage: Stage,
}

impl DefeatSequencer {
    /// Creates an armed sequencer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the script the first time it is called after arming.
    pub fn run(&mut self) -> Option<DefeatScript> {
        if self.stage != Stage::Armed {
            tracing::debug!(target: "boss_room::defeat", "defeat sequence already consumed");
            return None;
        }
        self.stage = Stage::Running;
        tracing::info!(target: "boss_room::defeat", "defeat sequence started");
        Some(DefeatScript::standard())
    }

    /// Records that the last step ran.
    pub fn finish(&mut self) {
        if self.stage == Stage::Running {
            self.stage = Stage::Finished;
            tracing::info!(target: "boss_room::defeat", "defeat sequence completed");
        }
    }

    /// Reports whether the script is between its first and last step.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.stage == Stage::Running
    }

    /// Reports whether the script ran to completion.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Finished
    }

    /// Allows the script to run again, for a new fight.
    pub fn rearm(&mut self) {
        self.stage = Stage::Armed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_waits_add_up() {
        let script = DefeatScript::standard();
        let expected = seconds(2.5) + seconds(1.5) + seconds(0.4) + Duration::from_secs(5);
        assert_eq!(script.total_duration(), expected);
    }

    #[test]
    fn finish_before_run_is_ignored() {
        let mut sequencer = DefeatSequencer::new();
        sequencer.finish();
        assert!(!sequencer.is_finished());
        assert!(sequencer.run().is_some());
    }
}
