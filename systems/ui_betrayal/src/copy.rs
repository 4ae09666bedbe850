use std::time::Duration;

/// Messages cycled by the persistent loading display.
pub const LOADING_MESSAGES: [&str; 6] = [
    "Loading...",
    "Initializing Compliance Protocol...",
    "Connecting to Management Server...",
    "Validating Employee Status...",
    "Loading... (This may take a while)",
    "System.exe has stopped responding",
];

/// Advice that is deliberately wrong.
pub const MISLEADING_TOOLTIPS: [&str; 7] = [
    "Press X to deal more damage",
    "Hit the glowing weak point",
    "Jump to avoid the next attack",
    "Hold Shift to charge your attack",
    "Click repeatedly for combo damage",
    "Move backwards to dodge better",
    "Press Alt to enter focus mode",
];

/// Errors reported by a system that is working as intended.
pub const FAKE_ERRORS: [&str; 6] = [
    "Error: Missing texture for boss_weakness.png",
    "Warning: Memory leak detected in combat system",
    "Notice: Combat module requires restart",
    "Error: Animation sync failed - retrying...",
    "Warning: Audio driver mismatch",
    "Notice: Updating combat balance patch 1.2.3",
];

const FAST_ROTATION: Duration = Duration::from_secs(2);
const SLOW_ROTATION: Duration = Duration::from_secs(5);
/// Rotations made at the fast pace before slowing down.
const FAST_STEPS: u32 = 4;

/// Loading message shown `elapsed` after the display appeared. Rotation
/// starts every two seconds and slows to every five once past the fourth
/// message.
pub(crate) fn loading_message_at(elapsed: Duration) -> &'static str {
    let fast_span = FAST_ROTATION * FAST_STEPS;
    let steps = if elapsed < fast_span {
        elapsed.as_nanos() / FAST_ROTATION.as_nanos()
    } else {
        u128::from(FAST_STEPS) + (elapsed - fast_span).as_nanos() / SLOW_ROTATION.as_nanos()
    };
    let index = (steps % LOADING_MESSAGES.len() as u128) as usize;
    LOADING_MESSAGES[index]
}
