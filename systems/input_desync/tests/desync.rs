use std::time::Duration;

use boss_room_core::Facing;
use boss_room_system_input_desync::{
    Action, ControlScheme, DesyncTuning, InputDesync, Key, DELAYED_ACTIONS,
};

fn desync() -> InputDesync {
    InputDesync::new(DesyncTuning::default(), 0xde5c)
}

#[test]
fn delayed_actions_become_ready_after_their_offset() {
    let mut desync = desync();
    let start = Duration::from_secs(10);
    assert!(desync.activate(start, Duration::from_secs(2)));

    for action in DELAYED_ACTIONS {
        let delay = desync.delay_of(action).expect("delayed action has an offset");
        assert!(delay >= Duration::from_millis(300) && delay < Duration::from_secs(1));
        assert!(!desync.is_ready_now(action, start));
        assert!(desync.is_ready_now(action, start + delay));
    }
    assert!(desync.is_ready_now(Action::Jump, start), "jump is never delayed");
}

#[test]
fn retriggering_an_open_window_is_ignored() {
    let mut desync = desync();
    assert!(desync.activate(Duration::ZERO, Duration::from_secs(2)));
    let before = desync.delay_of(Action::Attack);
    assert!(!desync.activate(Duration::from_millis(500), Duration::from_secs(2)));
    assert_eq!(desync.delay_of(Action::Attack), before);
}

#[test]
fn window_timeout_restores_immediate_input() {
    let mut desync = desync();
    assert!(desync.activate(Duration::ZERO, Duration::from_millis(600)));
    let end = Duration::from_millis(600);
    desync.advance(end);
    assert!(!desync.is_delaying());
    for action in DELAYED_ACTIONS {
        assert!(desync.is_ready_now(action, end));
    }
    assert!(desync.activate(end, Duration::from_secs(1)), "can reopen afterwards");
}

#[test]
fn swap_restores_standard_mapping_after_duration() {
    let mut desync = desync();
    let scheme = desync.swap_temporarily(Duration::ZERO, Duration::from_secs(6));
    assert_ne!(scheme, ControlScheme::Standard);
    assert_ne!(
        desync.action_for(Key::Primary, Duration::from_secs(1)),
        Action::Attack
    );

    let end = Duration::from_secs(6);
    desync.advance(end);
    assert!(!desync.is_swapped());
    assert_eq!(desync.action_for(Key::Left, end), Action::MoveLeft);
    assert_eq!(desync.action_for(Key::Primary, end), Action::Attack);
}

#[test]
fn swap_and_delay_are_independent() {
    let mut desync = desync();
    assert!(desync.activate(Duration::ZERO, Duration::from_secs(10)));
    let _ = desync.swap_temporarily(Duration::ZERO, Duration::from_secs(1));

    desync.restore_control_scheme();
    assert!(desync.is_delaying(), "restoring controls keeps the delay");

    let _ = desync.swap_temporarily(Duration::ZERO, Duration::from_secs(1));
    desync.clear_desync();
    assert!(desync.is_swapped(), "clearing the delay keeps the swap");
}

#[test]
fn freeze_blocks_everything_until_lifted() {
    let mut desync = desync();
    desync.freeze();
    assert!(!desync.is_ready_now(Action::Jump, Duration::ZERO));
    desync.reset();
    assert!(desync.is_frozen(), "reset leaves the freeze to its owner");
    desync.unfreeze();
    assert!(desync.is_ready_now(Action::Jump, Duration::ZERO));
}

#[test]
fn triple_tap_forces_a_turn_only_when_facing_away() {
    let mut desync = desync();
    let tap = Duration::from_millis(200);
    assert_eq!(desync.register_tap(Facing::Left, Duration::ZERO, Facing::Right), None);
    assert_eq!(desync.register_tap(Facing::Left, tap, Facing::Right), None);
    assert_eq!(
        desync.register_tap(Facing::Left, tap * 2, Facing::Right),
        Some(Facing::Left)
    );

    for step in 3..6 {
        let forced = desync.register_tap(Facing::Left, tap * step, Facing::Left);
        assert_eq!(forced, None, "already facing left");
    }
}

#[test]
fn changing_direction_restarts_the_tap_count() {
    let mut desync = desync();
    let tap = Duration::from_millis(100);
    let _ = desync.register_tap(Facing::Left, Duration::ZERO, Facing::Right);
    let _ = desync.register_tap(Facing::Left, tap, Facing::Right);
    assert_eq!(desync.register_tap(Facing::Right, tap * 2, Facing::Left), None);
}
