use std::time::Duration;

use boss_room_system_ui_betrayal::{PanelId, UiBetrayal, UiNotice, LOADING_MESSAGES};
use glam::Vec2;

fn ui_with_panels(seed: u64) -> UiBetrayal {
    let mut ui = UiBetrayal::new(seed);
    ui.register_panel(PanelId::new(0), Vec2::new(0.0, 0.0));
    ui.register_panel(PanelId::new(1), Vec2::new(10.0, 0.0));
    ui.register_panel(PanelId::new(2), Vec2::new(0.0, 10.0));
    ui
}

fn sorted(mut positions: Vec<Vec2>) -> Vec<Vec2> {
    positions.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    positions
}

#[test]
fn shuffle_holds_a_permutation_and_returns_home() {
    let mut ui = ui_with_panels(4);
    let origins: Vec<Vec2> = ui
        .panel_positions(Duration::ZERO)
        .into_iter()
        .map(|(_, position)| position)
        .collect();

    assert!(ui.shuffle(Duration::ZERO, Duration::from_secs(5)));
    let held: Vec<Vec2> = ui
        .panel_positions(Duration::from_secs(2))
        .into_iter()
        .map(|(_, position)| position)
        .collect();
    assert_eq!(sorted(held), sorted(origins.clone()));

    let end = Duration::from_secs(5);
    let returned: Vec<Vec2> = ui
        .panel_positions(end)
        .into_iter()
        .map(|(_, position)| position)
        .collect();
    assert_eq!(returned, origins);

    ui.advance(end);
    assert!(!ui.is_shuffling());
}

#[test]
fn shuffle_needs_two_panels() {
    let mut ui = UiBetrayal::new(1);
    assert!(!ui.shuffle(Duration::ZERO, Duration::from_secs(5)));
    ui.register_panel(PanelId::new(0), Vec2::ZERO);
    assert!(!ui.shuffle(Duration::ZERO, Duration::from_secs(5)));
    assert_eq!(
        ui.panel_position(PanelId::new(0), Duration::from_secs(1)),
        Some(Vec2::ZERO)
    );
}

#[test]
fn popups_expire_or_can_be_dismissed() {
    let mut ui = UiBetrayal::new(2);
    let first = ui.spawn_transient_popup(Duration::ZERO);
    let second = ui.spawn_transient_popup(Duration::ZERO);
    assert_ne!(first, second);
    for popup in ui.popups() {
        assert!(popup.expires_at >= Duration::from_secs(8));
        assert!(popup.expires_at <= Duration::from_secs(15));
    }

    assert!(ui.dismiss_popup(first));
    assert!(!ui.dismiss_popup(first));
    ui.advance(Duration::from_secs(7));
    assert_eq!(ui.popups().len(), 1);
    ui.advance(Duration::from_secs(16));
    assert!(ui.popups().is_empty());
}

#[test]
fn random_bugs_wait_for_betrayal() {
    let mut ui = ui_with_panels(3);
    assert_eq!(ui.trigger_random_bug(Duration::ZERO), None);
    ui.start_betrayal();
    for step in 0..20 {
        assert!(ui.trigger_random_bug(Duration::from_secs(step)).is_some());
    }
}

#[test]
fn reset_all_restores_the_honest_hud_but_keeps_loading() {
    let mut ui = ui_with_panels(5);
    ui.start_betrayal();
    ui.show_persistent_loading(Duration::ZERO);
    assert!(ui.shuffle(Duration::ZERO, Duration::from_secs(5)));
    let _ = ui.spawn_transient_popup(Duration::ZERO);
    ui.show_fake_error(Duration::ZERO);
    ui.show_misleading_tooltip(Duration::ZERO);

    ui.reset_all();

    assert!(!ui.is_betrayal_active());
    assert!(!ui.is_shuffling());
    assert!(ui.popups().is_empty());
    assert_eq!(ui.current_message(), None);
    assert_eq!(ui.current_debug_message(), None);
    assert_eq!(
        ui.panel_position(PanelId::new(1), Duration::from_secs(1)),
        Some(Vec2::new(10.0, 0.0))
    );
    assert_eq!(ui.loading_text(Duration::ZERO), Some(LOADING_MESSAGES[0]));

    ui.hide_loading();
    assert_eq!(ui.loading_text(Duration::ZERO), None);
}

#[test]
fn loading_rotation_counts_from_when_it_appeared() {
    let mut ui = UiBetrayal::new(6);
    ui.show_persistent_loading(Duration::from_secs(100));
    ui.show_persistent_loading(Duration::from_secs(101));
    assert_eq!(
        ui.loading_text(Duration::from_secs(102)),
        Some(LOADING_MESSAGES[1])
    );
}

#[test]
fn messages_are_queued_for_the_hud_and_expire() {
    let mut ui = UiBetrayal::new(7);
    ui.show_message(Duration::ZERO, "Update Complete!", Duration::from_secs(2));
    ui.show_debug_message(Duration::ZERO, "Debug: trace", Duration::from_secs(1));

    let notices = ui.take_notices();
    assert_eq!(notices.len(), 2);
    assert!(matches!(&notices[0], UiNotice::Dialog { text, .. } if text == "Update Complete!"));
    assert!(ui.take_notices().is_empty());

    ui.advance(Duration::from_secs(1));
    assert_eq!(ui.current_debug_message(), None);
    assert_eq!(ui.current_message(), Some("Update Complete!"));
    ui.advance(Duration::from_secs(2));
    assert_eq!(ui.current_message(), None);
}
