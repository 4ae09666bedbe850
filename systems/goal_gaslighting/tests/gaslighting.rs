use std::time::Duration;

use boss_room_core::{HealthSnapshot, IntensityTier};
use boss_room_system_goal_gaslighting::{
    GaslightChances, GaslightEffect, GaslightTuning, GoalGaslighting,
};

fn only(fake_damage: f32, fake_heal: f32, wrong_marker: f32) -> GaslightTuning {
    let chances = GaslightChances {
        fake_damage,
        prevent_damage: 0.0,
        fake_heal,
        wrong_marker,
    };
    GaslightTuning {
        mild: chances,
        aggressive: chances,
        ..GaslightTuning::default()
    }
}

#[test]
fn hits_are_never_blocked_outside_a_window() {
    let mut gaslighting = GoalGaslighting::new(GaslightTuning::default(), 1);
    gaslighting.set_tier(IntensityTier::Aggressive);
    for _ in 0..10_000 {
        assert!(!gaslighting.should_block_damage());
        assert_eq!(gaslighting.fake_miss_drop(10.0), None);
    }
}

#[test]
fn block_rate_tracks_tier_chance() {
    let mut gaslighting = GoalGaslighting::new(GaslightTuning::default(), 2);
    gaslighting.set_tier(IntensityTier::Aggressive);
    gaslighting.activate(Duration::ZERO, Duration::from_secs(60));
    let blocked = (0..10_000)
        .filter(|_| gaslighting.should_block_damage())
        .count();
    assert!((2_700..3_300).contains(&blocked), "blocked {blocked} of 10000");
}

#[test]
fn fake_damage_reconciles_back_to_real_health() {
    let mut gaslighting = GoalGaslighting::new(only(1.0, 0.0, 0.0), 3);
    gaslighting.activate(Duration::ZERO, Duration::from_secs(30));

    let mut effects = Vec::new();
    gaslighting.advance(
        Duration::ZERO,
        HealthSnapshot::new(100.0, 100.0, 100.0),
        &mut effects,
    );
    let [GaslightEffect::FakeDamage { amount }] = effects.as_slice() else {
        panic!("expected a single fake damage event, got {effects:?}");
    };
    assert!((5.0..15.0).contains(amount));
    assert!(gaslighting.is_showing_fake());

    let mut displayed = 100.0 - amount;
    let dt = Duration::from_millis(100);
    let mut steps = 0;
    while gaslighting.is_showing_fake() {
        let next =
            gaslighting.displayed_health(HealthSnapshot::new(100.0, displayed, 100.0), dt);
        assert!(next >= displayed, "bar only drifts toward truth");
        displayed = next;
        steps += 1;
        assert!(steps < 100, "reconciliation must finish");
    }
    assert_eq!(displayed, 100.0);
}

#[test]
fn fake_damage_is_ineligible_while_already_faking() {
    let mut gaslighting = GoalGaslighting::new(only(1.0, 0.0, 0.0), 4);
    gaslighting.activate(Duration::ZERO, Duration::from_secs(30));
    let health = HealthSnapshot::new(100.0, 100.0, 100.0);

    let mut effects = Vec::new();
    gaslighting.advance(Duration::ZERO, health, &mut effects);
    assert_eq!(effects.len(), 1);

    gaslighting.advance(Duration::from_secs(5), health, &mut effects);
    assert_eq!(effects.len(), 1, "no second fake damage while the first shows");
}

#[test]
fn fake_heal_carries_a_patch_notice() {
    let mut gaslighting = GoalGaslighting::new(only(0.0, 1.0, 0.0), 5);
    gaslighting.activate(Duration::ZERO, Duration::from_secs(30));
    let mut effects = Vec::new();
    gaslighting.advance(
        Duration::ZERO,
        HealthSnapshot::new(50.0, 50.0, 100.0),
        &mut effects,
    );
    match effects.as_slice() {
        [GaslightEffect::FakeHeal { amount, notice }] => {
            assert!((3.0..8.0).contains(amount));
            assert!(notice.starts_with("Auto-Heal Patch Applied (+"));
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn events_are_spaced_by_the_event_interval() {
    let mut gaslighting = GoalGaslighting::new(only(0.0, 1.0, 0.0), 6);
    gaslighting.activate(Duration::ZERO, Duration::from_secs(20));
    let health = HealthSnapshot::new(100.0, 100.0, 100.0);
    let mut effects = Vec::new();
    let mut now = Duration::ZERO;
    while now < Duration::from_secs(20) {
        gaslighting.advance(now, health, &mut effects);
        now += Duration::from_millis(100);
    }
    gaslighting.advance(now, health, &mut effects);
    assert!(effects.len() >= 7, "one event per 1-3s, got {}", effects.len());
    assert!(effects.len() <= 20);
    assert!(!gaslighting.is_active(), "window closed at its end");
}

#[test]
fn window_end_restores_truthful_display() {
    let mut gaslighting = GoalGaslighting::new(only(1.0, 0.0, 0.0), 7);
    gaslighting.register_markers(3);
    gaslighting.activate(Duration::ZERO, Duration::from_secs(4));
    let mut effects = Vec::new();
    gaslighting.advance(
        Duration::ZERO,
        HealthSnapshot::new(90.0, 90.0, 100.0),
        &mut effects,
    );

    gaslighting.advance(
        Duration::from_secs(4),
        HealthSnapshot::new(90.0, 80.0, 100.0),
        &mut effects,
    );
    assert!(!gaslighting.is_active());
    let shown = gaslighting.displayed_health(
        HealthSnapshot::new(90.0, 80.0, 100.0),
        Duration::from_millis(16),
    );
    assert_eq!(shown, 90.0);
    assert_eq!(gaslighting.correct_marker(), 0);
}

#[test]
fn wrong_marker_hits_fake_damage_only_while_active() {
    let mut gaslighting = GoalGaslighting::new(only(0.0, 0.0, 1.0), 8);
    gaslighting.register_markers(3);
    assert!(gaslighting.is_marker_correct(0));
    assert!(!gaslighting.is_marker_correct(5));
    assert_eq!(gaslighting.on_player_attack(2, 100.0), None);

    gaslighting.activate(Duration::ZERO, Duration::from_secs(5));
    assert_eq!(gaslighting.on_player_attack(0, 100.0), None);
    assert!(matches!(
        gaslighting.on_player_attack(2, 100.0),
        Some(GaslightEffect::FakeDamage { .. })
    ));
}

#[test]
fn periodic_window_length_follows_tier() {
    let mut gaslighting = GoalGaslighting::new(GaslightTuning::default(), 9);
    assert_eq!(gaslighting.window_for_tier(), Duration::from_secs(5));
    gaslighting.set_tier(IntensityTier::Aggressive);
    assert_eq!(gaslighting.window_for_tier(), Duration::from_secs(8));
}

#[test]
fn second_wrong_marker_hit_does_not_stack_fake_damage() {
    let mut gaslighting = GoalGaslighting::new(only(0.0, 0.0, 1.0), 10);
    gaslighting.register_markers(3);
    gaslighting.activate(Duration::ZERO, Duration::from_secs(10));

    assert!(matches!(
        gaslighting.on_player_attack(1, 100.0),
        Some(GaslightEffect::FakeDamage { .. })
    ));
    assert!(gaslighting.is_showing_fake());
    assert_eq!(gaslighting.on_player_attack(2, 100.0), None);

    let settled = gaslighting.displayed_health(
        HealthSnapshot::new(100.0, 100.0, 100.0),
        Duration::from_millis(16),
    );
    assert_eq!(settled, 100.0);
    assert!(!gaslighting.is_showing_fake());
    assert!(matches!(
        gaslighting.on_player_attack(2, 100.0),
        Some(GaslightEffect::FakeDamage { .. })
    ));
}
