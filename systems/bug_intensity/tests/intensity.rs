use std::time::Duration;

use boss_room_core::{DeceptionKind, IntensityTier};
use boss_room_system_bug_intensity::{BugIntensity, IntensityTuning};

fn always_collision() -> IntensityTuning {
    IntensityTuning {
        collision_chance: 1.0,
        input_chance: 0.0,
        gaslight_chance: 0.0,
        ui_chance: 0.0,
        ..IntensityTuning::default()
    }
}

#[test]
fn trigger_fires_once_per_interval() {
    let mut intensity = BugIntensity::new(always_collision(), 3);
    let mut triggered = Vec::new();
    for _ in 0..100 {
        if let Some(kind) = intensity.advance(Duration::from_millis(100)) {
            triggered.push(kind);
        }
    }
    assert_eq!(triggered, vec![DeceptionKind::Collision; 2], "5s interval over 10s");
    assert_eq!(intensity.stats().collision, 2);
    assert_eq!(intensity.stats().total(), 2);
}

#[test]
fn paused_controller_never_triggers() {
    let mut intensity = BugIntensity::new(always_collision(), 3);
    let tier = intensity.set_tier(IntensityTier::Paused);
    assert_eq!(tier, IntensityTier::Paused);
    for _ in 0..100 {
        assert_eq!(intensity.advance(Duration::from_secs(1)), None);
    }
    assert_eq!(intensity.stats().total(), 0);
}

#[test]
fn resume_rederives_tier_from_value() {
    let mut intensity = BugIntensity::new(IntensityTuning::default(), 3);
    assert_eq!(intensity.increase_by(0.7), Some(IntensityTier::Aggressive));
    intensity.pause();
    assert_eq!(intensity.tier(), IntensityTier::Paused);
    assert_eq!(intensity.increase_by(0.1), None, "tier stays paused");
    assert_eq!(intensity.resume(), IntensityTier::Aggressive);
    assert!((intensity.state().value() - 0.8).abs() < 1e-6);
}

#[test]
fn increase_is_clamped_and_reports_tier_changes_only() {
    let mut intensity = BugIntensity::new(IntensityTuning::default(), 3);
    assert_eq!(intensity.increase_by(0.1), None);
    assert_eq!(intensity.increase_by(0.1), None);
    assert_eq!(intensity.increase_by(0.3), Some(IntensityTier::Aggressive));
    for _ in 0..20 {
        let _ = intensity.increase_by(0.1);
    }
    assert_eq!(intensity.state().value(), 1.0);
    assert_eq!(intensity.increase_by(f32::NAN), None);
    assert_eq!(intensity.state().value(), 1.0);
}

#[test]
fn identical_seeds_trigger_identically() {
    let run = |seed| {
        let mut intensity = BugIntensity::new(IntensityTuning::default(), seed);
        let _ = intensity.set_tier(IntensityTier::Aggressive);
        (0..600)
            .filter_map(|_| intensity.advance(Duration::from_millis(100)))
            .collect::<Vec<_>>()
    };
    let first = run(77);
    assert_eq!(first, run(77));
    assert!(first.len() <= 30, "at most one bug per 2s interval");
}
