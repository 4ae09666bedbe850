use std::time::Duration;

use boss_room_core::{Command, Event, Phase, PhaseCause};
use boss_room_world::{self as world, query, FightRules, World};

fn started_world() -> World {
    let mut world = World::default();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartFight, &mut events);
    assert_eq!(events, vec![Event::FightStarted { max_health: 100.0 }]);
    world
}

fn tick_for(world: &mut World, total: Duration, step: Duration, events: &mut Vec<Event>) {
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        world::apply(world, Command::Tick { dt: step }, events);
        elapsed += step;
    }
}

fn phase_changes(events: &[Event]) -> Vec<(Phase, PhaseCause)> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::PhaseChanged { to, cause, .. } => Some((*to, *cause)),
            _ => None,
        })
        .collect()
}

#[test]
fn three_heavy_hits_walk_through_every_phase() {
    let mut world = started_world();
    let mut events = Vec::new();

    for expected in [60.0, 20.0, 0.0] {
        world::apply(&mut world, Command::ApplyDamage { amount: 40.0 }, &mut events);
        assert_eq!(query::health(&world).real(), expected);
    }

    assert_eq!(
        phase_changes(&events),
        vec![
            (Phase::Phase2, PhaseCause::HealthThreshold),
            (Phase::Defeated, PhaseCause::HealthDepleted),
        ]
    );
    assert!(!query::is_active(&world));
    assert_eq!(query::health(&world).displayed(), 0.0);
}

#[test]
fn phase_two_begins_exactly_at_phase_one_duration() {
    let mut world = started_world();
    let mut events = Vec::new();

    tick_for(
        &mut world,
        Duration::from_secs(149),
        Duration::from_secs(1),
        &mut events,
    );
    assert_eq!(query::phase(&world), Phase::Phase1);

    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
        &mut events,
    );
    assert_eq!(query::phase(&world), Phase::Phase2);
    assert_eq!(query::elapsed(&world), Duration::from_secs(150));
    assert_eq!(
        phase_changes(&events),
        vec![(Phase::Phase2, PhaseCause::TimeLimit)]
    );
}

#[test]
fn escalation_fires_every_interval() {
    let mut world = started_world();
    let mut events = Vec::new();

    tick_for(
        &mut world,
        Duration::from_secs(95),
        Duration::from_millis(500),
        &mut events,
    );

    let levels: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            Event::EscalationDue { level } => Some(*level),
            _ => None,
        })
        .collect();
    assert_eq!(levels, vec![1, 2, 3]);
    assert_eq!(
        query::fight(&world).next_escalation(),
        Duration::from_secs(120)
    );
}

#[test]
fn large_tick_reports_every_missed_escalation() {
    let mut world = started_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(65),
        },
        &mut events,
    );
    let count = events
        .iter()
        .filter(|event| matches!(event, Event::EscalationDue { .. }))
        .count();
    assert_eq!(count, 2);
}

#[test]
fn safety_timeout_forces_defeat_in_the_same_tick() {
    let mut world = started_world();
    let mut events = Vec::new();
    world::apply(&mut world, Command::ApplyDamage { amount: 65.0 }, &mut events);
    assert_eq!(query::health(&world).real(), 35.0);

    tick_for(
        &mut world,
        Duration::from_secs(420),
        Duration::from_secs(1),
        &mut events,
    );

    assert_eq!(query::phase(&world), Phase::Defeated);
    assert_eq!(query::health(&world).real(), 0.0);
    assert_eq!(query::elapsed(&world), Duration::from_secs(420));
    assert_eq!(
        phase_changes(&events).last(),
        Some(&(Phase::Defeated, PhaseCause::SafetyTimeout))
    );
}

#[test]
fn damage_is_ignored_once_defeated() {
    let mut world = started_world();
    let mut events = Vec::new();
    world::apply(&mut world, Command::ApplyDamage { amount: 500.0 }, &mut events);
    assert_eq!(query::phase(&world), Phase::Defeated);

    events.clear();
    world::apply(&mut world, Command::ApplyDamage { amount: 10.0 }, &mut events);
    assert_eq!(events, vec![Event::DamageIgnored { requested: 10.0 }]);

    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
        &mut events,
    );
    assert_eq!(query::elapsed(&world), Duration::ZERO, "clock frozen");
}

#[test]
fn displayed_health_moves_independently_of_real() {
    let mut world = started_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::NudgeDisplayedHealth { delta: -12.5 },
        &mut events,
    );
    let health = query::health(&world);
    assert_eq!(health.displayed(), 87.5);
    assert_eq!(health.real(), 100.0);
    assert!(events.is_empty());
}

#[test]
fn stop_halts_without_defeat() {
    let mut world = started_world();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StopFight, &mut events);
    assert_eq!(events, vec![Event::FightStopped]);
    assert_eq!(query::phase(&world), Phase::Phase1);
    assert!(!query::is_active(&world));
}

#[test]
fn rules_deserialize_partially_and_sanitize() {
    let rules: FightRules =
        toml::from_str("max_health = -4.0\nphase1_duration_secs = 900.0").expect("valid toml");
    let rules = rules.sanitized();
    assert_eq!(rules.max_health, 100.0);
    assert_eq!(rules.phase1_duration_secs, rules.total_fight_duration_secs);
    assert_eq!(rules.escalation_interval_secs, 30.0);
}
