use boss_room_orchestrator::{
    Collaborators, ConfigError, FightConfig, FightOrchestrator, OrchestratorTuning,
};

#[test]
fn partial_toml_keeps_defaults_for_missing_keys() {
    let config = FightConfig::from_toml_str(
        r#"
            seed = 42

            [fight]
            max_health = 250.0

            [orchestrator]
            base_move_speed = 3.0
            anchors = [[4.0, 2.0], [-4.0, 2.0]]
        "#,
    )
    .expect("valid configuration");

    assert_eq!(config.seed, 42);
    assert_eq!(config.fight.max_health, 250.0);
    assert_eq!(config.fight.phase1_duration_secs, 150.0);
    assert_eq!(config.orchestrator.base_move_speed, 3.0);
    assert_eq!(config.orchestrator.anchors.len(), 2);
    assert_eq!(
        config.orchestrator.glitch_chance,
        OrchestratorTuning::default().glitch_chance
    );

    let mut orchestrator = FightOrchestrator::from_config(config, Collaborators::default());
    orchestrator.start();
    assert_eq!(orchestrator.health().max(), 250.0);
    assert_eq!(orchestrator.move_speed(), 3.0);
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let error = FightConfig::from_toml_str("seed = \"not a number\"").unwrap_err();
    assert!(matches!(error, ConfigError::Parse(_)));
}

#[test]
fn missing_file_reports_its_path() {
    let error = FightConfig::from_path("definitely/not/here.toml").unwrap_err();
    match error {
        ConfigError::Read { path, .. } => assert!(path.ends_with("here.toml")),
        ConfigError::Parse(_) => panic!("expected a read error"),
    }
}

#[test]
fn unusable_values_are_sanitized_on_construction() {
    let mut config = FightConfig::default();
    config.orchestrator.base_move_speed = -1.0;
    config.fight.max_health = f32::NAN;
    let orchestrator = FightOrchestrator::from_config(config, Collaborators::default());
    assert_eq!(orchestrator.move_speed(), 2.5);
    assert_eq!(orchestrator.health().max(), 100.0);
    assert_eq!(orchestrator.config().orchestrator.base_move_speed, 2.5);
}
