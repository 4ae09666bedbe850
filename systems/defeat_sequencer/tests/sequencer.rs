use std::time::Duration;

use boss_room_system_defeat_sequencer::{
    DefeatScript, DefeatSequencer, DefeatStep, CRASH_LINE, OPENING_LINE,
};

#[test]
fn script_runs_once_per_arming() {
    let mut sequencer = DefeatSequencer::new();
    let script = sequencer.run().expect("first run yields the script");
    assert_eq!(script, DefeatScript::standard());
    assert!(sequencer.is_running());
    assert!(sequencer.run().is_none());

    sequencer.finish();
    assert!(sequencer.is_finished());
    assert!(sequencer.run().is_none());

    sequencer.rearm();
    assert!(sequencer.run().is_some());
}

#[test]
fn script_order_matches_the_defeat_beats() {
    let steps: Vec<DefeatStep> = DefeatScript::standard()
        .into_iter()
        .map(|(step, _)| step)
        .collect();

    assert!(matches!(
        steps.first(),
        Some(DefeatStep::ShowMessage { text, .. }) if *text == OPENING_LINE
    ));
    let position = |wanted: DefeatStep| steps.iter().position(|step| *step == wanted);
    let freeze = position(DefeatStep::FreezeInput).expect("freeze step");
    let pause = position(DefeatStep::PauseDeception).expect("pause step");
    let exit = position(DefeatStep::EnableExit).expect("exit step");
    let restore = position(DefeatStep::RestoreInput).expect("restore step");
    assert!(pause < freeze && freeze < exit && exit < restore);
    assert_eq!(steps.last(), Some(&DefeatStep::Complete));
}

#[test]
fn crash_line_outlives_its_wait() {
    let (step, wait) = DefeatScript::standard()
        .into_iter()
        .find(|(step, _)| {
            matches!(step, DefeatStep::ShowMessage { text, .. } if *text == CRASH_LINE)
        })
        .expect("crash line present");
    let DefeatStep::ShowMessage { duration, .. } = step else {
        unreachable!("filtered above");
    };
    assert_eq!(duration, Duration::from_secs(4));
    assert_eq!(wait, Duration::from_secs(2));
}
