//! Headless collaborators that stand in for the player, HUD, exit door,
//! animator and arena while the simulation runs in a terminal.

use std::{cell::RefCell, rc::Rc, time::Duration};

use boss_room_core::{
    hooks::{
        AnimatorHooks, AreaBurst, ArenaHooks, ExitHooks, HealthCue, HudHooks, PlayerHooks,
        Projectile,
    },
    Facing, PlayerState,
};
use boss_room_orchestrator::Collaborators;
use glam::Vec2;

/// What the headless collaborators observed.
#[derive(Debug)]
pub(crate) struct Tally {
    pub(crate) facing: Facing,
    pub(crate) input_enabled: bool,
    pub(crate) boss_beaten: bool,
    pub(crate) exit_enabled: bool,
    pub(crate) glitches: u32,
    pub(crate) dialogs: u32,
    pub(crate) debug_messages: u32,
    pub(crate) fake_cues: u32,
    pub(crate) projectiles: u32,
    pub(crate) area_bursts: u32,
    pub(crate) last_bar: f32,
    pub(crate) dishonest_frames: u64,
}

impl Default for Tally {
    fn default() -> Self {
        Self {
            facing: Facing::Left,
            input_enabled: true,
            boss_beaten: false,
            exit_enabled: false,
            glitches: 0,
            dialogs: 0,
            debug_messages: 0,
            fake_cues: 0,
            projectiles: 0,
            area_bursts: 0,
            last_bar: 1.0,
            dishonest_frames: 0,
        }
    }
}

/// Shared handle implementing every collaborator interface.
#[derive(Clone, Debug)]
pub(crate) struct Headless {
    tally: Rc<RefCell<Tally>>,
    position: Vec2,
}

impl Headless {
    pub(crate) fn new(position: Vec2) -> Self {
        Self {
            tally: Rc::default(),
            position,
        }
    }

    pub(crate) fn tally(&self) -> std::cell::Ref<'_, Tally> {
        self.tally.borrow()
    }

    pub(crate) fn collaborators(&self) -> Collaborators {
        Collaborators {
            player: Some(Box::new(self.clone())),
            hud: Some(Box::new(self.clone())),
            exit: Some(Box::new(self.clone())),
            animator: Some(Box::new(self.clone())),
            arena: Some(Box::new(self.clone())),
        }
    }
}

impl PlayerHooks for Headless {
    fn state(&self) -> PlayerState {
        PlayerState::new(self.position, self.tally.borrow().facing, 0.0)
    }

    fn set_forced_facing(&mut self, facing: Facing) {
        self.tally.borrow_mut().facing = facing;
    }

    fn disable_input(&mut self) {
        self.tally.borrow_mut().input_enabled = false;
    }

    fn restore_input(&mut self) {
        self.tally.borrow_mut().input_enabled = true;
    }

    fn glitch_appearance(&mut self, duration: Duration) {
        self.tally.borrow_mut().glitches += 1;
        tracing::debug!(
            target: "boss_room::cli",
            duration_ms = duration.as_millis() as u64,
            "player glitched"
        );
    }

    fn boss_beaten(&mut self) {
        self.tally.borrow_mut().boss_beaten = true;
        tracing::info!(target: "boss_room::cli", "boss beaten");
    }
}

impl HudHooks for Headless {
    fn update_health_bar(&mut self, fraction: f32, honest: bool) {
        let mut tally = self.tally.borrow_mut();
        tally.last_bar = fraction;
        if !honest {
            tally.dishonest_frames += 1;
        }
    }

    fn show_dialog(&mut self, text: &str, duration: Duration) {
        self.tally.borrow_mut().dialogs += 1;
        tracing::info!(target: "boss_room::cli", secs = duration.as_secs_f32(), "dialog: {text}");
    }

    fn show_debug_message(&mut self, text: &str, _duration: Duration) {
        self.tally.borrow_mut().debug_messages += 1;
        tracing::info!(target: "boss_room::cli", "debug: {text}");
    }

    fn flash_health_bar(&mut self, cue: HealthCue) {
        self.tally.borrow_mut().fake_cues += 1;
        tracing::debug!(target: "boss_room::cli", ?cue, "health bar flashed");
    }
}

impl ExitHooks for Headless {
    fn enable_exit(&mut self) {
        self.tally.borrow_mut().exit_enabled = true;
    }
}

impl AnimatorHooks for Headless {
    fn trigger(&mut self, name: &str) {
        tracing::trace!(target: "boss_room::cli", name, "animator trigger");
    }

    fn set_bool(&mut self, _name: &str, _value: bool) {}

    fn set_float(&mut self, _name: &str, _value: f32) {}
}

impl ArenaHooks for Headless {
    fn spawn_projectile(&mut self, projectile: Projectile) {
        self.tally.borrow_mut().projectiles += 1;
        tracing::trace!(target: "boss_room::cli", ?projectile, "projectile");
    }

    fn area_burst(&mut self, burst: AreaBurst) {
        self.tally.borrow_mut().area_bursts += 1;
        tracing::trace!(target: "boss_room::cli", radius = burst.radius, "area burst");
    }
}
