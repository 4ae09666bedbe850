#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc, time::Duration};

use boss_room_core::{
    hooks::{
        AnimatorHooks, AreaBurst, ArenaHooks, ExitHooks, HealthCue, HudHooks, PlayerHooks,
        Projectile,
    },
    Facing, PlayerState,
};
use boss_room_orchestrator::{Collaborators, FightOrchestrator};
use glam::Vec2;

pub const STEP: Duration = Duration::from_millis(100);

/// Everything the collaborators were asked to do.
#[derive(Debug, Default)]
pub struct Log {
    pub health_bar: Vec<(f32, bool)>,
    pub dialogs: Vec<String>,
    pub debug_messages: Vec<String>,
    pub flashes: Vec<HealthCue>,
    pub exit_enabled: bool,
    pub input_disabled: u32,
    pub input_restored: u32,
    pub boss_beaten: u32,
    pub glitches: u32,
    pub forced_facing: Vec<Facing>,
    pub triggers: Vec<String>,
    pub projectiles: Vec<Projectile>,
    pub area_bursts: Vec<AreaBurst>,
}

/// Recording stand-in for every collaborator.
#[derive(Clone, Debug, Default)]
pub struct Probe {
    pub log: Rc<RefCell<Log>>,
}

impl Probe {
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            player: Some(Box::new(self.clone())),
            hud: Some(Box::new(self.clone())),
            exit: Some(Box::new(self.clone())),
            animator: Some(Box::new(self.clone())),
            arena: Some(Box::new(self.clone())),
        }
    }
}

impl PlayerHooks for Probe {
    fn state(&self) -> PlayerState {
        PlayerState::new(Vec2::new(6.0, 0.0), Facing::Left, 0.0)
    }

    fn set_forced_facing(&mut self, facing: Facing) {
        self.log.borrow_mut().forced_facing.push(facing);
    }

    fn disable_input(&mut self) {
        self.log.borrow_mut().input_disabled += 1;
    }

    fn restore_input(&mut self) {
        self.log.borrow_mut().input_restored += 1;
    }

    fn glitch_appearance(&mut self, _duration: Duration) {
        self.log.borrow_mut().glitches += 1;
    }

    fn boss_beaten(&mut self) {
        self.log.borrow_mut().boss_beaten += 1;
    }
}

impl HudHooks for Probe {
    fn update_health_bar(&mut self, fraction: f32, honest: bool) {
        self.log.borrow_mut().health_bar.push((fraction, honest));
    }

    fn show_dialog(&mut self, text: &str, _duration: Duration) {
        self.log.borrow_mut().dialogs.push(text.to_owned());
    }

    fn show_debug_message(&mut self, text: &str, _duration: Duration) {
        self.log.borrow_mut().debug_messages.push(text.to_owned());
    }

    fn flash_health_bar(&mut self, cue: HealthCue) {
        self.log.borrow_mut().flashes.push(cue);
    }
}

impl ExitHooks for Probe {
    fn enable_exit(&mut self) {
        self.log.borrow_mut().exit_enabled = true;
    }
}

impl AnimatorHooks for Probe {
    fn trigger(&mut self, name: &str) {
        self.log.borrow_mut().triggers.push(name.to_owned());
    }

    fn set_bool(&mut self, _name: &str, _value: bool) {}

    fn set_float(&mut self, _name: &str, _value: f32) {}
}

impl ArenaHooks for Probe {
    fn spawn_projectile(&mut self, projectile: Projectile) {
        self.log.borrow_mut().projectiles.push(projectile);
    }

    fn area_burst(&mut self, burst: AreaBurst) {
        self.log.borrow_mut().area_bursts.push(burst);
    }
}

pub fn tick_for(orchestrator: &mut FightOrchestrator, total: Duration) {
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        orchestrator.tick(STEP);
        elapsed += STEP;
    }
}
