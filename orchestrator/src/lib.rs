#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fight orchestration for the Boss Room encounter.
//!
//! [`FightOrchestrator`] is the single writer of the fight. It pushes commands
//! into the [`World`], reacts to the events coming back, and drives the
//! deception subsystems and collaborators in a fixed order every tick:
//!
//! 1. world tick: clock, escalation, phase checks, safety timeout;
//! 2. timeline steps that became due;
//! 3. subsystem timeouts and deceptive events;
//! 4. displayed-health reconciliation and the health bar;
//! 5. phase reactions (phase two entry, defeat script);
//! 6. attacks, projectile cadence and random bugs, only while the fight is
//!    active and the phase two update is not installing;
//! 7. boss motion and animator parameters.
//!
//! Every subsystem and collaborator is optional. A missing one turns its calls
//! into no-ops and never aborts a tick.

mod config;
mod directive;
mod motion;

use std::time::Duration;

use boss_room_core::{
    derive_seed,
    hooks::{
        AnimatorHooks, AreaBurst, ArenaHooks, ExitHooks, HealthCue, HudHooks, PlayerHooks,
        Projectile,
    },
    seconds, AttackKind, Command, DeceptionKind, Event, Facing, FightSnapshot, HealthSnapshot,
    IntensityState, IntensityTier, Phase, TaskGroup, RNG_STREAM_COLLISION, RNG_STREAM_GASLIGHT,
    RNG_STREAM_INPUT, RNG_STREAM_INTENSITY, RNG_STREAM_ORCHESTRATOR, RNG_STREAM_SCHEDULER,
    RNG_STREAM_UI,
};
use boss_room_system_attack_scheduler::{
    AttackScheduler, FiredAttack, PairedStrike, ProjectileCadence, Volley,
};
use boss_room_system_bug_intensity::{BugIntensity, BugStats};
use boss_room_system_collision_paradox::{CollisionParadox, ObstacleId};
use boss_room_system_defeat_sequencer::{DefeatSequencer, DefeatStep};
use boss_room_system_goal_gaslighting::{GaslightEffect, GoalGaslighting};
use boss_room_system_input_desync::{Action, ControlScheme, InputDesync, Key};
use boss_room_system_ui_betrayal::{PanelId, UiBetrayal, UiNotice};
use boss_room_tasks::{Script, TaskHandle, Timeline};
use boss_room_world::{self as world, query, World};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use crate::config::{ConfigError, FightConfig, OrchestratorTuning};
use crate::{directive::Directive, motion::BossMotion};

/// RNG stream mixed into the fight seed for the ambient projectile cadence.
const RNG_STREAM_CADENCE: u64 = 0x3c6e_f372_fe94_f82b;

const UPDATE_ANNOUNCEMENT: &str = "Installing Workplace Optimization Update...";
const UPDATE_COMPLETE: &str = "Update Complete! Optimizations Applied.";
const NETWORK_TIMEOUT: &str = "Network Timeout";
const CONTROLS_UPDATED: &str = "Controls Updated to Optimize Workflow";
const CONTROLS_UPDATED_SECS: f32 = 1.5;
const DEBUG_MESSAGE_SECS: f32 = 4.0;
const NOTICE_SECS: f32 = 4.0;
/// Shortest gap between two glitch rolls.
const MIN_GLITCH_GAP: Duration = Duration::from_millis(100);

/// Deception subsystems and scripts driven by the orchestrator.
#[derive(Debug, Default)]
pub struct Subsystems {
    /// Weighted attack scheduler.
    pub scheduler: Option<AttackScheduler>,
    /// Ambient projectile fire.
    pub cadence: Option<ProjectileCadence>,
    /// Intensity controller and random-bug trigger.
    pub intensity: Option<BugIntensity>,
    /// Collision paradox.
    pub collision: Option<CollisionParadox>,
    /// Input desync.
    pub input: Option<InputDesync>,
    /// Goal gaslighting.
    pub gaslighting: Option<GoalGaslighting>,
    /// UI betrayal.
    pub ui: Option<UiBetrayal>,
    /// Defeat script gate.
    pub defeat: Option<DefeatSequencer>,
}

impl Subsystems {
    /// Builds every subsystem from `config`, each seeded from its own stream.
    #[must_use]
    pub fn from_config(config: &FightConfig) -> Self {
        let seed = config.seed;
        Self {
            scheduler: Some(AttackScheduler::new(
                config.attacks.clone(),
                derive_seed(seed, RNG_STREAM_SCHEDULER),
            )),
            cadence: Some(ProjectileCadence::new(
                config.cadence,
                derive_seed(seed, RNG_STREAM_CADENCE),
            )),
            intensity: Some(BugIntensity::new(
                config.intensity,
                derive_seed(seed, RNG_STREAM_INTENSITY),
            )),
            collision: Some(CollisionParadox::new(derive_seed(seed, RNG_STREAM_COLLISION))),
            input: Some(InputDesync::new(
                config.desync,
                derive_seed(seed, RNG_STREAM_INPUT),
            )),
            gaslighting: Some(GoalGaslighting::new(
                config.gaslighting,
                derive_seed(seed, RNG_STREAM_GASLIGHT),
            )),
            ui: Some(UiBetrayal::new(derive_seed(seed, RNG_STREAM_UI))),
            defeat: Some(DefeatSequencer::new()),
        }
    }

    /// No subsystem at all: the fight runs on the phase machine alone.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Collaborators living outside the encounter core.
#[derive(Default)]
pub struct Collaborators {
    /// Player character.
    pub player: Option<Box<dyn PlayerHooks>>,
    /// Health bar, dialogs and debug console.
    pub hud: Option<Box<dyn HudHooks>>,
    /// Arena exit door.
    pub exit: Option<Box<dyn ExitHooks>>,
    /// Boss animator.
    pub animator: Option<Box<dyn AnimatorHooks>>,
    /// Projectile and area damage host.
    pub arena: Option<Box<dyn ArenaHooks>>,
}

/// Drives one boss encounter.
pub struct FightOrchestrator {
    config: FightConfig,
    world: World,
    timeline: Timeline<Directive>,
    systems: Subsystems,
    hooks: Collaborators,
    motion: BossMotion,
    move_speed: f32,
    phase2_entry: Option<TaskHandle>,
    glitch: Option<TaskHandle>,
    journal: Vec<Event>,
    rng: ChaCha8Rng,
}

impl FightOrchestrator {
    /// Creates an idle orchestrator. The configuration is sanitized first.
    #[must_use]
    pub fn new(config: FightConfig, systems: Subsystems, hooks: Collaborators) -> Self {
        let config = config.sanitized();
        let tuning = &config.orchestrator;
        Self {
            world: World::new(config.fight),
            timeline: Timeline::new(),
            systems,
            hooks,
            motion: BossMotion::new(Vec2::from_array(tuning.boss_start)),
            move_speed: tuning.base_move_speed,
            phase2_entry: None,
            glitch: None,
            journal: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(derive_seed(config.seed, RNG_STREAM_ORCHESTRATOR)),
            config,
        }
    }

    /// Creates an orchestrator with every subsystem built from `config`.
    #[must_use]
    pub fn from_config(config: FightConfig, hooks: Collaborators) -> Self {
        let config = config.sanitized();
        let systems = Subsystems::from_config(&config);
        Self::new(config, systems, hooks)
    }

    /// Starts a fresh fight. Ignored while a fight is active.
    pub fn start(&mut self) {
        if query::is_active(&self.world) {
            tracing::debug!(target: "boss_room::fight", "start ignored; fight already active");
            return;
        }
        let _ = self.cancel_tasks(None);
        self.reset_deception();
        let now = self.now();
        if let Some(input) = self.systems.input.as_mut() {
            input.unfreeze();
        }
        if let Some(ui) = self.systems.ui.as_mut() {
            ui.hide_loading();
        }
        if let Some(scheduler) = self.systems.scheduler.as_mut() {
            scheduler.reset(now);
        }
        if let Some(cadence) = self.systems.cadence.as_mut() {
            cadence.reset(now);
        }
        if let Some(defeat) = self.systems.defeat.as_mut() {
            defeat.rearm();
        }
        self.move_speed = self.config.orchestrator.base_move_speed;
        self.motion = BossMotion::new(Vec2::from_array(self.config.orchestrator.boss_start));

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::StartFight, &mut events);
        self.record(&events);

        if let Some(intensity) = self.systems.intensity.as_mut() {
            let _ = intensity.resume();
        }
        self.set_intensity_tier(IntensityTier::Mild);
        if let Some(animator) = self.hooks.animator.as_mut() {
            animator.trigger("StartFight");
        }
        tracing::info!(
            target: "boss_room::fight",
            max_health = query::health(&self.world).max(),
            "fight started"
        );
        self.forward_notices();
    }

    /// Advances the encounter by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        self.record(&events);
        for event in &events {
            if let Event::EscalationDue { level } = event {
                self.escalate(*level);
            }
        }

        let mut due = Vec::new();
        self.timeline.advance(dt, &mut due);
        self.run_directives(due);

        self.advance_subsystems();
        self.reconcile_health(dt);

        self.react_to_phases(&events);

        if query::is_active(&self.world) && !self.is_entering_phase2() {
            self.run_attacks(dt);
        }

        self.update_motion(dt);
        self.forward_notices();
    }

    /// Single entry point for damage dealt to the boss. Returns the damage
    /// that reached real health.
    pub fn request_damage(&mut self, amount: f32) -> f32 {
        if !query::is_active(&self.world) {
            let mut events = Vec::new();
            world::apply(&mut self.world, Command::ApplyDamage { amount }, &mut events);
            self.record(&events);
            return 0.0;
        }

        if let Some(gaslighting) = self.systems.gaslighting.as_mut() {
            if gaslighting.should_block_damage() {
                let drop = gaslighting.fake_miss_drop(amount);
                self.journal.push(Event::DamageBlocked { requested: amount });
                self.flash(HealthCue::FakeMiss);
                if let Some(drop) = drop {
                    self.nudge_displayed(-drop);
                }
                tracing::debug!(target: "boss_room::fight", amount, "damage discarded");
                return 0.0;
            }
        }

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::ApplyDamage { amount }, &mut events);
        self.record(&events);
        let applied = events
            .iter()
            .find_map(|event| match event {
                Event::DamageApplied { applied, .. } => Some(*applied),
                _ => None,
            })
            .unwrap_or(0.0);
        self.react_to_phases(&events);
        self.forward_notices();
        applied
    }

    /// Halts all subordinate activity and restores every subsystem to its
    /// baseline.
    pub fn stop(&mut self) {
        let cancelled = self.cancel_tasks(None);
        self.reset_deception();
        if let Some(input) = self.systems.input.as_mut() {
            input.unfreeze();
        }
        if let Some(ui) = self.systems.ui.as_mut() {
            ui.hide_loading();
        }
        if let Some(intensity) = self.systems.intensity.as_mut() {
            intensity.pause();
        }
        self.push_tier(IntensityTier::Paused);

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::StopFight, &mut events);
        self.record(&events);
        tracing::info!(target: "boss_room::fight", cancelled, "fight stopped");
        self.forward_notices();
    }

    /// Cancels deception tasks, closes every deception window and suspends
    /// the random-bug trigger.
    pub fn pause_bugs(&mut self) {
        let _ = self.cancel_tasks(Some(TaskGroup::Deception));
        self.reset_deception();
        if let Some(intensity) = self.systems.intensity.as_mut() {
            intensity.pause();
        }
        self.push_tier(IntensityTier::Paused);
        self.journal_intensity();
        tracing::info!(target: "boss_room::fight", "deception paused");
    }

    /// Lifts [`Self::pause_bugs`]; the tier is derived from the retained intensity.
    pub fn resume_bugs(&mut self) {
        let tier = match self.systems.intensity.as_mut() {
            Some(intensity) => intensity.resume(),
            None => IntensityTier::Mild,
        };
        self.push_tier(tier);
        self.journal_intensity();
    }

    /// Snaps intensity to `tier` and pushes it to every deception subsystem.
    pub fn set_intensity_tier(&mut self, tier: IntensityTier) {
        let tier = match self.systems.intensity.as_mut() {
            Some(intensity) => intensity.set_tier(tier),
            None => tier,
        };
        self.push_tier(tier);
        self.journal_intensity();
    }

    /// Registers an obstacle with the collision paradox.
    pub fn register_obstacle(&mut self, id: ObstacleId, position: Vec2) {
        if let Some(collision) = self.systems.collision.as_mut() {
            collision.register_obstacle(id, position);
        }
    }

    /// Registers a HUD panel with the UI betrayal.
    pub fn register_panel(&mut self, id: PanelId, position: Vec2) {
        if let Some(ui) = self.systems.ui.as_mut() {
            ui.register_panel(id, position);
        }
    }

    /// Registers `count` hit markers with goal gaslighting.
    pub fn register_markers(&mut self, count: usize) {
        if let Some(gaslighting) = self.systems.gaslighting.as_mut() {
            gaslighting.register_markers(count);
        }
    }

    /// Reports that the player struck hit marker `marker`.
    pub fn strike_marker(&mut self, marker: usize) {
        let max = query::health(&self.world).max();
        let effect = self
            .systems
            .gaslighting
            .as_mut()
            .and_then(|gaslighting| gaslighting.on_player_attack(marker, max));
        if let Some(effect) = effect {
            self.apply_gaslight_effect(effect);
        }
        self.forward_notices();
    }

    /// Records a directional tap and forces the player's facing on a quick
    /// triple tap.
    pub fn register_tap(&mut self, direction: Facing) -> Option<Facing> {
        let now = self.now();
        let current = self.hooks.player.as_ref()?.state().facing();
        let forced = self
            .systems
            .input
            .as_mut()?
            .register_tap(direction, now, current)?;
        if let Some(player) = self.hooks.player.as_mut() {
            player.set_forced_facing(forced);
        }
        tracing::debug!(target: "boss_room::input", ?forced, "forced turn");
        Some(forced)
    }

    /// Orchestrator clock; keeps running across fights.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.timeline.now()
    }

    /// Snapshot of the fight record.
    #[must_use]
    pub fn fight(&self) -> FightSnapshot {
        query::fight(&self.world)
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        query::phase(&self.world)
    }

    /// Reports whether a fight is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        query::is_active(&self.world)
    }

    /// Real and displayed health.
    #[must_use]
    pub fn health(&self) -> HealthSnapshot {
        query::health(&self.world)
    }

    /// Intensity state; the default state when no controller is present.
    #[must_use]
    pub fn intensity(&self) -> IntensityState {
        self.systems
            .intensity
            .as_ref()
            .map_or_else(IntensityState::default, BugIntensity::state)
    }

    /// Random-bug counts, when the controller is present.
    #[must_use]
    pub fn bug_stats(&self) -> Option<BugStats> {
        self.systems.intensity.as_ref().map(BugIntensity::stats)
    }

    /// Current boss movement speed.
    #[must_use]
    pub const fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// Current boss position.
    #[must_use]
    pub const fn boss_position(&self) -> Vec2 {
        self.motion.position()
    }

    /// Reports whether attacks are suspended by the phase two update.
    #[must_use]
    pub fn is_entering_phase2(&self) -> bool {
        self.phase2_entry
            .is_some_and(|handle| self.timeline.is_running(handle))
    }

    /// Decides whether the player may walk through `id` right now. Obstacles
    /// are solid when the collision paradox or the player is missing.
    #[must_use]
    pub fn is_obstacle_passable(&self, id: ObstacleId) -> bool {
        let (Some(collision), Some(player)) = (&self.systems.collision, &self.hooks.player) else {
            return false;
        };
        collision.is_passable(id, &player.state(), self.now())
    }

    /// Reports whether `action` responds right now.
    #[must_use]
    pub fn is_action_ready(&self, action: Action) -> bool {
        self.systems
            .input
            .as_ref()
            .map_or(true, |input| input.is_ready_now(action, self.now()))
    }

    /// Resolves a physical key to the action it triggers right now.
    #[must_use]
    pub fn action_for_key(&self, key: Key) -> Action {
        match &self.systems.input {
            Some(input) => input.action_for(key, self.now()),
            None => ControlScheme::Standard.action_for(key),
        }
    }

    /// UI betrayal state, for rendering panels, popups and loading text.
    #[must_use]
    pub fn ui(&self) -> Option<&UiBetrayal> {
        self.systems.ui.as_ref()
    }

    /// Subsystems driven by the orchestrator.
    #[must_use]
    pub fn subsystems(&self) -> &Subsystems {
        &self.systems
    }

    /// Effective configuration after sanitizing.
    #[must_use]
    pub fn config(&self) -> &FightConfig {
        &self.config
    }

    /// Number of pending timeline tasks.
    #[must_use]
    pub fn running_tasks(&self) -> usize {
        self.timeline.len()
    }

    /// Every event recorded so far, except clock ticks.
    #[must_use]
    pub fn journal(&self) -> &[Event] {
        &self.journal
    }

    /// Removes and returns the recorded events.
    pub fn drain_journal(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.journal)
    }

    fn record(&mut self, events: &[Event]) {
        self.journal.extend(
            events
                .iter()
                .filter(|event| !matches!(event, Event::TimeAdvanced { .. }))
                .copied(),
        );
    }

    fn journal_intensity(&mut self) {
        let state = self.intensity();
        self.journal.push(Event::IntensityChanged {
            value: state.value(),
            tier: state.tier(),
        });
    }

    fn push_tier(&mut self, tier: IntensityTier) {
        if let Some(collision) = self.systems.collision.as_mut() {
            collision.set_tier(tier);
        }
        if let Some(input) = self.systems.input.as_mut() {
            input.set_tier(tier);
        }
        if let Some(gaslighting) = self.systems.gaslighting.as_mut() {
            gaslighting.set_tier(tier);
        }
        if let Some(ui) = self.systems.ui.as_mut() {
            ui.set_tier(tier);
        }
    }

    fn reset_deception(&mut self) {
        if let Some(collision) = self.systems.collision.as_mut() {
            collision.reset();
        }
        if let Some(input) = self.systems.input.as_mut() {
            input.reset();
        }
        if let Some(gaslighting) = self.systems.gaslighting.as_mut() {
            gaslighting.clear();
        }
        if let Some(ui) = self.systems.ui.as_mut() {
            ui.reset_all();
        }
    }

    /// Cancels the tasks of `group`, or every task, and runs their cleanup.
    fn cancel_tasks(&mut self, group: Option<TaskGroup>) -> usize {
        let mut cleanup = Vec::new();
        let cancelled = match group {
            Some(group) => self.timeline.cancel_group(group, &mut cleanup),
            None => self.timeline.cancel_all(&mut cleanup),
        };
        if group.map_or(true, |group| group == TaskGroup::Narrative) {
            self.phase2_entry = None;
            self.glitch = None;
        }
        self.run_directives(cleanup);
        cancelled
    }

    fn spawn(&mut self, script: Script<Directive>) -> TaskHandle {
        let mut due = Vec::new();
        let handle = self.timeline.spawn(script, &mut due);
        self.run_directives(due);
        handle
    }

    fn escalate(&mut self, level: u32) {
        if let Some(scheduler) = self.systems.scheduler.as_mut() {
            scheduler.escalate();
        }
        self.move_speed += self.config.orchestrator.escalation_speed_step;
        let step = self.config.orchestrator.escalation_intensity_step;
        let changed = self
            .systems
            .intensity
            .as_mut()
            .and_then(|intensity| intensity.increase_by(step));
        if let Some(tier) = changed {
            self.push_tier(tier);
        }
        if self.systems.intensity.is_some() {
            self.journal_intensity();
        }
        tracing::debug!(
            target: "boss_room::fight",
            level,
            move_speed = self.move_speed,
            "escalation"
        );
    }

    fn advance_subsystems(&mut self) {
        let now = self.now();
        if let Some(collision) = self.systems.collision.as_mut() {
            collision.advance(now);
        }
        if let Some(input) = self.systems.input.as_mut() {
            input.advance(now);
        }
        if let Some(ui) = self.systems.ui.as_mut() {
            ui.advance(now);
        }
        let health = query::health(&self.world);
        let mut effects = Vec::new();
        if let Some(gaslighting) = self.systems.gaslighting.as_mut() {
            gaslighting.advance(now, health, &mut effects);
        }
        for effect in effects {
            self.apply_gaslight_effect(effect);
        }
    }

    fn reconcile_health(&mut self, dt: Duration) {
        let health = query::health(&self.world);
        let displayed = match self.systems.gaslighting.as_mut() {
            Some(gaslighting) => gaslighting.displayed_health(health, dt),
            None => health.real(),
        };
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::SetDisplayedHealth { value: displayed },
            &mut events,
        );
        self.record(&events);

        let honest = !self
            .systems
            .gaslighting
            .as_ref()
            .is_some_and(GoalGaslighting::is_active);
        let fraction = query::health(&self.world).displayed_fraction();
        if let Some(hud) = self.hooks.hud.as_mut() {
            hud.update_health_bar(fraction, honest);
        }
    }

    fn react_to_phases(&mut self, events: &[Event]) {
        for event in events {
            if let Event::PhaseChanged { from, to, cause } = *event {
                tracing::info!(target: "boss_room::fight", ?from, ?to, ?cause, "phase changed");
                match to {
                    Phase::Phase2 => self.begin_phase2(),
                    Phase::Defeated => self.begin_defeat(),
                    Phase::Phase1 => {}
                }
            }
        }
    }

    fn begin_phase2(&mut self) {
        let pause = seconds(self.config.orchestrator.phase2_pause_secs);
        let script = Script::new(TaskGroup::Narrative)
            .then(Directive::AnnounceUpdate, pause)
            .then(Directive::ApplyPhase2, Duration::ZERO);
        let handle = self.spawn(script);
        self.phase2_entry = Some(handle);
    }

    fn apply_phase2(&mut self) {
        self.phase2_entry = None;
        if query::phase(&self.world) != Phase::Phase2 {
            return;
        }
        if self.intensity().is_paused() {
            // A host pause holds until `resume_bugs`.
            if let Some(intensity) = self.systems.intensity.as_mut() {
                let _ = intensity.set_tier(IntensityTier::Aggressive);
                intensity.pause();
            }
            self.journal_intensity();
        } else {
            self.set_intensity_tier(IntensityTier::Aggressive);
        }
        if let Some(scheduler) = self.systems.scheduler.as_mut() {
            scheduler.apply_phase2();
        }
        let tuning = &self.config.orchestrator;
        self.move_speed = self
            .move_speed
            .max(tuning.base_move_speed * tuning.phase2_speed_factor);
        if let Some(ui) = self.systems.ui.as_mut() {
            ui.start_betrayal();
        }
        let complete = seconds(self.config.orchestrator.phase2_complete_secs);
        self.dialog(UPDATE_COMPLETE, complete);
        self.schedule_glitch();
        tracing::info!(
            target: "boss_room::fight",
            move_speed = self.move_speed,
            "phase two parameters applied"
        );
    }

    fn schedule_glitch(&mut self) {
        let gap = self
            .config
            .orchestrator
            .glitch_interval
            .sample_duration(&mut self.rng)
            .max(MIN_GLITCH_GAP);
        let script = Script::new(TaskGroup::Narrative)
            .wait(gap)
            .then(Directive::GlitchRoll, Duration::ZERO);
        let handle = self.spawn(script);
        self.glitch = Some(handle);
    }

    fn glitch_roll(&mut self) {
        self.glitch = None;
        if query::phase(&self.world) != Phase::Phase2 || !query::is_active(&self.world) {
            return;
        }
        let tuning = &self.config.orchestrator;
        if self.rng.gen::<f32>() < tuning.glitch_chance {
            let duration = tuning.glitch_duration.sample_duration(&mut self.rng);
            if let Some(player) = self.hooks.player.as_mut() {
                player.glitch_appearance(duration);
            }
        }
        self.schedule_glitch();
    }

    fn begin_defeat(&mut self) {
        let volleys = self.cancel_tasks(Some(TaskGroup::Deception));
        if volleys > 0 {
            tracing::debug!(
                target: "boss_room::fight",
                cancelled = volleys,
                "in-flight attacks dropped"
            );
        }
        let mut cleanup = Vec::new();
        for handle in [self.phase2_entry.take(), self.glitch.take()]
            .into_iter()
            .flatten()
        {
            let _ = self.timeline.cancel(handle, &mut cleanup);
        }
        self.run_directives(cleanup);
        if let Some(gaslighting) = self.systems.gaslighting.as_mut() {
            gaslighting.clear();
        }
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::SetDisplayedHealth { value: 0.0 },
            &mut events,
        );
        self.record(&events);
        if let Some(hud) = self.hooks.hud.as_mut() {
            hud.update_health_bar(0.0, true);
        }

        let Some(script) = self.systems.defeat.as_mut().and_then(DefeatSequencer::run) else {
            return;
        };
        let mut steps = Script::new(TaskGroup::Narrative).on_cancel(Directive::RestoreInput);
        for (step, wait) in script {
            steps = steps.then(Directive::Defeat(step), wait);
        }
        self.journal.push(Event::DefeatSequenceStarted);
        let _ = self.spawn(steps);
    }

    fn run_directives(&mut self, directives: Vec<Directive>) {
        for directive in directives {
            self.execute(directive);
        }
    }

    fn execute(&mut self, directive: Directive) {
        let now = self.now();
        match directive {
            Directive::AnnounceUpdate => {
                let announce = seconds(self.config.orchestrator.phase2_announce_secs);
                self.dialog(UPDATE_ANNOUNCEMENT, announce);
            }
            Directive::ApplyPhase2 => self.apply_phase2(),
            Directive::ChainDesync { duration } => {
                if let Some(input) = self.systems.input.as_mut() {
                    let _ = input.activate(now, duration);
                }
            }
            Directive::FireProjectile { speed, damage } => self.fire_projectile(speed, damage),
            Directive::GlitchRoll => self.glitch_roll(),
            Directive::Defeat(step) => self.defeat_step(step),
            Directive::RestoreInput => self.restore_input(),
        }
    }

    fn defeat_step(&mut self, step: DefeatStep) {
        tracing::debug!(target: "boss_room::defeat", ?step, "defeat step");
        match step {
            DefeatStep::ShowMessage { text, duration } => self.dialog(text, duration),
            DefeatStep::ShowPersistentLoading => {
                let now = self.now();
                if let Some(ui) = self.systems.ui.as_mut() {
                    ui.show_persistent_loading(now);
                }
            }
            DefeatStep::PauseDeception => self.pause_bugs(),
            DefeatStep::FreezeInput => {
                if let Some(input) = self.systems.input.as_mut() {
                    input.freeze();
                }
                if let Some(player) = self.hooks.player.as_mut() {
                    player.disable_input();
                }
            }
            DefeatStep::EnableExit => {
                if let Some(exit) = self.hooks.exit.as_mut() {
                    exit.enable_exit();
                }
            }
            DefeatStep::RestoreInput => self.restore_input(),
            DefeatStep::Complete => {
                if let Some(defeat) = self.systems.defeat.as_mut() {
                    defeat.finish();
                }
                if let Some(player) = self.hooks.player.as_mut() {
                    player.boss_beaten();
                }
                self.journal.push(Event::DefeatSequenceCompleted);
            }
        }
    }

    fn restore_input(&mut self) {
        if let Some(input) = self.systems.input.as_mut() {
            input.unfreeze();
            input.restore_control_scheme();
        }
        if let Some(player) = self.hooks.player.as_mut() {
            player.restore_input();
        }
    }

    fn run_attacks(&mut self, dt: Duration) {
        let now = self.now();
        let phase = query::phase(&self.world);
        let fired = self
            .systems
            .scheduler
            .as_mut()
            .and_then(|scheduler| scheduler.maybe_fire(now, phase));
        if let Some(fired) = fired {
            self.launch_attack(fired, phase);
        }
        let volley = self
            .systems
            .cadence
            .as_mut()
            .and_then(|cadence| cadence.maybe_fire(now, phase));
        if let Some(volley) = volley {
            self.spawn_volley(volley);
        }
        let bug = self
            .systems
            .intensity
            .as_mut()
            .and_then(|intensity| intensity.advance(dt));
        if let Some(kind) = bug {
            self.trigger_bug(kind);
        }
    }

    fn launch_attack(&mut self, fired: FiredAttack, phase: Phase) {
        let now = self.now();
        self.journal.push(Event::AttackLaunched {
            kind: fired.kind,
            phase,
        });
        match fired.kind {
            AttackKind::CollisionParadox => {
                self.collision_paradox(fired.window);
                if let Some(chain) = fired.chain {
                    let script = Script::new(TaskGroup::Deception).wait(chain.delay).then(
                        Directive::ChainDesync {
                            duration: chain.duration,
                        },
                        Duration::ZERO,
                    );
                    let _ = self.spawn(script);
                }
            }
            AttackKind::InputDesync => {
                if let Some(input) = self.systems.input.as_mut() {
                    let _ = input.activate(now, fired.window);
                }
                self.debug_message(NETWORK_TIMEOUT, seconds(DEBUG_MESSAGE_SECS));
            }
            AttackKind::GoalGaslight => {
                if let Some(gaslighting) = self.systems.gaslighting.as_mut() {
                    gaslighting.activate(now, fired.window);
                }
            }
            AttackKind::UiShuffle => {
                if let Some(ui) = self.systems.ui.as_mut() {
                    let _ = ui.shuffle(now, fired.window);
                    let _ = ui.spawn_transient_popup(now);
                }
            }
            AttackKind::FakePopup => {
                if let Some(ui) = self.systems.ui.as_mut() {
                    let _ = ui.spawn_transient_popup(now);
                }
            }
            AttackKind::ControlSwap => {
                if let Some(input) = self.systems.input.as_mut() {
                    let _ = input.swap_temporarily(now, fired.window);
                }
                self.dialog(CONTROLS_UPDATED, seconds(CONTROLS_UPDATED_SECS));
            }
            AttackKind::ProjectileBurst => {
                let burst = self.config.attacks.burst();
                self.spawn_volley(burst);
            }
            AttackKind::AreaBurst => self.area_burst(),
        }
        match fired.pairing {
            Some(PairedStrike::Projectile) => {
                let (speed, damage) = (
                    self.config.attacks.burst_speed,
                    self.config.attacks.projectile_damage,
                );
                self.fire_projectile(speed, damage);
            }
            Some(PairedStrike::AreaBurst) => self.area_burst(),
            None => {}
        }
    }

    fn trigger_bug(&mut self, kind: DeceptionKind) {
        let now = self.now();
        self.journal.push(Event::BugTriggered { kind });
        match kind {
            DeceptionKind::Collision => {
                self.collision_paradox(seconds(self.config.orchestrator.collision_bug_secs));
            }
            DeceptionKind::InputDesync => {
                let duration = self
                    .config
                    .orchestrator
                    .input_bug
                    .sample_duration(&mut self.rng);
                if let Some(input) = self.systems.input.as_mut() {
                    let _ = input.activate(now, duration);
                }
            }
            DeceptionKind::Gaslight => {
                if let Some(gaslighting) = self.systems.gaslighting.as_mut() {
                    let window = gaslighting.window_for_tier();
                    gaslighting.activate(now, window);
                }
            }
            DeceptionKind::UiBetrayal => {
                if let Some(ui) = self.systems.ui.as_mut() {
                    let _ = ui.trigger_random_bug(now);
                }
            }
        }
    }

    fn collision_paradox(&mut self, duration: Duration) {
        let now = self.now();
        let Some(collision) = self.systems.collision.as_mut() else {
            return;
        };
        let activation = collision.trigger(now, duration);
        if activation.affected > 0 {
            self.debug_message(activation.description, seconds(DEBUG_MESSAGE_SECS));
        }
    }

    fn spawn_volley(&mut self, volley: Volley) {
        if volley.count == 0 {
            return;
        }
        let shot = Directive::FireProjectile {
            speed: volley.speed,
            damage: volley.damage,
        };
        let script = (0..volley.count).fold(Script::new(TaskGroup::Deception), |script, _| {
            script.then(shot, volley.spacing)
        });
        let _ = self.spawn(script);
    }

    fn fire_projectile(&mut self, speed: f32, damage: f32) {
        let Some(target) = self.hooks.player.as_ref().map(|player| player.state().position())
        else {
            return;
        };
        let origin = self.motion.position();
        if let Some(arena) = self.hooks.arena.as_mut() {
            arena.spawn_projectile(Projectile {
                origin,
                direction: (target - origin).normalize_or_zero(),
                speed,
                damage,
            });
        }
    }

    fn area_burst(&mut self) {
        let burst = AreaBurst {
            center: self.motion.position(),
            radius: self.config.attacks.area_radius,
            damage: self.config.attacks.area_damage,
        };
        if let Some(arena) = self.hooks.arena.as_mut() {
            arena.area_burst(burst);
        }
    }

    fn apply_gaslight_effect(&mut self, effect: GaslightEffect) {
        match effect {
            GaslightEffect::FakeDamage { amount } => {
                self.nudge_displayed(-amount);
                self.flash(HealthCue::FakeDamage);
            }
            GaslightEffect::FakeHeal { amount, notice } => {
                self.nudge_displayed(amount);
                self.dialog(&notice, seconds(NOTICE_SECS));
                self.flash(HealthCue::FakeHeal);
            }
            GaslightEffect::MarkersShuffled { correct } => {
                tracing::debug!(target: "boss_room::gaslight", correct, "markers shuffled");
            }
        }
    }

    fn nudge_displayed(&mut self, delta: f32) {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::NudgeDisplayedHealth { delta },
            &mut events,
        );
        self.record(&events);
    }

    fn flash(&mut self, cue: HealthCue) {
        if let Some(hud) = self.hooks.hud.as_mut() {
            hud.flash_health_bar(cue);
        }
    }

    fn dialog(&mut self, text: &str, duration: Duration) {
        let now = self.now();
        if let Some(ui) = self.systems.ui.as_mut() {
            ui.show_message(now, text, duration);
        } else if let Some(hud) = self.hooks.hud.as_mut() {
            hud.show_dialog(text, duration);
        }
    }

    fn debug_message(&mut self, text: &str, duration: Duration) {
        let now = self.now();
        if let Some(ui) = self.systems.ui.as_mut() {
            ui.show_debug_message(now, text, duration);
        } else if let Some(hud) = self.hooks.hud.as_mut() {
            hud.show_debug_message(text, duration);
        }
    }

    fn forward_notices(&mut self) {
        let Some(ui) = self.systems.ui.as_mut() else {
            return;
        };
        let notices = ui.take_notices();
        let Some(hud) = self.hooks.hud.as_mut() else {
            return;
        };
        for notice in notices {
            match notice {
                UiNotice::Dialog { text, duration } => hud.show_dialog(&text, duration),
                UiNotice::Debug { text, duration } => hud.show_debug_message(&text, duration),
            }
        }
    }

    fn update_motion(&mut self, dt: Duration) {
        let active = query::is_active(&self.world);
        if active {
            let player = self.hooks.player.as_ref().map(|player| player.state().position());
            self.motion.step(
                dt,
                self.move_speed,
                player,
                &self.config.orchestrator,
                &mut self.rng,
            );
        }
        let Some(animator) = self.hooks.animator.as_mut() else {
            return;
        };
        let health = query::health(&self.world);
        animator.set_bool(
            "isMoving",
            active && self.motion.is_moving(&self.config.orchestrator),
        );
        animator.set_float("healthPercent", health.real_fraction());
        animator.set_float("visualHealthPercent", health.displayed_fraction());
    }
}
