//! End-of-run summary.

use std::collections::BTreeMap;

use boss_room_core::{Event, Phase};
use boss_room_orchestrator::FightOrchestrator;
use serde::Serialize;

use crate::hooks::Tally;

/// Summary of one simulated fight.
#[derive(Debug, Serialize)]
pub(crate) struct Summary {
    seed: u64,
    fight_secs: f32,
    clock_secs: f32,
    phase: Phase,
    real_health: f32,
    displayed_health: f32,
    health_bar: f32,
    hits: HitSummary,
    attacks: BTreeMap<String, u32>,
    random_bugs: u32,
    projectiles: u32,
    area_bursts: u32,
    dialogs: u32,
    debug_messages: u32,
    glitches: u32,
    health_cues: u32,
    dishonest_frames: u64,
    exit_enabled: bool,
    boss_beaten: bool,
}

#[derive(Debug, Default, Serialize)]
struct HitSummary {
    requested: u32,
    landed: u32,
    blocked: u32,
    ignored: u32,
}

impl Summary {
    pub(crate) fn collect(orchestrator: &FightOrchestrator, tally: &Tally) -> Self {
        let mut hits = HitSummary::default();
        let mut attacks = BTreeMap::new();
        for event in orchestrator.journal() {
            match event {
                Event::DamageApplied { .. } => {
                    hits.requested += 1;
                    hits.landed += 1;
                }
                Event::DamageBlocked { .. } => {
                    hits.requested += 1;
                    hits.blocked += 1;
                }
                Event::DamageIgnored { .. } => {
                    hits.requested += 1;
                    hits.ignored += 1;
                }
                Event::AttackLaunched { kind, .. } => {
                    *attacks.entry(format!("{kind:?}")).or_insert(0) += 1;
                }
                _ => {}
            }
        }
        let fight = orchestrator.fight();
        let health = orchestrator.health();
        Self {
            seed: orchestrator.config().seed,
            fight_secs: fight.elapsed().as_secs_f32(),
            clock_secs: orchestrator.now().as_secs_f32(),
            phase: fight.phase(),
            real_health: health.real(),
            displayed_health: health.displayed(),
            health_bar: tally.last_bar,
            hits,
            attacks,
            random_bugs: orchestrator
                .bug_stats()
                .map_or(0, |stats| stats.total()),
            projectiles: tally.projectiles,
            area_bursts: tally.area_bursts,
            dialogs: tally.dialogs,
            debug_messages: tally.debug_messages,
            glitches: tally.glitches,
            health_cues: tally.fake_cues,
            dishonest_frames: tally.dishonest_frames,
            exit_enabled: tally.exit_enabled,
            boss_beaten: tally.boss_beaten,
        }
    }

    pub(crate) fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub(crate) fn to_text(&self) -> String {
        let mut lines = vec![
            format!("seed            {}", self.seed),
            format!(
                "fight           {:.1}s ({:?}), clock {:.1}s",
                self.fight_secs, self.phase, self.clock_secs
            ),
            format!(
                "health          real {:.1}, displayed {:.1}, bar {:.0}%",
                self.real_health,
                self.displayed_health,
                self.health_bar * 100.0
            ),
            format!(
                "hits            {} requested, {} landed, {} blocked, {} ignored",
                self.hits.requested, self.hits.landed, self.hits.blocked, self.hits.ignored
            ),
            format!("random bugs     {}", self.random_bugs),
            format!(
                "arena           {} projectiles, {} area bursts",
                self.projectiles, self.area_bursts
            ),
            format!(
                "hud             {} dialogs, {} debug lines, {} cues, {} dishonest frames",
                self.dialogs, self.debug_messages, self.health_cues, self.dishonest_frames
            ),
            format!("player glitches {}", self.glitches),
            format!(
                "outcome         exit {}, beaten {}",
                self.exit_enabled, self.boss_beaten
            ),
        ];
        for (kind, count) in &self.attacks {
            lines.push(format!("attack          {kind}: {count}"));
        }
        lines.join("\n")
    }
}
