use std::{f32::consts::TAU, time::Duration};

use glam::Vec2;
use rand::Rng;

use crate::config::OrchestratorTuning;

/// Wander radius used when neither anchors nor a player are available.
const WANDER_RADIUS: f32 = 2.0;

/// Boss position and destination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BossMotion {
    position: Vec2,
    target: Vec2,
}

impl BossMotion {
    pub(crate) fn new(start: Vec2) -> Self {
        Self {
            position: start,
            target: start,
        }
    }

    pub(crate) const fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn is_moving(&self, tuning: &OrchestratorTuning) -> bool {
        self.position.distance(self.target) > tuning.arrive_distance
    }

    /// Occasionally picks a new destination while idle, then walks toward it.
    pub(crate) fn step<R: Rng + ?Sized>(
        &mut self,
        dt: Duration,
        speed: f32,
        player: Option<Vec2>,
        tuning: &OrchestratorTuning,
        rng: &mut R,
    ) {
        let secs = dt.as_secs_f32();
        if !self.is_moving(tuning) && rng.gen::<f32>() < tuning.retarget_rate * secs {
            self.target = self.pick_target(player, tuning, rng);
        }
        if self.is_moving(tuning) {
            self.position = move_towards(self.position, self.target, speed.max(0.0) * secs);
        }
    }

    fn pick_target<R: Rng + ?Sized>(
        &self,
        player: Option<Vec2>,
        tuning: &OrchestratorTuning,
        rng: &mut R,
    ) -> Vec2 {
        if !tuning.anchors.is_empty() {
            let anchor = tuning.anchors[rng.gen_range(0..tuning.anchors.len())];
            return Vec2::from_array(anchor);
        }
        if let Some(player) = player {
            let away = (self.position - player).normalize_or_zero();
            return player + away * tuning.player_offset.sample(rng);
        }
        let angle = rng.gen_range(0.0..TAU);
        let radius = WANDER_RADIUS * rng.gen::<f32>().sqrt();
        self.position + Vec2::from_angle(angle) * radius
    }
}

fn move_towards(from: Vec2, to: Vec2, max_step: f32) -> Vec2 {
    let delta = to - from;
    let distance = delta.length();
    if distance <= max_step || distance == 0.0 {
        to
    } else {
        from + delta / distance * max_step
    }
}
