#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision paradox: obstacles that become solid or passable depending on
//! how the player moves and where the player looks.

use std::time::Duration;

use boss_room_core::{DeceptionWindow, IntensityTier, PlayerState};
use glam::Vec2;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Velocity magnitude below which the player counts as standing still.
const VELOCITY_DEADZONE: f32 = 0.1;
/// Minimum x-component of the normalized direction to count as looking at a target.
const LOOK_CONE: f32 = 0.3;
/// Largest number of obstacles a single activation affects.
const MAX_AFFECTED: usize = 3;

/// Identifier of an obstacle registered with the subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric value of the identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Conditions under which a paradoxical obstacle lets the player through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParadoxMode {
    /// Passable only while the player moves backward.
    pub reverse_only: bool,
    /// Passable only while the player looks away.
    pub look_away: bool,
}

impl ParadoxMode {
    fn describe(self) -> &'static str {
        match (self.reverse_only, self.look_away) {
            (true, true) => "Debug: Multi-directional phase variance detected",
            (true, false) => "Debug: Reverse-motion bypass enabled",
            (false, true) => "Debug: Observer-dependent solidity active",
            (false, false) => "Debug: Paradox state undefined",
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Obstacle {
    id: ObstacleId,
    position: Vec2,
    paradox: Option<ParadoxMode>,
}

/// Result of an activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Activation {
    /// Number of obstacles made paradoxical.
    pub affected: usize,
    /// Debug-style description for the HUD.
    pub description: &'static str,
}

/// Owns the set of obstacles and the active paradox window.
#[derive(Debug)]
pub struct CollisionParadox {
    obstacles: Vec<Obstacle>,
    window: Option<DeceptionWindow>,
    tier: IntensityTier,
    rng: ChaCha8Rng,
}

impl CollisionParadox {
    /// Creates an empty subsystem at the mild tier.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            obstacles: Vec::new(),
            window: None,
            tier: IntensityTier::Mild,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Registers an obstacle, replacing any previous entry with the same id.
    pub fn register_obstacle(&mut self, id: ObstacleId, position: Vec2) {
        self.remove_obstacle(id);
        self.obstacles.push(Obstacle {
            id,
            position,
            paradox: None,
        });
    }

    /// Removes an obstacle.
    pub fn remove_obstacle(&mut self, id: ObstacleId) {
        self.obstacles.retain(|obstacle| obstacle.id != id);
    }

    /// Number of registered obstacles.
    #[must_use]
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Updates the tier used when picking modes.
    pub fn set_tier(&mut self, tier: IntensityTier) {
        self.tier = tier;
    }

    /// Reports whether a paradox window is open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.window.is_some()
    }

    /// Mode currently applied to `id`, if it is paradoxical.
    #[must_use]
    pub fn mode_of(&self, id: ObstacleId) -> Option<ParadoxMode> {
        self.obstacles
            .iter()
            .find(|obstacle| obstacle.id == id)
            .and_then(|obstacle| obstacle.paradox)
    }

    /// Picks modes from the current tier and activates them for `duration`.
    pub fn trigger(&mut self, now: Duration, duration: Duration) -> Activation {
        let mode = match self.tier {
            IntensityTier::Mild => ParadoxMode {
                reverse_only: true,
                look_away: false,
            },
            IntensityTier::Aggressive => {
                let roll = self.rng.gen_range(0..3);
                ParadoxMode {
                    reverse_only: roll == 0 || roll == 2,
                    look_away: roll == 1 || roll == 2,
                }
            }
            IntensityTier::Paused => ParadoxMode::default(),
        };
        self.activate(now, mode.reverse_only, mode.look_away, duration)
    }

    /// Marks a random subset of one to three obstacles paradoxical for `duration`.
    /// A mode with neither rule enabled marks nothing.
    pub fn activate(
        &mut self,
        now: Duration,
        reverse_only: bool,
        look_away: bool,
        duration: Duration,
    ) -> Activation {
        self.reset();
        let mode = ParadoxMode {
            reverse_only,
            look_away,
        };
        let description = mode.describe();
        if !(reverse_only || look_away) || self.obstacles.is_empty() || duration.is_zero() {
            return Activation {
                affected: 0,
                description,
            };
        }

        let wanted = self.rng.gen_range(1..=MAX_AFFECTED).min(self.obstacles.len());
        let mut indices: Vec<usize> = (0..self.obstacles.len()).collect();
        indices.shuffle(&mut self.rng);
        for &index in indices.iter().take(wanted) {
            self.obstacles[index].paradox = Some(mode);
        }
        self.window = Some(DeceptionWindow::new(now, duration));

        tracing::debug!(
            target: "boss_room::collision",
            affected = wanted,
            reverse_only,
            look_away,
            duration_ms = duration.as_millis() as u64,
            "collision paradox active"
        );
        Activation {
            affected: wanted,
            description,
        }
    }

    /// Decides whether the player may pass through `id` right now.
    #[must_use]
    pub fn is_passable(&self, id: ObstacleId, player: &PlayerState, now: Duration) -> bool {
        let open = self.window.is_some_and(|window| window.is_open_at(now));
        if !open {
            return false;
        }
        let Some(obstacle) = self.obstacles.iter().find(|obstacle| obstacle.id == id) else {
            return false;
        };
        let Some(mode) = obstacle.paradox else {
            return false;
        };

        let backward = is_moving_backward(player);
        let looking = is_looking_at(player, obstacle.position);
        match (mode.reverse_only, mode.look_away) {
            (true, true) => backward && !looking,
            (true, false) => backward,
            (false, true) => !looking,
            (false, false) => false,
        }
    }

    /// Closes the window once it elapsed.
    pub fn advance(&mut self, now: Duration) {
        if self.window.is_some_and(|window| !window.is_open_at(now)) {
            self.reset();
        }
    }

    /// Restores full solidity immediately.
    pub fn reset(&mut self) {
        self.window = None;
        for obstacle in &mut self.obstacles {
            obstacle.paradox = None;
        }
    }
}

/// Reports whether the player moves opposite to the way they face.
#[must_use]
pub fn is_moving_backward(player: &PlayerState) -> bool {
    player.velocity_x() * player.facing().sign() < -VELOCITY_DEADZONE
}

/// Reports whether `target` lies inside the player's forward view cone.
#[must_use]
pub fn is_looking_at(player: &PlayerState, target: Vec2) -> bool {
    let direction = (target - player.position()).normalize_or_zero();
    direction.x * player.facing().sign() > LOOK_CONE
}

#[cfg(test)]
mod tests {
    use super::*;
    use boss_room_core::Facing;

    #[test]
    fn backward_requires_velocity_beyond_deadzone() {
        let slow = PlayerState::new(Vec2::ZERO, Facing::Right, -0.05);
        let fast = PlayerState::new(Vec2::ZERO, Facing::Right, -2.0);
        let forward = PlayerState::new(Vec2::ZERO, Facing::Left, -2.0);
        assert!(!is_moving_backward(&slow));
        assert!(is_moving_backward(&fast));
        assert!(!is_moving_backward(&forward));
    }

    #[test]
    fn look_cone_uses_facing_direction() {
        let player = PlayerState::new(Vec2::ZERO, Facing::Right, 0.0);
        assert!(is_looking_at(&player, Vec2::new(3.0, 0.5)));
        assert!(!is_looking_at(&player, Vec2::new(-3.0, 0.0)));
        assert!(!is_looking_at(&player, Vec2::new(0.2, 5.0)), "outside cone");
        assert!(!is_looking_at(&player, Vec2::ZERO));
    }

    #[test]
    fn activation_affects_at_most_three_obstacles() {
        let mut paradox = CollisionParadox::new(9);
        for id in 0..10 {
            paradox.register_obstacle(ObstacleId::new(id), Vec2::new(id as f32, 0.0));
        }
        for round in 0..50 {
            let activation =
                paradox.activate(Duration::from_secs(round), true, false, Duration::from_secs(1));
            assert!((1..=3).contains(&activation.affected));
            let marked = (0..10)
                .filter(|&id| paradox.mode_of(ObstacleId::new(id)).is_some())
                .count();
            assert_eq!(marked, activation.affected);
        }
    }

    #[test]
    fn descriptions_follow_modes() {
        let mut paradox = CollisionParadox::new(1);
        paradox.register_obstacle(ObstacleId::new(0), Vec2::ZERO);
        let both = paradox.activate(Duration::ZERO, true, true, Duration::from_secs(1));
        assert_eq!(
            both.description,
            "Debug: Multi-directional phase variance detected"
        );
        paradox.set_tier(IntensityTier::Mild);
        let mild = paradox.trigger(Duration::ZERO, Duration::from_secs(1));
        assert_eq!(mild.description, "Debug: Reverse-motion bypass enabled");
    }
}
