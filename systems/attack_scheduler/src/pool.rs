use boss_room_core::AttackKind;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Weighted entry inside an [`AttackPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Attack fired when the entry is selected.
    pub kind: AttackKind,
    /// Relative selection weight.
    pub weight: u32,
}

/// Ordered list of weighted attacks available in one phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttackPool {
    entries: Vec<PoolEntry>,
}

impl AttackPool {
    /// Creates a pool from `(kind, weight)` pairs, preserving order.
    #[must_use]
    pub fn from_weights(weights: &[(AttackKind, u32)]) -> Self {
        Self {
            entries: weights
                .iter()
                .map(|&(kind, weight)| PoolEntry { kind, weight })
                .collect(),
        }
    }

    /// Default opening pool.
    #[must_use]
    pub fn phase1() -> Self {
        Self::from_weights(&[
            (AttackKind::CollisionParadox, 30),
            (AttackKind::InputDesync, 25),
            (AttackKind::GoalGaslight, 20),
            (AttackKind::ProjectileBurst, 25),
        ])
    }

    /// Default escalated pool.
    #[must_use]
    pub fn phase2() -> Self {
        Self::from_weights(&[
            (AttackKind::CollisionParadox, 20),
            (AttackKind::InputDesync, 20),
            (AttackKind::GoalGaslight, 20),
            (AttackKind::UiShuffle, 25),
            (AttackKind::FakePopup, 20),
            (AttackKind::ControlSwap, 20),
            (AttackKind::ProjectileBurst, 25),
            (AttackKind::AreaBurst, 20),
        ])
    }

    /// Entries in selection order.
    #[must_use]
    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    /// Reports whether the pool has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every weight, saturating on overflow.
    #[must_use]
    pub fn total_weight(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |total, entry| total.saturating_add(entry.weight))
    }

    /// Resolves `pick` against the cumulative weights. The first entry whose
    /// cumulative sum exceeds `pick` wins; when none does (zero total weight)
    /// the first entry is returned.
    #[must_use]
    pub fn select(&self, pick: u32) -> Option<AttackKind> {
        let mut cumulative = 0u32;
        for entry in &self.entries {
            cumulative = cumulative.saturating_add(entry.weight);
            if pick < cumulative {
                return Some(entry.kind);
            }
        }
        self.entries.first().map(|entry| entry.kind)
    }

    /// Draws a kind with probability proportional to its weight.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<AttackKind> {
        let total = self.total_weight().max(1);
        self.select(rng.gen_range(0..total))
    }
}
