use boss_room_core::HealthSnapshot;

/// Dual health record: `real` decides defeat, `displayed` is what the HUD shows.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HealthState {
    real: f32,
    displayed: f32,
    max: f32,
}

impl HealthState {
    pub(crate) fn full(max: f32) -> Self {
        let max = if max.is_finite() && max > 0.0 { max } else { 1.0 };
        Self {
            real: max,
            displayed: max,
            max,
        }
    }

    pub(crate) fn real(&self) -> f32 {
        self.real
    }

    pub(crate) fn max(&self) -> f32 {
        self.max
    }

    /// Subtracts a sanitized amount from real health and returns how much was removed.
    pub(crate) fn apply_damage(&mut self, amount: f32) -> f32 {
        let amount = if amount.is_nan() {
            0.0
        } else {
            amount.clamp(0.0, self.max)
        };
        let before = self.real;
        self.real = (self.real - amount).max(0.0);
        before - self.real
    }

    pub(crate) fn deplete(&mut self) {
        self.real = 0.0;
        self.displayed = 0.0;
    }

    pub(crate) fn set_displayed(&mut self, value: f32) {
        if value.is_finite() {
            self.displayed = value.clamp(0.0, self.max);
        }
    }

    pub(crate) fn nudge_displayed(&mut self, delta: f32) {
        if delta.is_finite() {
            self.set_displayed(self.displayed + delta);
        }
    }

    pub(crate) fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot::new(self.real, self.displayed, self.max)
    }
}
