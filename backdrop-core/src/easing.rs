/// Easing curves for timeline tweens

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    /// Quadratic ease-out
    Power2Out,
    /// Cubic ease-out
    Power3Out,
}

impl Ease {
    /// Map linear progress to eased progress. Input is clamped to `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power2Out => 1.0 - (1.0 - t).powi(2),
            Ease::Power3Out => 1.0 - (1.0 - t).powi(3),
        }
    }
}

impl Default for Ease {
    fn default() -> Self {
        Ease::Power3Out
    }
}
