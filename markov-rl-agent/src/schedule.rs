//! Learning-rate schedules

/// Step-size schedule driven by visit counts
pub trait Schedule: Send + Sync {
    /// Learning rate to apply after `visits` visits
    fn value(&self, visits: f64) -> f64;
}

/// Decaying rate `numerator / (offset + visits)`
///
/// The default, `60 / (59 + n)`, starts at 1 on the first visit and decays
/// as `O(1/n)`, satisfying the stochastic-approximation conditions for
/// eventual convergence of the tabular updates.
#[derive(Debug, Clone)]
pub struct VisitDecaySchedule {
    /// Numerator of the decay fraction
    pub numerator: f64,
    /// Offset added to the visit count in the denominator
    pub offset: f64,
}

impl Default for VisitDecaySchedule {
    fn default() -> Self {
        Self {
            numerator: 60.0,
            offset: 59.0,
        }
    }
}

impl Schedule for VisitDecaySchedule {
    fn value(&self, visits: f64) -> f64 {
        self.numerator / (self.offset + visits)
    }
}
