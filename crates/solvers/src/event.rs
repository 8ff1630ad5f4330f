use crate::Variant;

/// Events emitted by the Newton solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    /// One outer iteration completed.
    Iteration {
        variant: Variant,
        /// Iteration counter, starting at 1.
        iter: usize,
        /// Unknown vector after the update.
        unknowns: &'a [f64],
        /// Relative step `Σ|Δxᵢ| / (|xᵢ| + guard)` of this update.
        step: f64,
        /// Norm of the residual before the update.
        residual: f64,
    },

    /// A plastic element switched between the active and inactive branch.
    BranchChanged {
        /// Series member holding the element.
        member: usize,
        iter: usize,
        active: bool,
    },
}

impl Event<'_> {
    /// Returns the iteration the event belongs to.
    #[must_use]
    pub fn iter(&self) -> usize {
        match self {
            Self::Iteration { iter, .. } | Self::BranchChanged { iter, .. } => *iter,
        }
    }
}

/// Actions an observer can take during a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop and return the current iterate with
    /// [`Status::StoppedByObserver`](crate::Status::StoppedByObserver).
    StopEarly,
}
