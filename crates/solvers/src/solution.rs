use rheo_core::{Layout, STRESS};

use crate::{Error, Variant, viscosity};

/// Indicates how the solver finished.
///
/// Reaching an iteration cap is never a status; it is reported as
/// [`Error::NonConvergence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Converged according to the configured tolerance.
    Converged,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// The result of a stress solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Final solver status.
    pub status: Status,

    /// The variant that produced this solution.
    pub variant: Variant,

    /// Shared series stress.
    pub stress: f64,

    /// Total strain rate the solve was driven at.
    pub strain_rate: f64,

    /// Full unknown vector, addressed by the composite's [`Layout`].
    pub unknowns: Vec<f64>,

    /// Iteration count when the solver finished.
    pub iters: usize,
}

impl Solution {
    /// Strain rate of the parallel group at series member `member`.
    #[must_use]
    pub fn group_strain_rate(&self, layout: &Layout, member: usize) -> Option<f64> {
        layout
            .group(member)
            .and_then(|slot| self.unknowns.get(slot.strain_rate).copied())
    }

    /// Plastic multiplier of the plastic element at series member `member`.
    #[must_use]
    pub fn multiplier(&self, layout: &Layout, member: usize) -> Option<f64> {
        layout
            .plastic(member)
            .and_then(|slot| self.unknowns.get(slot.multiplier).copied())
    }

    /// Stress carried by the plastic element at series member `member`.
    ///
    /// Inside a parallel group this is its own stress unknown; in series it
    /// is the shared stress.
    #[must_use]
    pub fn plastic_stress(&self, layout: &Layout, member: usize) -> Option<f64> {
        let slot = layout.plastic(member)?;
        self.unknowns.get(slot.stress.unwrap_or(STRESS)).copied()
    }

    /// Effective viscosity `τ / 2ε` of the converged state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroStrainRate`] if the solve was driven at zero strain rate.
    pub fn viscosity(&self) -> Result<f64, Error> {
        viscosity(self.stress, self.strain_rate)
    }
}
