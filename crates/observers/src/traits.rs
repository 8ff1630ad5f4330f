//! Capability traits for cross-solver observers.
//!
//! These traits abstract over solver event and action types, so an observer
//! can be written once against the capabilities it needs.
//!
//! # Event traits
//!
//! - [`HasResidual`] — events that carry a residual norm
//! - [`HasStep`] — events that carry a relative step
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use rheo_core::Observer;
//! use rheo_observers::traits::{CanStopEarly, HasStep};
//!
//! struct GoodEnough {
//!     tolerance: f64,
//!     min_iters: usize,
//!     iter: usize,
//! }
//!
//! impl<E: HasStep, A: CanStopEarly> Observer<E, A> for GoodEnough {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         self.iter += 1;
//!         if self.iter >= self.min_iters && event.step() < self.tolerance {
//!             return Some(A::stop_early());
//!         }
//!         None
//!     }
//! }
//! ```

use rheo_solvers::{Action, Event};

/// An event that carries a residual norm.
pub trait HasResidual {
    /// Returns the residual norm for this event.
    ///
    /// Returns `f64::NAN` when the event carries no residual.
    fn residual(&self) -> f64;
}

/// An event that carries a relative step.
pub trait HasStep {
    /// Returns the relative step for this event.
    ///
    /// Returns `f64::NAN` when the event carries no step.
    fn step(&self) -> f64;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

impl HasResidual for Event<'_> {
    fn residual(&self) -> f64 {
        match self {
            Event::Iteration { residual, .. } => *residual,
            Event::BranchChanged { .. } => f64::NAN,
        }
    }
}

impl HasStep for Event<'_> {
    fn step(&self) -> f64 {
        match self {
            Event::Iteration { step, .. } => *step,
            Event::BranchChanged { .. } => f64::NAN,
        }
    }
}

impl CanStopEarly for Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use rheo_core::{Args, Member, Observer, Series};
    use rheo_laws::{Elastic, PowerLawViscous};
    use rheo_solvers::{Config, Status};
    use uom::si::{
        f64::{MolarEnergy, Pressure},
        molar_energy::joule_per_mole,
        pressure::pascal,
    };

    /// Stops once the relative step drops below a loose tolerance.
    struct Loose(f64);

    impl<E: HasStep, A: CanStopEarly> Observer<E, A> for Loose {
        fn observe(&mut self, event: &E) -> Option<A> {
            (event.step() < self.0).then(A::stop_early)
        }
    }

    #[test]
    fn generic_observer_stops_a_solver() {
        let series = Series::new(vec![
            Member::element(PowerLawViscous::new(
                1.67e-24,
                3.3,
                MolarEnergy::new::<joule_per_mole>(187e3),
            )),
            Member::element(Elastic::new(Pressure::new::<pascal>(1e11))),
        ])
        .expect("valid composition");
        let args = Args::new().with_temperature(773.15).with_dt(3.15576e10);

        let loose = rheo_solvers::stress(&series, 1e-14, &args, &Config::default(), Loose(1e-2))
            .expect("stops cleanly");
        let tight = rheo_solvers::stress_unobserved(&series, 1e-14, &args, &Config::default())
            .expect("should converge");

        assert_eq!(loose.status, Status::StoppedByObserver);
        assert!(loose.iters < tight.iters);
        assert_relative_eq!(loose.stress, tight.stress, max_relative = 1e-3);
    }

    #[test]
    fn branch_changes_carry_no_residual() {
        let event = Event::BranchChanged {
            member: 2,
            iter: 4,
            active: true,
        };
        assert!(event.residual().is_nan());
        assert!(event.step().is_nan());
    }
}
