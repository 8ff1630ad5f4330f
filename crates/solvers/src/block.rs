//! Block Newton solver for series composites with parallel groups.
//!
//! The unknowns are the shared series stress and one strain rate per
//! parallel group, `x = [τ, ε_g₁, …, ε_gₖ]`. Each iteration assembles the
//! dense Jacobian, solves it by LU decomposition, and updates `x`
//! additively until the relative step `Σ|Δxᵢ| / (|xᵢ| + guard)` falls
//! below the tolerance.
//!
//! Groups start from the strain rate they would carry alone at the initial
//! stress, so a converged stress passed as `initial_stress` finishes in a
//! single iteration.
//!
//! # Observer Events
//!
//! One [`Event::Iteration`] per iteration, after the update. Returning
//! [`Action::StopEarly`] ends the solve with [`Status::StoppedByObserver`].

use rheo_core::{Args, Observer, STRESS, Series};

use crate::{
    Action, Config, Error, Event, Solution, Status, Variant,
    system::{System, step_norm},
};

/// Solves for the stress of `series` at `strain_rate`.
///
/// # Errors
///
/// Returns an error if the composite has plastic elements, the config is
/// invalid, an element fails, the Jacobian is singular, or
/// `config.block_max_iters` is reached.
pub fn solve<Obs>(
    series: &Series,
    strain_rate: f64,
    args: &Args,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    config.validate()?;
    if series.metadata().has_plastic() {
        return Err(Error::Unsupported {
            stage: Variant::Block.into(),
            reason: "plastic elements",
        });
    }

    let mut system = System::new(series, strain_rate, args, config, Variant::Block);
    let (mut x, _) = system.seed()?;

    let mut step = f64::INFINITY;
    let mut residual = f64::NAN;
    for iter in 1..=config.block_max_iters {
        system.assemble(&x, &[])?;
        residual = system.residual_norm();
        let delta = system.newton_step(iter)?;

        for (xi, di) in x.iter_mut().zip(delta.iter()) {
            *xi += di;
        }
        step = step_norm(&x, delta.as_slice(), config.step_guard);

        let event = Event::Iteration {
            variant: Variant::Block,
            iter,
            unknowns: &x,
            step,
            residual,
        };
        let status = match observer.observe(&event) {
            Some(Action::StopEarly) => Some(Status::StoppedByObserver),
            None if step <= config.tol => Some(Status::Converged),
            None => None,
        };

        if let Some(status) = status {
            return Ok(Solution {
                status,
                variant: Variant::Block,
                stress: x[STRESS],
                strain_rate,
                unknowns: x,
                iters: iter,
            });
        }
    }

    Err(Error::NonConvergence {
        stage: Variant::Block.into(),
        iters: config.block_max_iters,
        step,
        residual,
    })
}

/// Solves for the stress of `series` without observer support.
///
/// # Errors
///
/// See [`solve`].
pub fn solve_unobserved(
    series: &Series,
    strain_rate: f64,
    args: &Args,
    config: &Config,
) -> Result<Solution, Error> {
    solve(series, strain_rate, args, config, ())
}
