//! Scalar Newton solver for series composites of plain elements.
//!
//! The only unknown is the shared stress `τ`. Each iteration evaluates
//! `f(τ) = ε_target − Σ εᵢ(τ)` and updates `τ ← τ + f / Σ dεᵢ/dτ` until the
//! relative step `|Δτ| / (|τ| + guard)` falls below the tolerance or the
//! residual is exactly zero. The iteration is capped by `config.max_iters`.
//!
//! # Observer Events
//!
//! One [`Event::Iteration`] per iteration, after the update. Returning
//! [`Action::StopEarly`] ends the solve with [`Status::StoppedByObserver`].

use rheo_core::{Args, Observer, Series};

use crate::{Action, Config, Error, Event, Solution, Status, Variant, eval, guess};

/// Solves for the stress of `series` at `strain_rate`.
///
/// # Errors
///
/// Returns an error if the composite has parallel groups or plastic
/// elements, the config is invalid, an element fails, the summed derivative
/// vanishes, or `config.max_iters` is reached.
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
    let metadata = series.metadata();
    if metadata.has_parallel() || metadata.has_plastic() {
        return Err(Error::Unsupported {
            stage: Variant::Scalar.into(),
            reason: "parallel groups or plastic elements",
        });
    }

    let mut stress = match config.initial_stress {
        Some(stress) => stress,
        None => guess::harmonic_stress(series, strain_rate, args)?,
    };

    let mut step = f64::INFINITY;
    let mut residual = f64::NAN;
    for iter in 1..=config.max_iters {
        let value = strain_rate - eval::nonplastic_strain_rate(series, stress, args)?;
        residual = value.abs();

        let delta = if value == 0.0 {
            0.0
        } else {
            let slope = eval::nonplastic_compliance(series, stress, args, config.derivatives)?;
            if slope == 0.0 || !slope.is_finite() {
                return Err(Error::SingularJacobian {
                    stage: Variant::Scalar.into(),
                    iter,
                });
            }
            value / slope
        };

        stress += delta;
        if !stress.is_finite() {
            return Err(Error::NonFinite {
                stage: Variant::Scalar.into(),
                iter,
            });
        }
        step = delta.abs() / (stress.abs() + config.step_guard);

        let unknowns = [stress];
        let event = Event::Iteration {
            variant: Variant::Scalar,
            iter,
            unknowns: &unknowns,
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
                variant: Variant::Scalar,
                stress,
                strain_rate,
                unknowns: unknowns.to_vec(),
                iters: iter,
            });
        }
    }

    Err(Error::NonConvergence {
        stage: Variant::Scalar.into(),
        iters: config.max_iters,
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
