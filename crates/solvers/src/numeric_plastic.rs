//! Differentiation-based plastic solver for a series with one plastic element.
//!
//! Each outer iteration takes a Newton step on the stress with the plastic
//! strain rate held fixed, using a central-difference derivative of the
//! non-plastic members. The non-plastic members are then linearized into a
//! tangent viscosity `η = 1 / (2 · dε/dτ)`, the plastic strain rate is moved
//! back into a trial stress, and the plastic element is returned to its yield
//! surface. The returned stress becomes the new series stress.
//!
//! The outer iteration is capped by `config.numeric_plastic_max_iters`
//! (10 by default), far below the block solvers' cap.
//!
//! # Observer Events
//!
//! One [`Event::Iteration`] per iteration with the unknowns laid out as for
//! the block solvers. Returning [`Action::StopEarly`] ends the solve with
//! [`Status::StoppedByObserver`].

use rheo_core::{Args, Member, Observer, Plastic, STRESS, Series};

use crate::{
    Action, Config, Error, Event, Solution, Status, Variant,
    eval::{self, central_difference},
    guess, return_map,
};

/// Solves for the stress of `series` at `strain_rate`.
///
/// The last plastic series member is the one that flows; any earlier plastic
/// member is treated as rigid.
///
/// # Errors
///
/// Returns an error if the composite has parallel groups or no plastic
/// element, the config is invalid, an element fails, the derivative of the
/// non-plastic members vanishes, or `config.numeric_plastic_max_iters` is
/// reached.
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
    if series.metadata().has_parallel() {
        return Err(Error::Unsupported {
            stage: Variant::NumericPlastic.into(),
            reason: "parallel groups",
        });
    }
    let (member, plastic) = last_plastic(series).ok_or(Error::Unsupported {
        stage: Variant::NumericPlastic.into(),
        reason: "a composite without plastic elements",
    })?;
    let multiplier_index = series
        .metadata()
        .layout()
        .plastic(member)
        .map(|slot| slot.multiplier)
        .ok_or(Error::Unsupported {
            stage: Variant::NumericPlastic.into(),
            reason: "a layout that does not match its composition",
        })?;

    let nonplastic = |stress: f64| eval::nonplastic_strain_rate(series, stress, args);

    let mut stress = match config.initial_stress {
        Some(stress) => stress,
        None => guess::harmonic_stress(series, strain_rate, args)?,
    };
    let mut plastic_rate = 0.0;
    let mut unknowns = vec![0.0; series.metadata().layout().len()];

    let mut step = f64::INFINITY;
    let mut residual = f64::NAN;
    for iter in 1..=config.numeric_plastic_max_iters {
        let slope = central_difference(nonplastic, stress)?;
        let value = strain_rate - nonplastic(stress)? - plastic_rate;
        residual = value.abs();
        if slope == 0.0 || !slope.is_finite() {
            return Err(Error::SingularJacobian {
                stage: Variant::NumericPlastic.into(),
                iter,
            });
        }
        let predicted = stress + value / slope;

        let viscosity = 0.5 / central_difference(nonplastic, predicted)?;
        let trial = predicted + 2.0 * viscosity * plastic_rate;
        let local = args
            .with_nonplastic_strain_rate(nonplastic(predicted)?)
            .with_effective_viscosity(viscosity);
        let mapped = return_map(plastic, trial, viscosity, &local, config)?;

        if !mapped.stress.is_finite() {
            return Err(Error::NonFinite {
                stage: Variant::NumericPlastic.into(),
                iter,
            });
        }
        step = (mapped.stress - stress).abs() / (mapped.stress.abs() + config.step_guard)
            + (mapped.strain_rate - plastic_rate).abs()
                / (mapped.strain_rate.abs() + config.step_guard);
        stress = mapped.stress;
        plastic_rate = mapped.strain_rate;

        unknowns[STRESS] = stress;
        unknowns[multiplier_index] = mapped.multiplier;

        let event = Event::Iteration {
            variant: Variant::NumericPlastic,
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
                variant: Variant::NumericPlastic,
                stress,
                strain_rate,
                unknowns,
                iters: iter,
            });
        }
    }

    Err(Error::NonConvergence {
        stage: Variant::NumericPlastic.into(),
        iters: config.numeric_plastic_max_iters,
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

fn last_plastic(series: &Series) -> Option<(usize, &dyn Plastic)> {
    series
        .members()
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, m)| match m {
            Member::Element(e) => e.as_plastic().map(|p| (i, p)),
            Member::Parallel(_) => None,
        })
}
