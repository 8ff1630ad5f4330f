//! Strain rate of a parallel group under a given stress.
//!
//! Members of a group share one strain rate and their stresses add, so the
//! strain rate at a prescribed stress is the root of `Σ σᵢ(ε) = τ`. When the
//! group holds a plastic element, that element stays rigid until its yield
//! function at the full stress turns positive; past yield it carries the
//! remainder `τ − Σ σ_np(ε)` on its yield surface.

use rheo_core::{Args, Parallel, Plastic};

use crate::{Config, Error, Stage, eval, guess};

/// The state of a parallel group at a prescribed stress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupState {
    /// Shared strain rate of the group.
    pub strain_rate: f64,
    /// Multiplier of the plastic element, zero without one.
    pub multiplier: f64,
    /// Stress carried by the plastic element, zero without one.
    pub plastic_stress: f64,
    /// Whether the plastic element is flowing.
    pub active: bool,
    /// Newton iterations used.
    pub iters: usize,
}

/// Solves for the strain rate of `group` at `stress`.
///
/// Seeds from `config.initial_strain_rate` when set, otherwise from a
/// harmonic-mean estimate, and iterates Newton's method up to
/// `config.max_iters` times.
///
/// # Errors
///
/// Returns an error if the config is invalid, a member fails to evaluate,
/// the group stiffness is zero or non-finite, or the iteration cap is reached.
pub fn solve(
    group: &Parallel,
    stress: f64,
    args: &Args,
    config: &Config,
) -> Result<GroupState, Error> {
    config.validate()?;
    match group.plastic_index() {
        None => viscous(group, stress, args, config),
        Some(index) => {
            let plastic = group.elements()[index]
                .as_plastic()
                .ok_or(Error::Unsupported {
                    stage: Stage::Group,
                    reason: "plastic index without plastic capability",
                })?;
            plastic_flow(group, plastic, stress, args, config)
        }
    }
}

/// `d(strain rate)/d(stress)` of `group` at `stress`: the reciprocal of the
/// summed member stiffness, or zero while the group is rigid.
///
/// # Errors
///
/// Returns an error if the inner solve fails or the stiffness is zero.
pub fn dstrain_rate_dstress(
    group: &Parallel,
    stress: f64,
    args: &Args,
    config: &Config,
) -> Result<f64, Error> {
    let state = solve(group, stress, args, config)?;
    if group.plastic_index().is_some() && !state.active {
        return Ok(0.0);
    }
    let stiffness =
        eval::parallel_dstress_dstrain_rate(group, state.strain_rate, args, config.derivatives)?;
    if stiffness == 0.0 || !stiffness.is_finite() {
        return Err(Error::SingularJacobian {
            stage: Stage::Group,
            iter: state.iters,
        });
    }
    Ok(stiffness.recip())
}

fn viscous(
    group: &Parallel,
    stress: f64,
    args: &Args,
    config: &Config,
) -> Result<GroupState, Error> {
    let seed = match config.initial_strain_rate {
        Some(rate) => rate,
        None => {
            let elements = group.elements().iter().map(|e| e.as_ref());
            guess::harmonic_strain_rate(elements, stress, args)?
        }
    };

    let (strain_rate, iters) = newton(seed, config, |rate| {
        let (sum, stiffness) = eval::nonplastic_group(group, rate, args, config.derivatives)?;
        Ok((sum - stress, stiffness))
    })?;

    Ok(GroupState {
        strain_rate,
        multiplier: 0.0,
        plastic_stress: 0.0,
        active: false,
        iters,
    })
}

fn plastic_flow(
    group: &Parallel,
    plastic: &dyn Plastic,
    stress: f64,
    args: &Args,
    config: &Config,
) -> Result<GroupState, Error> {
    let excess = plastic.yield_function(stress, 0.0, args)?;
    if excess <= 0.0 {
        return Ok(GroupState {
            strain_rate: 0.0,
            multiplier: 0.0,
            plastic_stress: stress,
            active: false,
            iters: 0,
        });
    }

    let seed = match config.initial_strain_rate {
        Some(rate) => rate,
        None => guess::harmonic_strain_rate(group.nonplastic(), excess, args)?,
    };

    // g(ε) = F(τ − Σ σ_np(ε), ε / ∂Q) vanishes once the plastic element sits
    // on its yield surface while carrying the remainder of the stress.
    let (strain_rate, iters) = newton(seed, config, |rate| {
        let (carried, stiffness) = eval::nonplastic_group(group, rate, args, config.derivatives)?;
        let local = stress - carried;
        let dq = plastic.dq_dstress(local, args)?;
        let value = plastic.yield_function(local, rate / dq, args)?;
        let slope = -plastic.df_dstress(local, args)? * stiffness
            + plastic.df_dmultiplier(local, args)? / dq;
        Ok((value, slope))
    })?;

    let (carried, _) = eval::nonplastic_group(group, strain_rate, args, config.derivatives)?;
    let plastic_stress = stress - carried;
    let dq = plastic.dq_dstress(plastic_stress, args)?;
    Ok(GroupState {
        strain_rate,
        multiplier: strain_rate / dq,
        plastic_stress,
        active: true,
        iters,
    })
}

/// Scalar Newton iteration on `g(ε) = 0` given `(g, dg/dε)`.
fn newton<F>(seed: f64, config: &Config, residual: F) -> Result<(f64, usize), Error>
where
    F: Fn(f64) -> Result<(f64, f64), Error>,
{
    let mut rate = seed;
    let mut step = f64::INFINITY;
    let mut value = f64::NAN;
    for iter in 1..=config.max_iters {
        let (current, slope) = residual(rate)?;
        value = current;
        if value == 0.0 {
            return Ok((rate, iter));
        }
        if slope == 0.0 || !slope.is_finite() {
            return Err(Error::SingularJacobian {
                stage: Stage::Group,
                iter,
            });
        }

        let delta = -value / slope;
        rate += delta;
        if !rate.is_finite() {
            return Err(Error::NonFinite {
                stage: Stage::Group,
                iter,
            });
        }

        step = delta.abs() / (rate.abs() + config.step_guard);
        if step <= config.tol {
            return Ok((rate, iter));
        }
    }

    Err(Error::NonConvergence {
        stage: Stage::Group,
        iters: config.max_iters,
        step,
        residual: value.abs(),
    })
}
