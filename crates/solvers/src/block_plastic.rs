//! Block Newton solver with plasticity, using closed-form yield derivatives.
//!
//! Extends the [block solver](crate::block) layout with one multiplier per
//! plastic element, plus an explicit local stress when the element sits in
//! a parallel group. Each plastic element is either active, enforcing
//! `F(τ_local, λ) = 0` and adding `λ·∂Q/∂τ` to the strain rate, or inactive,
//! with `λ` pinned to zero. An inactive element inside a group also pins the
//! group strain rate to zero. Pinned unknowns are reset exactly after every
//! update.
//!
//! # Active set
//!
//! After every update an inactive element activates when
//! `F(τ_local, 0) > 0`, and an active element whose multiplier turned
//! negative deactivates with `λ = 0`. A solve converges only on an iteration
//! without switches. An element switching more than
//! `config.max_branch_switches` times ends the solve with
//! [`Error::BranchOscillation`].
//!
//! # Observer Events
//!
//! One [`Event::BranchChanged`] per switch, then one [`Event::Iteration`]
//! per iteration. Returning [`Action::StopEarly`] from either ends the
//! solve with [`Status::StoppedByObserver`].

use rheo_core::{Args, Observer, STRESS, Series};

use crate::{
    Action, Config, Error, Event, Solution, Status, Variant,
    system::{System, step_norm},
};

/// Solves for the stress of `series` at `strain_rate`.
///
/// # Errors
///
/// Returns an error if the config is invalid, an element fails, the
/// Jacobian is singular, an element keeps switching branches, or
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

    let layout = series.metadata().layout();
    let mut system = System::new(series, strain_rate, args, config, Variant::BlockPlastic);
    let (mut x, mut active) = system.seed()?;
    let mut switches = vec![0_usize; active.len()];

    let mut step = f64::INFINITY;
    let mut residual = f64::NAN;
    for iter in 1..=config.block_max_iters {
        system.assemble(&x, &active)?;
        residual = system.residual_norm();
        let delta = system.newton_step(iter)?;

        let previous = x.clone();
        for (xi, di) in x.iter_mut().zip(delta.iter()) {
            *xi += di;
        }
        for (k, slot) in layout.plastics().iter().enumerate() {
            if !active[k] {
                x[slot.multiplier] = 0.0;
                if slot.stress.is_some() {
                    x[system.group_index(slot)?] = 0.0;
                }
            }
        }
        let applied: Vec<f64> = x.iter().zip(&previous).map(|(new, old)| new - old).collect();
        step = step_norm(&x, &applied, config.step_guard);

        let mut switched = false;
        for (k, slot) in layout.plastics().iter().enumerate() {
            let flip = if active[k] {
                x[slot.multiplier] < 0.0
            } else {
                system.trial_yield(slot, &x)? > 0.0
            };
            if !flip {
                continue;
            }

            switched = true;
            switches[k] += 1;
            if switches[k] > config.max_branch_switches {
                return Err(Error::BranchOscillation {
                    member: slot.member,
                    switches: switches[k],
                });
            }

            active[k] = !active[k];
            if !active[k] {
                x[slot.multiplier] = 0.0;
                if let Some(s) = slot.stress {
                    x[system.group_index(slot)?] = 0.0;
                    x[s] = system.rigid_stress(slot, x[STRESS])?;
                }
            }

            let event = Event::BranchChanged {
                member: slot.member,
                iter,
                active: active[k],
            };
            if let Some(Action::StopEarly) = observer.observe(&event) {
                return Ok(finish(Status::StoppedByObserver, x, strain_rate, iter));
            }
        }

        let event = Event::Iteration {
            variant: Variant::BlockPlastic,
            iter,
            unknowns: &x,
            step,
            residual,
        };
        let status = match observer.observe(&event) {
            Some(Action::StopEarly) => Some(Status::StoppedByObserver),
            None if step <= config.tol && !switched => Some(Status::Converged),
            None => None,
        };
        if let Some(status) = status {
            return Ok(finish(status, x, strain_rate, iter));
        }
    }

    Err(Error::NonConvergence {
        stage: Variant::BlockPlastic.into(),
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

fn finish(status: Status, unknowns: Vec<f64>, strain_rate: f64, iters: usize) -> Solution {
    Solution {
        status,
        variant: Variant::BlockPlastic,
        stress: unknowns[STRESS],
        strain_rate,
        unknowns,
        iters,
    }
}
