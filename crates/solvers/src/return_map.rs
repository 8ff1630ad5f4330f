//! Plastic return mapping for a single plastic element.
//!
//! Given a trial stress and the effective viscosity of everything the plastic
//! element is coupled to, find the multiplier `λ ≥ 0` that returns the stress
//! to the yield surface:
//!
//! ```text
//! τ_pl = τ_trial − 2·η_eff·λ·∂Q/∂τ(τ_pl)
//! F(τ_pl, λ) = 0
//! ```
//!
//! When the trial yield value is not positive the element does not flow and
//! the multiplier is exactly zero.

use rheo_core::{Args, Plastic};

use crate::{Config, Error, Stage};

/// The result of a return mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnMap {
    /// Plastic multiplier `λ`.
    pub multiplier: f64,
    /// Stress on the yield surface, or the trial stress when inactive.
    pub stress: f64,
    /// Plastic strain rate `λ·∂Q/∂τ`.
    pub strain_rate: f64,
    /// Newton iterations used; zero when the element does not yield.
    pub iters: usize,
}

/// Returns `trial` to the yield surface of `plastic`.
///
/// Converges when `|F| ≤ tol · |τ_trial|`, within
/// `config.return_map_max_iters` iterations.
///
/// # Errors
///
/// Returns an error if the config is invalid, the element fails to evaluate,
/// the viscosity is not finite, `∂F/∂λ` of the coupled system vanishes, or
/// the iteration cap is reached.
pub fn return_map(
    plastic: &dyn Plastic,
    trial: f64,
    viscosity: f64,
    args: &Args,
    config: &Config,
) -> Result<ReturnMap, Error> {
    config.validate()?;
    if plastic.yield_function(trial, 0.0, args)? <= 0.0 {
        return Ok(ReturnMap {
            multiplier: 0.0,
            stress: trial,
            strain_rate: 0.0,
            iters: 0,
        });
    }
    if !viscosity.is_finite() {
        return Err(Error::NonFinite {
            stage: Stage::ReturnMap,
            iter: 0,
        });
    }

    let tolerance = config.tol * trial.abs().max(f64::MIN_POSITIVE);
    let mut multiplier = 0.0;
    let mut dq = plastic.dq_dstress(trial, args)?;
    let mut value = f64::NAN;

    for iter in 1..=config.return_map_max_iters {
        let stress = trial - 2.0 * viscosity * multiplier * dq;
        dq = plastic.dq_dstress(stress, args)?;
        value = plastic.yield_function(stress, multiplier, args)?;

        if value.abs() <= tolerance {
            return Ok(ReturnMap {
                multiplier,
                stress,
                strain_rate: multiplier * dq,
                iters: iter,
            });
        }

        let slope = -plastic.df_dstress(stress, args)? * 2.0 * viscosity * dq
            + plastic.df_dmultiplier(stress, args)?;
        if slope == 0.0 || !slope.is_finite() {
            return Err(Error::SingularJacobian {
                stage: Stage::ReturnMap,
                iter,
            });
        }
        multiplier -= value / slope;
    }

    Err(Error::ReturnMap {
        iters: config.return_map_max_iters,
        yield_value: value,
    })
}
