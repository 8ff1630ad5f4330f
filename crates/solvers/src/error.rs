use rheo_core::ElementError;
use thiserror::Error;

use crate::{ConfigError, Stage};

/// Errors that can occur while solving a composite.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "{stage} solver did not converge in {iters} iters (step {step:e}, residual {residual:e})"
    )]
    NonConvergence {
        stage: Stage,
        iters: usize,
        step: f64,
        residual: f64,
    },

    #[error("{stage} solver hit a singular jacobian at iteration {iter}")]
    SingularJacobian { stage: Stage, iter: usize },

    #[error("{stage} solver produced a non-finite value at iteration {iter}")]
    NonFinite { stage: Stage, iter: usize },

    #[error("plastic member {member} switched between active and inactive {switches} times")]
    BranchOscillation { member: usize, switches: usize },

    #[error("return mapping did not converge in {iters} iterations (yield value {yield_value:e})")]
    ReturnMap { iters: usize, yield_value: f64 },

    #[error("viscosity is undefined at zero strain rate")]
    ZeroStrainRate,

    #[error("{stage} solver does not support {reason}")]
    Unsupported {
        stage: Stage,
        reason: &'static str,
    },

    #[error("element evaluation failed")]
    Element(#[from] ElementError),

    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
}
