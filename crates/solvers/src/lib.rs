//! Local Newton solvers for series/parallel composite rheologies.
//!
//! Given a [`Series`] composite and a target strain rate, [`stress`] picks a
//! solver variant from the composite's metadata alone and returns the shared
//! stress together with every internal unknown:
//!
//! - [`scalar`] — plain elements in series; the stress is the only unknown
//! - [`block`] — series with parallel groups; one strain rate per group
//! - [`block_plastic`] — plastic elements anywhere, closed-form yield derivatives
//! - [`numeric_plastic`] — one plastic series element, differentiation-based
//!
//! The reverse direction, [`strain_rate`] at a given stress, is explicit
//! except for parallel groups, which [`group::solve`] handles, and plastic
//! elements, which [`return_map`] returns to their yield surface.
//!
//! Every solver is bounded by an explicit iteration cap from [`Config`] and
//! reports exceeding it as [`Error::NonConvergence`]. Progress is reported
//! through an [`Observer`] receiving [`Event`]s; there is no other logging.
//!
//! A built composite is immutable, so concurrent solves over the same
//! composite are safe.
//!
//! [`Observer`]: rheo_core::Observer

mod config;
mod error;
mod eval;
mod event;
mod guess;
mod return_map;
mod series;
mod solution;
mod system;
mod variant;
mod viscosity;

pub mod block;
pub mod block_plastic;
pub mod group;
pub mod numeric_plastic;
pub mod quantity;
pub mod scalar;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError, Derivatives};
pub use error::Error;
pub use eval::{parallel_dstress_dstrain_rate, parallel_stress};
pub use event::{Action, Event};
pub use guess::{harmonic_strain_rate, harmonic_stress};
pub use return_map::{ReturnMap, return_map};
pub use series::{dstrain_rate_dstress, strain_rate};
pub use solution::{Solution, Status};
pub use variant::{Stage, Variant};
pub use viscosity::viscosity;

use rheo_core::{Args, Observer, Series};

/// Solves for the stress of `series` driven at `strain_rate`.
///
/// The variant is chosen by [`Variant::select`] from the composite's
/// metadata and `config.derivatives`.
///
/// # Errors
///
/// Returns an error if the config is invalid or the selected solver fails.
pub fn stress<Obs>(
    series: &Series,
    strain_rate: f64,
    args: &Args,
    config: &Config,
    observer: Obs,
) -> Result<Solution, Error>
where
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    config.validate()?;
    match Variant::select(series.metadata(), config.derivatives) {
        Variant::Scalar => scalar::solve(series, strain_rate, args, config, observer),
        Variant::Block => block::solve(series, strain_rate, args, config, observer),
        Variant::BlockPlastic => block_plastic::solve(series, strain_rate, args, config, observer),
        Variant::NumericPlastic => {
            numeric_plastic::solve(series, strain_rate, args, config, observer)
        }
    }
}

/// Solves for the stress of `series` without observer support.
///
/// # Errors
///
/// See [`stress`].
pub fn stress_unobserved(
    series: &Series,
    strain_rate: f64,
    args: &Args,
    config: &Config,
) -> Result<Solution, Error> {
    stress(series, strain_rate, args, config, ())
}
