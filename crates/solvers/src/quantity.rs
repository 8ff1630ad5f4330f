//! Unit-aware entry points.
//!
//! Solvers work on plain `f64` in SI base units. These wrappers accept and
//! return [`uom`] quantities, with strain rate expressed as a [`Frequency`].

use rheo_core::{Args, Series};
use uom::si::{
    dynamic_viscosity::pascal_second,
    f64::{DynamicViscosity, Frequency, Pressure},
    frequency::hertz,
    pressure::pascal,
};

use crate::{Config, Error};

/// Stress of `series` driven at `strain_rate`.
///
/// # Errors
///
/// See [`crate::stress`].
pub fn stress(
    series: &Series,
    strain_rate: Frequency,
    args: &Args,
    config: &Config,
) -> Result<Pressure, Error> {
    let solution = crate::stress_unobserved(series, strain_rate.get::<hertz>(), args, config)?;
    Ok(Pressure::new::<pascal>(solution.stress))
}

/// Strain rate of `series` under `stress`.
///
/// # Errors
///
/// See [`crate::strain_rate`].
pub fn strain_rate(
    series: &Series,
    stress: Pressure,
    args: &Args,
    config: &Config,
) -> Result<Frequency, Error> {
    let rate = crate::strain_rate(series, stress.get::<pascal>(), args, config)?;
    Ok(Frequency::new::<hertz>(rate))
}

/// Effective viscosity of a stress and strain rate pair.
///
/// # Errors
///
/// Returns [`Error::ZeroStrainRate`] when `strain_rate` is zero.
pub fn viscosity(stress: Pressure, strain_rate: Frequency) -> Result<DynamicViscosity, Error> {
    let eta = crate::viscosity(stress.get::<pascal>(), strain_rate.get::<hertz>())?;
    Ok(DynamicViscosity::new::<pascal_second>(eta))
}
