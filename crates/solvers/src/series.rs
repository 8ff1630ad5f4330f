//! Strain rate of a whole series composite under a given stress.

use rheo_core::{Args, Member, Series};

use crate::{Config, Error, eval, group, return_map};

/// Total strain rate of `series` at `stress`.
///
/// Plain members are evaluated directly and parallel groups by their inner
/// solve. A plastic series member treats `stress` as its trial stress and is
/// returned to its yield surface against the effective viscosity in `args`,
/// or, when none is given, the tangent viscosity `1 / (2 · Σ dε/dτ)` of the
/// plain members.
///
/// # Errors
///
/// Returns an error if a member fails to evaluate or an inner solve fails.
pub fn strain_rate(
    series: &Series,
    stress: f64,
    args: &Args,
    config: &Config,
) -> Result<f64, Error> {
    config.validate()?;

    let mut total = 0.0;
    for member in series.members() {
        total += match member {
            Member::Element(e) => match e.as_plastic() {
                None => e.strain_rate(stress, args)?,
                Some(plastic) => {
                    let viscosity = match args.effective_viscosity() {
                        Some(viscosity) => viscosity,
                        None => tangent_viscosity(series, stress, args, config)?,
                    };
                    let args = args.with_effective_viscosity(viscosity);
                    return_map(plastic, stress, viscosity, &args, config)?.strain_rate
                }
            },
            Member::Parallel(p) => group::solve(p, stress, args, config)?.strain_rate,
        };
    }
    Ok(total)
}

/// `d(strain rate)/d(stress)` of `series` at `stress`.
///
/// Sums the plain members and the parallel groups. Plastic series members
/// contribute nothing.
///
/// # Errors
///
/// Returns an error if a member fails to evaluate or an inner solve fails.
pub fn dstrain_rate_dstress(
    series: &Series,
    stress: f64,
    args: &Args,
    config: &Config,
) -> Result<f64, Error> {
    config.validate()?;

    let mut total = eval::nonplastic_compliance(series, stress, args, config.derivatives)?;
    for member in series.members() {
        if let Member::Parallel(p) = member {
            total += group::dstrain_rate_dstress(p, stress, args, config)?;
        }
    }
    Ok(total)
}

/// Viscosity `1 / (2 · Σ dε/dτ)` of the plain non-plastic members.
pub(crate) fn tangent_viscosity(
    series: &Series,
    stress: f64,
    args: &Args,
    config: &Config,
) -> Result<f64, Error> {
    let compliance = eval::nonplastic_compliance(series, stress, args, config.derivatives)?;
    Ok(0.5 / compliance)
}
