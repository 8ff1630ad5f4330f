//! Averaging initial guesses for the Newton solvers.
//!
//! Each member is assumed to carry the full load on its own; the results are
//! combined as a harmonic mean `1 / Σ (1 / xᵢ)`. These seeds only shorten the
//! iteration and carry no accuracy guarantee.

use rheo_core::{Args, Element, ElementError, Member, Series};

use crate::eval;

/// Harmonic-mean stress estimate of a series composite at `strain_rate`.
///
/// Plastic members and parallel groups are skipped. When no plain viscous or
/// elastic member remains, every member contributes its closed-form stress
/// instead. A zero member stress makes the estimate zero.
///
/// # Errors
///
/// Returns an error if a member fails to evaluate.
pub fn harmonic_stress(
    series: &Series,
    strain_rate: f64,
    args: &Args,
) -> Result<f64, ElementError> {
    let plain = eval::plain_elements(series)
        .map(|e| e.stress(strain_rate, args))
        .collect::<Result<Vec<_>, _>>()?;
    if !plain.is_empty() {
        return Ok(harmonic(plain));
    }

    let all = series
        .members()
        .iter()
        .map(|m| match m {
            Member::Element(e) => e.stress(strain_rate, args),
            Member::Parallel(p) => eval::parallel_stress(p, strain_rate, args),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(harmonic(all))
}

/// Harmonic-mean strain rate of elements sharing a strain rate at `stress`.
///
/// Exact for linear viscous members. A zero member strain rate makes the
/// estimate zero.
///
/// # Errors
///
/// Returns an error if a member fails to evaluate.
pub fn harmonic_strain_rate<'a, I>(
    elements: I,
    stress: f64,
    args: &Args,
) -> Result<f64, ElementError>
where
    I: IntoIterator<Item = &'a dyn Element>,
{
    let rates = elements
        .into_iter()
        .map(|e| e.strain_rate(stress, args))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(harmonic(rates))
}

#[allow(clippy::float_cmp)]
fn harmonic(values: Vec<f64>) -> f64 {
    if values.is_empty() || values.contains(&0.0) {
        return 0.0;
    }
    1.0 / values.into_iter().map(f64::recip).sum::<f64>()
}
