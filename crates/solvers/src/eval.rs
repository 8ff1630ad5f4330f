//! Closed-form evaluators over elements, parallel groups, and the plain
//! members of a series composite.

use rheo_core::{Args, Element, ElementError, Member, Parallel, Series};

use crate::Derivatives;

/// Central difference of `f` at `x`.
///
/// The step scales with `|x|` and never drops below `√f64::MIN_POSITIVE`,
/// so a zero argument still yields a finite quotient.
pub(crate) fn central_difference<F>(f: F, x: f64) -> Result<f64, ElementError>
where
    F: Fn(f64) -> Result<f64, ElementError>,
{
    let h = f64::EPSILON.cbrt() * x.abs().max(f64::MIN_POSITIVE.sqrt());
    Ok((f(x + h)? - f(x - h)?) / (2.0 * h))
}

/// `d(strain rate)/d(stress)` of an element under the given derivative mode.
pub(crate) fn dstrain_rate_dstress(
    element: &dyn Element,
    stress: f64,
    args: &Args,
    mode: Derivatives,
) -> Result<f64, ElementError> {
    let numeric = || central_difference(|s| element.strain_rate(s, args), stress);
    match mode {
        Derivatives::Analytic => element.dstrain_rate_dstress(stress, args),
        Derivatives::Numeric => numeric(),
        Derivatives::Auto => match element.dstrain_rate_dstress(stress, args) {
            Err(ElementError::NotImplemented { .. }) => numeric(),
            other => other,
        },
    }
}

/// `d(stress)/d(strain rate)` of an element under the given derivative mode.
pub(crate) fn dstress_dstrain_rate(
    element: &dyn Element,
    strain_rate: f64,
    args: &Args,
    mode: Derivatives,
) -> Result<f64, ElementError> {
    let numeric = || central_difference(|e| element.stress(e, args), strain_rate);
    match mode {
        Derivatives::Analytic => element.dstress_dstrain_rate(strain_rate, args),
        Derivatives::Numeric => numeric(),
        Derivatives::Auto => match element.dstress_dstrain_rate(strain_rate, args) {
            Err(ElementError::NotImplemented { .. }) => numeric(),
            other => other,
        },
    }
}

/// Stress carried by a parallel group at a shared strain rate.
///
/// The members' stresses add, so this is closed form with no inner solve.
///
/// # Errors
///
/// Returns an error if any member fails to evaluate.
pub fn parallel_stress(
    group: &Parallel,
    strain_rate: f64,
    args: &Args,
) -> Result<f64, ElementError> {
    group
        .elements()
        .iter()
        .map(|e| e.stress(strain_rate, args))
        .sum()
}

/// `d(stress)/d(strain rate)` of a parallel group: the sum over its members.
///
/// # Errors
///
/// Returns an error if any member fails to evaluate, or if a member has no
/// closed-form derivative and `mode` is [`Derivatives::Analytic`].
pub fn parallel_dstress_dstrain_rate(
    group: &Parallel,
    strain_rate: f64,
    args: &Args,
    mode: Derivatives,
) -> Result<f64, ElementError> {
    group
        .elements()
        .iter()
        .map(|e| dstress_dstrain_rate(e.as_ref(), strain_rate, args, mode))
        .sum()
}

/// Stress and stiffness of the non-plastic members of a group.
pub(crate) fn nonplastic_group(
    group: &Parallel,
    strain_rate: f64,
    args: &Args,
    mode: Derivatives,
) -> Result<(f64, f64), ElementError> {
    let mut stress = 0.0;
    let mut stiffness = 0.0;
    for element in group.nonplastic() {
        stress += element.stress(strain_rate, args)?;
        stiffness += dstress_dstrain_rate(element, strain_rate, args, mode)?;
    }
    Ok((stress, stiffness))
}

/// Iterates over the plain, non-plastic elements of a series composite.
pub(crate) fn plain_elements(series: &Series) -> impl Iterator<Item = &dyn Element> {
    series.members().iter().filter_map(|m| match m {
        Member::Element(e) if e.as_plastic().is_none() => Some(e.as_ref()),
        _ => None,
    })
}

/// Strain rate carried by the plain non-plastic series members at `stress`.
pub(crate) fn nonplastic_strain_rate(
    series: &Series,
    stress: f64,
    args: &Args,
) -> Result<f64, ElementError> {
    plain_elements(series)
        .map(|e| e.strain_rate(stress, args))
        .sum()
}

/// Compliance of the plain non-plastic series members at `stress`.
pub(crate) fn nonplastic_compliance(
    series: &Series,
    stress: f64,
    args: &Args,
    mode: Derivatives,
) -> Result<f64, ElementError> {
    plain_elements(series)
        .map(|e| dstrain_rate_dstress(e, stress, args, mode))
        .sum()
}
