use crate::Error;

/// Effective viscosity `η = τ / 2ε` of a stress and strain rate pair.
///
/// # Errors
///
/// Returns [`Error::ZeroStrainRate`] when `strain_rate` is zero.
///
/// # Example
///
/// ```
/// let eta = rheo_solvers::viscosity(2e7, 1e-14).unwrap();
/// assert!((eta / 1e21 - 1.0).abs() < 1e-12);
/// ```
pub fn viscosity(stress: f64, strain_rate: f64) -> Result<f64, Error> {
    if strain_rate == 0.0 {
        return Err(Error::ZeroStrainRate);
    }
    Ok(0.5 * stress / strain_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn halves_the_stress_to_strain_rate_ratio() {
        assert_relative_eq!(viscosity(3e6, 1e-15).expect("nonzero"), 1.5e21);
        assert_relative_eq!(viscosity(-3e6, -1e-15).expect("nonzero"), 1.5e21);
    }

    #[test]
    fn zero_strain_rate_is_an_error() {
        assert!(matches!(viscosity(1e6, 0.0), Err(Error::ZeroStrainRate)));
        assert!(matches!(viscosity(0.0, -0.0), Err(Error::ZeroStrainRate)));
    }
}
