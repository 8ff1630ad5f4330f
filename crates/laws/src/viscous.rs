use rheo_core::{Args, Element, ElementError};
use uom::si::{
    dynamic_viscosity::pascal_second,
    f64::{DynamicViscosity, MolarEnergy},
    molar_energy::joule_per_mole,
};

/// Universal gas constant in J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.3145;

/// Newtonian viscous creep: `ε = τ / 2η`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearViscous {
    viscosity: f64,
}

impl LinearViscous {
    #[must_use]
    pub fn new(viscosity: DynamicViscosity) -> Self {
        Self {
            viscosity: viscosity.get::<pascal_second>(),
        }
    }

    #[must_use]
    pub fn viscosity(&self) -> DynamicViscosity {
        DynamicViscosity::new::<pascal_second>(self.viscosity)
    }
}

impl Element for LinearViscous {
    fn strain_rate(&self, stress: f64, _args: &Args) -> Result<f64, ElementError> {
        Ok(stress / (2.0 * self.viscosity))
    }

    fn stress(&self, strain_rate: f64, _args: &Args) -> Result<f64, ElementError> {
        Ok(2.0 * self.viscosity * strain_rate)
    }

    fn dstrain_rate_dstress(&self, _stress: f64, _args: &Args) -> Result<f64, ElementError> {
        Ok(1.0 / (2.0 * self.viscosity))
    }

    fn dstress_dstrain_rate(&self, _strain_rate: f64, _args: &Args) -> Result<f64, ElementError> {
        Ok(2.0 * self.viscosity)
    }
}

/// Thermally activated power-law creep: `ε = A · τⁿ · exp(−E / RT)`.
///
/// The prefactor `A` is in `Pa⁻ⁿ·s⁻¹`; temperature is read from [`Args`].
/// The law is odd in its argument so a Newton overshoot below zero stays finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawViscous {
    prefactor: f64,
    exponent: f64,
    activation_energy: f64,
}

impl PowerLawViscous {
    #[must_use]
    pub fn new(prefactor: f64, exponent: f64, activation_energy: MolarEnergy) -> Self {
        Self {
            prefactor,
            exponent,
            activation_energy: activation_energy.get::<joule_per_mole>(),
        }
    }

    /// Temperature-corrected prefactor `A · exp(−E / RT)`.
    fn rate_factor(&self, args: &Args) -> Result<f64, ElementError> {
        let temperature = args.require_temperature()?;
        if temperature <= 0.0 {
            return Err(ElementError::InvalidInput(format!(
                "temperature must be positive, got {temperature} K"
            )));
        }
        Ok(self.prefactor * (-self.activation_energy / (GAS_CONSTANT * temperature)).exp())
    }
}

impl Element for PowerLawViscous {
    fn strain_rate(&self, stress: f64, args: &Args) -> Result<f64, ElementError> {
        let factor = self.rate_factor(args)?;
        Ok(factor * stress.abs().powf(self.exponent - 1.0) * stress)
    }

    fn stress(&self, strain_rate: f64, args: &Args) -> Result<f64, ElementError> {
        let factor = self.rate_factor(args)?;
        Ok((strain_rate.abs() / factor).powf(1.0 / self.exponent) * strain_rate.signum())
    }

    fn dstrain_rate_dstress(&self, stress: f64, args: &Args) -> Result<f64, ElementError> {
        let factor = self.rate_factor(args)?;
        Ok(self.exponent * factor * stress.abs().powf(self.exponent - 1.0))
    }

    fn dstress_dstrain_rate(&self, strain_rate: f64, args: &Args) -> Result<f64, ElementError> {
        let factor = self.rate_factor(args)?;
        let n = self.exponent;
        Ok((1.0 / n) * factor.powf(-1.0 / n) * strain_rate.abs().powf(1.0 / n - 1.0))
    }
}
