use rheo_core::{Args, Element, ElementError};
use uom::si::{f64::Pressure, pressure::pascal};

/// Incremental shear elasticity: `ε = (τ − τ_old) / (2G·dt)`.
///
/// Reads the time step and, when present, the previous-step stress from
/// [`Args`]. A missing previous stress is taken as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elastic {
    shear_modulus: f64,
}

impl Elastic {
    #[must_use]
    pub fn new(shear_modulus: Pressure) -> Self {
        Self {
            shear_modulus: shear_modulus.get::<pascal>(),
        }
    }

    #[must_use]
    pub fn shear_modulus(&self) -> Pressure {
        Pressure::new::<pascal>(self.shear_modulus)
    }

    fn stiffness(&self, args: &Args) -> Result<f64, ElementError> {
        let dt = args.require_dt()?;
        if dt <= 0.0 {
            return Err(ElementError::InvalidInput(format!(
                "time step must be positive, got {dt} s"
            )));
        }
        Ok(2.0 * self.shear_modulus * dt)
    }
}

impl Element for Elastic {
    fn strain_rate(&self, stress: f64, args: &Args) -> Result<f64, ElementError> {
        let previous = args.previous_stress().unwrap_or(0.0);
        Ok((stress - previous) / self.stiffness(args)?)
    }

    fn stress(&self, strain_rate: f64, args: &Args) -> Result<f64, ElementError> {
        let previous = args.previous_stress().unwrap_or(0.0);
        Ok(previous + self.stiffness(args)? * strain_rate)
    }

    fn dstrain_rate_dstress(&self, _stress: f64, args: &Args) -> Result<f64, ElementError> {
        Ok(1.0 / self.stiffness(args)?)
    }

    fn dstress_dstrain_rate(&self, _strain_rate: f64, args: &Args) -> Result<f64, ElementError> {
        self.stiffness(args)
    }
}
