use rheo_core::{Args, Element, ElementError, Plastic};
use uom::si::{
    angle::radian,
    dynamic_viscosity::pascal_second,
    f64::{Angle, DynamicViscosity, Pressure},
    pressure::pascal,
};

/// Drucker-Prager plasticity on second invariants.
///
/// ```text
/// F = τ − C·cos φ − P·sin φ − η_vp·λ
/// Q = τ
/// ```
///
/// `C` is the cohesion, `φ` the friction angle, and `η_vp` an optional
/// viscoplastic regularization viscosity. The deviatoric flow rule is linear
/// in stress, so `∂Q/∂τ = 1` and the plastic strain rate equals `λ`.
/// Pressure is read from [`Args`] and is required only when `φ` is nonzero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DruckerPrager {
    cohesion: f64,
    friction: f64,
    regularization: f64,
}

impl DruckerPrager {
    #[must_use]
    pub fn new(cohesion: Pressure, friction_angle: Angle) -> Self {
        Self {
            cohesion: cohesion.get::<pascal>(),
            friction: friction_angle.get::<radian>(),
            regularization: 0.0,
        }
    }

    /// Adds viscoplastic regularization `η_vp`.
    #[must_use]
    pub fn with_regularization(mut self, viscosity: DynamicViscosity) -> Self {
        self.regularization = viscosity.get::<pascal_second>();
        self
    }

    /// Stress at which plastic flow starts under the given pressure.
    ///
    /// # Errors
    ///
    /// Returns an error if the friction angle is nonzero and no pressure is set.
    pub fn yield_stress(&self, args: &Args) -> Result<f64, ElementError> {
        #[allow(clippy::float_cmp)]
        let pressure = if self.friction == 0.0 {
            args.pressure().unwrap_or(0.0)
        } else {
            args.pressure()
                .ok_or(ElementError::MissingArg { name: "pressure" })?
        };
        Ok(self.cohesion * self.friction.cos() + pressure * self.friction.sin())
    }
}

impl Element for DruckerPrager {
    /// Plastic strain rate after returning `stress` to the yield surface.
    ///
    /// The non-plastic part of the composite is represented by the effective
    /// viscosity in [`Args`]; without it, only the regularization resists flow.
    fn strain_rate(&self, stress: f64, args: &Args) -> Result<f64, ElementError> {
        let trial = self.yield_function(stress, 0.0, args)?;
        if trial <= 0.0 {
            return Ok(0.0);
        }
        let viscosity = args.effective_viscosity().unwrap_or(0.0);
        let resistance = 2.0 * viscosity + self.regularization;
        if resistance <= 0.0 {
            return Err(ElementError::InvalidInput(
                "yielding without effective viscosity or regularization is unbounded".into(),
            ));
        }
        Ok(trial / resistance)
    }

    /// Flow stress at the given plastic strain rate.
    fn stress(&self, strain_rate: f64, args: &Args) -> Result<f64, ElementError> {
        Ok(self.yield_stress(args)? + self.regularization * strain_rate)
    }

    fn dstress_dstrain_rate(&self, _strain_rate: f64, _args: &Args) -> Result<f64, ElementError> {
        Ok(self.regularization)
    }

    fn as_plastic(&self) -> Option<&dyn Plastic> {
        Some(self)
    }
}

impl Plastic for DruckerPrager {
    fn yield_function(
        &self,
        stress: f64,
        multiplier: f64,
        args: &Args,
    ) -> Result<f64, ElementError> {
        Ok(stress - self.yield_stress(args)? - self.regularization * multiplier)
    }

    fn dq_dstress(&self, _stress: f64, _args: &Args) -> Result<f64, ElementError> {
        Ok(1.0)
    }

    fn df_dstress(&self, _stress: f64, _args: &Args) -> Result<f64, ElementError> {
        Ok(1.0)
    }

    fn df_dmultiplier(&self, _stress: f64, _args: &Args) -> Result<f64, ElementError> {
        Ok(-self.regularization)
    }
}
