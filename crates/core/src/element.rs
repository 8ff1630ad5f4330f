use std::fmt::Debug;

use thiserror::Error;

use crate::Args;

/// Errors an element may return when evaluating one of its capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    /// The element does not provide this capability in closed form.
    ///
    /// Derivative capabilities return this by default; solvers running with
    /// automatic derivative selection fall back to numerical differentiation.
    #[error("capability `{capability}` is not implemented by this element")]
    NotImplemented { capability: &'static str },

    /// A required auxiliary field was not supplied.
    #[error("missing auxiliary argument `{name}`")]
    MissingArg { name: &'static str },

    /// The inputs are outside the element's valid domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// The capability contract of an elementary constitutive law.
///
/// All quantities are second invariants in SI base units: stress in pascal,
/// strain rate in 1/s. Implementations must be pure; the same inputs always
/// give the same outputs.
///
/// The two derivative capabilities are optional. An element that has a
/// closed form overrides them; otherwise they report
/// [`ElementError::NotImplemented`] and the solvers differentiate numerically
/// when allowed to.
pub trait Element: Debug + Send + Sync {
    /// Strain rate carried by the element at the given stress.
    ///
    /// # Errors
    ///
    /// Returns an error if a required argument is missing or invalid.
    fn strain_rate(&self, stress: f64, args: &Args) -> Result<f64, ElementError>;

    /// Stress carried by the element at the given strain rate.
    ///
    /// # Errors
    ///
    /// Returns an error if a required argument is missing or invalid.
    fn stress(&self, strain_rate: f64, args: &Args) -> Result<f64, ElementError>;

    /// Closed-form `d(strain rate)/d(stress)` at the given stress.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::NotImplemented`] unless overridden.
    fn dstrain_rate_dstress(&self, _stress: f64, _args: &Args) -> Result<f64, ElementError> {
        Err(ElementError::NotImplemented {
            capability: "dstrain_rate_dstress",
        })
    }

    /// Closed-form `d(stress)/d(strain rate)` at the given strain rate.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::NotImplemented`] unless overridden.
    fn dstress_dstrain_rate(&self, _strain_rate: f64, _args: &Args) -> Result<f64, ElementError> {
        Err(ElementError::NotImplemented {
            capability: "dstress_dstrain_rate",
        })
    }

    /// Returns the plastic capabilities of this element, if any.
    fn as_plastic(&self) -> Option<&dyn Plastic> {
        None
    }

    /// Whether the element carries a volumetric (pressure-dependent) strain component.
    fn is_volumetric(&self) -> bool {
        false
    }
}

/// Additional capabilities of a plastic element.
///
/// The yield function `F(τ, λ)` is negative inside the yield surface and
/// non-negative when plastic flow is active. The plastic strain rate is
/// `λ · ∂Q/∂τ` for multiplier `λ ≥ 0` and flow potential `Q`.
pub trait Plastic: Element {
    /// Value of the yield function at stress `stress` and multiplier `multiplier`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required argument is missing or invalid.
    fn yield_function(&self, stress: f64, multiplier: f64, args: &Args)
    -> Result<f64, ElementError>;

    /// Derivative of the flow potential with respect to stress.
    ///
    /// # Errors
    ///
    /// Returns an error if a required argument is missing or invalid.
    fn dq_dstress(&self, stress: f64, args: &Args) -> Result<f64, ElementError>;

    /// Derivative of the yield function with respect to stress.
    ///
    /// # Errors
    ///
    /// Returns an error if a required argument is missing or invalid.
    fn df_dstress(&self, stress: f64, args: &Args) -> Result<f64, ElementError>;

    /// Derivative of the yield function with respect to the plastic multiplier.
    ///
    /// Zero for perfect plasticity; the negative regularization viscosity for
    /// viscoplastic flow rules.
    ///
    /// # Errors
    ///
    /// Returns an error if a required argument is missing or invalid.
    fn df_dmultiplier(&self, stress: f64, args: &Args) -> Result<f64, ElementError>;
}
