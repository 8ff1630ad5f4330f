use thiserror::Error;

/// How element derivatives are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Derivatives {
    /// Closed-form derivatives only; an element without one is an error.
    Analytic,
    /// Central differences of the evaluator functions for every element.
    ///
    /// Composites with a single series plastic element and no parallel
    /// groups are then solved by the differentiation-based plastic path.
    Numeric,
    /// Closed form where an element provides one, central differences otherwise.
    #[default]
    Auto,
}

/// Configuration shared by every solver variant.
///
/// Every iteration cap is explicit. The defaults reproduce the reference
/// behavior: 1000 block iterations, 100 return-mapping iterations, and 10
/// iterations for the differentiation-based plastic path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Relative step tolerance for every outer iteration, and relative
    /// yield-function tolerance for return mapping.
    pub tol: f64,
    /// Cap for the scalar Newton solver and for parallel group inner solves.
    pub max_iters: usize,
    /// Cap for the block solvers, with and without plasticity.
    pub block_max_iters: usize,
    /// Cap for the plastic return-mapping sub-solve.
    pub return_map_max_iters: usize,
    /// Cap for the differentiation-based plastic path.
    pub numeric_plastic_max_iters: usize,
    /// Active/inactive switches allowed per plastic element before giving up.
    pub max_branch_switches: usize,
    /// Additive guard in the relative step `Σ|Δxᵢ| / (|xᵢ| + guard)`.
    pub step_guard: f64,
    /// Initial stress, replacing the harmonic estimate.
    pub initial_stress: Option<f64>,
    /// Initial strain rate for parallel group inner solves, replacing the
    /// harmonic estimate.
    pub initial_strain_rate: Option<f64>,
    pub derivatives: Derivatives,
}

/// Errors that can occur when validating a solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tol must be finite and positive")]
    Tolerance,

    #[error("step_guard must be finite and positive")]
    StepGuard,

    #[error("{name} must be at least 1")]
    ZeroCap { name: &'static str },

    #[error("{name} must be finite")]
    InitialGuess { name: &'static str },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tol: 1e-6,
            max_iters: 100,
            block_max_iters: 1000,
            return_map_max_iters: 100,
            numeric_plastic_max_iters: 10,
            max_branch_switches: 20,
            step_guard: f64::MIN_POSITIVE,
            initial_stress: None,
            initial_strain_rate: None,
            derivatives: Derivatives::Auto,
        }
    }
}

impl Config {
    /// Validates tolerances, caps, and initial guesses.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is not finite and positive, a cap is
    /// zero, or an initial guess is not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(ConfigError::Tolerance);
        }
        if !self.step_guard.is_finite() || self.step_guard <= 0.0 {
            return Err(ConfigError::StepGuard);
        }

        let caps = [
            ("max_iters", self.max_iters),
            ("block_max_iters", self.block_max_iters),
            ("return_map_max_iters", self.return_map_max_iters),
            ("numeric_plastic_max_iters", self.numeric_plastic_max_iters),
        ];
        for (name, cap) in caps {
            if cap == 0 {
                return Err(ConfigError::ZeroCap { name });
            }
        }

        if self.initial_stress.is_some_and(|s| !s.is_finite()) {
            return Err(ConfigError::InitialGuess {
                name: "initial_stress",
            });
        }
        if self.initial_strain_rate.is_some_and(|e| !e.is_finite()) {
            return Err(ConfigError::InitialGuess {
                name: "initial_strain_rate",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_tolerances() {
        let config = Config {
            tol: 0.0,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Tolerance));

        let config = Config {
            step_guard: f64::NAN,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::StepGuard));
    }

    #[test]
    fn rejects_zero_caps() {
        let config = Config {
            return_map_max_iters: 0,
            ..Config::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCap {
                name: "return_map_max_iters"
            })
        );
    }

    #[test]
    fn rejects_non_finite_guesses() {
        let config = Config {
            initial_stress: Some(f64::INFINITY),
            ..Config::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InitialGuess {
                name: "initial_stress"
            })
        );
    }
}
