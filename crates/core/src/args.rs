use crate::ElementError;

/// Auxiliary state passed alongside stress or strain rate to every element.
///
/// Fields are looked up by name, never by position. Values are SI base units:
/// kelvin, pascal, and seconds. Callers fill the physical state
/// (temperature, pressure, time step, previous-step stress); solvers inject
/// the internal estimates (non-plastic strain rate, effective viscosity)
/// on a copy while iterating.
///
/// # Example
///
/// ```
/// use rheo_core::Args;
///
/// let args = Args::new().with_temperature(773.15).with_dt(3.15576e10);
/// assert_eq!(args.temperature(), Some(773.15));
/// assert!(args.pressure().is_none());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Args {
    temperature: Option<f64>,
    pressure: Option<f64>,
    dt: Option<f64>,
    previous_stress: Option<f64>,
    nonplastic_strain_rate: Option<f64>,
    effective_viscosity: Option<f64>,
}

impl Args {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }

    #[must_use]
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Sets the second invariant of the stress at the end of the previous step.
    #[must_use]
    pub fn with_previous_stress(mut self, stress: f64) -> Self {
        self.previous_stress = Some(stress);
        self
    }

    /// Sets the strain rate carried by the non-plastic members.
    ///
    /// Injected by the solvers before a return-mapping sub-solve.
    #[must_use]
    pub fn with_nonplastic_strain_rate(mut self, strain_rate: f64) -> Self {
        self.nonplastic_strain_rate = Some(strain_rate);
        self
    }

    /// Sets the effective viscosity of the non-plastic members.
    ///
    /// Injected by the solvers before a return-mapping sub-solve.
    #[must_use]
    pub fn with_effective_viscosity(mut self, viscosity: f64) -> Self {
        self.effective_viscosity = Some(viscosity);
        self
    }

    #[must_use]
    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    #[must_use]
    pub fn pressure(&self) -> Option<f64> {
        self.pressure
    }

    #[must_use]
    pub fn dt(&self) -> Option<f64> {
        self.dt
    }

    #[must_use]
    pub fn previous_stress(&self) -> Option<f64> {
        self.previous_stress
    }

    #[must_use]
    pub fn nonplastic_strain_rate(&self) -> Option<f64> {
        self.nonplastic_strain_rate
    }

    #[must_use]
    pub fn effective_viscosity(&self) -> Option<f64> {
        self.effective_viscosity
    }

    /// Returns the temperature or a [`ElementError::MissingArg`] error.
    ///
    /// # Errors
    ///
    /// Fails when no temperature has been set.
    pub fn require_temperature(&self) -> Result<f64, ElementError> {
        self.temperature
            .ok_or(ElementError::MissingArg { name: "temperature" })
    }

    /// Returns the time step or a [`ElementError::MissingArg`] error.
    ///
    /// # Errors
    ///
    /// Fails when no time step has been set.
    pub fn require_dt(&self) -> Result<f64, ElementError> {
        self.dt.ok_or(ElementError::MissingArg { name: "dt" })
    }
}
