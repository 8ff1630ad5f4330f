use std::fmt;

use rheo_core::Metadata;

use crate::Derivatives;

/// The solver variant that handles a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Series of plain elements; the only unknown is the stress.
    Scalar,
    /// Series with parallel groups and no plasticity.
    Block,
    /// Series with plastic elements, closed-form Jacobian with an active set.
    BlockPlastic,
    /// Series with one plastic element, differentiation-based outer iteration.
    NumericPlastic,
}

/// The iteration an error comes from: an outer solver or one of the inner
/// solves it calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Outer(Variant),
    /// Strain rate of a single parallel group at a given stress.
    Group,
    /// Plastic return mapping.
    ReturnMap,
}

impl From<Variant> for Stage {
    fn from(variant: Variant) -> Self {
        Self::Outer(variant)
    }
}

impl Variant {
    /// Selects the outer solver from composition metadata alone.
    ///
    /// The differentiation-based plastic path is chosen only for numeric
    /// derivatives, no parallel groups, and exactly one plastic element;
    /// every other plastic composition uses the block solver.
    #[must_use]
    pub fn select(metadata: &Metadata, derivatives: Derivatives) -> Self {
        match (metadata.has_parallel(), metadata.n_plastic()) {
            (false, 0) => Self::Scalar,
            (true, 0) => Self::Block,
            (false, 1) if derivatives == Derivatives::Numeric => Self::NumericPlastic,
            _ => Self::BlockPlastic,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scalar => "scalar",
            Self::Block => "block",
            Self::BlockPlastic => "block plastic",
            Self::NumericPlastic => "numeric plastic",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outer(variant) => variant.fmt(f),
            Self::Group => f.write_str("parallel group"),
            Self::ReturnMap => f.write_str("return mapping"),
        }
    }
}
