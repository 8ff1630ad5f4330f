//! Reference elementary laws for composite rheologies.
//!
//! Each law implements [`rheo_core::Element`] (and [`rheo_core::Plastic`] for
//! [`DruckerPrager`]) with closed-form derivatives. Parameters are given as
//! `uom` quantities; evaluation works on SI base-unit `f64` invariants.

mod elastic;
mod plastic;
mod viscous;

pub use elastic::Elastic;
pub use plastic::DruckerPrager;
pub use viscous::{GAS_CONSTANT, LinearViscous, PowerLawViscous};
