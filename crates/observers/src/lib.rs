//! Reusable observers for the composite rheology solvers.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across every solver variant in `rheo-solvers`.
//!
//! # Modules
//!
//! - [`traits`] — Capability traits for cross-solver observers
//!   ([`HasResidual`], [`HasStep`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`Recorder`] — keeps the iteration history in memory
//! - [`Log`] — writes one line per event to any [`std::io::Write`]
//!
//! [`Observer`]: rheo_core::Observer
//! [`HasResidual`]: traits::HasResidual
//! [`HasStep`]: traits::HasStep
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod log;
mod recorder;

pub use log::Log;
pub use recorder::{Record, Recorder};
