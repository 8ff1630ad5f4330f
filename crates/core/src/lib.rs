//! Core traits and types for composite rheologies.
//!
//! A material's stress–strain-rate response is built by composing elementary
//! laws (viscous, elastic, plastic) in series and in parallel. This crate
//! defines the shared abstractions the solvers build on:
//!
//! - [`Element`] and [`Plastic`] — the capability contract of an elementary law
//! - [`Args`] — the auxiliary state (temperature, time step, …) passed to every law
//! - [`Series`], [`Parallel`], [`Member`], [`Node`] — the two-level composition model
//! - [`Metadata`] and [`Layout`] — facts derived once at construction that
//!   select the solver variant and size its unknown vector
//! - [`Observer`] — receives solver events and optionally returns control actions

mod args;
mod composite;
mod element;
mod metadata;
mod observer;

pub use args::Args;
pub use composite::{CompositionError, Member, Node, Parallel, Series};
pub use element::{Element, ElementError, Plastic};
pub use metadata::{GroupSlot, Layout, Metadata, PlasticSlot, STRESS};
pub use observer::Observer;
