//! # Rotor Cases
//!
//! Turns rotor blade geometries and operating-condition sweeps into
//! directory trees of input files for an acoustic prediction simulator.
//!
//! ## Crate layout
//!
//! - [`casegen`]: The case-generation orchestrator, its configuration,
//!   the polar cache, and the result store.
//! - [`aero`]: Collaborator contracts (geometry, polars, loading, writers)
//!   and reference implementations of the numerical ones.
//! - [`support`]: Supporting utilities used across the crate.
//!
//! ## Pipeline
//!
//! For every configured geometry the orchestrator parses the geometry,
//! builds the airfoil polar cache (first geometry only), recreates the
//! geometry's output directory, and then either writes a single loading
//! condition (design mode) or a full thrust × forward speed × climb rate ×
//! rotor speed sweep (analysis mode).
//!
//! Note: Only the [`aero`] traits are meant to be implemented downstream.
//! The reference collaborators are conveniences, not stable numerics.

pub mod aero;
pub mod casegen;
pub mod support;
