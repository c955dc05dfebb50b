//! Supporting utilities used across the crate.
//!
//! - [`constraint`]: Numeric invariants checked once at construction.
//! - [`fs`]: Filesystem helpers shared by the writers and the result store.

pub mod constraint;
pub mod fs;
