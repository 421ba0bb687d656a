//! Physical models of the FLC cell.
//!
//! Models are implemented as small, pure functions so that the region code can
//! recompute derived quantities on every read without caching.

pub mod cell;

pub use cell::*;
