//! `flc-analyzer` library crate.
//!
//! The binary (`flc`) is a thin wrapper around this library so that:
//!
//! - the segmentation/extraction engine is testable without spawning processes
//! - acquisition and presentation stay swappable (CSV today, an instrument later)
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
