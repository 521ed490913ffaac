//! # Workflows Module
//!
//! High-level entry points that tie the engine and core layers together into
//! complete procedures.
//!
//! - **Gamma Fitting** ([`solve`]) - One full training run: artifact
//!   resolution, moment aggregation, spectral regularization, and the
//!   production of the fitted weight vector plus its diagnostic artifacts.
//! - **Energy Diagnostics** ([`energy`]) - Read-only scoring of phi artifacts
//!   against a fitted gamma vector, including the native/decoy Z-score.

pub mod energy;
pub mod solve;
