//! # Engine Module
//!
//! This module implements the logic core of the gamma optimizer: everything
//! between the raw on-disk phi artifacts and the fitted weight vector.
//!
//! ## Overview
//!
//! A training run flows through four stages, each owned by a submodule:
//! the solver configuration is validated ([`config`]), the decoy feature
//! matrix belonging to the run is located among heterogeneous artifact files
//! ([`resolve`]), its first and second moments are accumulated in batches
//! ([`moments`]), and the covariance-like matrix is eigendecomposed and
//! regularized by eigenvalue truncation ([`spectral`]).
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Solver parameters, cutoff policies, and
//!   the fallible builder that assembles them.
//! - **Artifact Resolution** ([`resolve`]) - Deterministic fuzzy matching of
//!   decoy feature artifacts against a parameterization and protein.
//! - **Moment Aggregation** ([`moments`]) - Batched accumulation of the decoy
//!   ensemble's mean, outer-product mean, and per-entry spread.
//! - **Spectral Regularization** ([`spectral`]) - Sorted symmetric
//!   eigendecomposition, manual and noise-aware cutoff estimation, and the
//!   truncated pseudo-inverse.
//! - **Error Handling** ([`error`]) - Engine-specific error types and
//!   propagation from the core layer.

pub mod config;
pub mod error;
pub mod moments;
pub mod resolve;
pub mod spectral;
