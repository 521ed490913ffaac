//! # Gammafit Core Library
//!
//! A library for fitting pairwise residue-interaction energy weights ("gamma"
//! vectors) that discriminate a native biomolecular structure from a large
//! ensemble of sequence decoys, via Z-score optimization: the decoy feature
//! ("phi") ensemble is summarized into second-moment statistics, the resulting
//! covariance-like matrix is eigendecomposed and regularized by eigenvalue
//! truncation, and the fitted weights are obtained from the regularized
//! inverse applied to the native/decoy mean difference.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (feature
//!   parameterizations and the functional registry, training sets, phi lists)
//!   and plain-text numeric table I/O.
//!
//! - **[`engine`]: The Logic Core.** This layer holds the solver
//!   configuration, the decoy-artifact resolver, the streaming moment
//!   aggregator, and the spectral regularizer.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer.
//!   It ties `engine` and `core` together to execute a complete gamma-fitting
//!   run and the read-only energy diagnostics that consume its outputs.

pub mod core;
pub mod engine;
pub mod workflows;
