//! # Core Module
//!
//! This module provides the fundamental building blocks for gamma-weight
//! fitting, serving as the stateless foundation of the library.
//!
//! ## Overview
//!
//! The core module implements the data models and file formats shared by every
//! stage of a training run: the geometric interaction functionals and their
//! parameterizations, the training-set and phi-list descriptions of a run, and
//! the plain-text numeric tables that carry feature vectors and fitted weights
//! between tools.
//!
//! ## Architecture
//!
//! - **Feature Parameterizations** ([`params`]) - Interaction functionals,
//!   their canonical string renderings, and the filename-variant machinery
//!   used to match artifacts produced by upstream tools.
//! - **Run Inputs** ([`training`]) - Training-set listings and phi lists.
//! - **Table I/O** ([`io`]) - Whitespace-delimited numeric vectors and
//!   matrices with atomic, fixed-point output.

pub mod io;
pub mod params;
pub mod training;
