//! Plain-text numeric table I/O.
//!
//! Every artifact consumed or produced by the solver is a whitespace-delimited
//! table of `f64` values: phi vectors, decoy feature matrices, covariance
//! dumps, and fitted gamma vectors. This module provides the readers and the
//! fixed-point, atomic writers for those tables.

pub mod table;
