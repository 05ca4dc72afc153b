//! Time-series utilities shared by connectors, the orchestrator and the fallback generator.
//!
//! Modules include:
//! - `join`: align several series onto the timestamps of a reference series
//! - `util`: normalization and nearest-sample lookup
/// Alignment of multiple series onto one timeline.
pub mod join;
/// Normalization and lookup helpers for point slices.
pub mod util;
