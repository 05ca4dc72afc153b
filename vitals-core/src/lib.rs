//! vitals-core
//!
//! Core traits and pure building blocks shared across the vitals workspace.
//!
//! - `connector`: the `WellnessConnector` trait, its role traits and the opaque `Session`.
//! - `source`: the `SnapshotSource` seam the cache layer wraps.
//! - `timeseries`: aligning irregularly sampled series onto one timeline.
//! - `fallback`: plausible synthetic snapshots for when nothing real is available.
#![warn(missing_docs)]

/// Connector role traits and the primary `WellnessConnector` interface.
pub mod connector;
/// Synthetic snapshot generation.
pub mod fallback;
/// Producers of whole snapshots.
pub mod source;
/// Time-series utilities for normalizing and joining series.
pub mod timeseries;

pub use connector::{MetricProvider, Session, SessionProvider, WellnessConnector};
pub use fallback::{FallbackGenerator, plausible_range};
pub use source::SnapshotSource;
pub use timeseries::join::join_series;
pub use timeseries::util::{nearest_within, normalize_points};
pub use vitals_types::*;
