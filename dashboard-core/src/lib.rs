//! Core library for the `citydash` weather dashboard.
//!
//! This crate defines:
//! - Configuration (endpoint, refresh interval, stale threshold)
//! - Snapshot sources and the loader that owns dashboard state
//! - Shared domain models (snapshots, city readings, selection)
//! - KPI aggregation and the display-agnostic dashboard view
//!
//! It is used by `dashboard-cli`, but can also be reused by other front ends.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod format;
pub mod loader;
pub mod model;
pub mod source;
pub mod view;

pub use config::Config;
pub use error::LoadError;
pub use loader::{DashboardState, LoadStatus, SnapshotLoader};
pub use model::{CityReading, Selection, Snapshot};
pub use source::{SnapshotSource, source_from_config};
pub use view::{DashboardView, RenderSettings, render};
