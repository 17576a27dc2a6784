//! FinBoard Core: data acquisition with fallback, validation, metrics and export.
//!
//! This crate contains everything behind the dashboard pages:
//! - Domain types (price bars, tips rows, session selections, locale)
//! - Providers for live equity data, plus upload parsing
//! - Deterministic synthetic generators used when real data is missing
//! - Validation of raw data into immutable records
//! - Summary metrics and descriptive statistics
//! - CSV export
//! - The per-interaction pipeline and the presentation seam

pub mod config;
pub mod data;
pub mod domain;
pub mod metrics;
pub mod pipeline;
pub mod presentation;
pub mod rng;

pub use config::{ConfigError, DashboardConfig, ProviderConfig};
pub use pipeline::{CycleOutcome, Dashboard, PipelineError};
pub use presentation::{Notice, PresentationAdapter, RenderError};
