//! Structural edits over an OpenTelemetry Collector configuration tree.
//!
//! The engines in this module are total: divergent shapes between the edit and the stored tree
//! never fail, they resolve to an overwrite (merge) or to a no-op (removal).
pub mod document;
pub mod merge;
pub mod prune;
pub mod remove;
pub mod transfer_metrics;

pub use document::{CollectorConfig, CollectorConfigError, ConfigPatch, Section};
