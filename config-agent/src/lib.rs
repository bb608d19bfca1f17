//! # OTel Collector Config Agent library
//!
//! Edits the configuration of an OpenTelemetry Collector stored in a Kubernetes ConfigMap through
//! an HTTP API, and reloads the collector so it picks the changes up.

pub mod agent_config;
pub mod cli;
pub mod collector_config;
pub mod command;
pub mod http_server;
pub mod k8s;
pub mod logging;
pub mod reload;
pub mod run;
pub mod service;
pub mod store;
