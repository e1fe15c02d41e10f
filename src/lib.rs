//! # Numerical Methods Lab Client
//!
//! Core library for the `nml-client` desktop application: an interactive
//! client for numerical-methods course labs backed by a remote computation
//! server.
//!
//! ## Crate Structure
//!
//! - **`config`**: Application configuration loaded from TOML and `NML_`
//!   environment variables.
//! - **`error`**: The `ClientError` enum used across the crate.
//! - **`expression`**: Normalization of free-text math expressions.
//! - **`gui`**: The eframe/egui front end (shell, forms, output, log panel).
//! - **`http`**: The GET-with-query-parameters adapter for lab calculations
//!   and remote expression validation.
//! - **`lab`**: The static catalog of labs and their grouping.
//! - **`log_capture`**: Captures `log` records for the in-app event log.
//! - **`socket`**: The WebSocket health push channel.
//! - **`state`**: `NmlApp` and the two state models (server connectivity and
//!   per-lab snapshots).
//! - **`storage`**: The file-backed, `nml-`-prefixed key/value store.
//! - **`validators`**: Small pure form-field validators.

pub mod config;
pub mod error;
pub mod expression;
pub mod gui;
pub mod http;
pub mod lab;
pub mod log_capture;
pub mod socket;
pub mod state;
pub mod storage;
pub mod validators;
