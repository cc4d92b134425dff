//! # Luma Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the error taxonomy of the deploy pipeline. Each variant
//! corresponds to one failure category the pipeline distinguishes:
//!
//! - `Config`: missing ignore file, missing or malformed `luma.yaml`, invalid settings.
//! - `Build`: I/O failure while archiving, or a missing artifact before upload.
//! - `Deployment`: the upload endpoint answered with anything but `202 Accepted`.
//! - `Transport`: network-level failure talking to the deployment service.
//! - `Credential`: the API key could not be obtained.
//!
//! A monitor timeout is deliberately *not* an error; it is reported as a
//! `MonitorOutcome` by the deploy command.
//!
//! ## Architecture
//!
//! - `LumaError`: a `thiserror` enum carrying the category and its details.
//! - `Result<T>`: an alias for `anyhow::Result<T>`, so call sites can attach context.
//!
//! Callers that need the category recover it with `downcast_ref`:
//!
//! ```rust
//! match pipeline::run(&ctx, &root, "my-package").await {
//!     Err(e) if matches!(e.downcast_ref::<LumaError>(), Some(LumaError::Config(_))) => {
//!         eprintln!("Fix your project configuration first.");
//!     }
//!     other => { /* ... */ }
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for the Luma deploy pipeline.
#[derive(Error, Debug)]
pub enum LumaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Build error: {0}")]
    Build(String),

    #[error("Deployment failed: {status} {body}")]
    Deployment { status: u16, body: String },

    #[error("Transport error: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    #[error("Credential error: {0}")]
    Credential(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
