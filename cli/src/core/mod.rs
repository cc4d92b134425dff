//! # Luma Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components shared by every
//! stage of the deploy pipeline.
//!
//! ## Architecture
//!
//! - `config`: Deploy settings loading, merging, and validation
//! - `error`: The `LumaError` taxonomy and the crate-wide `Result` alias
//! - `manifest`: Reading the package name from the project's `luma.yaml`
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config::{self, ConfigOverrides};
//! use crate::core::error::{LumaError, Result};
//! use crate::core::manifest::ProjectManifest;
//! ```
//!
pub mod config;
pub mod error;
pub mod manifest;
