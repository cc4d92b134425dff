//! # Luma Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the top-level commands of the Luma CLI and makes them
//! accessible to the entry point (`main.rs`).
//!
//! Each command defines its own arguments structure and a `handle_*` function
//! that processes those arguments.
//!
//! ## Commands
//!
//! - `deploy`: Package, upload and monitor a documentation site deployment
//!

/// Packages the project, uploads it and follows the deployment to completion.
pub mod deploy;
