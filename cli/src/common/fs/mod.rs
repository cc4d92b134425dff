//! # Luma Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Filesystem helpers shared by the deploy pipeline.
//!
//! - **`ignore`**: Compiles the project's `.gitignore` into an `IgnoreSpec`
//!   deciding which files are left out of the deploy archive.
//!
//! ```rust
//! use crate::common::fs::ignore::{IgnoreSpec, IGNORE_FILENAME};
//!
//! let spec = IgnoreSpec::load(&project_root.join(IGNORE_FILENAME))?;
//! ```
//!

/// Gitignore-style pattern compilation and matching.
pub mod ignore;
