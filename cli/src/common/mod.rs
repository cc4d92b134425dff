//! # Luma Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared building blocks of the deploy pipeline. Command logic lives in
//! `commands::`, core infrastructure (config, errors, manifest) in `core::`.
//!
//! ## Architecture
//!
//! - **`archive`**: Builds the deflate-compressed `.zip` artifact of a project tree.
//! - **`credentials`**: Supplies the API key from the platform secret store, a prompt, or a fixed value.
//! - **`fs`**: Filesystem helpers; currently the gitignore-style `IgnoreSpec`.
//! - **`network`**: The HTTP client for the deployment service and its wire types.
//! - **`ui`**: Terminal interaction, such as the hidden-input API key prompt.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::{archive, network::DeployClient};
//! use crate::common::fs::ignore::IgnoreSpec;
//!
//! let spec = IgnoreSpec::load(&root.join(".gitignore"))?;
//! let artifact = archive::zip::build(&root, &spec, &build_dir)?;
//! let id = DeployClient::new(api_url, api_key)?.upload(artifact.path(), "docs").await?;
//! ```
//!

/// Deploy artifact creation (zip).
pub mod archive;
/// API key lookup, prompting and persistence.
pub mod credentials;
/// Filesystem helpers (ignore patterns).
pub mod fs;
/// Deployment service HTTP client.
pub mod network;
/// Terminal prompts.
pub mod ui;
