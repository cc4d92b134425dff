//! # Luma Project Manifest
//!
//! File: cli/src/core/manifest.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A Luma project is a directory containing a `luma.yaml` manifest. The deploy
//! pipeline only needs one value from it: the package `name`, which selects
//! the remote package the archive is uploaded to.
//!
//! ```yaml
//! name: my_package
//! title: My Package Docs
//! ```
//!
//! Fields other than `name` belong to the site toolchain and are ignored here.
//!
use crate::core::error::{LumaError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// File name of the project manifest inside the project root.
pub const MANIFEST_FILENAME: &str = "luma.yaml";

#[derive(Deserialize, Debug)]
struct RawManifest {
    name: Option<String>,
}

/// The parts of `luma.yaml` the deploy pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectManifest {
    pub name: String,
}

impl ProjectManifest {
    /// Loads the manifest from `project_root/luma.yaml`.
    ///
    /// Fails with `LumaError::Config` if the file is missing, is not valid
    /// YAML, or does not declare a non-empty `name`.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(MANIFEST_FILENAME);
        if !path.is_file() {
            return Err(LumaError::Config(format!(
                "The directory '{}' isn't a valid Luma project (no {} found).",
                project_root.display(),
                MANIFEST_FILENAME
            ))
            .into());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            LumaError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let manifest = Self::parse(&content)?;
        debug!("Loaded manifest for package '{}'", manifest.name);
        Ok(manifest)
    }

    /// Parses manifest text.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: Option<RawManifest> = serde_yaml_ng::from_str(content).map_err(|e| {
            LumaError::Config(format!("Error parsing {}: {}", MANIFEST_FILENAME, e))
        })?;

        match raw.and_then(|r| r.name).map(|n| n.trim().to_string()) {
            Some(name) if !name.is_empty() => Ok(Self { name }),
            _ => Err(LumaError::Config(format!(
                "Package name not found. Please add `name: <your_package_name>` to {}",
                MANIFEST_FILENAME
            ))
            .into()),
        }
    }
}
