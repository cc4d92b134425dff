//! # Luma Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module produces the deploy artifact: a deflate-compressed zip of the
//! project tree, filtered through the project's ignore patterns.
//!
//! ## Architecture
//!
//! - **`BuildArtifact`** (this file): owns the archive file on disk. The file
//!   lives at a unique temporary path and is deleted either explicitly through
//!   `cleanup()` or automatically when the artifact is dropped, so an early
//!   return from any pipeline stage can never leak it.
//! - **`zip`**: walks the project root and writes the archive.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive;
//!
//! let artifact = archive::zip::build(&root, &ignore_spec, &settings.build_dir)?;
//! println!("{} files, {} bytes", artifact.file_count(), artifact.size());
//! upload(artifact.path()).await?;
//! artifact.cleanup()?;
//! ```
//!
use crate::core::error::{LumaError, Result};
use std::path::Path;
use tempfile::TempPath;
use tracing::debug;

pub mod zip;

/// Prefix of every artifact file name (`luma-build-XXXXXX.zip`).
pub const ARTIFACT_PREFIX: &str = "luma-build-";
/// Extension of every artifact file name.
pub const ARTIFACT_SUFFIX: &str = ".zip";

/// # Build Artifact (`BuildArtifact`)
///
/// A finished archive at a unique filesystem location, exclusively owned by
/// the deploy pipeline. Dropping the value removes the file.
#[derive(Debug)]
pub struct BuildArtifact {
    path: TempPath,
    file_count: usize,
    size: u64,
}

impl BuildArtifact {
    pub(crate) fn new(path: TempPath, file_count: usize, size: u64) -> Self {
        Self {
            path,
            file_count,
            size,
        }
    }

    /// Location of the archive on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of files stored in the archive.
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Size of the archive in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Deletes the archive, reporting failures instead of swallowing them.
    pub fn cleanup(self) -> Result<()> {
        let shown = self.path.display().to_string();
        self.path.close().map_err(|e| {
            LumaError::Build(format!("Failed to remove build artifact {}: {}", shown, e))
        })?;
        debug!("Removed build artifact {}", shown);
        Ok(())
    }
}
