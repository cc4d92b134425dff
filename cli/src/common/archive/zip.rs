//! # Luma ZIP Archive Operations (`common::archive::zip`)
//!
//! File: cli/src/common/archive/zip.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module builds the deploy artifact: a deflate-compressed `.zip`
//! holding every regular file under the project root that the project's
//! ignore patterns do not exclude, stored under its root-relative path.
//!
//! ## Architecture
//!
//! - `walkdir` enumerates the tree (sorted, symlinks not followed).
//! - `IgnoreSpec::matches` filters each root-relative path.
//! - The `zip` crate writes the archive into a `tempfile`-allocated file in the
//!   build directory. The file name is random, so concurrent builds from the
//!   same root never collide.
//! - If anything fails mid-way, the temporary path is dropped and the partial
//!   archive is removed before the error is returned.
//!
use super::{BuildArtifact, ARTIFACT_PREFIX, ARTIFACT_SUFFIX};
use crate::common::fs::ignore::IgnoreSpec;
use crate::core::error::{LumaError, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// # Build Deploy Archive (`build`)
///
/// Archives `project_root` into a new zip inside `build_dir`, skipping every
/// file `ignore_spec` excludes.
///
/// ## Arguments
///
/// * `project_root` - Directory whose contents are archived. Must exist.
/// * `ignore_spec` - Compiled ignore patterns, anchored at `project_root`.
/// * `build_dir` - Directory receiving the archive; created if missing.
///
/// ## Returns
///
/// * `Result<BuildArtifact>` - The finished archive. Dropping it deletes the file.
///
/// ## Errors
///
/// Returns `LumaError::Build` if the root cannot be read, a file cannot be
/// archived, a file name is not valid UTF-8, or the archive cannot be written.
/// No archive file is left on disk in that case.
pub fn build(
    project_root: &Path,
    ignore_spec: &IgnoreSpec,
    build_dir: &Path,
) -> Result<BuildArtifact> {
    info!("Building archive of {}", project_root.display());

    let root = fs::canonicalize(project_root).map_err(|e| {
        LumaError::Build(format!(
            "Project root {} is not accessible: {}",
            project_root.display(),
            e
        ))
    })?;
    if !root.is_dir() {
        return Err(LumaError::Build(format!(
            "Project root {} is not a directory",
            project_root.display()
        ))
        .into());
    }

    fs::create_dir_all(build_dir).map_err(|e| {
        LumaError::Build(format!(
            "Failed to create build directory {}: {}",
            build_dir.display(),
            e
        ))
    })?;

    let temp_file = tempfile::Builder::new()
        .prefix(ARTIFACT_PREFIX)
        .suffix(ARTIFACT_SUFFIX)
        .tempfile_in(build_dir)
        .map_err(|e| {
            LumaError::Build(format!(
                "Failed to allocate archive in {}: {}",
                build_dir.display(),
                e
            ))
        })?;
    // From here on, `temp_path` removes the file when dropped on any error path.
    let (file, temp_path) = temp_file.into_parts();
    let artifact_path = fs::canonicalize(&temp_path).map_err(|e| {
        LumaError::Build(format!("Failed to resolve archive path: {}", e))
    })?;

    let file_count = write_archive(file, &root, ignore_spec, &artifact_path)?;
    let size = fs::metadata(&temp_path)
        .map_err(|e| LumaError::Build(format!("Failed to stat archive: {}", e)))?
        .len();

    info!(
        "Archived {} file(s) into {} ({} bytes)",
        file_count,
        temp_path.display(),
        size
    );
    Ok(BuildArtifact::new(temp_path, file_count, size))
}

/// Streams every non-ignored regular file under `root` into a zip written to `file`.
fn write_archive(
    file: File,
    root: &Path,
    ignore_spec: &IgnoreSpec,
    artifact_path: &Path,
) -> Result<usize> {
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut file_count = 0;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            LumaError::Build(format!("Failed to read {}: {}", root.display(), e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path == artifact_path {
            continue;
        }

        let rel_path = path.strip_prefix(root).map_err(|_| {
            LumaError::Build(format!("{} escapes the project root", path.display()))
        })?;
        if ignore_spec.matches(rel_path, false) {
            debug!("Ignoring {}", rel_path.display());
            continue;
        }

        let name = entry_name(rel_path)?;
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| LumaError::Build(format!("Failed to add {}: {}", name, e)))?;
        let mut source = File::open(path).map_err(|e| {
            LumaError::Build(format!("Failed to open {}: {}", path.display(), e))
        })?;
        io::copy(&mut source, &mut writer).map_err(|e| {
            LumaError::Build(format!("Failed to compress {}: {}", path.display(), e))
        })?;
        debug!("Added {}", name);
        file_count += 1;
    }

    let mut buffered = writer
        .finish()
        .map_err(|e| LumaError::Build(format!("Failed to finalize archive: {}", e)))?;
    buffered
        .flush()
        .map_err(|e| LumaError::Build(format!("Failed to flush archive: {}", e)))?;
    let file = buffered
        .into_inner()
        .map_err(|e| LumaError::Build(format!("Failed to flush archive: {}", e.error())))?;
    file.sync_all()
        .map_err(|e| LumaError::Build(format!("Failed to sync archive: {}", e)))?;

    Ok(file_count)
}

/// Zip entry names always use `/`, whatever the host separator.
fn entry_name(rel_path: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in rel_path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(|| {
                LumaError::Build(format!(
                    "File name is not valid UTF-8: {}",
                    rel_path.display()
                ))
            })?),
            other => {
                return Err(LumaError::Build(format!(
                    "Unexpected path component {:?} in {}",
                    other,
                    rel_path.display()
                ))
                .into())
            }
        }
    }
    Ok(parts.join("/"))
}
