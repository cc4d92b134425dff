//! # Luma Ignore Patterns (`common::fs::ignore`)
//!
//! File: cli/src/common/fs/ignore.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Compiles a gitignore-style pattern file into a reusable matcher that
//! decides which files are left out of the deploy archive.
//!
//! Matching follows gitignore precedence: patterns are evaluated in order and
//! the **last** matching pattern wins, so a later `!pattern` re-includes what
//! an earlier pattern excluded. Paths no pattern matches are included. A path
//! is also excluded when one of its parent directories is matched (so
//! `node_modules/` excludes everything below it).
//!
//! Compilation is independent of directory walking: `IgnoreSpec::from_lines`
//! builds a matcher from in-memory lines, which is how the matching rules are
//! tested without touching the disk.
//!
//! ## Usage
//!
//! ```rust
//! let spec = IgnoreSpec::load(&project_root.join(IGNORE_FILENAME))?;
//! if spec.matches(Path::new("node_modules/react/index.js"), false) {
//!     // skip the file
//! }
//! ```
//!
use crate::core::error::{LumaError, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Name of the ignore file read from the project root.
pub const IGNORE_FILENAME: &str = ".gitignore";

/// A compiled set of gitignore patterns.
#[derive(Debug)]
pub struct IgnoreSpec {
    matcher: Gitignore,
    pattern_count: usize,
}

impl IgnoreSpec {
    /// A spec without patterns; it excludes nothing.
    #[cfg(test)]
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            pattern_count: 0,
        }
    }

    /// Loads and compiles the ignore file at `ignore_file`.
    ///
    /// Patterns are anchored at the directory containing the file.
    ///
    /// # Errors
    ///
    /// Returns `LumaError::Config` if the file does not exist, cannot be read,
    /// or contains an invalid pattern.
    pub fn load(ignore_file: &Path) -> Result<Self> {
        if !ignore_file.is_file() {
            return Err(LumaError::Config(format!(
                "Ignore file not found: {}",
                ignore_file.display()
            ))
            .into());
        }
        let content = fs::read_to_string(ignore_file).map_err(|e| {
            LumaError::Config(format!(
                "Failed to read ignore file {}: {}",
                ignore_file.display(),
                e
            ))
        })?;
        let root = ignore_file.parent().unwrap_or_else(|| Path::new(""));
        let spec = Self::from_lines(root, content.lines())?;
        debug!(
            "Compiled {} ignore pattern(s) from {}",
            spec.pattern_count,
            ignore_file.display()
        );
        Ok(spec)
    }

    /// Compiles `lines` into a matcher anchored at `root`.
    ///
    /// Blank lines and `#` comments are skipped.
    pub fn from_lines<I, S>(root: &Path, lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new(root);
        let mut pattern_count = 0;

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            builder.add_line(None, line).map_err(|e| {
                LumaError::Config(format!(
                    "Invalid ignore pattern on line {}: '{}' ({})",
                    index + 1,
                    line,
                    e
                ))
            })?;
            pattern_count += 1;
        }

        let matcher = builder.build().map_err(|e| {
            LumaError::Config(format!("Failed to build ignore matcher: {}", e))
        })?;

        Ok(Self {
            matcher,
            pattern_count,
        })
    }

    /// Returns `true` if `rel_path` (relative to the spec's root) is excluded.
    ///
    /// `is_dir` must be `true` when `rel_path` names a directory, so that
    /// directory-only patterns (`build/`) apply correctly.
    pub fn matches(&self, rel_path: &Path, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(rel_path, is_dir)
            .is_ignore()
    }

    /// Number of patterns compiled into this spec.
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn spec(lines: &[&str]) -> IgnoreSpec {
        IgnoreSpec::from_lines(Path::new(""), lines).expect("patterns should compile")
    }

    fn excluded(spec: &IgnoreSpec, path: &str) -> bool {
        spec.matches(Path::new(path), false)
    }

    #[test]
    fn test_unmatched_paths_are_included() {
        let s = spec(&["*.log"]);
        assert!(!excluded(&s, "index.md"));
        assert!(!excluded(&s, "pages/guide.md"));
        assert!(!excluded(&IgnoreSpec::empty(), "anything.txt"));
    }

    #[test]
    fn test_wildcard_matches_at_any_depth() {
        let s = spec(&["*.log"]);
        assert!(excluded(&s, "debug.log"));
        assert!(excluded(&s, "deep/nested/dir/trace.log"));
        assert!(!excluded(&s, "debug.log.md"));
    }

    #[test]
    fn test_directory_only_pattern() {
        let s = spec(&["node_modules/"]);
        assert!(excluded(&s, "node_modules/react/index.js"));
        assert!(excluded(&s, "app/node_modules/x.js"));
        // A plain file with the same name is not a directory.
        assert!(!excluded(&s, "node_modules"));
        assert!(s.matches(Path::new("node_modules"), true));
    }

    #[test]
    fn test_anchored_pattern() {
        let s = spec(&["/build.zip"]);
        assert!(excluded(&s, "build.zip"));
        assert!(!excluded(&s, "nested/build.zip"));
    }

    #[test]
    fn test_negation_reincludes() {
        let s = spec(&["*.md", "!README.md"]);
        assert!(excluded(&s, "notes.md"));
        assert!(!excluded(&s, "README.md"));
        assert!(!excluded(&s, "docs/README.md"));
    }

    #[test]
    fn test_last_matching_pattern_wins() {
        let s = spec(&["!keep.txt", "keep.txt"]);
        assert!(excluded(&s, "keep.txt"));

        let s = spec(&["keep.txt", "!keep.txt"]);
        assert!(!excluded(&s, "keep.txt"));
    }

    #[test]
    fn test_negated_file_inside_excluded_directory() {
        let s = spec(&["logs/", "!logs/keep.txt"]);
        assert!(excluded(&s, "logs/today.txt"));
        assert!(!excluded(&s, "logs/keep.txt"));
    }

    #[test]
    fn test_double_star() {
        let s = spec(&["docs/**/*.tmp"]);
        assert!(excluded(&s, "docs/a.tmp"));
        assert!(excluded(&s, "docs/x/y/z.tmp"));
        assert!(!excluded(&s, "other/a.tmp"));
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let s = spec(&["# build output", "", "   ", "dist/"]);
        assert_eq!(s.pattern_count(), 1);
        assert!(excluded(&s, "dist/main.js"));
        assert!(!excluded(&s, "# build output"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = IgnoreSpec::from_lines(Path::new(""), ["ok.txt", "a{b"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LumaError>(),
            Some(LumaError::Config(_))
        ));
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("a{b"));

        let err = IgnoreSpec::from_lines(Path::new(""), ["[z-a]"]).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = tempdir().unwrap();
        let err = IgnoreSpec::load(&dir.path().join(IGNORE_FILENAME)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LumaError>(),
            Some(LumaError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(IGNORE_FILENAME), "*.pyc\n.venv/\n").unwrap();
        let s = IgnoreSpec::load(&dir.path().join(IGNORE_FILENAME)).unwrap();
        assert_eq!(s.pattern_count(), 2);
        assert!(excluded(&s, "pkg/__init__.pyc"));
        assert!(excluded(&s, ".venv/bin/python"));
        assert!(!excluded(&s, "pkg/__init__.py"));
    }
}
