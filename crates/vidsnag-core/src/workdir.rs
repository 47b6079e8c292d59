//! Per-run working directory

use crate::extractor::OUTPUT_TEMPLATE;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A freshly created, uniquely named directory holding one run's artifacts.
///
/// It is never removed automatically: once the run finishes, the directory
/// and everything in it belong to whoever invoked the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirectory {
    path: PathBuf,
}

impl WorkingDirectory {
    pub fn create(parent: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(parent)?;

        let dir = tempfile::Builder::new()
            .prefix("vidsnag-")
            .keep(true)
            .tempdir_in(parent)?;
        let path = dir.path().to_path_buf();

        debug!("Working directory: {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// yt-dlp output template placing files in this directory
    pub fn output_template(&self) -> PathBuf {
        self.path.join(OUTPUT_TEMPLATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_is_unique_and_kept() {
        let parent = tempfile::tempdir().unwrap();

        let first = WorkingDirectory::create(parent.path()).unwrap();
        let second = WorkingDirectory::create(parent.path()).unwrap();

        assert_ne!(first, second);
        assert!(first.path().starts_with(parent.path()));

        let kept = first.path().to_path_buf();
        drop(first);
        assert!(kept.is_dir());
    }

    #[test]
    fn test_create_makes_missing_parent() {
        let root = tempfile::tempdir().unwrap();
        let parent = root.path().join("nested/runs");

        let workdir = WorkingDirectory::create(&parent).unwrap();
        assert!(workdir.path().is_dir());
    }

    #[test]
    fn test_output_template() {
        let root = tempfile::tempdir().unwrap();
        let workdir = WorkingDirectory::create(root.path()).unwrap();

        let template = workdir.output_template();
        assert_eq!(template.parent(), Some(workdir.path()));
        assert!(template.ends_with("%(title)s [%(id)s].%(ext)s"));
    }
}
