//! Classification of the files a download leaves in its working directory

use crate::error::ArtifactError;
use crate::sanitizer::sanitize_name;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Role of a file, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `.mp4`
    Video,
    /// `.jpg` / `.png`: the video thumbnail or the uploader avatar
    Image,
    /// `.vtt`
    Subtitle,
}

impl ArtifactKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "mp4" => Some(Self::Video),
            "jpg" | "png" => Some(Self::Image),
            "vtt" => Some(Self::Subtitle),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Video => write!(f, "video"),
            ArtifactKind::Image => write!(f, "image"),
            ArtifactKind::Subtitle => write!(f, "subtitle"),
        }
    }
}

/// Extensions the classifier requires for each slot
const VIDEO_EXT: &str = "mp4";
const THUMBNAIL_EXT: &str = "jpg";
const SUBTITLE_EXT: &str = "vtt";

/// Snapshot of the files found in a directory, each tagged with its role
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    dir: PathBuf,
    entries: Vec<(ArtifactKind, PathBuf)>,
}

impl ArtifactSet {
    /// List `dir` in directory order; files of unknown kinds are ignored.
    pub fn scan(dir: &Path) -> Result<Self, ArtifactError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if let Some(kind) = ArtifactKind::from_path(&path) {
                entries.push((kind, path));
            }
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            entries,
        })
    }

    /// First file with the given extension, in listing order
    pub fn first_with_extension(&self, ext: &str) -> Option<&Path> {
        self.entries
            .iter()
            .map(|(_, path)| path.as_path())
            .find(|path| has_extension(path, ext))
    }

    pub fn contains(&self, kind: ArtifactKind) -> bool {
        self.entries.iter().any(|(k, _)| *k == kind)
    }

    /// Pick the video, thumbnail and optional subtitle.
    ///
    /// `reported` are paths the extraction engine says it wrote, before the
    /// names were sanitized. A reported path is used when its sanitized form
    /// exists in the directory with the right extension; any slot left empty
    /// falls back to the first matching file in listing order.
    pub fn classify<'a, I>(&self, reported: I) -> Result<Artifacts, ArtifactError>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let reported: Vec<PathBuf> = reported
            .into_iter()
            .filter_map(|path| self.resolve_reported(path))
            .collect();

        let pick = |ext: &str| -> Option<PathBuf> {
            reported
                .iter()
                .find(|path| has_extension(path, ext))
                .cloned()
                .or_else(|| self.first_with_extension(ext).map(Path::to_path_buf))
        };

        let video = pick(VIDEO_EXT).ok_or_else(|| ArtifactError::NotFound {
            kind: ArtifactKind::Video,
            dir: self.dir.clone(),
        })?;
        let thumbnail = pick(THUMBNAIL_EXT).ok_or_else(|| ArtifactError::NotFound {
            kind: ArtifactKind::Image,
            dir: self.dir.clone(),
        })?;
        let subtitle = pick(SUBTITLE_EXT);

        debug!(
            "Classified video={}, thumbnail={}, subtitle={:?}",
            video.display(),
            thumbnail.display(),
            subtitle
        );

        Ok(Artifacts {
            video,
            thumbnail,
            subtitle,
        })
    }

    /// Where a reported path lives now, if it is still in this directory
    fn resolve_reported(&self, path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?.to_str()?;
        let current = self.dir.join(sanitize_name(name));
        self.entries
            .iter()
            .any(|(_, p)| *p == current)
            .then_some(current)
    }
}

/// The classified media files of one download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub video: PathBuf,
    pub thumbnail: PathBuf,
    /// Absent when neither uploaded nor automatic subtitles were written
    pub subtitle: Option<PathBuf>,
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}
