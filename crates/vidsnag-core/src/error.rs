//! Error types for vidsnag-core

use std::path::PathBuf;

use thiserror::Error;

use crate::artifacts::ArtifactKind;

pub type Result<T> = std::result::Result<T, VidsnagError>;

#[derive(Error, Debug)]
pub enum VidsnagError {
    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Filename cleanup failed: {0}")]
    Sanitize(#[from] SanitizeError),

    #[error("Artifact lookup failed: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Avatar resolution failed: {0}")]
    Avatar(#[from] AvatarError),

    #[error("Unsupported extractor: {0}")]
    UnsupportedSite(String),

    #[error("Metadata field missing: {0}")]
    MissingField(&'static str),

    #[error("Invalid upload timestamp: {0}")]
    InvalidTimestamp(f64),

    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("yt-dlp not found. Install with: pipx install yt-dlp")]
    YtDlpNotFound,

    /// The engine reported an HTTP-layer failure with a status code.
    #[error("HTTP Error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("yt-dlp failed with exit code {code:?}: {message}")]
    YtDlpFailed { code: Option<i32>, message: String },

    #[error("Failed to parse metadata: {0}")]
    MetadataParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// HTTP status code, if the failure happened at the HTTP layer.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            DownloadError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SanitizeError {
    /// Two artifacts normalize to the same name.
    #[error("Cannot rename {from:?}: {to:?} already exists")]
    Collision { from: PathBuf, to: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("No {kind} file found in {}", dir.display())]
    NotFound { kind: ArtifactKind, dir: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("No thumbnail with id {0:?} in channel metadata")]
    NoMatchingThumbnail(&'static str),

    #[error("Cannot derive a file name from channel URL: {0}")]
    InvalidChannelUrl(String),

    #[error("Unrecognised content-type: {0}")]
    UnrecognizedContentType(String),

    #[error("Response for {0} has no content-type header")]
    MissingContentType(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gallery-dl not found. Install with: pipx install gallery-dl")]
    GalleryDlNotFound,

    #[error("gallery-dl failed with exit code {code:?}: {stderr}")]
    GalleryDlFailed { code: Option<i32>, stderr: String },

    #[error("gallery-dl printed no avatar URL for {0}")]
    EmptyAvatarUrl(String),

    #[error("Channel lookup failed: {0}")]
    Channel(#[from] DownloadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}
