//! The JSON description of a finished download

use crate::error::VidsnagError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Sites this tool knows how to resolve uploaders for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Youtube,
    Instagram,
}

impl Site {
    /// Map yt-dlp's `extractor` field; the comparison is exact.
    pub fn from_extractor(extractor: &str) -> Option<Self> {
        match extractor {
            "youtube" => Some(Site::Youtube),
            "Instagram" => Some(Site::Instagram),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploaderInfo {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(serialize_with = "absolute_path")]
    pub avatar_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    pub id: String,
    pub url: String,
    pub title: String,
    /// `null` when the site reports none
    pub description: Option<String>,
    /// ISO-8601 in UTC with a `Z` suffix
    pub date_uploaded: String,
    #[serde(serialize_with = "absolute_path")]
    pub video_path: PathBuf,
    #[serde(serialize_with = "absolute_path")]
    pub thumbnail_path: PathBuf,
    #[serde(serialize_with = "absolute_path_opt")]
    pub subtitle_path: Option<PathBuf>,
    #[serde(serialize_with = "absolute_path")]
    pub folder_path: PathBuf,
    pub uploader: UploaderInfo,
    pub site: Site,
}

impl DownloadResult {
    /// Pretty JSON with two-space indentation
    pub fn to_json(&self) -> Result<String, VidsnagError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Format a UNIX timestamp as `YYYY-MM-DDTHH:MM:SS[.ffffff]Z`.
///
/// Sub-second precision is microseconds, shown only when non-zero.
pub fn format_upload_date(timestamp: f64) -> Result<String, VidsnagError> {
    if !timestamp.is_finite() {
        return Err(VidsnagError::InvalidTimestamp(timestamp));
    }

    let total_micros = (timestamp * 1e6).round() as i64;
    let secs = total_micros.div_euclid(1_000_000);
    let micros = total_micros.rem_euclid(1_000_000) as u32;

    let format = if micros == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };

    DateTime::<Utc>::from_timestamp(secs, micros * 1_000)
        .map(|date| date.to_rfc3339_opts(format, true))
        .ok_or(VidsnagError::InvalidTimestamp(timestamp))
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn absolute_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&absolute(path).display())
}

fn absolute_path_opt<S: Serializer>(
    path: &Option<PathBuf>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match path {
        Some(path) => absolute_path(path, serializer),
        None => serializer.serialize_none(),
    }
}
