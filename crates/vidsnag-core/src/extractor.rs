//! Video and metadata extraction through yt-dlp

use crate::config::DownloadConfig;
use crate::error::DownloadError;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// File name template used for every artifact of a run
pub const OUTPUT_TEMPLATE: &str = "%(title)s [%(id)s].%(ext)s";

/// One yt-dlp invocation's settings.
///
/// Built fresh for every call; the output template is always passed in
/// explicitly, never patched into a shared table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    output_template: Option<PathBuf>,
    format: Option<String>,
    format_sort: Vec<String>,
    write_thumbnail: bool,
    write_subtitles: bool,
    write_auto_subtitles: bool,
    skip_download: bool,
    convert_video: Option<String>,
    convert_thumbnails: Option<String>,
    playlist_items: Option<String>,
}

impl ExtractOptions {
    /// Best video and audio, thumbnail and uploaded subtitles, converted to
    /// the configured container and image formats.
    pub fn primary(output_template: PathBuf, download: &DownloadConfig) -> Self {
        Self {
            output_template: Some(output_template),
            format: Some(download.format.clone()),
            format_sort: download.format_sort.clone(),
            write_thumbnail: true,
            write_subtitles: true,
            convert_video: Some(download.video_format.clone()),
            convert_thumbnails: Some(download.thumbnail_format.clone()),
            ..Self::default()
        }
    }

    /// Machine-generated subtitles only, no media download.
    pub fn auto_subtitles(output_template: PathBuf) -> Self {
        Self {
            output_template: Some(output_template),
            write_auto_subtitles: true,
            skip_download: true,
            ..Self::default()
        }
    }

    /// Channel metadata without enumerating any of the channel's videos.
    pub fn channel_metadata() -> Self {
        Self {
            playlist_items: Some("0".to_string()),
            skip_download: true,
            ..Self::default()
        }
    }

    pub fn output_template(&self) -> Option<&Path> {
        self.output_template.as_deref()
    }

    pub fn writes_auto_subtitles(&self) -> bool {
        self.write_auto_subtitles
    }

    pub fn skips_download(&self) -> bool {
        self.skip_download
    }

    /// Translate into yt-dlp command line arguments (URL excluded).
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--dump-single-json".into()];

        if self.skip_download {
            args.push("--skip-download".into());
        }
        // Subtitle files are only written when not simulating
        if !self.skip_download || self.write_auto_subtitles || self.write_subtitles {
            args.push("--no-simulate".into());
        }
        if !self.skip_download {
            // -J implies quiet; keep download progress on stderr anyway
            args.extend(["--progress".into(), "--newline".into()]);
        }

        if let Some(ref template) = self.output_template {
            args.push("-o".into());
            args.push(template.as_os_str().to_owned());
        }
        if let Some(ref format) = self.format {
            args.extend(["-f".into(), format.into()]);
        }
        if !self.format_sort.is_empty() {
            args.extend(["-S".into(), self.format_sort.join(",").into()]);
        }
        if self.write_thumbnail {
            args.push("--write-thumbnail".into());
        }
        if self.write_subtitles {
            args.push("--write-subs".into());
        }
        if self.write_auto_subtitles {
            args.push("--write-auto-subs".into());
        }
        if let Some(ref container) = self.convert_video {
            args.extend(["--recode-video".into(), container.into()]);
        }
        if let Some(ref image) = self.convert_thumbnails {
            args.extend(["--convert-thumbnails".into(), image.into()]);
        }
        if let Some(ref items) = self.playlist_items {
            args.extend(["--playlist-items".into(), items.into()]);
        }

        args
    }
}

/// The subset of yt-dlp's info dictionary this tool reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// UNIX timestamp of the upload
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub extractor: String,
    #[serde(default)]
    pub uploader_id: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub uploader_url: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
    #[serde(default)]
    pub requested_downloads: Vec<RequestedDownload>,
    #[serde(default)]
    pub requested_subtitles: Option<HashMap<String, RequestedSubtitle>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Set when the thumbnail was written to disk
    #[serde(default)]
    pub filepath: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestedDownload {
    #[serde(default)]
    pub filepath: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestedSubtitle {
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub filepath: Option<PathBuf>,
}

impl MediaInfo {
    /// Paths yt-dlp reports having written, in no particular role
    pub fn written_paths(&self) -> impl Iterator<Item = &Path> {
        let downloads = self
            .requested_downloads
            .iter()
            .filter_map(|d| d.filepath.as_deref());
        let thumbnails = self.thumbnails.iter().filter_map(|t| t.filepath.as_deref());
        let subtitles = self
            .requested_subtitles
            .iter()
            .flat_map(|subs| subs.values())
            .filter_map(|s| s.filepath.as_deref());

        downloads.chain(thumbnails).chain(subtitles)
    }

    /// Find a thumbnail by its exact id
    pub fn thumbnail(&self, id: &str) -> Option<&Thumbnail> {
        self.thumbnails.iter().find(|t| t.id.as_deref() == Some(id))
    }
}

/// The extraction engine seam
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Run one extraction against `url`, writing whatever `options` asks for.
    async fn extract(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<MediaInfo, DownloadError>;
}

/// yt-dlp driven as a subprocess
#[derive(Debug)]
pub struct YtDlp {
    yt_dlp_path: PathBuf,
}

impl YtDlp {
    pub fn new(yt_dlp_path: PathBuf) -> Self {
        Self { yt_dlp_path }
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn extract(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<MediaInfo, DownloadError> {
        info!("Extracting: {}", url);

        let mut cmd = Command::new(&self.yt_dlp_path);
        cmd.args(options.to_args())
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!("Executing command: {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DownloadError::YtDlpNotFound,
            _ => DownloadError::Io(e),
        })?;

        let mut stdout = child.stdout.take().ok_or_else(|| {
            DownloadError::Io(std::io::Error::other("yt-dlp stdout was not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            DownloadError::Io(std::io::Error::other("yt-dlp stderr was not captured"))
        })?;

        // Both pipes are drained together so a large JSON document cannot
        // block the process while stderr is being relayed.
        let read_stdout = async {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).await.map(|_| buf)
        };
        let (stdout, diagnostics) = tokio::try_join!(read_stdout, relay_diagnostics(stderr))?;

        let status = child.wait().await?;
        if !status.success() {
            return Err(classify_failure(status.code(), &diagnostics));
        }

        let info: MediaInfo = serde_json::from_slice(&stdout)
            .map_err(|e| DownloadError::MetadataParse(e.to_string()))?;

        debug!("Extracted: {:?} ({})", info.title, info.id);
        Ok(info)
    }
}

/// Forward yt-dlp's stderr to the log as it arrives, keeping the lines.
async fn relay_diagnostics(
    stderr: tokio::process::ChildStderr,
) -> std::io::Result<Vec<String>> {
    let mut lines = BufReader::new(stderr).lines();
    let mut kept = Vec::new();

    while let Some(line) = lines.next_line().await? {
        if line.starts_with("ERROR:") || line.starts_with("WARNING:") {
            warn!(target: "vidsnag_core::yt_dlp", "{}", line);
        } else {
            info!(target: "vidsnag_core::yt_dlp", "{}", line);
        }
        kept.push(line);
    }

    Ok(kept)
}

fn http_error_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"HTTP Error (\d{3})").expect("static regex is valid"))
}

/// Turn a failed run's stderr into a typed error.
///
/// Only `ERROR:` lines are considered, so retried requests reported as
/// warnings do not masquerade as the final failure.
pub fn classify_failure(code: Option<i32>, diagnostics: &[String]) -> DownloadError {
    let errors: Vec<&str> = diagnostics
        .iter()
        .map(String::as_str)
        .filter(|line| line.starts_with("ERROR:"))
        .collect();

    for line in &errors {
        if let Some(status) = http_error_regex()
            .captures(line)
            .and_then(|cap| cap[1].parse::<u16>().ok())
        {
            return DownloadError::Http {
                status,
                message: line.to_string(),
            };
        }
    }

    let message = if errors.is_empty() {
        diagnostics.last().cloned().unwrap_or_default()
    } else {
        errors.join("\n")
    };

    DownloadError::YtDlpFailed { code, message }
}
