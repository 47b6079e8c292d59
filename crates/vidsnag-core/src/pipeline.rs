//! Download orchestration: fetch, normalize, classify, resolve the uploader

use crate::artifacts::{ArtifactKind, ArtifactSet};
use crate::avatar::{instagram_profile_url, AvatarFetcher, AvatarSource};
use crate::config::{Config, DownloadConfig};
use crate::error::{Result, VidsnagError};
use crate::extractor::{ExtractOptions, Extractor, MediaInfo};
use crate::report::{format_upload_date, DownloadResult, Site, UploaderInfo};
use crate::sanitizer::sanitize_dir;
use crate::workdir::WorkingDirectory;

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Status YouTube answers with when a video has no automatic captions.
///
/// This is observed behaviour, not a documented contract: the same status
/// also means "rate limited". Revisit if YouTube starts answering differently.
pub const NO_AUTO_SUBTITLES_STATUS: u16 = 429;

/// One download run, from URL to [`DownloadResult`]
pub struct Pipeline<'a, E, A> {
    extractor: &'a E,
    avatars: &'a A,
    download: DownloadConfig,
    temp_root: PathBuf,
}

impl<'a, E: Extractor, A: AvatarFetcher> Pipeline<'a, E, A> {
    pub fn new(extractor: &'a E, avatars: &'a A, config: &Config) -> Self {
        Self {
            extractor,
            avatars,
            download: config.download.clone(),
            temp_root: config.temp_dir(),
        }
    }

    pub async fn run(&self, url: &str) -> Result<DownloadResult> {
        let start_time = Instant::now();
        info!("Starting download for: {}", url);

        let workdir = WorkingDirectory::create(&self.temp_root)?;
        let template = workdir.output_template();

        // 1. Video, thumbnail and uploaded subtitles
        let primary = ExtractOptions::primary(template.clone(), &self.download);
        let video_info = self.extractor.extract(url, &primary).await?;
        let mut reported: Vec<PathBuf> =
            video_info.written_paths().map(Path::to_path_buf).collect();

        // 2. Automatic subtitles, only when YouTube gave no uploaded ones
        let is_youtube = Site::from_extractor(&video_info.extractor) == Some(Site::Youtube);
        if is_youtube && !ArtifactSet::scan(workdir.path())?.contains(ArtifactKind::Subtitle) {
            if let Some(subtitles) = self.fetch_auto_subtitles(url, template).await? {
                reported.extend(subtitles.written_paths().map(Path::to_path_buf));
            }
        }

        // 3. Normalize names, then pick the artifacts
        sanitize_dir(workdir.path())?;
        let artifacts = ArtifactSet::scan(workdir.path())?
            .classify(reported.iter().map(PathBuf::as_path))?;

        // 4. Uploader
        let site = Site::from_extractor(&video_info.extractor)
            .ok_or_else(|| VidsnagError::UnsupportedSite(video_info.extractor.clone()))?;
        let uploader = self.resolve_uploader(site, &video_info, workdir.path()).await?;

        let timestamp = video_info
            .timestamp
            .ok_or(VidsnagError::MissingField("timestamp"))?;

        let result = DownloadResult {
            id: video_info.id.clone(),
            url: url.to_string(),
            title: required(&video_info.title, "title")?,
            description: video_info.description.clone(),
            date_uploaded: format_upload_date(timestamp)?,
            video_path: artifacts.video,
            thumbnail_path: artifacts.thumbnail,
            subtitle_path: artifacts.subtitle,
            folder_path: workdir.path().to_path_buf(),
            uploader,
            site,
        };

        info!(
            "Download complete: {} ({:.1}s)",
            result.video_path.display(),
            start_time.elapsed().as_secs_f32()
        );
        Ok(result)
    }

    /// Second, subtitle-only pass for machine-generated captions.
    ///
    /// An HTTP [`NO_AUTO_SUBTITLES_STATUS`] means there are none; every other
    /// failure is fatal.
    async fn fetch_auto_subtitles(
        &self,
        url: &str,
        template: PathBuf,
    ) -> Result<Option<MediaInfo>> {
        debug!("No uploaded subtitles, requesting automatic ones");

        let options = ExtractOptions::auto_subtitles(template);
        match self.extractor.extract(url, &options).await {
            Ok(info) => Ok(Some(info)),
            Err(e) if e.http_status() == Some(NO_AUTO_SUBTITLES_STATUS) => {
                info!("No automatic subtitles available");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn resolve_uploader(
        &self,
        site: Site,
        video_info: &MediaInfo,
        out_dir: &Path,
    ) -> Result<UploaderInfo> {
        let id = required(&video_info.uploader_id, "uploader_id")?;
        let name = required(&video_info.uploader, "uploader")?;

        let (url, source) = match site {
            Site::Youtube => {
                let channel_url = required(&video_info.uploader_url, "uploader_url")?;
                (channel_url.clone(), AvatarSource::YouTube { channel_url })
            }
            Site::Instagram => {
                let handle = required(&video_info.channel, "channel")?;
                (instagram_profile_url(&handle), AvatarSource::Instagram { handle })
            }
        };

        let avatar_path = self.avatars.fetch(out_dir, &source).await?;

        Ok(UploaderInfo {
            id,
            name,
            url,
            avatar_path,
        })
    }
}

fn required(value: &Option<String>, field: &'static str) -> Result<String> {
    value.clone().ok_or(VidsnagError::MissingField(field))
}
