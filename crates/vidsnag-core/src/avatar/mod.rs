//! Uploader avatar resolution
//!
//! Each supported site finds its avatar URL differently:
//! - YouTube: the channel's `avatar_uncropped` thumbnail, read from yt-dlp
//!   channel metadata
//! - Instagram: the profile avatar URL printed by gallery-dl
//!
//! Both then fetch the image over HTTP and store it in the working directory.

mod image;
mod instagram;
mod youtube;

pub use image::{download_image, save_image, suffix_for_content_type};
pub use instagram::{avatar_page as instagram_avatar_page, profile_url as instagram_profile_url};
pub use youtube::{channel_basename, AVATAR_THUMBNAIL_ID};

use crate::error::AvatarError;
use crate::extractor::Extractor;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where an uploader's avatar comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarSource {
    /// A YouTube channel, e.g. `https://www.youtube.com/@networkrail`
    YouTube { channel_url: String },
    /// An Instagram account handle
    Instagram { handle: String },
}

impl std::fmt::Display for AvatarSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvatarSource::YouTube { channel_url } => write!(f, "YouTube channel {}", channel_url),
            AvatarSource::Instagram { handle } => write!(f, "Instagram account {}", handle),
        }
    }
}

/// Fetches one avatar image into a directory
#[async_trait]
pub trait AvatarFetcher: Send + Sync {
    /// Download the avatar for `source` into `out_dir` and return its path.
    async fn fetch(&self, out_dir: &Path, source: &AvatarSource) -> Result<PathBuf, AvatarError>;
}

/// Avatar fetcher backed by yt-dlp, gallery-dl and an HTTP client
#[derive(Debug)]
pub struct AvatarResolver<E> {
    extractor: E,
    gallery_dl_path: PathBuf,
    cookies_from_browser: String,
    http: reqwest::Client,
}

impl<E: Extractor> AvatarResolver<E> {
    pub fn new(
        extractor: E,
        gallery_dl_path: PathBuf,
        cookies_from_browser: String,
    ) -> Result<Self, AvatarError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("vidsnag/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            extractor,
            gallery_dl_path,
            cookies_from_browser,
            http,
        })
    }
}

#[async_trait]
impl<E: Extractor> AvatarFetcher for AvatarResolver<E> {
    async fn fetch(&self, out_dir: &Path, source: &AvatarSource) -> Result<PathBuf, AvatarError> {
        info!("Resolving avatar for {}", source);

        match source {
            AvatarSource::YouTube { channel_url } => {
                let basename = channel_basename(channel_url)?;
                let url = youtube::avatar_url(&self.extractor, channel_url).await?;
                download_image(&self.http, out_dir, &url, &basename).await
            }
            AvatarSource::Instagram { handle } => {
                let url =
                    instagram::avatar_url(&self.gallery_dl_path, &self.cookies_from_browser, handle)
                        .await?;
                download_image(&self.http, out_dir, &url, handle).await
            }
        }
    }
}
