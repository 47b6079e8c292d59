//! YouTube channel avatars

use crate::error::AvatarError;
use crate::extractor::{ExtractOptions, Extractor};
use tracing::debug;
use url::Url;

/// Thumbnail id YouTube gives the full, uncropped channel avatar
pub const AVATAR_THUMBNAIL_ID: &str = "avatar_uncropped";

/// Look up the channel's avatar URL from its metadata.
pub(super) async fn avatar_url<E: Extractor>(
    extractor: &E,
    channel_url: &str,
) -> Result<String, AvatarError> {
    let channel = extractor
        .extract(channel_url, &ExtractOptions::channel_metadata())
        .await?;

    let url = channel
        .thumbnail(AVATAR_THUMBNAIL_ID)
        .and_then(|thumbnail| thumbnail.url.clone())
        .ok_or(AvatarError::NoMatchingThumbnail(AVATAR_THUMBNAIL_ID))?;

    debug!("Channel avatar: {}", url);
    Ok(url)
}

/// File name stem for a channel's avatar: the last path segment of the
/// channel URL, percent-decoded, without a leading `@`.
///
/// `https://www.youtube.com/@networkrail` becomes `networkrail`.
pub fn channel_basename(channel_url: &str) -> Result<String, AvatarError> {
    let invalid = || AvatarError::InvalidChannelUrl(channel_url.to_string());

    let url = Url::parse(channel_url).map_err(|_| invalid())?;
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(invalid)?;

    let segment = urlencoding::decode(segment).map_err(|_| invalid())?;
    let name = segment.strip_prefix('@').unwrap_or(&*segment);
    if name.is_empty() {
        return Err(invalid());
    }

    Ok(name.to_string())
}
