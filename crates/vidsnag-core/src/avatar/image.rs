//! Image download and persistence

use crate::error::AvatarError;
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// File suffix for an HTTP `Content-Type`
pub fn suffix_for_content_type(content_type: &str) -> Result<&'static str, AvatarError> {
    match content_type {
        "image/png" => Ok(".png"),
        "image/jpeg" => Ok(".jpg"),
        other => Err(AvatarError::UnrecognizedContentType(other.to_string())),
    }
}

/// GET `url` and store the body as `<out_dir>/<basename><suffix>`.
///
/// Any non-2xx status is an error; there is no retry.
pub async fn download_image(
    http: &reqwest::Client,
    out_dir: &Path,
    url: &str,
    basename: &str,
) -> Result<PathBuf, AvatarError> {
    debug!("Fetching image: {}", url);

    let response = http.get(url).send().await?.error_for_status()?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AvatarError::MissingContentType(url.to_string()))?
        .to_string();

    let body = response.bytes().await?;
    save_image(out_dir, basename, &content_type, &body).await
}

/// Write image bytes, picking the suffix from `content_type`.
///
/// The file must not exist yet.
pub async fn save_image(
    out_dir: &Path,
    basename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Result<PathBuf, AvatarError> {
    let suffix = suffix_for_content_type(content_type)?;
    let out_path = out_dir.join(format!("{}{}", basename, suffix));

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&out_path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await?;

    debug!("Saved image: {}", out_path.display());
    Ok(out_path)
}
