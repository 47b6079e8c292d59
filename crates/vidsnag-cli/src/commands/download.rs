use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use vidsnag_core::{
    avatar::AvatarResolver,
    config::Config,
    extractor::YtDlp,
    pipeline::Pipeline,
};

pub async fn run(url: &str, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    let yt_dlp_path = config.yt_dlp_path()?;
    // Only Instagram needs gallery-dl; a missing binary surfaces when it is spawned
    let gallery_dl_path = config
        .gallery_dl_path()
        .unwrap_or_else(|_| PathBuf::from("gallery-dl"));
    debug!("yt-dlp: {}, gallery-dl: {}", yt_dlp_path.display(), gallery_dl_path.display());

    let extractor = YtDlp::new(yt_dlp_path.clone());
    let avatars = AvatarResolver::new(
        YtDlp::new(yt_dlp_path),
        gallery_dl_path,
        config.instagram.cookies_from_browser.clone(),
    )?;

    let result = Pipeline::new(&extractor, &avatars, &config)
        .run(url)
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    println!("{}", result.to_json()?);
    Ok(())
}
