//! Configuration management for vidsnag

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub download: DownloadConfig,
    pub instagram: InstagramConfig,
    pub temp: TempConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    pub yt_dlp: Option<PathBuf>,
    /// Path to gallery-dl binary (auto-detected if not set)
    pub gallery_dl: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Format selection; the default skips AI-upscaled ("-sr") renditions
    pub format: String,
    /// Format sort order passed to yt-dlp
    pub format_sort: Vec<String>,
    /// Container the video is converted to
    pub video_format: String,
    /// Image format the thumbnail is converted to
    pub thumbnail_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    /// Browser whose cookies gallery-dl reuses to see profile pages
    pub cookies_from_browser: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TempConfig {
    /// Parent of the per-run working directories (uses system temp if not set)
    pub directory: Option<PathBuf>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            format: "bestvideo*[format_id!*=-sr]+bestaudio/best[format_id!*=-sr]".to_string(),
            format_sort: vec!["res".to_string(), "ext:mp4:m4a".to_string()],
            video_format: "mp4".to_string(),
            thumbnail_format: "jpg".to_string(),
        }
    }
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            cookies_from_browser: "firefox".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            download: DownloadConfig::default(),
            instagram: InstagramConfig::default(),
            temp: TempConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(default_config) = Self::default_file() {
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ConfigError::InvalidValue(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        // VIDSNAG_PATHS__YT_DLP=/opt/bin/yt-dlp
        figment = figment.merge(Env::prefixed("VIDSNAG_").split("__"));

        figment.extract().map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Location of the per-user config file
    pub fn default_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vidsnag/config.toml"))
    }

    /// Get yt-dlp path, auto-detecting if not configured
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.yt_dlp {
            Ok(path.clone())
        } else {
            which::which("yt-dlp")
                .map_err(|_| ConfigError::InvalidValue("yt-dlp not found in PATH".to_string()))
        }
    }

    /// Get gallery-dl path, auto-detecting if not configured
    pub fn gallery_dl_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.gallery_dl {
            Ok(path.clone())
        } else {
            which::which("gallery-dl")
                .map_err(|_| ConfigError::InvalidValue("gallery-dl not found in PATH".to_string()))
        }
    }

    /// Parent directory for working directories
    pub fn temp_dir(&self) -> PathBuf {
        self.temp.directory.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}
