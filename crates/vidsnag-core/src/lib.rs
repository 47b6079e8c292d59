//! vidsnag-core: Download one video with its thumbnail, subtitles and uploader avatar

pub mod artifacts;
pub mod avatar;
pub mod config;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod report;
pub mod sanitizer;
pub mod workdir;

pub use config::Config;
pub use error::{Result, VidsnagError};
pub use pipeline::Pipeline;
pub use report::{DownloadResult, Site, UploaderInfo};
