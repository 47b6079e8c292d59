use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;
use vidsnag_core::config::Config;
use which::which;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("vidsnag dependency check\n");

    let mut all_ok = true;

    // Check yt-dlp
    print!("yt-dlp:     ");
    all_ok &= report(
        config.yt_dlp_path().ok(),
        &["--version"],
        first_line,
        "pipx install yt-dlp",
    );

    // Check gallery-dl (Instagram avatars)
    print!("gallery-dl: ");
    all_ok &= report(
        config.gallery_dl_path().ok(),
        &["--version"],
        first_line,
        "pipx install gallery-dl",
    );

    // Check FFmpeg (video recoding and thumbnail conversion)
    print!("ffmpeg:     ");
    all_ok &= report(
        which("ffmpeg").ok(),
        &["-version"],
        // "ffmpeg version 6.1.1 Copyright ..."
        |out| out.split_whitespace().nth(2).unwrap_or("unknown").to_string(),
        "brew install ffmpeg",
    );

    println!();
    if all_ok {
        println!("All dependencies OK!");
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
    }

    Ok(())
}

/// Print one status line; returns whether the tool is usable.
fn report(
    path: Option<PathBuf>,
    version_args: &[&str],
    version: impl Fn(&str) -> String,
    install_hint: &str,
) -> bool {
    let Some(path) = path else {
        println!("NOT FOUND");
        println!("            Install with: {}", install_hint);
        return false;
    };

    match Command::new(&path).args(version_args).output() {
        Ok(out) if out.status.success() => {
            println!("OK ({})", version(&String::from_utf8_lossy(&out.stdout)));
            true
        }
        _ => {
            println!("FOUND at {} but failed to get version", path.display());
            false
        }
    }
}

fn first_line(out: &str) -> String {
    out.lines().next().unwrap_or("").trim().to_string()
}
