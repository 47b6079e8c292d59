//! Instagram profile avatars, resolved with gallery-dl

use crate::error::AvatarError;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Canonical profile URL of an account
pub fn profile_url(handle: &str) -> String {
    format!("https://www.instagram.com/{}/", handle)
}

/// gallery-dl's pseudo-page for a profile picture
pub fn avatar_page(handle: &str) -> String {
    format!("https://www.instagram.com/{}/avatar", handle)
}

/// Ask gallery-dl for the direct URL of an account's avatar.
///
/// Instagram hides profiles from anonymous visitors, so gallery-dl borrows
/// the cookies of a local browser session.
pub(super) async fn avatar_url(
    gallery_dl_path: &Path,
    cookies_from_browser: &str,
    handle: &str,
) -> Result<String, AvatarError> {
    let output = Command::new(gallery_dl_path)
        .arg("--get-urls")
        .arg(avatar_page(handle))
        .args(["--cookies-from-browser", cookies_from_browser])
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AvatarError::GalleryDlNotFound,
            _ => AvatarError::Io(e),
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        debug!("gallery-dl stderr: {}", stderr);
    }

    if !output.status.success() {
        return Err(AvatarError::GalleryDlFailed {
            code: output.status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if url.is_empty() {
        return Err(AvatarError::EmptyAvatarUrl(handle.to_string()));
    }

    debug!("Instagram avatar: {}", url);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::{Mutex, MutexGuard};

    // Writing a script while another test forks can leave it "text file busy"
    static SCRIPT_LOCK: Mutex<()> = Mutex::const_new(());

    async fn script_lock() -> MutexGuard<'static, ()> {
        SCRIPT_LOCK.lock().await
    }

    #[test]
    fn test_profile_urls() {
        assert_eq!(
            profile_url("publicdomaingems"),
            "https://www.instagram.com/publicdomaingems/"
        );
        assert_eq!(
            avatar_page("publicdomaingems"),
            "https://www.instagram.com/publicdomaingems/avatar"
        );
    }

    #[cfg(unix)]
    fn script(dir: &Path, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("gallery-dl");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_avatar_url_trims_stdout() {
        let _guard = script_lock().await;
        let dir = tempfile::tempdir().unwrap();
        let bin = script(
            dir.path(),
            r#"[ "$1" = "--get-urls" ] || exit 9
[ "$2" = "https://www.instagram.com/publicdomaingems/avatar" ] || exit 9
[ "$4" = "firefox" ] || exit 9
printf '  https://cdn.example/pic.jpg\n\n'"#,
        );

        let url = avatar_url(&bin, "firefox", "publicdomaingems").await.unwrap();
        assert_eq!(url, "https://cdn.example/pic.jpg");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_avatar_url_nonzero_exit_is_fatal() {
        let _guard = script_lock().await;
        let dir = tempfile::tempdir().unwrap();
        let bin = script(dir.path(), "echo 'login required' >&2\nexit 4");

        let err = avatar_url(&bin, "firefox", "someone").await.unwrap_err();
        match err {
            AvatarError::GalleryDlFailed { code, stderr } => {
                assert_eq!(code, Some(4));
                assert_eq!(stderr, "login required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_avatar_url_empty_output() {
        let _guard = script_lock().await;
        let dir = tempfile::tempdir().unwrap();
        let bin = script(dir.path(), "exit 0");

        let err = avatar_url(&bin, "firefox", "someone").await.unwrap_err();
        assert!(matches!(err, AvatarError::EmptyAvatarUrl(h) if h == "someone"));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let _guard = script_lock().await;
        let dir = tempfile::tempdir().unwrap();
        let err = avatar_url(&dir.path().join("absent"), "firefox", "someone")
            .await
            .unwrap_err();
        assert!(matches!(err, AvatarError::GalleryDlNotFound));
    }
}
