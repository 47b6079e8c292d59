//! File name cleanup for downloaded artifacts
//!
//! yt-dlp swaps characters that are unsafe on disk for fullwidth lookalikes
//! (`？`, `⧸`, `：`, ...). Those survive on the filesystem but are awkward in
//! URLs and shells, so every name in the working directory is rewritten to
//! plain ASCII equivalents.

use crate::error::SanitizeError;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use tracing::debug;

/// Character replacements applied before whitespace is collapsed
const REPLACEMENTS: [(char, &str); 6] = [
    ('#', " "),
    ('？', " "),
    ('⧸', "-"),
    ('：', "-"),
    ('｜', "-"),
    ('＂', ""),
];

/// Normalized form of a single file name.
///
/// Idempotent: `sanitize_name(&sanitize_name(s)) == sanitize_name(s)`.
pub fn sanitize_name(name: &str) -> String {
    let mut builder = NameBuilder::default();
    name.chars().for_each(|c| builder.push_char(c));

    String::from_utf8_lossy(&builder.out).into_owned()
}

/// [`sanitize_name`] for raw file names.
///
/// Bytes that are not valid UTF-8 are kept as they are; the characters
/// around them are still replaced.
#[cfg(unix)]
pub fn sanitize_os_name(name: &OsStr) -> OsString {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    let mut builder = NameBuilder::default();
    for chunk in name.as_bytes().utf8_chunks() {
        chunk.valid().chars().for_each(|c| builder.push_char(c));
        if !chunk.invalid().is_empty() {
            builder.push_token(chunk.invalid());
        }
    }

    OsString::from_vec(builder.out)
}

#[cfg(not(unix))]
pub fn sanitize_os_name(name: &OsStr) -> OsString {
    match name.to_str() {
        Some(name) => sanitize_name(name).into(),
        None => name.to_os_string(),
    }
}

/// Replaces characters and joins whitespace-separated runs with one space
#[derive(Default)]
struct NameBuilder {
    out: Vec<u8>,
    gap: bool,
}

impl NameBuilder {
    fn push_char(&mut self, c: char) {
        match REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => to.chars().for_each(|c| self.push_plain(c)),
            None => self.push_plain(c),
        }
    }

    fn push_plain(&mut self, c: char) {
        if c.is_whitespace() {
            self.gap = true;
            return;
        }
        let mut buf = [0u8; 4];
        self.push_token(c.encode_utf8(&mut buf).as_bytes());
    }

    fn push_token(&mut self, bytes: &[u8]) {
        if self.gap && !self.out.is_empty() {
            self.out.push(b' ');
        }
        self.gap = false;
        self.out.extend_from_slice(bytes);
    }
}

/// Rename every entry of `dir` to its sanitized name.
///
/// A target name that already exists means two artifacts collapsed onto the
/// same name; that is reported as [`SanitizeError::Collision`] and nothing
/// further is renamed.
pub fn sanitize_dir(dir: &Path) -> Result<(), SanitizeError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let old_name = entry.file_name();

        let new_name = sanitize_os_name(&old_name);
        if new_name == old_name {
            continue;
        }

        let from = entry.path();
        let to = dir.join(&new_name);
        if to.exists() {
            return Err(SanitizeError::Collision { from, to });
        }

        debug!("Renaming {:?} -> {:?}", old_name, new_name);
        std::fs::rename(&from, &to)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORBIDDEN: [char; 6] = ['#', '？', '：', '｜', '⧸', '＂'];

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_sanitize_name_replacements() {
        assert_eq!(
            sanitize_name(
                "3D Printing Everyday for 365 Days 176⧸365  #stem #3dprinting [eso8JB7q0a0].mp4"
            ),
            "3D Printing Everyday for 365 Days 176-365 stem 3dprinting [eso8JB7q0a0].mp4"
        );
        assert_eq!(sanitize_name("What？ Really： yes｜no.jpg"), "What Really- yes-no.jpg");
        assert_eq!(sanitize_name("＂quoted＂ title.vtt"), "quoted title.vtt");
        assert_eq!(sanitize_name("  padded\t name  "), "padded name");
        assert_eq!(sanitize_name("plain [abc].mp4"), "plain [abc].mp4");
    }

    #[test]
    fn test_sanitize_name_is_idempotent() {
        let samples = [
            "a # b ？ c",
            "＂＂  ＂",
            "x⧸y：z｜w",
            "#leading and trailing#",
            "tabs\t\tand\nnewlines",
        ];

        for sample in samples {
            let once = sanitize_name(sample);
            assert_eq!(sanitize_name(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_sanitize_dir_renames_in_place() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Video #tag ？ [id1].mp4"), b"video").unwrap();
        std::fs::write(dir.path().join("Video #tag ？ [id1].jpg"), b"thumb").unwrap();
        std::fs::write(dir.path().join("clean.vtt"), b"subs").unwrap();

        sanitize_dir(dir.path()).unwrap();

        assert_eq!(
            names(dir.path()),
            vec!["Video tag [id1].jpg", "Video tag [id1].mp4", "clean.vtt"]
        );
        assert_eq!(
            std::fs::read(dir.path().join("Video tag [id1].mp4")).unwrap(),
            b"video"
        );
    }

    #[test]
    fn test_sanitize_dir_leaves_no_forbidden_characters() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a#b.mp4", " c：d .jpg", "e｜f⧸g.vtt", "＂h＂  i.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        sanitize_dir(dir.path()).unwrap();

        for name in names(dir.path()) {
            assert!(!name.contains(&FORBIDDEN[..]), "{name:?} still has forbidden characters");
            assert!(!name.contains("  "), "{name:?} has consecutive whitespace");
            assert_eq!(name.trim(), name);
        }
    }

    #[test]
    fn test_sanitize_dir_twice_matches_once() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["one # two.mp4", "three ？ four.jpg"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        sanitize_dir(dir.path()).unwrap();
        let once = names(dir.path());
        sanitize_dir(dir.path()).unwrap();

        assert_eq!(names(dir.path()), once);
    }

    #[test]
    fn test_os_name_matches_str_name() {
        let samples = ["a # b ？ c", "x⧸y：z｜w", "  padded\t name  ", "＂＂  ＂", "plain.mp4"];
        for sample in samples {
            assert_eq!(
                sanitize_os_name(OsStr::new(sample)),
                OsString::from(sanitize_name(sample))
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_sanitize_dir_handles_non_utf8_names() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let raw = OsStr::from_bytes(b"clip #tag \xff\xe6\xef\xbc\x82 [id].mp4");
        std::fs::write(dir.path().join(raw), b"video").unwrap();

        sanitize_dir(dir.path()).unwrap();

        let entries: Vec<OsString> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(
            entries,
            vec![OsStr::from_bytes(b"clip tag \xff\xe6 [id].mp4").to_os_string()]
        );
        assert!(!entries[0].as_bytes().contains(&b'#'));
    }

    #[test]
    fn test_sanitize_dir_collision_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a#b.mp4"), b"first").unwrap();
        std::fs::write(dir.path().join("a b.mp4"), b"second").unwrap();

        let err = sanitize_dir(dir.path()).unwrap_err();

        assert!(matches!(err, SanitizeError::Collision { .. }));
        assert_eq!(std::fs::read(dir.path().join("a b.mp4")).unwrap(), b"second");
    }
}
