//! Video selection checks and filename sanitisation.
//!
//! [`Validator::validate`] is pure: it never touches the session or the
//! preview registry, so a rejected file leaves every piece of state exactly
//! as it was.

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;

use super::ValidationError;

/// MIME type reported for files whose extension is not a known video kind.
const UNKNOWN_MIME: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// VideoCandidate
// ---------------------------------------------------------------------------

/// A file the user picked, before any checks have run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCandidate {
    /// Location of the bytes on disk.
    pub path: PathBuf,
    /// Name as the user sees it (the last path component).
    pub original_name: String,
    /// MIME type, e.g. `video/mp4`.
    pub mime_type: String,
    pub size_bytes: u64,
}

impl VideoCandidate {
    /// Describe the file at `path` using its metadata and extension.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Unreadable`] when the path does not exist, is not a
    /// regular file, or its metadata cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|e| ValidationError::Unreadable(format!("{}: {e}", path.display())))?;

        if !metadata.is_file() {
            return Err(ValidationError::Unreadable(format!(
                "{} is not a file",
                path.display()
            )));
        }

        let original_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            mime_type: mime_for_path(path).to_string(),
            original_name,
            size_bytes: metadata.len(),
        })
    }
}

/// Guess a MIME type from the file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mpeg" | "mpg" => "video/mpeg",
        "ogv" => "video/ogg",
        "3gp" => "video/3gpp",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        _ => UNKNOWN_MIME,
    }
}

// ---------------------------------------------------------------------------
// NormalizedFile
// ---------------------------------------------------------------------------

/// A validated video whose name is safe to send to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFile {
    pub path: PathBuf,
    /// Sanitised name; also the reference passed to the extract and
    /// generate stages.
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

// ---------------------------------------------------------------------------
// sanitize_filename
// ---------------------------------------------------------------------------

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`.
///
/// Each offending `char` becomes exactly one underscore, so the result has
/// as many characters as the input.
///
/// ```
/// use video_captioner::input::sanitize_filename;
///
/// assert_eq!(sanitize_filename("my clip (1).mp4"), "my_clip__1_.mp4");
/// assert_eq!(sanitize_filename("safe-name_2.mov"), "safe-name_2.mov");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Applies the MIME and size rules to a [`VideoCandidate`].
#[derive(Debug, Clone)]
pub struct Validator {
    max_size_bytes: u64,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

impl Validator {
    pub fn new(max_size_bytes: u64) -> Self {
        Self { max_size_bytes }
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Check `candidate` and produce its normalised form.
    ///
    /// The MIME check runs first, so a huge non-video file reports
    /// [`ValidationError::NotVideo`].
    pub fn validate(&self, candidate: &VideoCandidate) -> Result<NormalizedFile, ValidationError> {
        if !candidate.mime_type.contains("video") {
            return Err(ValidationError::NotVideo);
        }

        if candidate.size_bytes > self.max_size_bytes {
            return Err(ValidationError::TooLarge {
                size_bytes: candidate.size_bytes,
                limit_bytes: self.max_size_bytes,
            });
        }

        Ok(NormalizedFile {
            path: candidate.path.clone(),
            name: sanitize_filename(&candidate.original_name),
            mime_type: candidate.mime_type.clone(),
            size_bytes: candidate.size_bytes,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn candidate(name: &str, mime: &str, size: u64) -> VideoCandidate {
        VideoCandidate {
            path: PathBuf::from("/videos").join(name),
            original_name: name.into(),
            mime_type: mime.into(),
            size_bytes: size,
        }
    }

    fn is_safe(name: &str) -> bool {
        name.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    }

    // ---- sanitize_filename ---

    #[test]
    fn sanitize_replaces_spaces_and_symbols() {
        assert_eq!(sanitize_filename("holiday video #2.mp4"), "holiday_video__2.mp4");
    }

    #[test]
    fn sanitize_replaces_each_non_ascii_char_once() {
        assert_eq!(sanitize_filename("café.mov"), "caf_.mov");
        assert_eq!(sanitize_filename("วิดีโอ.mp4").chars().count(), "วิดีโอ.mp4".chars().count());
    }

    #[test]
    fn sanitize_output_is_always_safe() {
        let names = [
            "",
            "plain.mp4",
            "../../etc/passwd",
            "tab\there.webm",
            "emoji 🎬 clip.mkv",
            "C:\\Users\\me\\clip.avi",
            "ünïcödé-ñame.mov",
        ];
        for name in names {
            let out = sanitize_filename(name);
            assert!(is_safe(&out), "{name:?} -> {out:?}");
        }
    }

    #[test]
    fn sanitize_is_idempotent() {
        for name in ["a b c.mp4", "x/y\\z.mov", "日本語.webm", "ok-name_1.mkv"] {
            let once = sanitize_filename(name);
            assert_eq!(sanitize_filename(&once), once);
        }
    }

    // ---- Validator ---

    #[test]
    fn rejects_non_video_mime() {
        let v = Validator::default();
        for mime in ["image/png", "audio/mpeg", "application/octet-stream", ""] {
            assert_eq!(
                v.validate(&candidate("file.bin", mime, 10)),
                Err(ValidationError::NotVideo),
                "{mime}"
            );
        }
    }

    #[test]
    fn rejects_files_over_200_mib() {
        let v = Validator::default();
        let limit = 200 * 1024 * 1024;
        let err = v.validate(&candidate("big.mp4", "video/mp4", limit + 1));
        assert!(matches!(err, Err(ValidationError::TooLarge { .. })));
    }

    #[test]
    fn accepts_file_exactly_at_limit() {
        let v = Validator::default();
        let limit = 200 * 1024 * 1024;
        assert!(v.validate(&candidate("edge.mp4", "video/mp4", limit)).is_ok());
    }

    #[test]
    fn mime_check_runs_before_size_check() {
        let v = Validator::new(10);
        assert_eq!(
            v.validate(&candidate("huge.png", "image/png", 1_000)),
            Err(ValidationError::NotVideo)
        );
    }

    #[test]
    fn success_sanitises_name_and_keeps_bytes_and_type() {
        let v = Validator::default();
        let c = candidate("My Trip (final).mov", "video/quicktime", 4096);
        let file = v.validate(&c).unwrap();

        assert_eq!(file.name, "My_Trip__final_.mov");
        assert_eq!(file.path, c.path);
        assert_eq!(file.mime_type, "video/quicktime");
        assert_eq!(file.size_bytes, 4096);
    }

    // ---- mime_for_path / from_path ---

    #[test]
    fn mime_from_extension_is_case_insensitive() {
        assert_eq!(mime_for_path(Path::new("a.MP4")), "video/mp4");
        assert_eq!(mime_for_path(Path::new("a.mov")), "video/quicktime");
        assert_eq!(mime_for_path(Path::new("a.txt")), UNKNOWN_MIME);
        assert_eq!(mime_for_path(Path::new("noext")), UNKNOWN_MIME);
    }

    #[test]
    fn from_path_reads_size_and_name() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("my clip.webm");
        let mut f = std::fs::File::create(&path).expect("create");
        f.write_all(&[0u8; 1234]).expect("write");

        let c = VideoCandidate::from_path(&path).unwrap();
        assert_eq!(c.original_name, "my clip.webm");
        assert_eq!(c.mime_type, "video/webm");
        assert_eq!(c.size_bytes, 1234);
    }

    #[test]
    fn from_path_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = VideoCandidate::from_path(dir.path().join("gone.mp4")).unwrap_err();
        assert!(matches!(err, ValidationError::Unreadable(_)));
    }

    #[test]
    fn from_path_directory_is_unreadable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = VideoCandidate::from_path(dir.path()).unwrap_err();
        assert!(matches!(err, ValidationError::Unreadable(_)));
    }
}
