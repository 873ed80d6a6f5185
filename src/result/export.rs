//! Caption export formats and the file writer behind "download".

use std::path::{Path, PathBuf};

use serde::Serialize;

/// File name used for plain-text downloads.
pub const TEXT_EXPORT_NAME: &str = "captions.txt";
/// File name used for JSON downloads.
pub const JSON_EXPORT_NAME: &str = "captions.json";

#[derive(Serialize)]
struct CaptionDocument<'a> {
    caption: &'a str,
}

/// `{"caption": text}` pretty-printed with two-space indentation.
///
/// ```
/// use video_captioner::result::render_json;
///
/// assert_eq!(render_json("hello"), "{\n  \"caption\": \"hello\"\n}");
/// ```
pub fn render_json(text: &str) -> String {
    // A struct with one &str field always serialises.
    serde_json::to_string_pretty(&CaptionDocument { caption: text }).unwrap_or_default()
}

/// Write `contents` to `dir/name`, creating `dir` if needed.
pub fn write_export(dir: &Path, name: &str, contents: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_matches_two_space_layout() {
        assert_eq!(render_json("hello"), "{\n  \"caption\": \"hello\"\n}");
    }

    #[test]
    fn json_escapes_quotes_and_newlines() {
        let out = render_json("say \"hi\"\nbye");
        assert_eq!(out, "{\n  \"caption\": \"say \\\"hi\\\"\\nbye\"\n}");
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["caption"], "say \"hi\"\nbye");
    }

    #[test]
    fn write_export_creates_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("nested/out");

        let path = write_export(&target, TEXT_EXPORT_NAME, "A dog runs.").unwrap();

        assert_eq!(path, target.join("captions.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "A dog runs.");
    }

    #[test]
    fn write_export_overwrites() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_export(dir.path(), JSON_EXPORT_NAME, "old").unwrap();
        let path = write_export(dir.path(), JSON_EXPORT_NAME, "new").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
    }
}
