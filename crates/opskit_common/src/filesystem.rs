//! Tolerant file reading.

use std::fs;
use std::io;
use std::path::Path;

/// Read a file as text, substituting invalid UTF-8 sequences instead of
/// failing. Assistant logs can contain garbage bytes from interrupted
/// writers; a scan must never abort over them.
pub fn read_to_string_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_reads_valid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.log");
        fs::write(&path, "hello world").unwrap();

        assert_eq!(read_to_string_lossy(&path).unwrap(), "hello world");
    }

    #[test]
    fn test_substitutes_invalid_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mangled.log");
        fs::write(&path, b"before \xff\xfe after").unwrap();

        let text = read_to_string_lossy(&path).unwrap();
        assert!(text.starts_with("before "));
        assert!(text.ends_with(" after"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(read_to_string_lossy(&dir.path().join("absent.log")).is_err());
    }
}
