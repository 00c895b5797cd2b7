//! Pre-flight checks for candidate bundle files

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{error, warn};

/// Signatures a readable bundle is expected to start with.
///
/// `Unit` covers UnityFS, UnityWeb, UnityRaw and UnityArchive containers;
/// four zero bytes is a bare serialized file.
const KNOWN_SIGNATURES: &[&[u8; 4]] = &[b"Unit", b"\0\0\0\0"];

/// Check that `path` exists, is non-empty and has a readable 4-byte header.
///
/// An unrecognised header only produces a warning: encrypted and
/// game-specific bundles are common and the decoder may still handle them.
/// Never fails; every problem is logged and reported as `false`.
pub fn validate(path: &Path) -> bool {
    match check(path) {
        Ok(valid) => valid,
        Err(e) => {
            error!("Error while checking {}: {}", path.display(), e);
            false
        }
    }
}

fn check(path: &Path) -> io::Result<bool> {
    if !path.exists() {
        error!("File does not exist: {}", path.display());
        return Ok(false);
    }

    if path.metadata()?.len() == 0 {
        error!("File is empty: {}", path.display());
        return Ok(false);
    }

    let mut header = Vec::with_capacity(4);
    File::open(path)?.take(4).read_to_end(&mut header)?;
    if header.len() < 4 {
        error!("File is truncated or corrupt: {}", path.display());
        return Ok(false);
    }

    if !KNOWN_SIGNATURES.iter().any(|sig| header.as_slice() == sig.as_slice()) {
        warn!(
            "File may not be a Unity bundle (header {:02X?}): {}",
            header,
            path.display()
        );
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture;

    fn write(dir: &Path, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(!validate(&temp_dir.path().join("nope.ab")));
    }

    #[test]
    fn test_empty_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write(temp_dir.path(), "empty.ab", b"");
        assert!(!validate(&path));
    }

    #[test]
    fn test_short_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write(temp_dir.path(), "short.ab", b"Uni");
        assert!(!validate(&path));
    }

    #[test]
    fn test_unity_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write(temp_dir.path(), "ok.ab", b"UnityFS\0\0\0\0\x07");
        let (valid, logs) = capture(|| validate(&path));
        assert!(valid);
        assert!(!logs.contains("WARN"));
    }

    #[test]
    fn test_raw_serialized_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write(temp_dir.path(), "raw.ab", &[0, 0, 0, 0, 1, 2]);
        assert!(validate(&path));
    }

    #[test]
    fn test_unknown_header_warns_but_passes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write(temp_dir.path(), "enc.ab", b"\xAB\xCD\xEF\x01rest");
        let (valid, logs) = capture(|| validate(&path));
        assert!(valid);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("may not be a Unity bundle"));
    }

    #[test]
    fn test_directory_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("folder.ab");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("inner"), b"data").unwrap();
        assert!(!validate(&dir));
    }
}
