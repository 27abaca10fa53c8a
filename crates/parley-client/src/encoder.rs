//! File encoder: turns a selected local file into a transmissible payload.
//!
//! Single-shot read-to-completion; the caller waits for the result before
//! emitting the send frame. A failed read abandons the send with a warning
//! and nothing else — there is no retry and no user-visible error.

use std::path::Path;

use bytes::Bytes;
use tracing::warn;

use parley_shared::constants::MAX_FILE_SIZE;

/// Read the full contents of `path` as a binary payload.
///
/// Returns `None` (after logging) if the file cannot be read or exceeds
/// [`MAX_FILE_SIZE`].
pub async fn read_file(path: &Path) -> Option<Bytes> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "File read failed, send abandoned");
            return None;
        }
    };

    if data.len() > MAX_FILE_SIZE {
        warn!(
            path = %path.display(),
            size = data.len(),
            max = MAX_FILE_SIZE,
            "File too large, send abandoned"
        );
        return None;
    }

    Some(Bytes::from(data))
}

/// Best-effort MIME type for an outgoing file, from its extension.
pub fn sniff_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// File name component of `path`, for the send frame.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_read_file_full_contents() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"payload bytes").unwrap();

        let data = read_file(tmp.path()).await.unwrap();
        assert_eq!(&data[..], b"payload bytes");
    }

    #[tokio::test]
    async fn test_read_oversized_file_is_none() {
        // Sparse file one byte past the cap; no need to write real data.
        let tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.as_file().set_len(MAX_FILE_SIZE as u64 + 1).unwrap();

        assert!(read_file(tmp.path()).await.is_none());
    }

    #[tokio::test]
    async fn test_read_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.bin");
        assert!(read_file(&path).await.is_none());
    }

    #[test]
    fn test_sniff_mime() {
        assert_eq!(sniff_mime(Path::new("photo.png")), "image/png");
        assert_eq!(sniff_mime(Path::new("mystery.zzz")), "application/octet-stream");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/tmp/dir/notes.txt")), "notes.txt");
    }
}
