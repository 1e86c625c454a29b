// src/services/uploads.rs
//! Materialization of uploaded spreadsheet files into the managed uploads
//! directory, plus best-effort cleanup helpers used by the import pipeline.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// An uploaded file as handed over by the upload boundary.
///
/// At least one of `path`/`buffer` must be populated. `path` points at the
/// transport layer's spool file when the upload was staged on disk; `buffer`
/// carries the bytes when the upload only ever lived in memory.
#[derive(Debug, Clone)]
pub struct UploadArtifact {
    pub path: Option<PathBuf>,
    pub buffer: Option<Vec<u8>>,
    pub original_name: String,
    pub size_bytes: u64,
}

const SPREADSHEET_EXTENSION: &str = "xlsx";

/// Length of the random segment appended to materialized file names
const UNIQUE_SEGMENT_LEN: usize = 12;

/// Move an uploaded file's bytes into the uploads directory under a
/// collision-free name and return the final path.
///
/// The sanitized display name is a cosmetic label only; uniqueness comes
/// from a random uuid segment, so two uploads with the same display name
/// never contend for the same path. A path-backed upload is copied and its
/// source deleted (copy-then-delete tolerates cross-device moves); a
/// buffer-backed upload is written directly.
pub async fn materialize(uploads_dir: &Path, upload: &UploadArtifact) -> io::Result<PathBuf> {
    fs::create_dir_all(uploads_dir).await?;

    let label = sanitize_display_name(&upload.original_name);
    let unique = Uuid::new_v4().simple().to_string();
    let filename = format!(
        "{}_{}.{}",
        label,
        &unique[..UNIQUE_SEGMENT_LEN],
        SPREADSHEET_EXTENSION
    );
    let final_path = uploads_dir.join(filename);

    // Last writer wins if the computed path is somehow already taken
    if fs::metadata(&final_path).await.is_ok() {
        fs::remove_file(&final_path).await?;
    }

    if let Some(source) = upload.path.as_deref() {
        if fs::metadata(source).await.is_ok() {
            fs::copy(source, &final_path).await?;
            // The bytes are safely at final_path; a source that refuses to
            // die must not fail the import or leak the copy
            remove_quietly(source).await;
            debug!(
                path = %final_path.display(),
                size = upload.size_bytes,
                "Materialized uploaded spreadsheet"
            );
            return Ok(final_path);
        }
    }

    // Source file missing or never staged on disk: fall back to the buffer
    let buffer = upload.buffer.as_deref().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "upload has neither a source file nor an in-memory buffer",
        )
    })?;
    fs::write(&final_path, buffer).await?;

    debug!(
        path = %final_path.display(),
        size = upload.size_bytes,
        "Materialized uploaded spreadsheet"
    );

    Ok(final_path)
}

/// Strip everything except ASCII alphanumerics and CJK ideographs from the
/// uploaded file's display name. Falls back to "exam" when nothing survives.
pub fn sanitize_display_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || ('\u{4e00}'..='\u{9fff}').contains(c))
        .collect();

    if cleaned.is_empty() {
        "exam".to_string()
    } else {
        cleaned
    }
}

/// Remove the upload's source file if one still exists.
///
/// Cleanup never escalates over the primary import result: a missing file is
/// fine, anything else is logged and swallowed.
pub async fn discard_source(upload: &UploadArtifact) {
    if let Some(source) = &upload.path {
        remove_quietly(source).await;
    }
}

/// Remove the materialized spreadsheet file, ignoring a file that is
/// already gone.
pub async fn discard_materialized(path: &Path) {
    remove_quietly(path).await;
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(error = %e, path = %path.display(), "Failed to remove temp file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_alphanumerics_and_cjk() {
        assert_eq!(sanitize_display_name("Math Exam 2024.xlsx"), "MathExam2024");
        assert_eq!(sanitize_display_name("期末考试题库.xlsx"), "期末考试题库");
        assert_eq!(sanitize_display_name("a b/c\\d:e*f?.xlsx"), "abcdef");
    }

    #[test]
    fn sanitize_falls_back_when_nothing_survives() {
        assert_eq!(sanitize_display_name("!!!.xlsx"), "exam");
        assert_eq!(sanitize_display_name(""), "exam");
    }

    #[tokio::test]
    async fn materialize_writes_buffer_backed_upload() {
        let dir = tempfile::tempdir().unwrap();
        let upload = UploadArtifact {
            path: None,
            buffer: Some(b"workbook bytes".to_vec()),
            original_name: "quiz.xlsx".to_string(),
            size_bytes: 14,
        };

        let path = materialize(dir.path(), &upload).await.unwrap();

        assert!(path.starts_with(dir.path()));
        assert_eq!(path.extension().unwrap(), "xlsx");
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"workbook bytes");
    }

    #[tokio::test]
    async fn materialize_moves_path_backed_upload_and_removes_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("spooled.tmp");
        tokio::fs::write(&source, b"spooled bytes").await.unwrap();

        let upload = UploadArtifact {
            path: Some(source.clone()),
            buffer: None,
            original_name: "quiz.xlsx".to_string(),
            size_bytes: 13,
        };

        let dest_dir = dir.path().join("uploads");
        let path = materialize(&dest_dir, &upload).await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"spooled bytes");
        assert!(tokio::fs::metadata(&source).await.is_err(), "source must be deleted");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn materialize_survives_an_undeletable_source() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let source_dir = dir.path().join("spool");
        std::fs::create_dir(&source_dir).unwrap();
        let source = source_dir.join("locked.tmp");
        std::fs::write(&source, b"spooled bytes").unwrap();

        // A read-only parent directory makes the source undeletable
        std::fs::set_permissions(&source_dir, std::fs::Permissions::from_mode(0o555)).unwrap();

        let upload = UploadArtifact {
            path: Some(source.clone()),
            buffer: None,
            original_name: "quiz.xlsx".to_string(),
            size_bytes: 13,
        };

        let dest_dir = dir.path().join("uploads");
        let result = materialize(&dest_dir, &upload).await;

        std::fs::set_permissions(&source_dir, std::fs::Permissions::from_mode(0o755)).unwrap();

        let path = result.expect("copy succeeded, so the failed source removal must not error");
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"spooled bytes");
    }

    #[tokio::test]
    async fn materialize_same_display_name_yields_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let upload = UploadArtifact {
            path: None,
            buffer: Some(vec![1, 2, 3]),
            original_name: "same-name.xlsx".to_string(),
            size_bytes: 3,
        };

        let first = materialize(dir.path(), &upload).await.unwrap();
        let second = materialize(dir.path(), &upload).await.unwrap();

        assert_ne!(first, second);
        assert!(tokio::fs::metadata(&first).await.is_ok());
        assert!(tokio::fs::metadata(&second).await.is_ok());
    }

    #[tokio::test]
    async fn discard_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.xlsx");
        tokio::fs::write(&path, b"x").await.unwrap();

        discard_materialized(&path).await;
        // Second call finds nothing to delete and must not panic
        discard_materialized(&path).await;

        let upload = UploadArtifact {
            path: Some(path),
            buffer: None,
            original_name: "gone.xlsx".to_string(),
            size_bytes: 1,
        };
        discard_source(&upload).await;
    }
}
