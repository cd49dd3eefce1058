//! Encrypted backup artifacts on disk.
//!
//! An artifact is the serialized SQLite image of the whole store, encrypted
//! as one age payload with the field key.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::crypto::FieldCipher;
use crate::error::{MobilityError, Result};

/// First bytes of every SQLite database file.
pub const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

pub fn backup_file_name(created_at: DateTime<Utc>) -> String {
    format!(
        "backup_{}_{}.age",
        created_at.format("%Y%m%dT%H%M%SZ"),
        Uuid::new_v4().simple()
    )
}

pub fn snapshot_file_name(taken_at: DateTime<Utc>) -> String {
    format!("pre-restore-{}.age", taken_at.format("%Y%m%dT%H%M%S%.9fZ"))
}

/// Resolve `file_name` inside `dir`, refusing anything that could escape it.
pub fn artifact_path(dir: &Path, file_name: &str) -> Result<PathBuf> {
    if file_name.is_empty()
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.starts_with('.')
    {
        return Err(MobilityError::RestoreFailed(format!(
            "Invalid backup file name: {}",
            file_name
        )));
    }
    Ok(dir.join(file_name))
}

/// Encrypt `image` and write it atomically to `path`.
pub fn write(cipher: &FieldCipher, path: &Path, image: &[u8]) -> Result<()> {
    let encrypted = cipher.encrypt_bytes(image)?;
    crate::fs::write_atomic(path, &encrypted).map_err(|e| {
        MobilityError::RestoreFailed(format!("Writing {} failed: {}", path.display(), e))
    })
}

/// Read and decrypt the artifact at `path`, checking it is a SQLite image.
pub fn read(cipher: &FieldCipher, path: &Path) -> Result<Vec<u8>> {
    let encrypted = fs::read(path).map_err(|e| {
        MobilityError::RestoreFailed(format!("Reading {} failed: {}", path.display(), e))
    })?;
    let image = cipher.decrypt_bytes(&encrypted).map_err(|e| {
        MobilityError::RestoreFailed(format!("Decrypting {} failed: {}", path.display(), e))
    })?;
    if !image.starts_with(SQLITE_HEADER) {
        return Err(MobilityError::RestoreFailed(format!(
            "{} does not contain a SQLite database",
            path.display()
        )));
    }
    Ok(image)
}

/// Write `image` to an owner-only temporary file in `dir`.
///
/// The file is removed when the returned handle drops.
pub fn stage(dir: &Path, image: &[u8]) -> Result<tempfile::NamedTempFile> {
    let mut staged = tempfile::Builder::new()
        .prefix(".restore-")
        .suffix(".db")
        .tempfile_in(dir)
        .map_err(|e| MobilityError::RestoreFailed(format!("Staging restore failed: {}", e)))?;
    staged
        .write_all(image)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|e| MobilityError::RestoreFailed(format!("Staging restore failed: {}", e)))?;
    Ok(staged)
}

/// Delete an artifact. Failures are logged and reported, never raised.
pub fn remove(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to remove backup artifact");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::FieldKey;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let cipher = FieldCipher::new(FieldKey::generate());
        let path = dir.path().join("backup.age");
        let mut image = SQLITE_HEADER.to_vec();
        image.extend_from_slice(b"rest of the pages");

        write(&cipher, &path, &image).unwrap();
        let on_disk = fs::read(&path).unwrap();
        assert!(!on_disk.starts_with(SQLITE_HEADER));
        assert_eq!(read(&cipher, &path).unwrap(), image);
    }

    #[test]
    fn test_read_rejects_non_sqlite_payload() {
        let dir = tempfile::tempdir().unwrap();
        let cipher = FieldCipher::new(FieldKey::generate());
        let path = dir.path().join("backup.age");
        write(&cipher, &path, b"not a database").unwrap();

        assert!(matches!(read(&cipher, &path), Err(MobilityError::RestoreFailed(_))));
    }

    #[test]
    fn test_read_under_foreign_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.age");
        write(&FieldCipher::new(FieldKey::generate()), &path, SQLITE_HEADER).unwrap();

        let other = FieldCipher::new(FieldKey::generate());
        assert!(matches!(read(&other, &path), Err(MobilityError::RestoreFailed(_))));
    }

    #[test]
    fn test_artifact_path_stays_inside_dir() {
        let dir = Path::new("/var/backups");
        assert!(artifact_path(dir, "backup_1.age").is_ok());
        assert!(artifact_path(dir, "../mobility.db").is_err());
        assert!(artifact_path(dir, "a/b.age").is_err());
        assert!(artifact_path(dir, "").is_err());
    }

    #[test]
    fn test_file_names_are_unique() {
        let now = Utc::now();
        assert_ne!(backup_file_name(now), backup_file_name(now));
        assert!(snapshot_file_name(now).starts_with("pre-restore-"));
    }

    #[test]
    fn test_remove_missing_artifact_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove(&dir.path().join("gone.age")));
    }
}
