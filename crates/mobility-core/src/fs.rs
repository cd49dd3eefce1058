//! Filesystem utilities for atomic operations.

use std::fs;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{MobilityError, Result};

/// Atomically rename a file, with fallback for platforms where rename fails if target exists.
///
/// On some platforms (notably Windows), `fs::rename` fails if the destination already exists.
/// This function handles that case by removing the destination first and retrying.
///
/// If the rename ultimately fails, the temp file is cleaned up.
pub fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

/// Write `data` to `path` through a synced temp file in the same directory.
///
/// Readers observe either the previous contents or the complete new contents.
/// The file is created with owner-only permissions on Unix.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| MobilityError::Storage("Invalid artifact path".to_string()))?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| MobilityError::Storage(format!("System time error: {}", e)))?
        .as_nanos();
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| MobilityError::Storage("Invalid artifact filename".to_string()))?;
    let temp_path = parent.join(format!(".{}.{}.tmp", filename, nanos));

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(|e| MobilityError::Storage(format!("Temp file create failed: {}", e)))?;
    let filled = fill_temp(&mut file, &temp_path, data);
    drop(file);
    discard_on_error(&temp_path, filled)?;

    rename_with_fallback(&temp_path, path)
        .map_err(|e| MobilityError::Storage(format!("Atomic rename failed: {}", e)))?;

    Ok(())
}

fn fill_temp(file: &mut File, temp_path: &Path, data: &[u8]) -> Result<()> {
    restrict_permissions(temp_path)?;
    file.write_all(data)
        .map_err(|e| MobilityError::Storage(format!("Temp file write failed: {}", e)))?;
    file.sync_all()
        .map_err(|e| MobilityError::Storage(format!("Temp file sync failed: {}", e)))?;
    Ok(())
}

/// Remove the temp file when `result` is an error, then pass `result` on.
fn discard_on_error<T>(temp_path: &Path, result: Result<T>) -> Result<T> {
    if result.is_err() {
        let _ = fs::remove_file(temp_path);
    }
    result
}

/// Restrict a file to owner read/write (no-op off Unix).
pub fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rename_overwrites_existing() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join("temp.txt");
        let dest = dir.path().join("dest.txt");

        File::create(&dest).unwrap().write_all(b"old").unwrap();
        File::create(&temp).unwrap().write_all(b"new").unwrap();

        rename_with_fallback(&temp, &dest).unwrap();

        assert!(!temp.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("artifact.age");

        write_atomic(&dest, b"first").unwrap();
        write_atomic(&dest, b"second").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"second");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_failed_fill_removes_temp_file() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join(".artifact.age.1.tmp");
        File::create(&temp).unwrap().write_all(b"partial").unwrap();

        let result: Result<()> = discard_on_error(
            &temp,
            Err(MobilityError::Storage("Temp file write failed".to_string())),
        );

        assert!(matches!(result, Err(MobilityError::Storage(_))));
        assert!(!temp.exists());
    }

    #[test]
    fn test_successful_fill_keeps_temp_file() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join(".artifact.age.1.tmp");
        File::create(&temp).unwrap();

        discard_on_error(&temp, Ok(())).unwrap();
        assert!(temp.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("artifact.age");
        write_atomic(&dest, b"secret").unwrap();

        let mode = fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
