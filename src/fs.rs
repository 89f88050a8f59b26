//! File input and atomic file output.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::RasterError;

/// Temporary-name attempts before giving up.
const TEMP_ATTEMPTS: u32 = 64;

/// Read up to `max` leading bytes of a file.
pub(crate) fn read_prefix(path: &Path, max: usize) -> Result<Vec<u8>, RasterError> {
    let mut header = Vec::with_capacity(max);
    File::open(path)?
        .take(max as u64)
        .read_to_end(&mut header)?;
    Ok(header)
}

pub(crate) fn read_all(path: &Path) -> Result<Vec<u8>, RasterError> {
    Ok(fs::read(path)?)
}

/// Write `bytes` to `path` via a sibling temporary file and a rename.
///
/// On failure the temporary file is removed and `path` is left as it was.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RasterError> {
    let (temp_path, file) = create_temp_sibling(path)?;
    if let Err(e) = write_and_rename(file, &temp_path, path, bytes) {
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                log::warn!(
                    "failed to remove temporary file {}: {cleanup}",
                    temp_path.display()
                );
            }
        }
        return Err(e.into());
    }
    log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn write_and_rename(mut file: File, temp_path: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, path)
}

fn create_temp_sibling(path: &Path) -> Result<(PathBuf, File), RasterError> {
    let name = path
        .file_name()
        .ok_or_else(|| {
            RasterError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            ))
        })?
        .to_string_lossy();
    let pid = std::process::id();
    for attempt in 0..TEMP_ATTEMPTS {
        let temp_path = path.with_file_name(format!(".{name}.{pid}.{attempt}.tmp"));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(file) => return Ok((temp_path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(RasterError::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free temporary name next to {}", path.display()),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_replaces_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.bin");
        fs::write(&target, b"old").unwrap();

        write_atomic(&target, b"new contents").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new contents");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nope").join("out.bin");
        assert!(matches!(
            write_atomic(&target, b"x"),
            Err(RasterError::Io(_))
        ));
        assert!(!target.exists());
    }

    #[test]
    fn prefix_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("data");
        fs::write(&target, [7u8; 100]).unwrap();
        assert_eq!(read_prefix(&target, 54).unwrap().len(), 54);
        fs::write(&target, [7u8; 3]).unwrap();
        assert_eq!(read_prefix(&target, 54).unwrap().len(), 3);
    }
}
