use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically replace `path` with `data` using a tempfile in the same directory.
/// An existing file keeps its permissions.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// True when a regular file exists at exactly `path`.
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Write `text` only if no regular file exists at `path`. Returns true if written.
///
/// The parent directory must already exist. There is no lock between the
/// existence check and the write.
pub fn write_if_missing(path: &Path, text: &str) -> Result<bool> {
    if file_exists(path) {
        return Ok(false);
    }
    std::fs::write(path, text)?;
    Ok(true)
}
