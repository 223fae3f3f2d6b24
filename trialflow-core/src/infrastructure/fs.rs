use crate::infrastructure::error::InfrastructureError;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write content to a file atomically.
///
/// The content goes to a temporary file in the target's directory which is
/// then renamed over the target, so readers see either the old file or the
/// complete new one. Missing parent directories are created.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Pretty-prints `data` as JSON into `path` (atomically).
pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(
    path: P,
    data: &T,
) -> Result<(), InfrastructureError> {
    let content = serde_json::to_string_pretty(data)?;
    atomic_write(path, content)
}
