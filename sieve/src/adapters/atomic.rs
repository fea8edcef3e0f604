//! Atomic file replacement for storage entries.
//!
//! A reader never sees a half-written entry: content goes to a temp file in
//! the same directory first and is renamed over the target.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Temp path next to `final_path`.
/// Format: {dir}/.tmp.{random}.{filename}
pub(crate) fn temp_path(final_path: &Path) -> PathBuf {
    let filename = final_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("entry");
    let random: u64 = rand::random();
    final_path.with_file_name(format!(".tmp.{:016x}.{}", random, filename))
}

/// Write `content` to `final_path`, replacing any previous entry.
pub(crate) fn replace_file(final_path: &Path, content: &[u8]) -> io::Result<()> {
    let temp = temp_path(final_path);
    fs::write(&temp, content)?;
    if let Err(e) = fs::rename(&temp, final_path) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }
    Ok(())
}
