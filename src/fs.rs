//! Filesystem utilities.
//!
//! Safe primitives for writing metadata documents in a crash-tolerant way.
//!
//! Why this exists:
//! - `metadata.json` is the only record of an asset's version history.
//! - A partial write (power loss, crash) must not leave that history unreadable.
//! - Windows semantics differ from Unix for rename-over-existing; we handle both.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::{HubError, HubResult};

/// Write bytes to `path` using an atomic replace pattern.
///
/// Implementation notes:
/// - Write to a sibling temporary file.
/// - Flush and sync the temp file.
/// - Swap into place by renaming.
/// - On Windows an existing destination is first moved aside as a `.bak`
///   file, then removed; elsewhere the rename replaces it directly.
///
/// A reader either sees the previous complete file or the new complete file,
/// never a truncated one.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> HubResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = tmp_path_for(path);
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes)?;
        writer.flush()?;
        // Best-effort fsync. If it fails, we still surface the error.
        writer.get_ref().sync_all()?;
    }

    atomic_replace(path, &tmp_path)?;
    Ok(())
}

/// Write a JSON file atomically with pretty formatting.
pub fn atomic_write_json_pretty<T: serde::Serialize>(path: &Path, value: &T) -> HubResult<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    atomic_write_bytes(path, &bytes)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "tmp".to_string());
    tmp.set_file_name(format!("{file_name}.tmp"));
    tmp
}

fn bak_path_for(path: &Path) -> PathBuf {
    let mut bak = path.to_path_buf();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "bak".to_string());
    bak.set_file_name(format!("{file_name}.bak"));
    bak
}

fn atomic_replace(dest: &Path, src_tmp: &Path) -> HubResult<()> {
    // Fast path: dest does not exist.
    if !dest.exists() {
        std::fs::rename(src_tmp, dest)?;
        return Ok(());
    }

    if cfg!(windows) {
        // Rename-over-existing may fail here depending on filesystem; swap
        // through a backup and restore it if the final rename fails.
        let bak = bak_path_for(dest);

        // Best-effort cleanup of stale backup.
        if bak.exists() {
            let _ = std::fs::remove_file(&bak);
        }

        std::fs::rename(dest, &bak)?;
        match std::fs::rename(src_tmp, dest) {
            Ok(()) => {
                let _ = std::fs::remove_file(&bak);
                Ok(())
            }
            Err(e) => {
                // Try to restore the old file.
                let _ = std::fs::rename(&bak, dest);
                let _ = std::fs::remove_file(src_tmp);
                Err(HubError::Io(e))
            }
        }
    } else {
        // Unix rename replaces an existing destination atomically; the
        // document is never absent mid-replace.
        std::fs::rename(src_tmp, dest)?;

        // A backup left by an interrupted swap is stale once the
        // destination is replaced.
        let bak = bak_path_for(dest);
        if bak.exists() {
            let _ = std::fs::remove_file(&bak);
        }
        Ok(())
    }
}
