//! Ledger file I/O
//!
//! Each ledger file is rewritten whole on every save: the new contents go to
//! a temp file that is renamed over the old one, and the previous version is
//! kept beside it as `<name>.bak`. If a ledger file will not parse, the
//! backup is used instead so one bad save does not take a month of shift
//! books with it.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::LedgerError;

/// Path of the previous version of a ledger file
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let file = File::open(path).map_err(|e| format!("cannot open: {}", e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| e.to_string())
}

/// Read a ledger file; a missing file reads as empty
///
/// Falls back to the `.bak` copy when the file exists but is unreadable.
pub fn read_json<T, P>(path: P) -> Result<T, LedgerError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let error = match parse_file(path) {
        Ok(data) => return Ok(data),
        Err(e) => e,
    };

    let backup = backup_path(path);
    if backup.exists() {
        if let Ok(data) = parse_file(&backup) {
            tracing::warn!(
                file = %path.display(),
                error = %error,
                "ledger file unreadable; loaded previous version from backup"
            );
            return Ok(data);
        }
    }

    Err(LedgerError::Storage(format!(
        "Failed to read {}: {}",
        path.display(),
        error
    )))
}

/// Write a ledger file atomically, keeping the previous version as `.bak`
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), LedgerError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let storage_error =
        |what: &str, e: std::io::Error| LedgerError::Storage(format!("{} {}: {}", what, path.display(), e));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error("Failed to create directory for", e))?;
    }

    // Same directory, so the rename below cannot cross filesystems
    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path).map_err(|e| storage_error("Failed to create temp file for", e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| LedgerError::Storage(format!("Failed to serialize {}: {}", path.display(), e)))?;
    writer
        .flush()
        .and_then(|_| writer.get_ref().sync_all())
        .map_err(|e| storage_error("Failed to write", e))?;

    // Only a readable file is worth keeping as the fallback
    if path.exists() && parse_file::<serde_json::Value>(path).is_ok() {
        fs::copy(path, backup_path(path)).map_err(|e| storage_error("Failed to back up", e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        storage_error("Failed to replace", e)
    })?;

    Ok(())
}
