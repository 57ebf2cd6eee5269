//! Append-only JSONL audit log writer and reader

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};

use super::entry::{AuditEntry, EntityType};

/// Narrows the log to one kind of record, one record or one business day
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    /// Short id (`shf-1a2b3c4d`), bare hex prefix or full UUID
    pub entity_id: Option<String>,
    pub business_date: Option<NaiveDate>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if self.entity_type.is_some_and(|t| t != entry.entity_type) {
            return false;
        }
        if let Some(id) = &self.entity_id {
            if !same_record(&entry.entity_id, id) {
                return false;
            }
        }
        if let Some(date) = self.business_date {
            if !entry.touches_date(date) {
                return false;
            }
        }
        true
    }
}

/// Hex part of an id, without a `shf-`/`inv-` style prefix
fn id_hex(id: &str) -> String {
    let id = id.trim().to_ascii_lowercase();
    match id.split_once('-') {
        Some((prefix, rest)) if prefix.len() == 3 && prefix.bytes().all(|b| b.is_ascii_alphabetic()) => {
            rest.to_string()
        }
        _ => id,
    }
}

fn same_record(logged: &str, wanted: &str) -> bool {
    let logged = id_hex(logged);
    let wanted = id_hex(wanted);
    !wanted.is_empty() && (wanted.starts_with(&logged) || logged.starts_with(&wanted))
}

/// Writes audit entries to the audit log file, one JSON object per line
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append one entry and flush
    pub fn log(&self, entry: &AuditEntry) -> LedgerResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    /// Append several entries with a single flush (used by bulk import)
    pub fn log_batch(&self, entries: &[AuditEntry]) -> LedgerResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut lines = String::new();
        for entry in entries {
            let json = serde_json::to_string(entry)
                .map_err(|e| LedgerError::Json(format!("Failed to serialize audit entry: {}", e)))?;
            lines.push_str(&json);
            lines.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| LedgerError::Io(format!("Failed to open audit log: {}", e)))?;

        // One write per batch so an import never leaves half its entries behind
        file.write_all(lines.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| LedgerError::Io(format!("Failed to write audit log: {}", e)))?;

        tracing::debug!(count = entries.len(), "audit entries appended");
        Ok(())
    }

    /// Read all entries, oldest first
    ///
    /// Lines that do not parse (a write cut short by a crash) are skipped
    /// with a warning.
    pub fn read_all(&self) -> LedgerResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| LedgerError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                LedgerError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<AuditEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(
                    line = line_num + 1,
                    error = %e,
                    "skipping unreadable audit log line"
                ),
            }
        }

        Ok(entries)
    }

    /// The most recent `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> LedgerResult<Vec<AuditEntry>> {
        self.read_filtered(&AuditFilter::default(), count)
    }

    /// The most recent `count` entries matching `filter`, oldest first
    pub fn read_filtered(&self, filter: &AuditFilter, count: usize) -> LedgerResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        entries.retain(|e| filter.matches(e));
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}
