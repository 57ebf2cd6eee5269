//! Storage initialization
//!
//! First-run setup: directories, settings file and empty ledger files.

use crate::config::paths::LedgerPaths;
use crate::config::settings::Settings;
use crate::error::LedgerError;

use super::Storage;

/// Initialize storage for a fresh station
///
/// Existing settings and ledger files are left untouched.
pub fn initialize_storage(paths: &LedgerPaths) -> Result<Settings, LedgerError> {
    paths.ensure_directories()?;

    let mut settings = Settings::load_or_create(paths)?;
    settings.setup_completed = true;
    settings.save(paths)?;

    let ledger_files = [
        paths.shifts_file(),
        paths.procurement_file(),
        paths.credit_file(),
        paths.payments_file(),
    ];
    if ledger_files.iter().any(|f| !f.exists()) {
        // Load first so files that already exist are written back unchanged
        let mut storage = Storage::new(paths.clone())?;
        storage.load_all()?;
        storage.save_all()?;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Shift, ShiftRecord};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_storage() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(!paths.is_initialized());
        let settings = initialize_storage(&paths).unwrap();

        assert!(settings.setup_completed);
        assert!(paths.is_initialized());
        assert!(paths.shifts_file().exists());
        assert!(paths.payments_file().exists());
    }

    #[test]
    fn test_doesnt_overwrite_existing() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();

        let mut storage = Storage::new(paths.clone()).unwrap();
        storage.load_all().unwrap();
        storage
            .shifts
            .upsert(ShiftRecord::new(
                NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
                Shift::Day,
                "Ravi",
            ))
            .unwrap();
        storage.shifts.save().unwrap();

        initialize_storage(&paths).unwrap();

        let mut reloaded = Storage::new(paths).unwrap();
        reloaded.load_all().unwrap();
        assert_eq!(reloaded.shifts.count().unwrap(), 1);
    }
}
