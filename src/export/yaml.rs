//! YAML Export functionality
//!
//! Same content as the JSON export, written for people to read.

use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::export::json::FullExport;
use crate::storage::Storage;

/// Export the full database to YAML format
pub fn export_full_yaml<W: Write>(
    storage: &Storage,
    station_name: &str,
    writer: &mut W,
) -> LedgerResult<()> {
    let export = FullExport::from_storage(storage, station_name)?;

    let header = format!(
        "# PumpLedger export for {}\n# Generated: {}\n# App Version: {}\n\n",
        export.station_name, export.exported_at, export.app_version
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| LedgerError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| LedgerError::Export(e.to_string()))?;

    Ok(())
}

/// Read back a YAML export
pub fn import_from_yaml(yaml_str: &str) -> LedgerResult<FullExport> {
    let export: FullExport =
        serde_yaml::from_str(yaml_str).map_err(|e| LedgerError::Import(e.to_string()))?;

    export.validate().map_err(LedgerError::Import)?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{CustomerCreditEntry, FuelType, Shift, ShiftRecord};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_yaml_export() {
        let (_temp_dir, storage) = create_test_storage();
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();

        storage
            .shifts
            .upsert(ShiftRecord::new(date, Shift::Day, "Ravi"))
            .unwrap();
        storage
            .credit
            .upsert(CustomerCreditEntry::sale(
                "Sharma Transport",
                date,
                FuelType::Hsd,
                100.0,
                90.0,
            ))
            .unwrap();

        let mut yaml_output = Vec::new();
        export_full_yaml(&storage, "Highway Fuels", &mut yaml_output).unwrap();
        let yaml_string = String::from_utf8(yaml_output).unwrap();

        assert!(yaml_string.starts_with("# PumpLedger export for Highway Fuels"));
        assert!(yaml_string.contains("Ravi"));
        assert!(yaml_string.contains("Sharma Transport"));

        // Comment lines are valid YAML
        let imported = import_from_yaml(&yaml_string).unwrap();
        assert_eq!(imported.shifts.len(), 1);
        assert_eq!(imported.credit[0].customer_name, "Sharma Transport");
    }
}
