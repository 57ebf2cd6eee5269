//! CSV bulk import of procurement invoices
//!
//! Expected header:
//! `invoice_number,invoice_date,fuel_type,quantity,rate,vehicle_number,supplier`
//!
//! Columns are located by header name, so extra columns and a different order
//! are fine. Each row is parsed on its own; a bad row is reported and the rest
//! of the file still imports. Lines already on file (same invoice number and
//! fuel type) are skipped, as are repeats within the file.

use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Write};

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::audit::AuditEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{FuelType, ProcurementRecord, RawProcurementRecord};
use crate::storage::Storage;

/// Header written by the template and expected by the importer
pub const IMPORT_HEADER: [&str; 7] = [
    "invoice_number",
    "invoice_date",
    "fuel_type",
    "quantity",
    "rate",
    "vehicle_number",
    "supplier",
];

const REQUIRED_COLUMNS: [&str; 5] = ["invoice_number", "invoice_date", "fuel_type", "quantity", "rate"];

/// Status of a parsed row in the import preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
    New,
    /// Already on file, or repeated earlier in the same file
    Duplicate,
    Error(String),
}

/// One CSV row after parsing
#[derive(Debug, Clone)]
pub struct ImportPreviewEntry {
    /// 1-based data row number (header excluded)
    pub row_number: usize,
    pub record: Option<ProcurementRecord>,
    pub status: ImportStatus,
}

/// Outcome of an import
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub duplicates_skipped: usize,
    pub errors: usize,
    pub imported_ids: Vec<String>,
    /// Error message by row number
    pub error_messages: BTreeMap<usize, String>,
}

/// Service for procurement CSV import
pub struct ImportService<'a> {
    storage: &'a Storage,
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Parse CSV rows into invoice lines, one result per data row
    pub fn parse_csv_from_reader<R: Read>(
        &self,
        reader: &mut Reader<R>,
    ) -> LedgerResult<Vec<Result<ProcurementRecord, String>>> {
        let headers = reader.headers()?.clone();
        let columns = ColumnIndex::from_headers(&headers)?;

        let mut results = Vec::new();
        for record in reader.records() {
            let parsed = match record {
                Ok(record) => columns.parse_row(&record),
                Err(e) => Err(format!("Error reading CSV record: {}", e)),
            };
            results.push(parsed);
        }
        Ok(results)
    }

    /// Mark each parsed row as new, duplicate or error
    pub fn generate_preview(
        &self,
        parsed: Vec<Result<ProcurementRecord, String>>,
    ) -> LedgerResult<Vec<ImportPreviewEntry>> {
        let mut existing: HashSet<(String, FuelType)> = self
            .storage
            .procurement
            .get_all()?
            .iter()
            .map(ProcurementRecord::duplicate_key)
            .collect();

        let mut preview = Vec::with_capacity(parsed.len());
        for (idx, row) in parsed.into_iter().enumerate() {
            let row_number = idx + 1;
            let entry = match row {
                Ok(record) => {
                    // insert returns false when the key was already seen
                    let status = if existing.insert(record.duplicate_key()) {
                        ImportStatus::New
                    } else {
                        ImportStatus::Duplicate
                    };
                    ImportPreviewEntry {
                        row_number,
                        record: Some(record),
                        status,
                    }
                }
                Err(message) => ImportPreviewEntry {
                    row_number,
                    record: None,
                    status: ImportStatus::Error(message),
                },
            };
            preview.push(entry);
        }
        Ok(preview)
    }

    /// Write the new rows of a preview to storage
    pub fn import_from_preview(&self, preview: &[ImportPreviewEntry]) -> LedgerResult<ImportResult> {
        let mut result = ImportResult::default();
        let mut audit_entries = Vec::new();

        for entry in preview {
            match (&entry.status, &entry.record) {
                (ImportStatus::New, Some(record)) => {
                    self.storage.procurement.upsert(record.clone())?;
                    audit_entries.push(AuditEntry::create(record));
                    result.imported_ids.push(record.id.to_string());
                    result.imported += 1;
                }
                (ImportStatus::Duplicate, _) => result.duplicates_skipped += 1,
                (ImportStatus::Error(message), _) => {
                    result.errors += 1;
                    result.error_messages.insert(entry.row_number, message.clone());
                }
                (ImportStatus::New, None) => {}
            }
        }

        if result.imported > 0 {
            self.storage.procurement.save()?;
            self.storage.audit().log_batch(&audit_entries)?;
        }

        tracing::info!(
            imported = result.imported,
            duplicates = result.duplicates_skipped,
            errors = result.errors,
            "procurement import finished"
        );
        Ok(result)
    }

    /// Parse, preview and import from any reader
    pub fn import_reader<R: Read>(&self, input: R) -> LedgerResult<ImportResult> {
        let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
        let parsed = self.parse_csv_from_reader(&mut reader)?;
        let preview = self.generate_preview(parsed)?;
        self.import_from_preview(&preview)
    }
}

/// Write the import header and one example row
pub fn write_template<W: Write>(writer: W) -> LedgerResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(IMPORT_HEADER)
        .map_err(|e| LedgerError::Export(e.to_string()))?;
    csv_writer
        .write_record([
            "INV-2025-0001",
            "2025-08-01",
            "HSD",
            "12000",
            "88.50",
            "MH12AB1234",
            "HPCL",
        ])
        .map_err(|e| LedgerError::Export(e.to_string()))?;
    csv_writer
        .flush()
        .map_err(|e| LedgerError::Export(e.to_string()))?;
    Ok(())
}

/// Position of each known column in the header row
struct ColumnIndex {
    positions: BTreeMap<&'static str, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> LedgerResult<Self> {
        let mut positions = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            let normalized = header.trim().to_ascii_lowercase().replace(' ', "_");
            if let Some(name) = IMPORT_HEADER.iter().find(|h| **h == normalized) {
                positions.entry(*name).or_insert(idx);
            }
        }

        let missing: Vec<_> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !positions.contains_key(*c))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(LedgerError::Import(format!(
                "Missing required column(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self { positions })
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.positions
            .get(column)
            .and_then(|idx| record.get(*idx))
            .map(str::trim)
            .unwrap_or("")
    }

    fn number(&self, record: &StringRecord, column: &str) -> Result<f64, String> {
        let value = self.get(record, column);
        let cleaned: String = value.chars().filter(|c| *c != ',').collect();
        cleaned
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| format!("Invalid {} '{}'", column, value))
    }

    fn parse_row(&self, record: &StringRecord) -> Result<ProcurementRecord, String> {
        let raw = RawProcurementRecord {
            invoice_number: self.get(record, "invoice_number").to_string(),
            invoice_date: self.get(record, "invoice_date").to_string(),
            fuel_type: self.get(record, "fuel_type").to_string(),
            quantity: self.number(record, "quantity")?,
            rate: self.number(record, "rate")?,
            total_amount: 0.0,
            vehicle_number: self.get(record, "vehicle_number").to_string(),
            supplier: self.get(record, "supplier").to_string(),
        };

        let parsed = raw.into_record().map_err(|e| e.to_string())?;
        parsed.validate().map_err(|e| e.to_string())?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::Money;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    const SAMPLE: &str = "\
invoice_number,invoice_date,fuel_type,quantity,rate,vehicle_number,supplier
INV-1,2025-08-01,HSD,\"12,000\",88.50,MH12AB1234,HPCL
INV-1,2025-08-01,MS,9000,101.2,MH12AB1234,
INV-2,08/01/2025,HSD,1000,88.5,,
INV-3,2025-08-02,LPG,1000,70,,
INV-4,2025-08-02,POWER,abc,110,,
INV-1,2025-08-01,hsd,12000,88.50,,
";

    #[test]
    fn test_import_reports_rows() {
        let (_temp, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        let result = service.import_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(result.imported, 2);
        assert_eq!(result.duplicates_skipped, 1);
        assert_eq!(result.errors, 3);
        assert!(result.error_messages.contains_key(&3));
        assert!(result.error_messages[&4].contains("LPG"));
        assert!(result.error_messages[&5].contains("quantity"));

        let all = storage.procurement.get_all().unwrap();
        assert_eq!(all.len(), 2);
        let hsd = all.iter().find(|r| r.fuel_type == FuelType::Hsd).unwrap();
        assert_eq!(hsd.total_amount(), Money::from_rupees(1_062_000));

        let ms = all.iter().find(|r| r.fuel_type == FuelType::Ms).unwrap();
        assert_eq!(ms.supplier, "HPCL");

        assert_eq!(storage.audit().read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_reimport_skips_everything() {
        let (_temp, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        service.import_reader(SAMPLE.as_bytes()).unwrap();
        let again = service.import_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(again.imported, 0);
        assert_eq!(again.duplicates_skipped, 3);
        assert_eq!(storage.procurement.count().unwrap(), 2);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let (_temp, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        let err = service
            .import_reader("invoice_number,invoice_date,quantity\nINV-1,2025-08-01,10\n".as_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("fuel_type"));
    }

    #[test]
    fn test_template_round_trips_through_import() {
        let (_temp, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        let mut buf = Vec::new();
        write_template(&mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with(
            "invoice_number,invoice_date,fuel_type,quantity,rate,vehicle_number,supplier"
        ));

        let result = service.import_reader(buf.as_slice()).unwrap();
        assert_eq!(result.imported, 1);
    }
}
