//! CSV Export functionality
//!
//! Shift and procurement records in the same flat column layout the records
//! store uses, so a procurement export can be fed straight back to import.

use std::io::Write;

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{RawProcurementRecord, RawShiftRecord};
use crate::storage::Storage;

fn in_range(date: NaiveDate, range: Option<(NaiveDate, NaiveDate)>) -> bool {
    range.map_or(true, |(start, end)| date >= start && date <= end)
}

fn check_range(range: Option<(NaiveDate, NaiveDate)>) -> LedgerResult<()> {
    match range {
        Some((start, end)) if end < start => Err(LedgerError::InvalidDateRange { start, end }),
        _ => Ok(()),
    }
}

/// Export shift records to CSV, oldest first
pub fn export_shifts_csv<W: Write>(
    storage: &Storage,
    writer: &mut W,
    range: Option<(NaiveDate, NaiveDate)>,
) -> LedgerResult<usize> {
    check_range(range)?;

    let mut shifts: Vec<_> = storage
        .shifts
        .get_all()?
        .into_iter()
        .filter(|s| in_range(s.date, range))
        .collect();
    shifts.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in &shifts {
        csv_writer
            .serialize(RawShiftRecord::from(record))
            .map_err(|e| LedgerError::Export(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| LedgerError::Export(e.to_string()))?;

    Ok(shifts.len())
}

/// Export procurement invoices to CSV, oldest first
pub fn export_procurement_csv<W: Write>(
    storage: &Storage,
    writer: &mut W,
    range: Option<(NaiveDate, NaiveDate)>,
) -> LedgerResult<usize> {
    check_range(range)?;

    let mut invoices: Vec<_> = storage
        .procurement
        .get_all()?
        .into_iter()
        .filter(|p| in_range(p.invoice_date, range))
        .collect();
    invoices.sort_by(|a, b| {
        a.invoice_date
            .cmp(&b.invoice_date)
            .then_with(|| a.invoice_number.cmp(&b.invoice_number))
    });

    let mut csv_writer = csv::Writer::from_writer(writer);
    for invoice in &invoices {
        csv_writer
            .serialize(RawProcurementRecord::from(invoice))
            .map_err(|e| LedgerError::Export(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| LedgerError::Export(e.to_string()))?;

    Ok(invoices.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{FuelLine, FuelType, Money, ProcurementRecord, Shift, ShiftRecord};
    use crate::services::import::ImportStatus;
    use crate::services::ImportService;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, day).unwrap()
    }

    #[test]
    fn test_export_shifts() {
        let (_temp_dir, storage) = create_test_storage();

        let mut record = ShiftRecord::new(date(2), Shift::Night, "Ravi");
        record.ms = FuelLine::new(102.5, 100.0);
        record.collections.cash = Money::from_rupees(10250);
        record.notes = "pump 3, nozzle 2 slow".to_string();
        storage.shifts.upsert(record).unwrap();
        storage
            .shifts
            .upsert(ShiftRecord::new(date(9), Shift::Day, "Suresh"))
            .unwrap();

        let mut out = Vec::new();
        let count = export_shifts_csv(&storage, &mut out, Some((date(1), date(5)))).unwrap();
        assert_eq!(count, 1);

        let csv = String::from_utf8(out).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("date,shift,manager,ms_rate"));
        assert!(lines[1].starts_with("2025-08-02,Night,Ravi,102.5,100.0,10250.0"));
        assert!(lines[1].contains("\"pump 3, nozzle 2 slow\""));
    }

    #[test]
    fn test_procurement_export_reimports() {
        let (_temp_dir, storage) = create_test_storage();
        storage
            .procurement
            .upsert(ProcurementRecord::new(
                "INV-7",
                date(3),
                FuelType::Ms,
                8000.0,
                95.0,
            ))
            .unwrap();

        let mut out = Vec::new();
        export_procurement_csv(&storage, &mut out, None).unwrap();

        // Same file against the same store is all duplicates
        let service = ImportService::new(&storage);
        let mut reader = ::csv::Reader::from_reader(out.as_slice());
        let rows = service.parse_csv_from_reader(&mut reader).unwrap();
        let preview = service.generate_preview(rows).unwrap();
        assert_eq!(preview.len(), 1);
        assert_eq!(preview[0].status, ImportStatus::Duplicate);
    }

    #[test]
    fn test_inverted_range() {
        let (_temp_dir, storage) = create_test_storage();
        let mut out = Vec::new();
        assert!(export_shifts_csv(&storage, &mut out, Some((date(5), date(1)))).is_err());
    }
}
