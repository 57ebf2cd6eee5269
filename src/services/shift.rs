//! Shift entry service
//!
//! Create, edit and remove manager shift entries. Entries are validated
//! against the station's tank capacities before they are written, and every
//! change lands in the audit log.

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Collections, FuelLine, FuelType, Money, Shift, ShiftRecord, ShiftRecordId, TankCapacities,
    TankLevels,
};
use crate::storage::Storage;

/// Service for shift entry management
pub struct ShiftService<'a> {
    storage: &'a Storage,
    capacities: TankCapacities,
}

/// Options for filtering shift entries
#[derive(Debug, Clone, Default)]
pub struct ShiftFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub shift: Option<Shift>,
    pub manager: Option<String>,
    /// Keep only the newest N entries
    pub limit: Option<usize>,
}

impl ShiftFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn shift(mut self, shift: Shift) -> Self {
        self.shift = Some(shift);
        self
    }

    pub fn manager(mut self, manager: impl Into<String>) -> Self {
        self.manager = Some(manager.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Input for creating a shift entry
#[derive(Debug, Clone)]
pub struct CreateShiftInput {
    pub date: NaiveDate,
    pub shift: Shift,
    pub manager: String,
    /// Rate and litres per product; products left out were not sold
    pub fuel: Vec<(FuelType, f64, f64)>,
    pub tanks: TankLevels,
    pub collections: Collections,
    pub total_outstanding: Option<Money>,
    pub hpcl_payment: Money,
    pub notes: Option<String>,
}

impl CreateShiftInput {
    pub fn new(date: NaiveDate, shift: Shift, manager: impl Into<String>) -> Self {
        Self {
            date,
            shift,
            manager: manager.into(),
            fuel: Vec::new(),
            tanks: TankLevels::default(),
            collections: Collections::default(),
            total_outstanding: None,
            hpcl_payment: Money::zero(),
            notes: None,
        }
    }
}

/// Fields to change on an existing entry; None leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct UpdateShiftInput {
    pub date: Option<NaiveDate>,
    pub shift: Option<Shift>,
    pub manager: Option<String>,
    pub fuel: Vec<(FuelType, f64, f64)>,
    pub tanks: Option<TankLevels>,
    pub collections: Option<Collections>,
    /// Some(zero) clears the reported balance
    pub total_outstanding: Option<Money>,
    pub hpcl_payment: Option<Money>,
    pub notes: Option<String>,
}

impl<'a> ShiftService<'a> {
    /// Create a new shift service checking tank dips against `capacities`
    pub fn new(storage: &'a Storage, capacities: TankCapacities) -> Self {
        Self {
            storage,
            capacities,
        }
    }

    /// Record a new shift entry
    ///
    /// A second entry for the same date and shift is accepted; the two are
    /// summed when the day is aggregated.
    pub fn create(&self, input: CreateShiftInput) -> LedgerResult<ShiftRecord> {
        let mut record = ShiftRecord::new(input.date, input.shift, input.manager.trim());
        for (fuel, rate, quantity) in input.fuel {
            record.set_fuel_line(fuel, FuelLine::new(rate, quantity));
        }
        record.tanks = input.tanks;
        record.collections = input.collections;
        if let Some(outstanding) = input.total_outstanding {
            record.set_total_outstanding(outstanding);
        }
        record.hpcl_payment = input.hpcl_payment;
        record.notes = input.notes.unwrap_or_default();

        record
            .validate(&self.capacities)
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        let existing = self.storage.shifts.get_by_key(record.date, &record.shift)?;
        if !existing.is_empty() {
            tracing::warn!(
                date = %record.date,
                shift = %record.shift,
                existing = existing.len(),
                "duplicate shift entry; figures will be summed"
            );
        }
        if !record.shift.is_recognized() {
            tracing::warn!(
                shift = %record.shift,
                "unrecognized shift label; entry will not count toward day completion"
            );
        }

        self.storage.shifts.upsert(record.clone())?;
        self.storage.shifts.save()?;

        self.storage.log_create(&record)?;

        tracing::info!(id = %record.id, date = %record.date, shift = %record.shift, "shift entry recorded");
        Ok(record)
    }

    pub fn get(&self, id: ShiftRecordId) -> LedgerResult<Option<ShiftRecord>> {
        self.storage.shifts.get(id)
    }

    /// Find an entry by full ID or short ID ("shf-1a2b3c4d")
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<ShiftRecord>> {
        if let Ok(id) = identifier.parse::<ShiftRecordId>() {
            return self.storage.shifts.get(id);
        }

        let mut matches = self.storage.shifts.find_by_short_id(identifier)?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(LedgerError::Validation(format!(
                "ID '{}' is ambiguous ({} entries match)",
                identifier, n
            ))),
        }
    }

    /// List entries matching a filter, oldest first
    pub fn list(&self, filter: ShiftFilter) -> LedgerResult<Vec<ShiftRecord>> {
        let mut records = self.storage.shifts.get_all()?;

        if let Some(start) = filter.start_date {
            records.retain(|r| r.date >= start);
        }
        if let Some(end) = filter.end_date {
            records.retain(|r| r.date <= end);
        }
        if let Some(ref shift) = filter.shift {
            records.retain(|r| &r.shift == shift);
        }
        if let Some(ref manager) = filter.manager {
            let manager = manager.to_lowercase();
            records.retain(|r| r.manager.to_lowercase().contains(&manager));
        }
        if let Some(limit) = filter.limit {
            let skip = records.len().saturating_sub(limit);
            records.drain(..skip);
        }

        Ok(records)
    }

    /// Entries for one date, in shift order
    pub fn list_for_date(&self, date: NaiveDate) -> LedgerResult<Vec<ShiftRecord>> {
        self.list(ShiftFilter::new().date_range(date, date))
    }

    /// Edit an existing entry
    pub fn update(&self, id: ShiftRecordId, input: UpdateShiftInput) -> LedgerResult<ShiftRecord> {
        let mut record = self
            .storage
            .shifts
            .get(id)?
            .ok_or_else(|| LedgerError::shift_not_found(id.to_string()))?;
        let before = record.clone();

        if let Some(date) = input.date {
            record.date = date;
        }
        if let Some(shift) = input.shift {
            record.shift = shift;
        }
        if let Some(manager) = input.manager {
            record.manager = manager.trim().to_string();
        }
        for (fuel, rate, quantity) in input.fuel {
            record.set_fuel_line(fuel, FuelLine::new(rate, quantity));
        }
        if let Some(tanks) = input.tanks {
            record.tanks = tanks;
        }
        if let Some(collections) = input.collections {
            record.collections = collections;
        }
        if let Some(outstanding) = input.total_outstanding {
            record.set_total_outstanding(outstanding);
        }
        if let Some(payment) = input.hpcl_payment {
            record.hpcl_payment = payment;
        }
        if let Some(notes) = input.notes {
            record.notes = notes;
        }
        record.touch();

        record
            .validate(&self.capacities)
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.shifts.upsert(record.clone())?;
        self.storage.shifts.save()?;

        self.storage.log_update(&before, &record)?;

        Ok(record)
    }

    /// Remove an entry, returning what was removed
    pub fn delete(&self, id: ShiftRecordId) -> LedgerResult<ShiftRecord> {
        let record = self
            .storage
            .shifts
            .get(id)?
            .ok_or_else(|| LedgerError::shift_not_found(id.to_string()))?;

        self.storage.shifts.delete(id)?;
        self.storage.shifts.save()?;

        self.storage.log_delete(&record)?;

        Ok(record)
    }

    pub fn count(&self) -> LedgerResult<usize> {
        self.storage.shifts.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::TankId;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn day_input() -> CreateShiftInput {
        let mut input = CreateShiftInput::new(date("2025-08-01"), Shift::Day, "Ravi");
        input.fuel = vec![(FuelType::Ms, 100.0, 10.0), (FuelType::Hsd, 90.0, 20.0)];
        input.collections.cash = Money::from_rupees(2500);
        input.collections.card = Money::from_rupees(300);
        input
    }

    #[test]
    fn test_create_shift_entry() {
        let (_temp, storage) = create_test_storage();
        let service = ShiftService::new(&storage, TankCapacities::default());

        let record = service.create(day_input()).unwrap();
        assert_eq!(record.manager, "Ravi");
        assert_eq!(record.total_sales(), Money::from_rupees(2800));
        assert_eq!(record.variance(), Money::zero());
        assert_eq!(service.count().unwrap(), 1);

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_create_rejects_empty_manager() {
        let (_temp, storage) = create_test_storage();
        let service = ShiftService::new(&storage, TankCapacities::default());

        let mut input = day_input();
        input.manager = "   ".into();
        let err = service.create(input).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_create_rejects_overfilled_tank() {
        let (_temp, storage) = create_test_storage();
        let service = ShiftService::new(&storage, TankCapacities::default());

        let mut input = day_input();
        input.tanks.set(TankId::Ms1, 50_000.0);
        assert!(service.create(input).unwrap_err().is_validation());
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_duplicate_key_is_accepted() {
        let (_temp, storage) = create_test_storage();
        let service = ShiftService::new(&storage, TankCapacities::default());

        service.create(day_input()).unwrap();
        service.create(day_input()).unwrap();

        let day = service.list_for_date(date("2025-08-01")).unwrap();
        assert_eq!(day.len(), 2);
    }

    #[test]
    fn test_update_changes_fields_and_logs_diff() {
        let (_temp, storage) = create_test_storage();
        let service = ShiftService::new(&storage, TankCapacities::default());
        let record = service.create(day_input()).unwrap();

        let updated = service
            .update(
                record.id,
                UpdateShiftInput {
                    total_outstanding: Some(Money::from_rupees(5000)),
                    notes: Some("pump 2 slow".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.reported_outstanding(), Some(Money::from_rupees(5000)));
        assert_eq!(updated.notes, "pump 2 slow");
        assert_eq!(updated.manager, "Ravi");

        let entries = storage.audit().read_all().unwrap();
        assert!(entries[1].diff_summary.as_deref().unwrap().contains("notes"));
    }

    #[test]
    fn test_update_missing_entry() {
        let (_temp, storage) = create_test_storage();
        let service = ShiftService::new(&storage, TankCapacities::default());

        let err = service
            .update(ShiftRecordId::new(), UpdateShiftInput::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_find_by_short_id() {
        let (_temp, storage) = create_test_storage();
        let service = ShiftService::new(&storage, TankCapacities::default());
        let record = service.create(day_input()).unwrap();

        let found = service.find(&record.id.to_string()).unwrap().unwrap();
        assert_eq!(found.id, record.id);
        assert!(service.find("shf-zzzzzzzz").unwrap().is_none());
    }

    #[test]
    fn test_list_with_filter() {
        let (_temp, storage) = create_test_storage();
        let service = ShiftService::new(&storage, TankCapacities::default());

        service.create(day_input()).unwrap();
        service
            .create(CreateShiftInput::new(date("2025-08-01"), Shift::Night, "Suresh"))
            .unwrap();
        service
            .create(CreateShiftInput::new(date("2025-08-03"), Shift::Day, "Ravi"))
            .unwrap();

        let nights = service.list(ShiftFilter::new().shift(Shift::Night)).unwrap();
        assert_eq!(nights.len(), 1);

        let ravi = service.list(ShiftFilter::new().manager("ravi")).unwrap();
        assert_eq!(ravi.len(), 2);

        let latest = service.list(ShiftFilter::new().limit(1)).unwrap();
        assert_eq!(latest[0].date, date("2025-08-03"));
    }

    #[test]
    fn test_delete() {
        let (_temp, storage) = create_test_storage();
        let service = ShiftService::new(&storage, TankCapacities::default());
        let record = service.create(day_input()).unwrap();

        let removed = service.delete(record.id).unwrap();
        assert_eq!(removed.id, record.id);
        assert_eq!(service.count().unwrap(), 0);
        assert!(service.delete(record.id).unwrap_err().is_not_found());
    }
}
