use chrono::{Datelike, NaiveDate};
use std::path::Path;

use super::row::{ISSUE_DATE_FORMAT, LedgerRow, Reservation, ledger_schema};
use crate::core::RechnungError;
use crate::sheet::{Cell, Sheet, SheetRow, map_sheet, read_sheet, write_csv};

const DEFAULT_HEADER: [&str; 4] = ["serial", "year", "number", "date"];

#[derive(Debug, Clone, Copy)]
struct Pending {
    rows_before: usize,
    dirty_before: bool,
}

/// Per-company invoice serial number ledger.
///
/// Numbers continue from the last non-blank row: within the same two-digit
/// year they increase by one, a new year starts again at 1. A reservation
/// stays provisional until it is confirmed, committed or rolled back.
///
/// Rows are appended in memory; [`commit`](Self::commit) writes the table once
/// at the end of a company's pass, and only if anything changed.
///
/// ```
/// use chrono::NaiveDate;
/// use rechnungslauf::numbering::{LedgerRow, SequenceLedger};
///
/// let mut ledger = SequenceLedger::from_rows(vec![LedgerRow::new("A", 24, 7, "02.01.2024")]);
/// let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
///
/// assert_eq!(ledger.reserve(today).unwrap().identifier, "A-24-8");
/// ledger.rollback().unwrap();
/// assert_eq!(ledger.reserve(today).unwrap().identifier, "A-24-8");
/// ```
#[derive(Debug, Clone)]
pub struct SequenceLedger {
    header: Vec<SheetRow>,
    first_data_row: u32,
    rows: Vec<LedgerRow>,
    dirty: bool,
    pending: Option<Pending>,
}

impl SequenceLedger {
    /// An in-memory ledger with a default header row.
    pub fn from_rows(rows: Vec<LedgerRow>) -> Self {
        Self {
            header: vec![SheetRow::new(
                0,
                DEFAULT_HEADER.iter().map(|h| Cell::from(*h)).collect(),
            )],
            first_data_row: 1,
            rows,
            dirty: false,
            pending: None,
        }
    }

    /// Load a company ledger. Rows above `first_data_row` are kept verbatim as header.
    ///
    /// Fails if the file cannot be read, a non-blank row lacks a valid year or
    /// number, or no row carries a serial prefix.
    pub fn load(path: &Path, first_data_row: u32) -> Result<Self, RechnungError> {
        let sheet = read_sheet(path)?;
        Self::from_sheet(&sheet, first_data_row).map_err(|e| match e {
            RechnungError::Ledger(msg) => {
                RechnungError::Ledger(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn from_sheet(sheet: &Sheet, first_data_row: u32) -> Result<Self, RechnungError> {
        let schema = ledger_schema(first_data_row)?;
        let header = sheet
            .rows
            .iter()
            .filter(|row| row.index < first_data_row)
            .cloned()
            .collect();

        let data_indices = sheet
            .rows
            .iter()
            .filter(|row| row.index >= first_data_row)
            .map(|row| row.index);
        let entries = map_sheet(sheet, &schema).records;

        let rows = entries
            .into_iter()
            .zip(data_indices)
            .map(|(entry, index)| entry.into_row(index))
            .collect::<Result<Vec<_>, _>>()?;

        if rows.iter().all(LedgerRow::is_blank) {
            return Err(RechnungError::Ledger(
                "no row carries a serial prefix; seed the ledger with the company's first row"
                    .into(),
            ));
        }

        Ok(Self {
            header,
            first_data_row,
            rows,
            dirty: false,
            pending: None,
        })
    }

    /// All rows in append order, blank rows included.
    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    /// The last row with a serial prefix.
    pub fn last_row(&self) -> Option<&LedgerRow> {
        self.rows.iter().rev().find(|row| !row.is_blank())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Allocate the next number for `today` and append it as a provisional row.
    ///
    /// A still-pending earlier reservation is confirmed first.
    pub fn reserve(&mut self, today: NaiveDate) -> Result<Reservation, RechnungError> {
        if self.pending.take().is_some() {
            tracing::debug!("previous reservation confirmed by a new reservation");
        }

        let last = self.last_row().ok_or_else(|| {
            RechnungError::Numbering("cannot reserve from a ledger without a seeded row".into())
        })?;

        let year_two_digits = u8::try_from(today.year().rem_euclid(100))
            .map_err(|e| RechnungError::Numbering(e.to_string()))?;
        let sequence_number = if last.year_two_digits == year_two_digits {
            last.sequence_number.checked_add(1).ok_or_else(|| {
                RechnungError::Numbering(format!("sequence {} exhausted", last.identifier()))
            })?
        } else {
            1
        };

        let row = LedgerRow::new(
            last.serial_prefix.clone(),
            year_two_digits,
            sequence_number,
            today.format(ISSUE_DATE_FORMAT).to_string(),
        );
        let reservation = Reservation {
            identifier: row.identifier(),
            serial_prefix: row.serial_prefix.clone(),
            year_two_digits,
            sequence_number,
            issue_date: today,
        };

        self.pending = Some(Pending {
            rows_before: self.rows.len(),
            dirty_before: self.dirty,
        });
        self.rows.push(row);
        self.dirty = true;
        Ok(reservation)
    }

    /// Keep the pending reservation. No-op without one.
    pub fn confirm(&mut self) {
        self.pending = None;
    }

    /// Undo the pending reservation, restoring rows and dirty flag to their prior state.
    pub fn rollback(&mut self) -> Result<Reservation, RechnungError> {
        let pending = self.pending.take().ok_or_else(|| {
            RechnungError::Numbering("rollback without a pending reservation".into())
        })?;

        let row = self.rows.pop().ok_or_else(|| {
            RechnungError::Numbering("pending reservation has no row".into())
        })?;
        debug_assert_eq!(self.rows.len(), pending.rows_before);
        self.dirty = pending.dirty_before;

        Ok(Reservation {
            identifier: row.identifier(),
            serial_prefix: row.serial_prefix,
            year_two_digits: row.year_two_digits,
            sequence_number: row.sequence_number,
            issue_date: NaiveDate::parse_from_str(&row.issue_date_text, ISSUE_DATE_FORMAT)
                .map_err(|e| RechnungError::Numbering(e.to_string()))?,
        })
    }

    /// Write the ledger to `path` as CSV if it changed. Returns whether a write happened.
    ///
    /// A pending reservation stands.
    pub fn commit(&mut self, path: &Path) -> Result<bool, RechnungError> {
        self.confirm();
        if !self.dirty {
            return Ok(false);
        }
        write_csv(path, &self.to_sheet())?;
        self.dirty = false;
        tracing::info!(path = %path.display(), rows = self.rows.len(), "ledger committed");
        Ok(true)
    }

    /// The ledger as a sheet: header rows, then data rows from the first data row on.
    pub fn to_sheet(&self) -> Sheet {
        let mut rows = self.header.clone();
        rows.extend(
            self.rows
                .iter()
                .enumerate()
                .map(|(i, row)| SheetRow::new(self.first_data_row + i as u32, row.to_cells())),
        );
        Sheet { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> SequenceLedger {
        SequenceLedger::from_rows(vec![LedgerRow::new("A", 24, 7, "15.01.2024")])
    }

    #[test]
    fn sequential_numbering() {
        let mut ledger = seeded();
        let today = date(2024, 3, 1);
        assert_eq!(ledger.reserve(today).unwrap().identifier, "A-24-8");
        assert_eq!(ledger.reserve(today).unwrap().identifier, "A-24-9");
        assert_eq!(ledger.reserve(today).unwrap().identifier, "A-24-10");
        assert_eq!(ledger.rows().len(), 4);
        assert!(ledger.is_dirty());
    }

    #[test]
    fn year_rollover_restarts_at_one() {
        let mut ledger = seeded();
        let r = ledger.reserve(date(2025, 1, 2)).unwrap();
        assert_eq!(r.identifier, "A-25-1");
        assert_eq!(r.sequence_number, 1);
    }

    #[test]
    fn skipped_years_do_not_fill_gaps() {
        let mut ledger = seeded();
        assert_eq!(ledger.reserve(date(2027, 5, 5)).unwrap().identifier, "A-27-1");
    }

    #[test]
    fn reserve_skips_trailing_blank_rows() {
        let mut ledger = SequenceLedger::from_rows(vec![
            LedgerRow::new("A", 24, 7, "15.01.2024"),
            LedgerRow::blank(),
            LedgerRow::blank(),
        ]);
        assert_eq!(ledger.reserve(date(2024, 2, 1)).unwrap().identifier, "A-24-8");
    }

    #[test]
    fn reserve_on_empty_ledger_fails() {
        let mut ledger = SequenceLedger::from_rows(vec![LedgerRow::blank()]);
        let err = ledger.reserve(date(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, RechnungError::Numbering(_)));
        assert!(!ledger.is_dirty());
    }

    #[test]
    fn rollback_restores_clean_state() {
        let mut ledger = seeded();
        let before = ledger.rows().to_vec();
        let reserved = ledger.reserve(date(2024, 3, 1)).unwrap();
        let undone = ledger.rollback().unwrap();
        assert_eq!(reserved, undone);
        assert_eq!(ledger.rows(), before.as_slice());
        assert!(!ledger.is_dirty());
        assert!(!ledger.has_pending());
    }

    #[test]
    fn rollback_keeps_earlier_dirt() {
        let mut ledger = seeded();
        ledger.reserve(date(2024, 3, 1)).unwrap();
        ledger.confirm();
        ledger.reserve(date(2024, 3, 1)).unwrap();
        ledger.rollback().unwrap();
        assert!(ledger.is_dirty());
        assert_eq!(ledger.last_row().unwrap().sequence_number, 8);
    }

    #[test]
    fn rollback_twice_fails() {
        let mut ledger = seeded();
        ledger.reserve(date(2024, 3, 1)).unwrap();
        ledger.rollback().unwrap();
        assert!(ledger.rollback().is_err());
        assert_eq!(ledger.rows().len(), 1);
    }

    #[test]
    fn rollback_after_confirm_fails() {
        let mut ledger = seeded();
        ledger.reserve(date(2024, 3, 1)).unwrap();
        ledger.confirm();
        assert!(ledger.rollback().is_err());
        assert_eq!(ledger.rows().len(), 2);
    }

    #[test]
    fn new_reservation_confirms_pending_one() {
        let mut ledger = seeded();
        ledger.reserve(date(2024, 3, 1)).unwrap();
        ledger.reserve(date(2024, 3, 1)).unwrap();
        ledger.rollback().unwrap();
        assert_eq!(ledger.last_row().unwrap().identifier(), "A-24-8");
    }

    #[test]
    fn clean_commit_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice_controller.csv");
        let mut ledger = seeded();
        assert!(!ledger.commit(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn to_sheet_places_rows_after_header() {
        let mut ledger = seeded();
        ledger.reserve(date(2024, 3, 9)).unwrap();
        let sheet = ledger.to_sheet();
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.get(0, 0), Some(&Cell::from("serial")));
        assert_eq!(sheet.get(2, 2), Some(&Cell::Int(8)));
        assert_eq!(sheet.get(2, 3), Some(&Cell::from("09.03.2024")));
    }
}
