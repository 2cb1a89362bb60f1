use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::sheet::{Cell, FieldBinding, IntegerTextParser, RecordSchema};
use crate::core::RechnungError;

/// Format of the issue date column.
pub const ISSUE_DATE_FORMAT: &str = "%d.%m.%Y";

/// One persisted serial number allocation.
///
/// A row whose serial prefix is empty is blank: debris of an interrupted
/// write. Blank rows are kept as they are but never count as the last row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub serial_prefix: String,
    /// Calendar year modulo 100.
    pub year_two_digits: u8,
    pub sequence_number: u32,
    pub issue_date_text: String,
}

impl LedgerRow {
    pub fn new(
        serial_prefix: impl Into<String>,
        year_two_digits: u8,
        sequence_number: u32,
        issue_date_text: impl Into<String>,
    ) -> Self {
        Self {
            serial_prefix: serial_prefix.into(),
            year_two_digits,
            sequence_number,
            issue_date_text: issue_date_text.into(),
        }
    }

    pub fn blank() -> Self {
        Self::new("", 0, 0, "")
    }

    pub fn is_blank(&self) -> bool {
        self.serial_prefix.trim().is_empty()
    }

    /// The printed invoice serial, e.g. "A-24-8".
    pub fn identifier(&self) -> String {
        format!(
            "{}-{:02}-{}",
            self.serial_prefix, self.year_two_digits, self.sequence_number
        )
    }

    pub(crate) fn to_cells(&self) -> Vec<Cell> {
        if self.is_blank() {
            return vec![
                Cell::Empty,
                Cell::Empty,
                Cell::Empty,
                Cell::from(self.issue_date_text.as_str()),
            ];
        }
        vec![
            Cell::from(self.serial_prefix.as_str()),
            Cell::Int(i64::from(self.year_two_digits)),
            Cell::Int(i64::from(self.sequence_number)),
            Cell::from(self.issue_date_text.as_str()),
        ]
    }
}

/// A number handed out by [`SequenceLedger::reserve`](super::SequenceLedger::reserve).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    pub identifier: String,
    pub serial_prefix: String,
    pub year_two_digits: u8,
    pub sequence_number: u32,
    pub issue_date: NaiveDate,
}

/// Ledger row as read from the sheet, before validation.
#[derive(Debug, Default)]
pub(crate) struct LedgerEntry {
    serial: String,
    year: Option<i64>,
    number: Option<i64>,
    date: String,
}

pub(crate) fn ledger_schema(first_data_row: u32) -> Result<RecordSchema<LedgerEntry>, RechnungError> {
    RecordSchema::builder("ledger")
        .first_data_row(first_data_row)
        .bind(0, FieldBinding::text("serial_prefix", |e: &mut LedgerEntry| &mut e.serial))
        .bind(
            1,
            FieldBinding::optional_integer("year_two_digits", |e: &mut LedgerEntry| &mut e.year)
                .parser(IntegerTextParser),
        )
        .bind(
            2,
            FieldBinding::optional_integer("sequence_number", |e: &mut LedgerEntry| {
                &mut e.number
            })
            .parser(IntegerTextParser),
        )
        .bind(3, FieldBinding::text("issue_date_text", |e: &mut LedgerEntry| &mut e.date))
        .build()
}

impl LedgerEntry {
    /// Validate a non-blank entry; blank entries become [`LedgerRow::blank`] keeping their date text.
    pub(crate) fn into_row(self, row_index: u32) -> Result<LedgerRow, RechnungError> {
        if self.serial.trim().is_empty() {
            return Ok(LedgerRow {
                issue_date_text: self.date,
                ..LedgerRow::blank()
            });
        }
        let year = self
            .year
            .and_then(|y| u8::try_from(y).ok())
            .filter(|y| *y <= 99)
            .ok_or_else(|| {
                RechnungError::Ledger(format!(
                    "row {row_index}: year must be a number between 0 and 99"
                ))
            })?;
        let number = self
            .number
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n >= 1)
            .ok_or_else(|| {
                RechnungError::Ledger(format!(
                    "row {row_index}: sequence number must be a positive integer"
                ))
            })?;
        Ok(LedgerRow::new(self.serial.trim(), year, number, self.date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_pads_year() {
        assert_eq!(LedgerRow::new("A", 24, 8, "").identifier(), "A-24-8");
        assert_eq!(LedgerRow::new("SWC", 5, 12, "").identifier(), "SWC-05-12");
    }

    #[test]
    fn blank_entry_keeps_date() {
        let entry = LedgerEntry {
            date: "01.02.2024".into(),
            ..Default::default()
        };
        let row = entry.into_row(4).unwrap();
        assert!(row.is_blank());
        assert_eq!(row.issue_date_text, "01.02.2024");
    }

    #[test]
    fn entry_without_number_is_rejected() {
        let entry = LedgerEntry {
            serial: "A".into(),
            year: Some(24),
            ..Default::default()
        };
        let err = entry.into_row(3).unwrap_err();
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn entry_year_out_of_range() {
        let entry = LedgerEntry {
            serial: "A".into(),
            year: Some(2024),
            number: Some(1),
            date: String::new(),
        };
        assert!(entry.into_row(1).is_err());
    }
}
