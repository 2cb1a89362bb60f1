//! Workbook sources (`.xlsx`, `.xlsm`, `.xls`, `.ods`). Only the first worksheet is read.

use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

use super::cell::{Cell, Sheet, SheetRow};
use crate::core::RechnungError;

pub fn read_workbook(path: &Path) -> Result<Sheet, RechnungError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| RechnungError::Sheet(format!("cannot open {}: {e}", path.display())))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| RechnungError::Sheet(format!("{} has no worksheet", path.display())))?
        .map_err(|e| RechnungError::Sheet(format!("cannot read {}: {e}", path.display())))?;

    // A range starts at its first used cell, not at A1.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let rows = range
        .rows()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = vec![Cell::Empty; start_col as usize];
            cells.extend(row.iter().map(|data| convert(data, path)));
            SheetRow::new(start_row + i as u32, cells)
        })
        .collect();

    Ok(Sheet { rows })
}

fn convert(data: &Data, path: &Path) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from(s.as_str()),
        Data::Error(e) => {
            tracing::warn!(path = %path.display(), error = ?e, "cell holds a spreadsheet error");
            Cell::Empty
        }
    }
}
