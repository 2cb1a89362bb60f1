//! CSV sheets: every non-empty field is read as text.

use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use super::cell::{Cell, Sheet, SheetRow};
use crate::core::RechnungError;

/// Read a CSV file as a sheet. Fails only if the file cannot be opened or decoded.
pub fn read_csv(path: &Path) -> Result<Sheet, RechnungError> {
    let file = File::open(path).map_err(|e| RechnungError::io(path, e))?;
    parse_csv(file)
}

/// Parse CSV content as a sheet. The first line is row 0; no header handling happens here.
pub fn parse_csv<R: Read>(reader: R) -> Result<Sheet, RechnungError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows: Vec<SheetRow> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        // The reader skips empty lines; keep row numbers physical.
        let index = record
            .position()
            .map(|p| p.line().saturating_sub(1) as u32)
            .unwrap_or_else(|| rows.last().map_or(0, |r| r.index + 1));
        let first = rows.is_empty();
        let cells = record
            .iter()
            .enumerate()
            .map(|(col, field)| {
                // Spreadsheet exports often start with a byte order mark.
                let field = if first && col == 0 {
                    field.trim_start_matches('\u{feff}')
                } else {
                    field
                };
                Cell::from(field)
            })
            .collect();
        rows.push(SheetRow::new(index, cells));
    }
    Ok(Sheet { rows })
}

/// Write a sheet as CSV, replacing `path` only once the new content is complete.
pub fn write_csv(path: &Path, sheet: &Sheet) -> Result<(), RechnungError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    {
        let mut wtr = WriterBuilder::new().flexible(true).from_path(tmp)?;
        for row in sheet.to_grid() {
            wtr.write_record(&row)?;
        }
        wtr.flush().map_err(|e| RechnungError::io(tmp, e))?;
    }
    fs::rename(tmp, path).map_err(|e| RechnungError::io(path, e))
}
