//! Row-to-record mapping with tolerant reads.

use std::path::Path;

use super::cell::Sheet;
use super::read_sheet;
use super::schema::{RecordSchema, SheetRecord};
use crate::core::{CellParseError, RechnungError};

/// Records mapped from one sheet, with the tolerated cell failures.
#[derive(Debug)]
pub struct Mapped<R> {
    /// One record per data row, in physical order.
    pub records: Vec<R>,
    /// Cell failures and missing required fields; already logged.
    pub errors: Vec<CellParseError>,
}

/// Read the first sheet at `path` into records of shape `R`.
///
/// Fails only if the source cannot be opened. Cell failures are logged with
/// their coordinates and leave the field at its default.
pub fn read_first_sheet<R: SheetRecord>(
    path: &Path,
    schema: &RecordSchema<R>,
) -> Result<Vec<R>, RechnungError> {
    let _span = tracing::debug_span!(
        "read_first_sheet",
        path = %path.display(),
        shape = schema.shape()
    )
    .entered();

    let sheet = read_sheet(path)?;
    Ok(map_sheet(&sheet, schema).records)
}

/// Map every row at or below the schema's first data row.
///
/// Rows without any bound value are still emitted as all-default records, so
/// callers can tell an empty data file from an unreadable one.
pub fn map_sheet<R: Default>(sheet: &Sheet, schema: &RecordSchema<R>) -> Mapped<R> {
    let mut records = Vec::new();
    let mut errors = Vec::new();

    for row in sheet
        .rows
        .iter()
        .filter(|row| row.index >= schema.first_data_row())
    {
        let mut record = R::default();
        let mut populated = Vec::new();

        for (column, cell) in row.present_cells() {
            let Some(binding) = schema.binding(column) else {
                continue;
            };
            match binding.apply(&mut record, cell) {
                Ok(()) => populated.push(column),
                Err(message) => {
                    let err = CellParseError {
                        row: row.index,
                        column,
                        field: binding.field(),
                        message,
                    };
                    tracing::warn!(
                        shape = schema.shape(),
                        parser = binding.parser_name(),
                        "cell left at default: {err}"
                    );
                    errors.push(err);
                }
            }
        }

        if !populated.is_empty() {
            for (column, binding) in schema.bindings() {
                if binding.is_required() && !populated.contains(&column) {
                    let err = CellParseError {
                        row: row.index,
                        column,
                        field: binding.field(),
                        message: "required field is missing".into(),
                    };
                    tracing::warn!(shape = schema.shape(), "{err}");
                    errors.push(err);
                }
            }
        }

        records.push(record);
    }

    Mapped { records, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::cell::Cell;
    use crate::sheet::parser::IntegerTextParser;
    use crate::sheet::schema::FieldBinding;

    #[derive(Debug, Default, PartialEq)]
    struct Line {
        name: String,
        qty: i64,
    }

    fn schema() -> RecordSchema<Line> {
        RecordSchema::builder("line")
            .has_header(true)
            .bind(0, FieldBinding::text("name", |r: &mut Line| &mut r.name).required())
            .bind(
                1,
                FieldBinding::integer("qty", |r: &mut Line| &mut r.qty).parser(IntegerTextParser),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn skips_header_and_ignores_unbound_columns() {
        let sheet = Sheet::from_rows(vec![
            vec![Cell::from("name"), Cell::from("qty")],
            vec![Cell::from("bolt"), Cell::from("4"), Cell::from("ignored")],
        ]);
        let mapped = map_sheet(&sheet, &schema());
        assert_eq!(
            mapped.records,
            vec![Line {
                name: "bolt".into(),
                qty: 4
            }]
        );
        assert!(mapped.errors.is_empty());
    }

    #[test]
    fn bad_cell_keeps_row() {
        let sheet = Sheet::from_rows(vec![
            vec![Cell::from("name"), Cell::from("qty")],
            vec![Cell::from("nut"), Cell::from("many")],
        ]);
        let mapped = map_sheet(&sheet, &schema());
        assert_eq!(mapped.records.len(), 1);
        assert_eq!(mapped.records[0].name, "nut");
        assert_eq!(mapped.records[0].qty, 0);
        assert_eq!(mapped.errors.len(), 1);
        assert_eq!(mapped.errors[0].row, 1);
        assert_eq!(mapped.errors[0].column, 1);
        assert_eq!(mapped.errors[0].field, "qty");
    }

    #[test]
    fn blank_row_is_emitted_as_default() {
        let sheet = Sheet::from_rows(vec![
            vec![Cell::from("name"), Cell::from("qty")],
            vec![Cell::Empty, Cell::Empty],
        ]);
        let mapped = map_sheet(&sheet, &schema());
        assert_eq!(mapped.records, vec![Line::default()]);
        assert!(mapped.errors.is_empty());
    }

    #[test]
    fn missing_required_is_reported() {
        let sheet = Sheet::from_rows(vec![
            vec![Cell::from("name"), Cell::from("qty")],
            vec![Cell::Empty, Cell::from("3")],
        ]);
        let mapped = map_sheet(&sheet, &schema());
        assert_eq!(mapped.records[0].qty, 3);
        assert_eq!(mapped.errors.len(), 1);
        assert_eq!(mapped.errors[0].field, "name");
    }
}
