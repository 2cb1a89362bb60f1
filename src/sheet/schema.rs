use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::cell::Cell;
use super::parser::{CellParser, DefaultParser, FieldValue};
use crate::core::RechnungError;

type Setter<R> = Box<dyn Fn(&mut R, FieldValue) -> Result<(), String> + Send + Sync>;

/// A record shape that can be read from a sheet.
pub trait SheetRecord: Default + Sized + 'static {
    /// Build the column mapping for this shape. Called once per run.
    fn schema() -> Result<RecordSchema<Self>, RechnungError>;
}

/// Binds one column to one field of `R`: which parser reads it and how the value is stored.
pub struct FieldBinding<R> {
    field: &'static str,
    parser: Arc<dyn CellParser>,
    required: bool,
    setter: Setter<R>,
}

impl<R: 'static> FieldBinding<R> {
    fn with_setter(
        field: &'static str,
        setter: impl Fn(&mut R, FieldValue) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            field,
            parser: Arc::new(DefaultParser),
            required: false,
            setter: Box::new(setter),
        }
    }

    pub fn text(field: &'static str, accessor: fn(&mut R) -> &mut String) -> Self {
        Self::with_setter(field, move |record, value| {
            *accessor(record) = value.into_text();
            Ok(())
        })
    }

    /// Text field of an embedded part of the record, e.g. a shared party block.
    pub fn nested_text<P: 'static>(
        field: &'static str,
        outer: fn(&mut R) -> &mut P,
        inner: fn(&mut P) -> &mut String,
    ) -> Self {
        Self::with_setter(field, move |record, value| {
            *inner(outer(record)) = value.into_text();
            Ok(())
        })
    }

    pub fn integer(field: &'static str, accessor: fn(&mut R) -> &mut i64) -> Self {
        Self::with_setter(field, move |record, value| {
            *accessor(record) = value.into_integer()?;
            Ok(())
        })
    }

    pub fn optional_integer(field: &'static str, accessor: fn(&mut R) -> &mut Option<i64>) -> Self {
        Self::with_setter(field, move |record, value| {
            *accessor(record) = Some(value.into_integer()?);
            Ok(())
        })
    }

    pub fn decimal(field: &'static str, accessor: fn(&mut R) -> &mut Option<Decimal>) -> Self {
        Self::with_setter(field, move |record, value| {
            *accessor(record) = Some(value.into_decimal()?);
            Ok(())
        })
    }

    pub fn flag(field: &'static str, accessor: fn(&mut R) -> &mut Option<bool>) -> Self {
        Self::with_setter(field, move |record, value| {
            *accessor(record) = Some(value.into_bool()?);
            Ok(())
        })
    }

    /// Replace the default parser.
    pub fn parser(mut self, parser: impl CellParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Mark the field as required; a row without it is reported but still emitted.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl<R> FieldBinding<R> {
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn parser_name(&self) -> &'static str {
        self.parser.name()
    }

    /// Parse `cell` and store it into `record`. On error the record is untouched.
    pub fn apply(&self, record: &mut R, cell: &Cell) -> Result<(), String> {
        let value = self.parser.parse(cell)?;
        (self.setter)(record, value)
    }
}

impl<R> fmt::Debug for FieldBinding<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("field", &self.field)
            .field("parser", &self.parser.name())
            .field("required", &self.required)
            .finish()
    }
}

/// Column index to field binding map for one record shape. Immutable once built.
#[derive(Debug)]
pub struct RecordSchema<R> {
    shape: &'static str,
    first_data_row: u32,
    bindings: BTreeMap<u32, FieldBinding<R>>,
}

impl<R> RecordSchema<R> {
    pub fn builder(shape: &'static str) -> RecordSchemaBuilder<R> {
        RecordSchemaBuilder {
            shape,
            first_data_row: 0,
            bindings: Vec::new(),
        }
    }

    /// Name of the record shape, used in log output.
    pub fn shape(&self) -> &'static str {
        self.shape
    }

    pub fn first_data_row(&self) -> u32 {
        self.first_data_row
    }

    pub fn binding(&self, column: u32) -> Option<&FieldBinding<R>> {
        self.bindings.get(&column)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (u32, &FieldBinding<R>)> {
        self.bindings.iter().map(|(col, b)| (*col, b))
    }
}

/// Builder for [`RecordSchema`].
pub struct RecordSchemaBuilder<R> {
    shape: &'static str,
    first_data_row: u32,
    bindings: Vec<(u32, FieldBinding<R>)>,
}

impl<R> RecordSchemaBuilder<R> {
    /// A header occupies row 0; data starts at row 1.
    pub fn has_header(mut self, has_header: bool) -> Self {
        self.first_data_row = u32::from(has_header);
        self
    }

    pub fn first_data_row(mut self, row: u32) -> Self {
        self.first_data_row = row;
        self
    }

    pub fn bind(mut self, column: u32, binding: FieldBinding<R>) -> Self {
        self.bindings.push((column, binding));
        self
    }

    /// Fails if two bindings claim the same column.
    pub fn build(self) -> Result<RecordSchema<R>, RechnungError> {
        let mut bindings: BTreeMap<u32, FieldBinding<R>> = BTreeMap::new();
        for (column, binding) in self.bindings {
            if let Some(existing) = bindings.get(&column) {
                return Err(RechnungError::Config(format!(
                    "schema '{}': column {column} bound to both '{}' and '{}'",
                    self.shape,
                    existing.field(),
                    binding.field()
                )));
            }
            bindings.insert(column, binding);
        }
        Ok(RecordSchema {
            shape: self.shape,
            first_data_row: self.first_data_row,
            bindings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::parser::IntegerTextParser;

    #[derive(Debug, Default)]
    struct Row {
        name: String,
        count: i64,
    }

    #[test]
    fn duplicate_column_is_config_error() {
        let err = RecordSchema::<Row>::builder("row")
            .bind(0, FieldBinding::text("name", |r: &mut Row| &mut r.name))
            .bind(0, FieldBinding::integer("count", |r: &mut Row| &mut r.count))
            .build()
            .unwrap_err();
        assert!(matches!(err, RechnungError::Config(_)));
        assert!(err.to_string().contains("'name' and 'count'"));
    }

    #[test]
    fn header_flag_sets_first_data_row() {
        let schema = RecordSchema::<Row>::builder("row")
            .has_header(true)
            .build()
            .unwrap();
        assert_eq!(schema.first_data_row(), 1);
    }

    #[test]
    fn apply_uses_bound_parser() {
        let schema = RecordSchema::<Row>::builder("row")
            .bind(0, FieldBinding::text("name", |r: &mut Row| &mut r.name).required())
            .bind(
                1,
                FieldBinding::integer("count", |r: &mut Row| &mut r.count).parser(IntegerTextParser),
            )
            .build()
            .unwrap();

        let mut row = Row::default();
        let count = schema.binding(1).unwrap();
        assert_eq!(count.parser_name(), "integer-text");
        count.apply(&mut row, &Cell::from("12")).unwrap();
        assert_eq!(row.count, 12);

        assert!(count.apply(&mut row, &Cell::from("twelve")).is_err());
        assert_eq!(row.count, 12);
        assert!(schema.binding(0).unwrap().is_required());
        assert!(schema.binding(2).is_none());
    }
}
