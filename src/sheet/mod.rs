//! Tabular sources and the declarative row-to-record mapper.
//!
//! A [`RecordSchema`] binds column indices to record fields, each through a
//! [`CellParser`]. [`read_first_sheet`] applies it to every data row of the
//! first sheet of a CSV file or, with the `xlsx` feature, a workbook.
//!
//! # Example
//!
//! ```
//! use rechnungslauf::sheet::*;
//!
//! #[derive(Default)]
//! struct Rate {
//!     code: String,
//!     percent: Option<rust_decimal::Decimal>,
//! }
//!
//! let schema = RecordSchema::builder("rate")
//!     .has_header(true)
//!     .bind(0, FieldBinding::text("code", |r: &mut Rate| &mut r.code))
//!     .bind(1, FieldBinding::decimal("percent", |r: &mut Rate| &mut r.percent).parser(PercentageParser))
//!     .build()
//!     .unwrap();
//!
//! let sheet = parse_csv("code,rate\nS,0.19\n".as_bytes()).unwrap();
//! let rates = map_sheet(&sheet, &schema).records;
//! assert_eq!(rates[0].percent, Some(rust_decimal::Decimal::from(19)));
//! ```

mod cell;
mod csv_io;
mod mapper;
mod parser;
mod schema;
#[cfg(feature = "xlsx")]
mod xlsx;

use std::path::Path;

pub use cell::{Cell, Sheet, SheetRow};
pub use csv_io::{parse_csv, read_csv, write_csv};
pub use mapper::{Mapped, map_sheet, read_first_sheet};
pub use parser::{
    CellParser, DefaultParser, FieldValue, IntegerTextParser, LocalizedYesNoParser,
    PercentageParser,
};
pub use schema::{FieldBinding, RecordSchema, RecordSchemaBuilder, SheetRecord};

use crate::core::RechnungError;

/// File extensions accepted as tabular sources with the enabled features.
pub fn is_tabular(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("csv"))
        || (cfg!(feature = "xlsx")
            && matches!(
                extension(path).as_deref(),
                Some("xlsx" | "xlsm" | "xls" | "ods")
            ))
}

/// Open the first sheet of a tabular source, choosing the reader by extension.
pub fn read_sheet(path: &Path) -> Result<Sheet, RechnungError> {
    match extension(path).as_deref() {
        Some("csv") => read_csv(path),
        #[cfg(feature = "xlsx")]
        Some("xlsx" | "xlsm" | "xls" | "ods") => xlsx::read_workbook(path),
        _ => Err(RechnungError::Sheet(format!(
            "unsupported sheet format: {}",
            path.display()
        ))),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_is_tabular() {
        assert!(is_tabular(Path::new("acme/customer_bob.CSV")));
        assert!(!is_tabular(Path::new("acme/notes.txt")));
    }

    #[test]
    fn unsupported_extension() {
        let err = read_sheet(Path::new("acme/customer.txt")).unwrap_err();
        assert!(matches!(err, RechnungError::Sheet(_)));
    }
}
