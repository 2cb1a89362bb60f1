use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading master data, numbering or producing invoices.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RechnungError {
    /// Filesystem error with the path that caused it.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A tabular source could not be opened or has an unsupported format.
    #[error("sheet error: {0}")]
    Sheet(String),

    /// Invalid configuration, detected before any company is processed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Sequence ledger precondition violation (empty ledger, rollback without reservation).
    #[error("numbering error: {0}")]
    Numbering(String),

    /// The on-disk ledger table is malformed.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Company input error (missing or duplicate supplier file, supplier without data).
    #[error("company error: {0}")]
    Company(String),

    /// The invoice document could not be rendered or saved.
    #[error("render error: {0}")]
    Render(String),

    /// The saved document could not be converted.
    #[error("conversion error: {0}")]
    Convert(String),

    /// The invoice email could not be sent.
    #[error("mail error: {0}")]
    Mail(String),
}

impl RechnungError {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A single tolerated cell failure with its sheet coordinates.
///
/// These are never propagated; the mapper logs them and leaves the field at its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellParseError {
    /// Zero-based physical row index.
    pub row: u32,
    /// Zero-based column index.
    pub column: u32,
    /// Target field name.
    pub field: &'static str,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for CellParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[row {}, column {}] {}: {}",
            self.row, self.column, self.field, self.message
        )
    }
}
