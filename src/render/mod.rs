//! Invoice document rendering and conversion.
//!
//! A [`Renderer`] saves one filled invoice document; its success or failure
//! decides whether the reserved serial number stands. A [`DocumentConverter`]
//! derives a distributable copy afterwards; its failures never undo an invoice.

#[cfg(feature = "pdf")]
mod pdf;
mod template;

use std::path::{Path, PathBuf};

use crate::core::{InvoiceRecord, RechnungError};

#[cfg(feature = "pdf")]
pub use pdf::{PdfConverter, sheet_to_pdf};
pub use template::TemplateRenderer;

/// Fills and saves one invoice document.
pub trait Renderer: Send + Sync {
    /// Extension of saved documents, without the dot.
    fn extension(&self) -> &str;

    /// Save the document for `record` at `target` and return the saved path.
    fn render(&self, record: &InvoiceRecord<'_>, target: &Path) -> Result<PathBuf, RechnungError>;
}

/// Converts a saved document into a distributable format.
pub trait DocumentConverter: Send + Sync {
    fn convert(&self, document: &Path) -> Result<PathBuf, RechnungError>;
}
