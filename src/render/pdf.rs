use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};

use super::DocumentConverter;
use crate::core::RechnungError;
use crate::sheet::{Sheet, read_sheet};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 9;
const LEADING: i64 = 12;

/// Converts a rendered invoice sheet into a plain A4 PDF next to it.
///
/// Each non-empty sheet row becomes one line of monospaced text; cells are
/// separated by two spaces. Characters outside Latin-1 print as `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfConverter;

impl DocumentConverter for PdfConverter {
    fn convert(&self, document: &Path) -> Result<PathBuf, RechnungError> {
        let sheet = read_sheet(document)
            .map_err(|e| RechnungError::Convert(format!("{}: {e}", document.display())))?;
        let bytes = sheet_to_pdf(&sheet)?;

        let target = document.with_extension("pdf");
        std::fs::write(&target, bytes).map_err(|e| RechnungError::io(&target, e))?;
        tracing::info!(path = %target.display(), "invoice converted to PDF");
        Ok(target)
    }
}

/// Lay out sheet rows as text lines, paginating as needed.
pub fn sheet_to_pdf(sheet: &Sheet) -> Result<Vec<u8>, RechnungError> {
    let lines: Vec<String> = sheet
        .rows
        .iter()
        .filter(|row| !row.is_blank())
        .map(|row| {
            row.cells
                .iter()
                .map(ToString::to_string)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect();

    let lines_per_page = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![&lines[..]]
    } else {
        lines.chunks(lines_per_page).collect()
    };
    for chunk in chunks {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
            Operation::new("TL", vec![LEADING.into()]),
            Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
        ];
        for line in chunk {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(to_latin1(line))],
            ));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations }
            .encode()
            .map_err(|e| RechnungError::Convert(format!("failed to encode page: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| RechnungError::Convert(format!("failed to save PDF: {e}")))?;
    Ok(output)
}

fn to_latin1(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Cell;

    #[test]
    fn latin1_replaces_wide_chars() {
        assert_eq!(to_latin1("Brașov é"), b"Bra?ov \xe9".to_vec());
    }

    #[test]
    fn produces_loadable_pdf() {
        let sheet = Sheet::from_rows(vec![
            vec![Cell::from("FACTURA"), Cell::from("A-24-8")],
            vec![],
            vec![Cell::from("Acme SRL")],
        ]);
        let bytes = sheet_to_pdf(&sheet).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn paginates_long_sheets() {
        let rows = (0..150).map(|i| vec![Cell::Int(i)]).collect();
        let bytes = sheet_to_pdf(&Sheet::from_rows(rows)).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn converts_file_next_to_document() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("invoice_Bob.csv");
        std::fs::write(&csv, "FACTURA,A-24-8\n").unwrap();
        let pdf = PdfConverter.convert(&csv).unwrap();
        assert_eq!(pdf, dir.path().join("invoice_Bob.pdf"));
        assert!(pdf.exists());
    }
}
