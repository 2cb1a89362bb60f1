use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use super::Renderer;
use crate::core::{CellPos, Collaborator, InvoiceRecord, RechnungError, TemplateLayout};
use crate::sheet::{Cell, Sheet, read_sheet, write_csv};

/// Fills a copy of the template sheet with supplier, customer and serial data
/// and saves it as CSV.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    template: Sheet,
    layout: TemplateLayout,
}

impl TemplateRenderer {
    pub fn new(template: Sheet, layout: TemplateLayout) -> Self {
        Self { template, layout }
    }

    /// Load the template once per run. A missing template is a configuration error.
    pub fn load(path: &Path, layout: TemplateLayout) -> Result<Self, RechnungError> {
        let template = read_sheet(path).map_err(|e| {
            RechnungError::Config(format!("cannot load invoice template: {e}"))
        })?;
        Ok(Self::new(template, layout))
    }

    /// The filled sheet, before it is written anywhere.
    pub fn fill(&self, record: &InvoiceRecord<'_>) -> Sheet {
        let layout = &self.layout;
        let mut sheet = self.template.clone();

        write_block(
            &mut sheet,
            layout.supplier_block,
            &layout.labels,
            &record.supplier.collaborator,
        );
        write_block(
            &mut sheet,
            layout.customer_block,
            &layout.labels,
            &record.customer.collaborator,
        );

        put(&mut sheet, layout.identifier, Cell::from(record.identifier.as_str()));
        put(
            &mut sheet,
            layout.issue_date,
            Cell::from(record.issue_date.format(&layout.date_format).to_string()),
        );
        put(&mut sheet, layout.amount, Cell::Int(record.customer.invoice_amount));

        if let (Some(pos), Some(rate)) = (layout.vat_rate, record.customer.vat_rate) {
            put(&mut sheet, pos, Cell::from(format_percent(rate)));
        }
        sheet
    }
}

impl Renderer for TemplateRenderer {
    fn extension(&self) -> &str {
        "csv"
    }

    fn render(&self, record: &InvoiceRecord<'_>, target: &Path) -> Result<PathBuf, RechnungError> {
        let sheet = self.fill(record);
        write_csv(target, &sheet)
            .map_err(|e| RechnungError::Render(format!("{}: {e}", target.display())))?;
        Ok(target.to_path_buf())
    }
}

fn put(sheet: &mut Sheet, pos: CellPos, value: Cell) {
    sheet.set(pos.row, pos.column, value);
}

fn write_block(sheet: &mut Sheet, origin: CellPos, labels: &[String; 5], party: &Collaborator) {
    put(sheet, origin, Cell::from(party.name.as_str()));
    let values = [
        &party.registration_number,
        &party.tax_id,
        &party.address,
        &party.bank,
        &party.account_iban,
    ];
    for (offset, (label, value)) in labels.iter().zip(values).enumerate() {
        let pos = CellPos::new(origin.row + 1 + offset as u32, origin.column);
        put(sheet, pos, Cell::from(format!("{label}: {value}")));
    }
}

fn format_percent(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Customer, Supplier};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn parties() -> (Supplier, Customer) {
        let supplier = Supplier {
            collaborator: Collaborator {
                name: "Acme SRL".into(),
                registration_number: "J40/1/2020".into(),
                tax_id: "RO123".into(),
                address: "Bucuresti".into(),
                bank: "BT".into(),
                account_iban: "RO49AAAA".into(),
            },
            contact_email: "office@acme.ro".into(),
        };
        let customer = Customer {
            collaborator: Collaborator {
                name: "Bob".into(),
                tax_id: "RO9".into(),
                ..Default::default()
            },
            invoice_amount: 1500,
            vat_rate: Some(dec!(19.00)),
            ..Default::default()
        };
        (supplier, customer)
    }

    #[test]
    fn fills_layout_cells() {
        let (supplier, customer) = parties();
        let layout = TemplateLayout {
            vat_rate: Some(CellPos::new(18, 5)),
            ..Default::default()
        };
        let renderer = TemplateRenderer::new(Sheet::default(), layout);
        let record = InvoiceRecord {
            company: "acme",
            supplier: &supplier,
            customer: &customer,
            identifier: "A-24-8".into(),
            issue_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        let sheet = renderer.fill(&record);

        assert_eq!(sheet.get(1, 0), Some(&Cell::from("Acme SRL")));
        assert_eq!(sheet.get(2, 0), Some(&Cell::from("Nr.Reg.Com: J40/1/2020")));
        assert_eq!(sheet.get(3, 6), Some(&Cell::from("CIF: RO9")));
        assert_eq!(sheet.get(6, 0), Some(&Cell::from("IBAN: RO49AAAA")));
        assert_eq!(sheet.get(11, 3), Some(&Cell::from("A-24-8")));
        assert_eq!(sheet.get(12, 3), Some(&Cell::from("01.06.2024")));
        assert_eq!(sheet.get(17, 5), Some(&Cell::Int(1500)));
        assert_eq!(sheet.get(18, 5), Some(&Cell::from("19%")));
    }

    #[test]
    fn keeps_template_content() {
        let (supplier, customer) = parties();
        let template = Sheet::from_rows(vec![vec![Cell::from("FACTURA")]]);
        let renderer = TemplateRenderer::new(template, TemplateLayout::default());
        let record = InvoiceRecord {
            company: "acme",
            supplier: &supplier,
            customer: &customer,
            identifier: "A-24-8".into(),
            issue_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        assert_eq!(renderer.fill(&record).get(0, 0), Some(&Cell::from("FACTURA")));
    }

    #[test]
    fn render_into_missing_directory_fails() {
        let (supplier, customer) = parties();
        let renderer = TemplateRenderer::new(Sheet::default(), TemplateLayout::default());
        let record = InvoiceRecord {
            company: "acme",
            supplier: &supplier,
            customer: &customer,
            identifier: "A-24-8".into(),
            issue_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        let err = renderer
            .render(&record, Path::new("/nonexistent/dir/invoice_Bob.csv"))
            .unwrap_err();
        assert!(matches!(err, RechnungError::Render(_)));
    }
}
