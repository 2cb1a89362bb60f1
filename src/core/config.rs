use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::RechnungError;

/// Configuration for an invoice run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory whose subdirectories are the companies.
    pub root_dir: PathBuf,
    /// Invoice template sheet.
    pub template_path: PathBuf,
    /// Ledger file, relative to the company directory. Always written as CSV.
    pub ledger_file_name: String,
    /// First ledger row holding data; rows above it are header rows.
    pub ledger_first_data_row: u32,
    /// File-name substring identifying the supplier file.
    pub supplier_marker: String,
    /// File-name substring identifying customer files.
    pub customer_marker: String,
    /// Directory, inside each company directory, receiving generated invoices.
    pub output_dir_name: String,
    /// Process companies concurrently on a pool of worker threads.
    pub parallel: bool,
    /// Upper bound on worker threads; 0 uses the available parallelism.
    pub max_workers: usize,
    pub email: EmailConfig,
    pub layout: TemplateLayout,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            template_path: PathBuf::from("invoice_template.csv"),
            ledger_file_name: "invoice_controller.csv".into(),
            ledger_first_data_row: 1,
            supplier_marker: "supplier".into(),
            customer_marker: "customer".into(),
            output_dir_name: "generatedInvoices".into(),
            parallel: false,
            max_workers: 0,
            email: EmailConfig::default(),
            layout: TemplateLayout::default(),
        }
    }
}

impl RunConfig {
    /// Check the configuration before touching any company.
    pub fn validate(&self) -> Result<(), RechnungError> {
        if !self.template_path.is_file() {
            return Err(RechnungError::Config(format!(
                "invoice template {} does not exist",
                self.template_path.display()
            )));
        }
        let ledger = Path::new(&self.ledger_file_name);
        let is_csv = ledger
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(RechnungError::Config(format!(
                "ledger file {} must be a .csv file",
                self.ledger_file_name
            )));
        }
        if self.supplier_marker.is_empty() || self.customer_marker.is_empty() {
            return Err(RechnungError::Config(
                "supplier and customer markers must not be empty".into(),
            ));
        }
        if self.supplier_marker == self.customer_marker {
            return Err(RechnungError::Config(format!(
                "supplier and customer markers are both '{}'",
                self.supplier_marker
            )));
        }
        if self.output_dir_name.is_empty() {
            return Err(RechnungError::Config("output directory name is empty".into()));
        }
        Ok(())
    }

    /// Absolute ledger path for a company directory.
    pub fn ledger_path(&self, company_dir: &Path) -> PathBuf {
        company_dir.join(&self.ledger_file_name)
    }
}

/// Invoice email settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    /// Subject line; `{company}` is replaced by the company name.
    pub subject: String,
    pub body_html: String,
    /// HTTP mail relay receiving the messages.
    pub relay_url: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            subject: "Factura {company}".into(),
            body_html: "Buna ziua,<br/>Va trimit atasata factura pentru luna anterioara.<br/>Cu stima"
                .into(),
            relay_url: None,
        }
    }
}

impl EmailConfig {
    pub fn subject_for(&self, company: &str) -> String {
        self.subject.replace("{company}", company)
    }
}

/// Zero-based (row, column) position in a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPos {
    pub row: u32,
    pub column: u32,
}

impl CellPos {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Where the template renderer writes each value.
///
/// A party block occupies six consecutive rows in one column:
/// name, registration number, tax id, address, bank, IBAN.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    pub supplier_block: CellPos,
    pub customer_block: CellPos,
    pub identifier: CellPos,
    pub issue_date: CellPos,
    pub amount: CellPos,
    pub vat_rate: Option<CellPos>,
    /// Labels prefixed to block rows two to six.
    pub labels: [String; 5],
    /// `chrono` format of the issue date cell.
    pub date_format: String,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            supplier_block: CellPos::new(1, 0),
            customer_block: CellPos::new(1, 6),
            identifier: CellPos::new(11, 3),
            issue_date: CellPos::new(12, 3),
            amount: CellPos::new(17, 5),
            vat_rate: None,
            labels: [
                "Nr.Reg.Com".into(),
                "CIF".into(),
                "Sediu".into(),
                "Banca".into(),
                "IBAN".into(),
            ],
            date_format: "%d.%m.%Y".into(),
        }
    }
}

/// Builder for [`RunConfig`].
///
/// # Example
///
/// ```
/// use rechnungslauf::RunConfigBuilder;
///
/// let config = RunConfigBuilder::new("/srv/invoices", "/srv/invoices/template.csv")
///     .ledger_file_name("controller.csv")
///     .parallel(true)
///     .build();
/// assert!(config.parallel);
/// ```
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Create a new builder with the required root directory and template.
    pub fn new(root_dir: impl Into<PathBuf>, template_path: impl Into<PathBuf>) -> Self {
        Self {
            config: RunConfig {
                root_dir: root_dir.into(),
                template_path: template_path.into(),
                ..Default::default()
            },
        }
    }

    pub fn ledger_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.ledger_file_name = name.into();
        self
    }

    pub fn ledger_first_data_row(mut self, row: u32) -> Self {
        self.config.ledger_first_data_row = row;
        self
    }

    pub fn supplier_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.supplier_marker = marker.into();
        self
    }

    pub fn customer_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.customer_marker = marker.into();
        self
    }

    pub fn output_dir_name(mut self, name: impl Into<String>) -> Self {
        self.config.output_dir_name = name.into();
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.config.max_workers = max_workers;
        self
    }

    pub fn email(mut self, email: EmailConfig) -> Self {
        self.config.email = email;
        self
    }

    pub fn layout(mut self, layout: TemplateLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn build(self) -> RunConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_template() {
        let config = RunConfigBuilder::new("/nonexistent", "/nonexistent/template.csv").build();
        assert!(matches!(config.validate(), Err(RechnungError::Config(_))));
    }

    #[test]
    fn rejects_non_csv_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.csv");
        std::fs::write(&template, "").unwrap();
        let config = RunConfigBuilder::new(dir.path(), &template)
            .ledger_file_name("controller.xlsx")
            .build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("controller.xlsx"));
    }

    #[test]
    fn rejects_identical_markers() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.csv");
        std::fs::write(&template, "").unwrap();
        let config = RunConfigBuilder::new(dir.path(), &template)
            .supplier_marker("data")
            .customer_marker("data")
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn subject_placeholder() {
        let email = EmailConfig::default();
        assert_eq!(email.subject_for("Acme"), "Factura Acme");
    }
}
