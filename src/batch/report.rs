use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

/// What happened to one customer's invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum CustomerOutcome {
    /// An invoice for this period already exists; the ledger was not touched.
    AlreadyGenerated { document: PathBuf },
    /// A new invoice was numbered and saved.
    Generated {
        identifier: String,
        document: PathBuf,
        converted: Option<PathBuf>,
        delivery: Delivery,
    },
    /// The invoice could not be saved; its number was released.
    Failed { reason: String },
}

/// Email delivery result for a generated invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum Delivery {
    /// No mailer configured or email disabled.
    Disabled,
    /// Missing addresses or the customer opted out.
    Skipped(String),
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerReport {
    pub customer: String,
    #[serde(flatten)]
    pub outcome: CustomerOutcome,
}

/// Result of one company's pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyReport {
    pub company: String,
    pub customers: Vec<CustomerReport>,
    /// Whether the ledger was written at the end of the pass.
    pub ledger_committed: bool,
    /// Set when the pass was aborted or the ledger could not be written.
    pub error: Option<String>,
}

impl CompanyReport {
    pub(crate) fn failed(company: impl Into<String>, error: impl ToString) -> Self {
        Self {
            company: company.into(),
            customers: Vec::new(),
            ledger_committed: false,
            error: Some(error.to_string()),
        }
    }

    /// Identifiers handed out in this pass, in order.
    pub fn identifiers(&self) -> Vec<&str> {
        self.customers
            .iter()
            .filter_map(|c| match &c.outcome {
                CustomerOutcome::Generated { identifier, .. } => Some(identifier.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Result of a whole run, companies in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub date: NaiveDate,
    pub companies: Vec<CompanyReport>,
}

impl RunReport {
    pub fn generated(&self) -> usize {
        self.count(|o| matches!(o, CustomerOutcome::Generated { .. }))
    }

    pub fn already_generated(&self) -> usize {
        self.count(|o| matches!(o, CustomerOutcome::AlreadyGenerated { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CustomerOutcome::Failed { .. }))
    }

    /// Companies whose pass reported an error.
    pub fn failed_companies(&self) -> impl Iterator<Item = &CompanyReport> {
        self.companies.iter().filter(|c| c.error.is_some())
    }

    pub fn company(&self, name: &str) -> Option<&CompanyReport> {
        self.companies.iter().find(|c| c.company == name)
    }

    fn count(&self, pred: impl Fn(&CustomerOutcome) -> bool) -> usize {
        self.companies
            .iter()
            .flat_map(|c| &c.customers)
            .filter(|c| pred(&c.outcome))
            .count()
    }
}
