use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identity and banking details shared by suppliers and customers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    /// Legal name, also used in the output file name for customers.
    pub name: String,
    /// Trade register number.
    pub registration_number: String,
    /// Tax identification number.
    pub tax_id: String,
    /// Registered office address.
    pub address: String,
    /// Bank name.
    pub bank: String,
    /// Account IBAN.
    pub account_iban: String,
}

/// The issuing party of a company's invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub collaborator: Collaborator,
    /// Sender address for invoice emails.
    pub contact_email: String,
}

/// An invoiced party with the amount to bill this period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub collaborator: Collaborator,
    /// Amount in the smallest unit the template expects; no currency semantics.
    pub invoice_amount: i64,
    /// Recipient address for invoice emails.
    pub contact_email: String,
    /// VAT rate in percent, if the master data carries one.
    pub vat_rate: Option<Decimal>,
    /// Explicit opt-in/opt-out for email delivery. `None` means deliver.
    pub send_by_email: Option<bool>,
}

impl Supplier {
    pub fn name(&self) -> &str {
        &self.collaborator.name
    }
}

impl Customer {
    pub fn name(&self) -> &str {
        &self.collaborator.name
    }

    /// Whether this customer wants the invoice by email.
    pub fn wants_email(&self) -> bool {
        self.send_by_email.unwrap_or(true)
    }
}

/// One company directory: exactly one supplier and the customers it bills.
///
/// Built once per run; the customer list is never mutated after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    /// Directory name, also the company identifier.
    pub name: String,
    /// Company directory.
    pub dir: PathBuf,
    pub supplier: Supplier,
    pub customers: Vec<Customer>,
}

/// Everything a renderer needs to fill one invoice document.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRecord<'a> {
    pub company: &'a str,
    pub supplier: &'a Supplier,
    pub customer: &'a Customer,
    /// Reserved serial, e.g. "A-24-8".
    pub identifier: String,
    pub issue_date: NaiveDate,
}

/// Arguments for one outgoing invoice email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDetails {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body_html: String,
    pub attachment: PathBuf,
}
