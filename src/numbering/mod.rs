//! Per-company invoice serial numbering.
//!
//! Each company keeps a ledger table of `(serial prefix, two-digit year,
//! sequence number, issue date)` rows. The orchestrator reserves one number
//! per invoice, rolls the reservation back if the invoice could not be saved,
//! and commits the table once per company pass.

mod ledger;
mod row;

pub use ledger::SequenceLedger;
pub use row::{ISSUE_DATE_FORMAT, LedgerRow, Reservation};
