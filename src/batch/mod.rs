//! Invoice run orchestration.
//!
//! Errors are contained at the narrowest level they belong to:
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Cell parse | logged, field left at default |
//! | Render or save | reservation rolled back, next customer |
//! | Conversion or email | logged, invoice stands |
//! | Supplier file or ledger | company skipped |
//! | Configuration | run refused at [`InvoiceRun::new`] |

mod report;
mod roster;
mod run;

pub use report::{CompanyReport, CustomerOutcome, CustomerReport, Delivery, RunReport};
pub use roster::{RosterEntry, company_dirs};
pub use run::InvoiceRun;
