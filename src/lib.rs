//! # rechnungslauf
//!
//! Batch invoice generation for many companies from spreadsheet master data.
//!
//! Every company directory carries a supplier sheet, customer sheets and a
//! sequence ledger. A run fills one invoice document per customer and month,
//! numbers it gaplessly per company and year (`A-24-8`), optionally converts
//! it to PDF and emails it. Reruns within the same month are idempotent.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rechnungslauf::numbering::{LedgerRow, SequenceLedger};
//!
//! let mut ledger = SequenceLedger::from_rows(vec![LedgerRow::new("A", 24, 7, "29.11.2024")]);
//! let today = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
//!
//! let bob = ledger.reserve(today).unwrap();
//! ledger.confirm();
//! assert_eq!(bob.identifier, "A-24-8");
//!
//! // Cara's invoice failed to save: her number goes back.
//! let cara = ledger.reserve(today).unwrap();
//! assert_eq!(ledger.rollback().unwrap(), cara);
//! assert_eq!(ledger.reserve(today).unwrap().identifier, "A-24-9");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Record mapping, ledger, template renderer, orchestration |
//! | `xlsx` (default) | Read `.xlsx`, `.xls` and `.ods` master data |
//! | `pdf` | PDF conversion of rendered invoices |
//! | `mail` | Email delivery through an HTTP mail relay |
//! | `cli` | `rechnungslauf` command-line entry point |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod sheet;

#[cfg(feature = "core")]
pub mod numbering;

#[cfg(feature = "core")]
pub mod render;

#[cfg(feature = "core")]
pub mod mail;

#[cfg(feature = "core")]
pub mod batch;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
