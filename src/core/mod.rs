//! Core data model, configuration and error types.
//!
//! Suppliers and customers are read from company master data sheets;
//! [`RunConfig`] describes where that data lives and how invoices are laid out.

mod config;
mod error;
mod records;
mod types;

pub use config::*;
pub use error::*;
pub use types::*;
