//! Invoice email delivery.
//!
//! Mail failures are reported and logged by the orchestrator; they never roll
//! back an invoice that was already saved.

#[cfg(feature = "mail")]
mod http;

use crate::core::{EmailDetails, RechnungError};

#[cfg(feature = "mail")]
pub use http::HttpMailer;

/// Sends one invoice email.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &EmailDetails) -> Result<(), RechnungError>;
}
