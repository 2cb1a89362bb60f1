use reqwest::blocking::{Client, multipart::Form};
use std::time::Duration;

use super::Mailer;
use crate::core::{EmailDetails, RechnungError};

/// Posts invoice emails to an HTTP mail relay as a multipart form with the
/// fields `from`, `to`, `subject`, `html` and the file part `attachment`.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RechnungError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RechnungError::Mail(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: None,
        })
    }

    /// Authenticate against the relay with a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl Mailer for HttpMailer {
    fn send(&self, email: &EmailDetails) -> Result<(), RechnungError> {
        let form = Form::new()
            .text("from", email.from.clone())
            .text("to", email.to.clone())
            .text("subject", email.subject.clone())
            .text("html", email.body_html.clone())
            .file("attachment", &email.attachment)
            .map_err(|e| RechnungError::io(&email.attachment, e))?;

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| RechnungError::Mail(format!("network error: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RechnungError::Mail(format!("HTTP {status}: {body}")));
        }
        Ok(())
    }
}
