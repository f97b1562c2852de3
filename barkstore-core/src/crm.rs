//! CRM form forwarding.
//!
//! Contact and newsletter submissions are relayed to the hosted forms API.
//! The relay is fire-and-forget from the storefront's point of view: the
//! HTTP handler responds immediately and a failed relay is only logged.

use compact_str::CompactString;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while relaying a form submission.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("form submission request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("form endpoint returned status {0}")]
    Status(u16),
}

/// One form field, name/value as the forms API expects.
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: CompactString,
    pub value: String,
}

impl FormField {
    pub fn new(name: impl Into<CompactString>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Client for the hosted forms API.
pub struct CrmClient {
    http: reqwest::Client,
    base_url: String,
    portal_id: CompactString,
}

impl CrmClient {
    pub const DEFAULT_BASE_URL: &str = "https://api.hsforms.com";

    pub fn new(portal_id: impl Into<CompactString>) -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL, portal_id)
    }

    /// Point the client at a different API root (tests, proxies).
    pub fn with_base_url(base_url: impl Into<String>, portal_id: impl Into<CompactString>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.into(),
            portal_id: portal_id.into(),
        }
    }

    /// Submit one form. Callers that must not block on the relay spawn
    /// this and log the outcome.
    pub async fn submit(&self, form_id: &str, fields: Vec<FormField>) -> Result<(), CrmError> {
        #[derive(Debug, Serialize)]
        struct Submission {
            fields: Vec<FormField>,
        }

        let url = format!(
            "{}/submissions/v3/integration/submit/{}/{}",
            self.base_url, self.portal_id, form_id
        );
        let response = self
            .http
            .post(&url)
            .json(&Submission { fields })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrmError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_field_serialization() {
        let field = FormField::new("email", "shopper@example.com");
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#"{"name":"email","value":"shopper@example.com"}"#);
    }
}
