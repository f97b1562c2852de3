//! Typed HTTP client for the storefront API.

mod storefront;

pub use storefront::StorefrontClient;

use serde::de::DeserializeOwned;

/// Errors returned by the storefront client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Deserialize a 2xx response body, or surface the status and body.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.json().await?)
}
