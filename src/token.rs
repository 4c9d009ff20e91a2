//! IMDSv2 session token acquisition.

use std::fmt;

use crate::client::MetadataClient;
use crate::error::MetadataError;

/// IMDSv2 token endpoint path.
pub(crate) const TOKEN_PATH: &str = "/latest/api/token";

/// Token TTL header name.
pub(crate) const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";

/// Token header name for metadata requests.
pub(crate) const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";

/// Requested token lifetime in seconds (six hours).
pub const TOKEN_TTL_SECONDS: u32 = 21600;

/// A short-lived IMDSv2 session token.
///
/// The value is kept exactly as the service returned it. It is never
/// refreshed; a walk that outlives the token sees its remaining requests
/// fail.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token value, as sent in the token header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Request a session token from the metadata service.
///
/// # Errors
///
/// Returns `MetadataError::Token` if the service answers with anything but
/// 200, or a transport error if the request cannot be made. Either is fatal
/// for the run.
pub async fn fetch_token(client: &MetadataClient) -> Result<Token, MetadataError> {
    let url = format!("{}{}", client.base_url(), TOKEN_PATH);

    let response = client
        .inner()
        .put(&url)
        .header(TOKEN_TTL_HEADER, TOKEN_TTL_SECONDS.to_string())
        .send()
        .await?;

    let status = response.status();
    if status.as_u16() != 200 {
        return Err(MetadataError::Token(status.as_u16()));
    }

    let token = response.text().await?;
    tracing::debug!(ttl = TOKEN_TTL_SECONDS, "acquired metadata session token");
    Ok(Token(token))
}
