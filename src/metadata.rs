//! InstanceMetadata struct and the recursive tree walk.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use crate::classify::{classify, Payload};
use crate::client::{read_body_limited, MetadataClient};
use crate::error::MetadataError;
use crate::node::{AbsentReason, MetadataNode};
use crate::token::{self, Token, TOKEN_HEADER};

/// Metadata namespace root path.
const METADATA_PATH: &str = "/latest/meta-data";

/// Default limit on directory nesting below the starting path.
pub const DEFAULT_MAX_DEPTH: usize = 64;

type NodeFuture<'a> = Pin<Box<dyn Future<Output = MetadataNode> + Send + 'a>>;

/// Walks the instance metadata namespace and rebuilds it as a [`MetadataNode`] tree.
///
/// # Example
///
/// ```ignore
/// use imds_dump::{InstanceMetadata, MetadataError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), MetadataError> {
///     let imds = InstanceMetadata::new()?;
///     let token = imds.fetch_token().await?;
///     let placement = imds.fetch(&token, "placement/").await;
///     println!("{}", serde_json::to_string_pretty(&placement)?);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct InstanceMetadata {
    client: MetadataClient,
    max_depth: usize,
    max_size: Option<usize>,
}

impl InstanceMetadata {
    /// Create an instance for the well-known link-local endpoint.
    pub fn new() -> Result<Self, MetadataError> {
        Ok(Self::from_client(MetadataClient::with_default_base_url()?))
    }

    /// Create an instance with a custom base URL.
    ///
    /// This is primarily useful for testing with mock servers.
    pub fn with_base_url(base_url: &str) -> Result<Self, MetadataError> {
        Ok(Self::from_client(MetadataClient::with_base_url(base_url)?))
    }

    /// Create an instance around an already configured client.
    pub fn from_client(client: MetadataClient) -> Self {
        Self {
            client,
            max_depth: DEFAULT_MAX_DEPTH,
            max_size: None,
        }
    }

    /// Set how many directory levels below the starting path are fetched.
    ///
    /// Children past the limit are not requested and come back as
    /// [`AbsentReason::DepthLimit`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum size limit for a single response body.
    ///
    /// Oversized nodes come back as [`AbsentReason::TooLarge`].
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn client(&self) -> &MetadataClient {
        &self.client
    }

    /// Request a session token for this run.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint is unreachable or rejects the request.
    pub async fn fetch_token(&self) -> Result<Token, MetadataError> {
        token::fetch_token(&self.client).await
    }

    /// Fetch the subtree at `path`.
    ///
    /// This never fails: a node that cannot be fetched or parsed becomes
    /// [`MetadataNode::Absent`] and the rest of the walk carries on.
    pub async fn fetch(&self, token: &Token, path: &str) -> MetadataNode {
        self.walk(token, path.to_string(), 0).await
    }

    /// Build the document for a run.
    ///
    /// Without a key (or with an empty one) this is the whole tree. With a key
    /// it is a single-entry directory mapping the key to its subtree.
    pub async fn document(&self, token: &Token, key: Option<&str>) -> MetadataNode {
        match key.filter(|key| !key.is_empty()) {
            Some(key) => {
                let node = self.fetch(token, key).await;
                MetadataNode::Directory(BTreeMap::from([(key.to_string(), node)]))
            }
            None => self.fetch(token, "").await,
        }
    }

    /// Acquire a token and build the document.
    ///
    /// # Errors
    ///
    /// Only token acquisition can fail. No metadata request is made in that case.
    pub async fn dump(&self, key: Option<&str>) -> Result<MetadataNode, MetadataError> {
        let token = self.fetch_token().await?;
        let document = self.document(&token, key).await;
        let absent = document.absent_count();
        if absent > 0 {
            tracing::info!(absent, "metadata tree has unavailable nodes");
        }
        Ok(document)
    }

    fn walk<'a>(&'a self, token: &'a Token, path: String, depth: usize) -> NodeFuture<'a> {
        Box::pin(async move {
            let content = match self.fetch_raw(token, &path).await {
                Ok(content) => content,
                Err(err) => {
                    tracing::debug!(path = %path, error = %err, "metadata node unavailable");
                    return MetadataNode::Absent(AbsentReason::from(&err));
                }
            };

            match classify(&content) {
                Payload::Directory(entries) => {
                    let mut children = BTreeMap::new();
                    for entry in entries {
                        let child_path = format!("{}{}", path, entry.segment);
                        let node = if depth >= self.max_depth {
                            tracing::warn!(
                                path = %child_path,
                                max_depth = self.max_depth,
                                "skipping metadata node past depth limit"
                            );
                            MetadataNode::Absent(AbsentReason::DepthLimit)
                        } else {
                            self.walk(token, child_path, depth + 1).await
                        };
                        children.insert(entry.name.to_string(), node);
                    }
                    MetadataNode::Directory(children)
                }
                Payload::Structured(raw) => match serde_json::from_str(raw) {
                    Ok(value) => MetadataNode::Structured(value),
                    Err(err) => {
                        tracing::debug!(path = %path, error = %err, "metadata node is not valid json");
                        MetadataNode::Absent(AbsentReason::InvalidJson)
                    }
                },
                Payload::Scalar(raw) => MetadataNode::Scalar(raw.to_string()),
            }
        })
    }

    async fn fetch_raw(&self, token: &Token, path: &str) -> Result<String, MetadataError> {
        let url = format!("{}{}/{}", self.client.base_url(), METADATA_PATH, path);
        tracing::trace!(url = %url, "fetching metadata node");

        let response = self
            .client
            .inner()
            .get(&url)
            .header(TOKEN_HEADER, token.as_str())
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(MetadataError::Http(status.as_u16()));
        }

        let body = read_body_limited(response, self.max_size).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constructor() {
        let imds = InstanceMetadata::new().unwrap();
        assert_eq!(imds.client().base_url(), "http://169.254.169.254");
        assert_eq!(imds.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_with_base_url() {
        let imds = InstanceMetadata::with_base_url("http://localhost:8080/").unwrap();
        assert_eq!(imds.client().base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_builder_options() {
        let imds = InstanceMetadata::with_base_url("http://localhost:8080")
            .unwrap()
            .with_max_depth(3)
            .with_max_size(1024);
        assert_eq!(imds.max_depth(), 3);
        assert_eq!(imds.max_size, Some(1024));
    }

    #[test]
    fn test_metadata_path() {
        assert_eq!(METADATA_PATH, "/latest/meta-data");
    }
}
