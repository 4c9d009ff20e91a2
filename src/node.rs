//! The in-memory metadata tree.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, Serializer};

use crate::error::MetadataError;

/// Why a node has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbsentReason {
    /// The service answered with a non-200 status.
    Status(u16),
    /// The request could not be sent or the body could not be read.
    Transport,
    /// The request timed out.
    Timeout,
    /// The body looked like JSON but did not parse.
    InvalidJson,
    /// The body exceeded the configured size limit.
    TooLarge,
    /// The node lies deeper than the configured depth limit and was not fetched.
    DepthLimit,
}

impl fmt::Display for AbsentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbsentReason::Status(code) => write!(f, "http {}", code),
            AbsentReason::Transport => write!(f, "transport error"),
            AbsentReason::Timeout => write!(f, "timeout"),
            AbsentReason::InvalidJson => write!(f, "invalid json"),
            AbsentReason::TooLarge => write!(f, "response too large"),
            AbsentReason::DepthLimit => write!(f, "depth limit reached"),
        }
    }
}

impl From<&MetadataError> for AbsentReason {
    fn from(err: &MetadataError) -> Self {
        match err {
            MetadataError::Http(code) | MetadataError::Token(code) => AbsentReason::Status(*code),
            MetadataError::Timeout => AbsentReason::Timeout,
            MetadataError::Json(_) => AbsentReason::InvalidJson,
            MetadataError::TooLarge(..) => AbsentReason::TooLarge,
            MetadataError::Request(_) | MetadataError::Io(_) => AbsentReason::Transport,
        }
    }
}

/// One node of the metadata tree.
///
/// Serializes to the JSON a consumer expects: directories become objects,
/// structured values are emitted as-is, scalars become strings and absent
/// nodes become `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataNode {
    /// A directory, keyed by child name.
    Directory(BTreeMap<String, MetadataNode>),
    /// A JSON object or array returned by the service.
    Structured(serde_json::Value),
    /// A plain value or PEM block, verbatim.
    Scalar(String),
    /// A node that could not be fetched or parsed.
    Absent(AbsentReason),
}

impl MetadataNode {
    /// Look up a direct child of a directory node.
    pub fn get(&self, name: &str) -> Option<&MetadataNode> {
        match self {
            MetadataNode::Directory(children) => children.get(name),
            _ => None,
        }
    }

    /// The scalar value, if this is a scalar node.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataNode::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, MetadataNode::Absent(_))
    }

    /// Count the absent nodes in this subtree.
    pub fn absent_count(&self) -> usize {
        match self {
            MetadataNode::Directory(children) => {
                children.values().map(MetadataNode::absent_count).sum()
            }
            MetadataNode::Absent(_) => 1,
            _ => 0,
        }
    }
}

impl Serialize for MetadataNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetadataNode::Directory(children) => children.serialize(serializer),
            MetadataNode::Structured(value) => value.serialize(serializer),
            MetadataNode::Scalar(value) => serializer.serialize_str(value),
            MetadataNode::Absent(_) => serializer.serialize_unit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> MetadataNode {
        let mut placement = BTreeMap::new();
        placement.insert(
            "availability-zone".to_string(),
            MetadataNode::Scalar("us-east-1a".to_string()),
        );
        placement.insert(
            "region".to_string(),
            MetadataNode::Absent(AbsentReason::Status(404)),
        );

        let mut root = BTreeMap::new();
        root.insert("placement".to_string(), MetadataNode::Directory(placement));
        root.insert(
            "info".to_string(),
            MetadataNode::Structured(json!({"Code": "Success"})),
        );
        MetadataNode::Directory(root)
    }

    #[test]
    fn test_serialize_tree() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "info": {"Code": "Success"},
                "placement": {
                    "availability-zone": "us-east-1a",
                    "region": null
                }
            })
        );
    }

    #[test]
    fn test_absent_serializes_to_null() {
        for reason in [
            AbsentReason::Transport,
            AbsentReason::InvalidJson,
            AbsentReason::DepthLimit,
        ] {
            let value = serde_json::to_value(MetadataNode::Absent(reason)).unwrap();
            assert!(value.is_null());
        }
    }

    #[test]
    fn test_accessors() {
        let tree = sample();
        let placement = tree.get("placement").unwrap();
        assert_eq!(
            placement.get("availability-zone").and_then(MetadataNode::as_str),
            Some("us-east-1a")
        );
        assert!(placement.get("region").unwrap().is_absent());
        assert!(tree.get("missing").is_none());
        assert_eq!(tree.absent_count(), 1);
    }

    #[test]
    fn test_reason_from_error() {
        assert_eq!(
            AbsentReason::from(&MetadataError::Http(401)),
            AbsentReason::Status(401)
        );
        assert_eq!(
            AbsentReason::from(&MetadataError::TooLarge(10, 5)),
            AbsentReason::TooLarge
        );
        assert_eq!(
            AbsentReason::from(&MetadataError::Timeout),
            AbsentReason::Timeout
        );
        assert_eq!(AbsentReason::Status(500).to_string(), "http 500");
    }
}
