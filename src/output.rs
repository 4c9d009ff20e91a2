//! Result document serialization.

use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::MetadataError;
use crate::node::MetadataNode;

/// Default output file, relative to the working directory.
pub const DEFAULT_OUTPUT_FILE: &str = "output.json";

/// Serialize a document as JSON indented with tabs.
pub fn to_json(document: &MetadataNode) -> Result<Vec<u8>, MetadataError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut serializer)?;
    Ok(buf)
}

/// Serialize a document and write it to `path`, replacing any existing file.
pub fn write_document(path: &Path, document: &MetadataNode) -> Result<(), MetadataError> {
    let json = to_json(document)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "wrote metadata document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::node::AbsentReason;

    #[test]
    fn test_tab_indentation() {
        let mut children = BTreeMap::new();
        children.insert(
            "hostname".to_string(),
            MetadataNode::Scalar("ip-10-0-0-1".to_string()),
        );
        children.insert(
            "public-keys".to_string(),
            MetadataNode::Absent(AbsentReason::Status(404)),
        );
        let json = to_json(&MetadataNode::Directory(children)).unwrap();

        assert_eq!(
            String::from_utf8(json).unwrap(),
            "{\n\t\"hostname\": \"ip-10-0-0-1\",\n\t\"public-keys\": null\n}"
        );
    }

    #[test]
    fn test_nested_indentation() {
        let mut inner = BTreeMap::new();
        inner.insert("x".to_string(), MetadataNode::Scalar("1".to_string()));
        let mut outer = BTreeMap::new();
        outer.insert("a".to_string(), MetadataNode::Directory(inner));
        let json = to_json(&MetadataNode::Directory(outer)).unwrap();

        assert_eq!(
            String::from_utf8(json).unwrap(),
            "{\n\t\"a\": {\n\t\t\"x\": \"1\"\n\t}\n}"
        );
    }

    #[test]
    fn test_scalar_keeps_newlines() {
        let pem = "-----BEGIN CERTIFICATE-----\nabc\n-----END CERTIFICATE-----";
        let json = to_json(&MetadataNode::Scalar(pem.to_string())).unwrap();
        let back: String = serde_json::from_slice(&json).unwrap();
        assert_eq!(back, pem);
    }
}
