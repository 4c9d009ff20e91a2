//! Walk the EC2 instance metadata service (IMDSv2) and capture it as one JSON document.
//!
//! The metadata service exposes a filesystem-like namespace. A path answers
//! with a listing of children, a JSON document, or a plain value (PEM blocks
//! included), and nothing in the response says which. This crate obtains a
//! session token, walks the namespace depth-first, classifies every body and
//! rebuilds the tree in memory.
//!
//! # Features
//!
//! - IMDSv2 session token with a six hour lifetime
//! - Directory listings, JSON documents, and multi-line certificates told apart by shape
//! - Per-node failures become explicit absent nodes instead of aborting the walk
//! - Optional depth and response size limits
//! - Tab-indented JSON output
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//!
//! use imds_dump::{output, InstanceMetadata, MetadataError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), MetadataError> {
//!     let imds = InstanceMetadata::new()?;
//!
//!     // Whole tree
//!     let document = imds.dump(None).await?;
//!
//!     // Or a single subtree, wrapped as {"iam/": ...}
//!     let iam = imds.dump(Some("iam/")).await?;
//!
//!     output::write_document(Path::new("output.json"), &document)?;
//!     Ok(())
//! }
//! ```
//!
//! # Classification
//!
//! | Body | Node |
//! |------|------|
//! | Ends with `/` | Directory |
//! | Several lines, not JSON, not PEM | Directory |
//! | `{...}` or `[...]` | Structured (absent if it does not parse) |
//! | Anything else | Scalar |

pub mod classify;
mod client;
mod error;
mod metadata;
mod node;
pub mod output;
mod token;

pub use client::{MetadataClient, DEFAULT_BASE_URL};
pub use error::MetadataError;
pub use metadata::{InstanceMetadata, DEFAULT_MAX_DEPTH};
pub use node::{AbsentReason, MetadataNode};
pub use token::{fetch_token, Token, TOKEN_TTL_SECONDS};
