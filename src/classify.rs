//! Shape detection for metadata response bodies.
//!
//! The metadata service does not say what kind of resource a path is. A body
//! is a directory listing, a JSON document, or a plain value, and the only way
//! to tell is to look at it. [`classify`] applies these checks in a fixed
//! order and never touches the network.

/// Marker at the start of a PEM block.
const PEM_BEGIN: &str = "-----BEGIN";

/// Marker at the end of a PEM block.
const PEM_END: &str = "-----END";

/// One line of a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    /// The child's key in the resulting map (one trailing `/` removed).
    pub name: &'a str,
    /// The line as listed, appended verbatim to the parent path.
    pub segment: &'a str,
}

impl<'a> Entry<'a> {
    fn from_line(line: &'a str) -> Self {
        Self {
            name: line.strip_suffix('/').unwrap_or(line),
            segment: line,
        }
    }
}

/// The shape of a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<'a> {
    /// A listing of child resources.
    Directory(Vec<Entry<'a>>),
    /// A JSON object or array, not yet parsed.
    Structured(&'a str),
    /// Anything else, including PEM blocks.
    Scalar(&'a str),
}

/// Classify a response body.
///
/// A body ending in `/` is always a listing. A multi-line body is a listing
/// unless it looks like JSON or PEM. Of what remains, JSON-looking bodies are
/// structured and everything else is a scalar.
pub fn classify(content: &str) -> Payload<'_> {
    if content.ends_with('/')
        || (content.contains('\n') && !is_structured(content) && !is_pem(content))
    {
        let entries = content
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(Entry::from_line)
            .collect();
        return Payload::Directory(entries);
    }

    if is_structured(content) {
        return Payload::Structured(content);
    }

    Payload::Scalar(content)
}

/// Whether the body is bracketed like a JSON object or array.
pub fn is_structured(content: &str) -> bool {
    let trimmed = content.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

/// Whether the body carries certificate or key material.
pub fn is_pem(content: &str) -> bool {
    content.contains(PEM_BEGIN) || content.contains(PEM_END)
}
