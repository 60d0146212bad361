//! Front-matter handling for persisted documents.
//!
//! Rendered documents are plain text: an optional YAML front-matter block
//! opened by a `---` line and closed by a `---` or `...` line, followed by
//! the Markdown body.
//!
//! ```text
//! ---
//! title: Checkout Revamp
//! author: Dana
//! ---
//!
//! # Checkout Revamp
//! ```

use crate::error::{DocsmithError, Result};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// A document split into its front matter and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Front-matter fields. Empty when the document has no front-matter block.
    pub front_matter: BTreeMap<String, Value>,
    /// Everything after the closing `---` line, preserved exactly.
    pub body: String,
}

impl Document {
    /// Split `content` into front matter and body.
    ///
    /// Text that does not open with a `---` line is all body. An opening
    /// delimiter without a closing one is an error, as is front matter that is
    /// not a YAML mapping.
    pub fn parse(content: &str) -> Result<Self> {
        let Some((yaml, body_start)) = split_front_matter(content)? else {
            return Ok(Self {
                front_matter: BTreeMap::new(),
                body: content.to_string(),
            });
        };

        let front_matter = if yaml.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| {
                DocsmithError::UserError(format!("failed to parse front matter: {}", e))
            })?
        };

        Ok(Self {
            front_matter,
            body: content[body_start..].to_string(),
        })
    }

    /// Serialize the document back to text.
    pub fn to_text(&self) -> Result<String> {
        compose(&self.front_matter, &self.body)
    }
}

/// Compose a front-matter block and a body into document text.
///
/// An empty front-matter map produces the body alone.
pub(crate) fn compose(front_matter: &BTreeMap<String, Value>, body: &str) -> Result<String> {
    if front_matter.is_empty() {
        return Ok(body.to_string());
    }

    let yaml = serde_yaml::to_string(front_matter).map_err(|e| {
        DocsmithError::UserError(format!("failed to serialize front matter: {}", e))
    })?;

    let mut output = String::with_capacity(yaml.len() + body.len() + 8);
    output.push_str("---\n");
    output.push_str(&yaml);
    output.push_str("---\n");
    output.push_str(body);
    Ok(output)
}

pub(crate) fn is_front_matter_open(line: &str) -> bool {
    line.trim_end() == "---"
}

/// YAML allows either `---` or the end-of-document marker `...`.
pub(crate) fn is_front_matter_close(line: &str) -> bool {
    matches!(line.trim_end(), "---" | "...")
}

/// Locate the front-matter YAML and the byte offset where the body starts.
fn split_front_matter(content: &str) -> Result<Option<(&str, usize)>> {
    let first_line_end = match content.find('\n') {
        Some(pos) => pos,
        None => return Ok(None),
    };
    if !is_front_matter_open(&content[..first_line_end]) {
        return Ok(None);
    }

    let yaml_start = first_line_end + 1;
    let mut offset = yaml_start;

    for line in content[yaml_start..].split_inclusive('\n') {
        if is_front_matter_close(line) {
            return Ok(Some((&content[yaml_start..offset], offset + line.len())));
        }
        offset += line.len();
    }

    Err(DocsmithError::UserError(
        "document missing closing '---' front-matter delimiter".to_string(),
    ))
}
