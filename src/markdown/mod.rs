//! Markdown section model.
//!
//! A document is treated as a flat, ordered sequence of heading-delimited
//! sections. Nesting is implicit: a section's content run extends until the
//! next heading whose level is less than or equal to its own, or to the end of
//! the document. Everything here is a pure function over text.
//!
//! Lines are obtained by splitting on `\n`, so joining them back with `\n`
//! reproduces the input byte-for-byte (CRLF documents keep their `\r`).
//!
//! # Example
//!
//! ```
//! use docsmith::markdown::{self, UpdateMode};
//!
//! let text = "# Title\n\n## Problem Statement\n\nold\n";
//! let sections = markdown::parse(text);
//! let target = markdown::locate(&sections, "problem statement").unwrap();
//!
//! let lines = markdown::split_lines(text);
//! let updated = markdown::apply(lines, target, "new", UpdateMode::Replace);
//! assert_eq!(markdown::join_lines(&updated), "# Title\n\n## Problem Statement\n\nnew\n");
//! ```

mod frontmatter;
mod section;
mod splice;

pub use frontmatter::Document;
pub(crate) use frontmatter::compose;
pub(crate) use section::{fence_marker, heading};
pub use section::{MatchRank, Section, locate, match_rank, normalize_title, parse};
pub use splice::{UpdateMode, apply, create_section, header_level, nest_content, normalize_header};

/// Split text into lines on `\n`, keeping a trailing empty line when the text
/// ends with a newline.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// Inverse of [`split_lines`].
pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}
