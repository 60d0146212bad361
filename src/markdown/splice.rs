//! Splicing content into sections.
//!
//! Blank lines at the start and end of a content run are padding: they keep
//! the body visually separated from its heading and from the next heading.
//! All insertion modes leave that padding in place and only touch the body
//! between it.

use super::section::{Section, fence_marker, heading};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// How new content is folded into an existing section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Substitute the section body.
    Replace,
    /// Insert after the section body.
    Append,
    /// Insert before the section body, right after the heading.
    Prepend,
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateMode::Replace => write!(f, "replace"),
            UpdateMode::Append => write!(f, "append"),
            UpdateMode::Prepend => write!(f, "prepend"),
        }
    }
}

/// Apply `content` to `section` within `lines` using `mode`.
///
/// Every line outside the section's content run is preserved.
pub fn apply(mut lines: Vec<String>, section: &Section, content: &str, mode: UpdateMode) -> Vec<String> {
    let new_lines = content_lines(content);
    let body = body_range(&lines, section);
    let has_body = !body.is_empty();

    // Inserting past the last line would swallow the document's final newline.
    if body.start == lines.len() && !new_lines.is_empty() {
        lines.push(String::new());
    }

    match mode {
        UpdateMode::Replace => {
            lines.splice(body, new_lines);
        }
        UpdateMode::Append if !new_lines.is_empty() => {
            let at = body.end;
            if has_body {
                lines.splice(at..at, std::iter::once(String::new()).chain(new_lines));
            } else {
                lines.splice(at..at, new_lines);
            }
        }
        UpdateMode::Prepend if !new_lines.is_empty() => {
            let at = body.start;
            if has_body {
                lines.splice(at..at, new_lines.into_iter().chain(std::iter::once(String::new())));
            } else {
                lines.splice(at..at, new_lines);
            }
        }
        UpdateMode::Append | UpdateMode::Prepend => {}
    }

    lines
}

/// Append a new section to the end of `text`.
///
/// The result always starts with `text` unchanged. A blank line separates the
/// existing content from the new heading, and another separates the heading
/// from the content.
pub fn create_section(text: &str, header: &str, content: &str) -> String {
    let mut out = String::with_capacity(text.len() + header.len() + content.len() + 8);
    out.push_str(text);

    if !out.is_empty() {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        if !out.ends_with("\n\n") {
            out.push('\n');
        }
    }

    out.push_str(&normalize_header(header));
    out.push('\n');

    let body = content.trim_end_matches(['\n', '\r']);
    if !body.trim().is_empty() {
        out.push('\n');
        out.push_str(body);
        out.push('\n');
    }

    out
}

/// Default a bare header to a level-2 heading.
pub fn normalize_header(header: &str) -> String {
    let trimmed = header.trim();
    if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("## {}", trimmed)
    }
}

/// Make `content` safe to splice under a heading of level `level`.
///
/// Headings at or above `level` would end the section early, so they are
/// pushed one level below it. Below level 6 there is no heading left, and the
/// title becomes a bold line instead. A code fence left open at the end is
/// closed so it cannot swallow the headings after the section.
pub fn nest_content(content: &str, level: u8) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut fence: Option<&str> = None;

    for line in content.split('\n') {
        if let Some(marker) = fence {
            if line.trim_start().starts_with(marker) {
                fence = None;
            }
            out.push(line.to_string());
            continue;
        }
        if let Some(marker) = fence_marker(line) {
            fence = Some(marker);
            out.push(line.to_string());
            continue;
        }

        match heading(line) {
            Some((found, title)) if found <= level => {
                let cr = if line.ends_with('\r') { "\r" } else { "" };
                if level < 6 {
                    out.push(format!("{} {}{}", "#".repeat(usize::from(level) + 1), title, cr));
                } else {
                    out.push(format!("**{}**{}", title, cr));
                }
            }
            _ => out.push(line.to_string()),
        }
    }

    if let Some(marker) = fence {
        let body = out.iter().rposition(|l| !l.trim().is_empty()).map_or(0, |i| i + 1);
        out.insert(body, marker.to_string());
    }

    out.join("\n")
}

/// Heading level of a header as [`create_section`] writes it.
pub fn header_level(header: &str) -> u8 {
    let header = normalize_header(header);
    let hashes = header.chars().take_while(|c| *c == '#').count();
    hashes.clamp(1, 6) as u8
}

fn content_lines(content: &str) -> Vec<String> {
    let trimmed = content.trim_end_matches(['\n', '\r']);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('\n').map(str::to_string).collect()
}

/// The body of a section's content run: the run without its blank padding.
///
/// For a run made only of blank lines, the first blank line is kept as
/// leading padding and the empty body sits right after it.
fn body_range(lines: &[String], section: &Section) -> Range<usize> {
    let run = section.content(lines);
    let start = section.content_start.min(lines.len());

    let lead = run.iter().take_while(|l| l.trim().is_empty()).count();
    if lead == run.len() {
        let pad = lead.min(1);
        return start + pad..start + pad;
    }

    let trail = run.iter().rev().take_while(|l| l.trim().is_empty()).count();
    start + lead..start + run.len() - trail
}
