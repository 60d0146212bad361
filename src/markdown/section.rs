//! Section parsing and lookup.

use super::frontmatter::{is_front_matter_close, is_front_matter_open};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// 1-6 `#` characters, whitespace, then a non-empty title.
static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+(.*\S)\s*$").expect("Invalid heading regex"));

/// A heading and the run of lines that belong to it.
///
/// `content_start..=content_end` is the content run. When the heading is
/// immediately followed by a heading of the same or higher level the run is
/// empty and `content_start == content_end + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text with the `#` markers and surrounding whitespace removed.
    pub title: String,
    /// Index of the heading line.
    pub start_line: usize,
    /// First line after the heading.
    pub content_start: usize,
    /// Last line belonging to the section.
    pub content_end: usize,
}

impl Section {
    /// Number of lines in the content run.
    pub fn content_len(&self) -> usize {
        (self.content_end + 1).saturating_sub(self.content_start)
    }

    /// The content run as a slice of `lines`.
    pub fn content<'a, S: AsRef<str>>(&self, lines: &'a [S]) -> &'a [S] {
        let end = (self.content_end + 1).min(lines.len());
        let start = self.content_start.min(end);
        &lines[start..end]
    }

    /// Whether the content run holds at least one non-blank line.
    ///
    /// HTML comments (`<!-- ... -->`, possibly spanning lines) are guidance,
    /// not content, and are ignored.
    pub fn has_content<S: AsRef<str>>(&self, lines: &[S]) -> bool {
        let mut in_comment = false;

        for line in self.content(lines) {
            let mut rest = line.as_ref().trim();
            while !rest.is_empty() {
                if in_comment {
                    match rest.find("-->") {
                        Some(end) => {
                            rest = rest[end + 3..].trim_start();
                            in_comment = false;
                        }
                        None => rest = "",
                    }
                } else if let Some(after) = rest.strip_prefix("<!--") {
                    rest = after;
                    in_comment = true;
                } else {
                    return true;
                }
            }
        }

        false
    }
}

/// Parse text into its heading-delimited sections, in document order.
///
/// Lines inside a leading `---` front-matter block or inside fenced code
/// blocks are never treated as headings. A document without headings yields
/// an empty vector.
pub fn parse(text: &str) -> Vec<Section> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut headings: Vec<(usize, u8, String)> = Vec::new();

    let mut index = front_matter_end(&lines).map_or(0, |end| end + 1);
    let mut fence: Option<&str> = None;

    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim_start();

        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
        } else if let Some(marker) = fence_marker(line) {
            fence = Some(marker);
        } else if let Some((level, title)) = heading(line) {
            headings.push((index, level, title.to_string()));
        }

        index += 1;
    }

    let last_line = lines.len().saturating_sub(1);

    headings
        .iter()
        .enumerate()
        .map(|(i, (start_line, level, title))| {
            let content_end = headings[i + 1..]
                .iter()
                .find(|(_, next_level, _)| next_level <= level)
                .map_or(last_line, |(next_start, _, _)| next_start - 1);

            Section {
                level: *level,
                title: title.clone(),
                start_line: *start_line,
                content_start: start_line + 1,
                content_end,
            }
        })
        .collect()
}

/// Level and title of a heading line, ignoring fences and front matter.
pub(crate) fn heading(line: &str) -> Option<(u8, &str)> {
    let caps = HEADING_REGEX.captures(line)?;
    let level = caps.get(1)?.as_str().len() as u8;
    Some((level, caps.get(2)?.as_str().trim()))
}

/// The marker that opens a fenced code block on `line`, if it opens one.
///
/// The same marker at the start of a later line closes the block.
pub(crate) fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

/// Index of the closing delimiter of a leading front-matter block, if any.
fn front_matter_end(lines: &[&str]) -> Option<usize> {
    if !lines.first().is_some_and(|l| is_front_matter_open(l)) {
        return None;
    }

    lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, line)| is_front_matter_close(line))
        .map(|(i, _)| i)
}

/// Normalize a heading or lookup target for comparison.
///
/// Strips leading `#` markers and whitespace, trims, and lowercases.
pub fn normalize_title(raw: &str) -> String {
    raw.trim_start_matches(|c: char| c == '#' || c.is_whitespace())
        .trim()
        .to_lowercase()
}

/// How well a section title matches a lookup target. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRank {
    /// Titles are identical after normalization.
    Exact,
    /// One title starts with the other.
    Prefix,
    /// One title contains the other.
    Substring,
}

/// Rank a section title against a target. Both inputs are normalized first.
///
/// An empty target matches nothing.
pub fn match_rank(title: &str, target: &str) -> Option<MatchRank> {
    let title = normalize_title(title);
    let target = normalize_title(target);

    if target.is_empty() || title.is_empty() {
        return None;
    }

    if title == target {
        Some(MatchRank::Exact)
    } else if title.starts_with(&target) || target.starts_with(&title) {
        Some(MatchRank::Prefix)
    } else if title.contains(&target) || target.contains(&title) {
        Some(MatchRank::Substring)
    } else {
        None
    }
}

/// Find the section best matching `target`.
///
/// Exact beats prefix beats substring; among equally ranked sections the
/// first in document order wins.
pub fn locate<'a>(sections: &'a [Section], target: &str) -> Option<&'a Section> {
    let mut best: Option<(MatchRank, &Section)> = None;

    for section in sections {
        let Some(rank) = match_rank(&section.title, target) else {
            continue;
        };
        match best {
            Some((best_rank, _)) if best_rank <= rank => {}
            _ => best = Some((rank, section)),
        }
        if rank == MatchRank::Exact {
            break;
        }
    }

    best.map(|(_, section)| section)
}
