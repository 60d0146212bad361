//! Keyword-driven extraction of agent replies.
//!
//! A reply is cut into paragraphs (runs of non-blank lines; a fenced code
//! block always stays whole). Each paragraph
//! goes to the rule whose keywords it mentions most often; ties go to the
//! rule listed first. When the reply carries its own Markdown headings, a
//! heading that names a rule's section claims everything under it, and
//! keyword matching only looks at what is left.

use crate::markdown::{self, match_rank};
use crate::template::TemplateStructure;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static BULLET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+").expect("Invalid bullet regex"));

/// How extracted text is reshaped before it reaches the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formatter {
    /// Paragraphs as written.
    #[default]
    Plain,
    /// One `- ` bullet per line.
    BulletList,
    /// One `###` heading per paragraph, titled by its first line.
    FeatureHeadings,
}

impl Formatter {
    pub fn format(&self, paragraphs: &[String]) -> String {
        match self {
            Formatter::Plain => paragraphs.join("\n\n"),
            Formatter::BulletList => paragraphs
                .iter()
                .flat_map(|p| bullet_lines(p))
                .collect::<Vec<_>>()
                .join("\n"),
            Formatter::FeatureHeadings => paragraphs
                .iter()
                .map(|p| feature_block(p))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

/// Bullets for each line of `paragraph`. Fenced blocks are kept verbatim.
fn bullet_lines(paragraph: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut fence: Option<&'static str> = None;

    for line in paragraph.lines() {
        if let Some(marker) = fence {
            if line.trim_start().starts_with(marker) {
                fence = None;
            }
            out.push(line.to_string());
        } else if let Some(marker) = markdown::fence_marker(line) {
            fence = Some(marker);
            out.push(line.to_string());
        } else if !line.trim().is_empty() {
            out.push(format!("- {}", BULLET_REGEX.replace(line.trim(), "")));
        }
    }
    out
}

fn feature_block(paragraph: &str) -> String {
    if markdown::fence_marker(paragraph).is_some() {
        return paragraph.to_string();
    }

    let mut lines = paragraph.lines();
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();

    // A heading line in the reply already names the feature.
    if let Some((_, title)) = markdown::heading(first) {
        return if rest.is_empty() {
            format!("### {}", title)
        } else {
            format!("### {}\n\n{}", title, rest.join("\n"))
        };
    }

    let first = BULLET_REGEX.replace(first, "");

    let (title, detail) = match first.split_once(':') {
        Some((title, detail)) if !title.trim().is_empty() && title.len() <= 80 => {
            (title.trim().to_string(), detail.trim().to_string())
        }
        _ => (first.trim().to_string(), String::new()),
    };

    let mut body: Vec<String> = Vec::new();
    if !detail.is_empty() {
        body.push(detail);
    }
    body.extend(rest.iter().map(|l| l.to_string()));

    if body.is_empty() {
        format!("### {}", title)
    } else {
        format!("### {}\n\n{}", title, body.join("\n"))
    }
}

/// Maps trigger words to one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub section: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub formatter: Formatter,
}

impl KeywordRule {
    pub fn new(section: &str, keywords: &[&str], formatter: Formatter) -> Self {
        Self {
            section: section.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            formatter,
        }
    }

    /// Case-insensitive, matching at word starts so `feature` also finds
    /// `features`. `None` when the rule has no usable keywords.
    fn pattern(&self) -> Option<Regex> {
        let alternatives: Vec<String> = self
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return None;
        }
        Regex::new(&format!(r"(?i)\b(?:{})", alternatives.join("|"))).ok()
    }
}

/// The keyword rules one agent uses, in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionProfile {
    pub rules: Vec<KeywordRule>,
}

impl ExtractionProfile {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// A profile keyed on the words of the structure's own section names.
    ///
    /// Used for agents without a profile of their own. Words shorter than four
    /// characters are ignored.
    pub fn from_structure(structure: &TemplateStructure) -> Self {
        let rules = structure
            .ordered()
            .into_iter()
            .map(|(name, _)| KeywordRule {
                section: name.to_string(),
                keywords: name
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|w| w.chars().count() >= 4)
                    .map(str::to_lowercase)
                    .collect(),
                formatter: Formatter::Plain,
            })
            .collect();
        Self { rules }
    }

    /// Split `content` into formatted text per rule section.
    ///
    /// Sections with nothing extracted are absent from the result.
    pub fn extract(&self, content: &str) -> BTreeMap<String, String> {
        let lines = markdown::split_lines(content);
        let mut claimed = vec![false; lines.len()];
        let mut collected: Vec<Vec<String>> = vec![Vec::new(); self.rules.len()];
        let mut explicit = vec![false; self.rules.len()];

        for section in markdown::parse(content) {
            let Some(rule_index) = self.best_rule_for_heading(&section.title) else {
                continue;
            };
            if claimed[section.start_line] {
                continue;
            }
            let end = (section.content_end + 1).min(lines.len());
            for flag in &mut claimed[section.start_line..end] {
                *flag = true;
            }
            explicit[rule_index] = true;
            collected[rule_index].extend(paragraphs(&lines[section.content_start.min(end)..end]));
        }

        let patterns: Vec<Option<Regex>> = self.rules.iter().map(KeywordRule::pattern).collect();
        let unclaimed: Vec<String> = lines
            .iter()
            .zip(&claimed)
            .map(|(line, taken)| if *taken { String::new() } else { line.clone() })
            .collect();

        for paragraph in paragraphs(&unclaimed) {
            let best = patterns
                .iter()
                .enumerate()
                .filter(|(i, _)| !explicit[*i])
                .filter_map(|(i, p)| p.as_ref().map(|p| (i, p.find_iter(&paragraph).count())))
                .filter(|(_, hits)| *hits > 0)
                .fold(None::<(usize, usize)>, |best, (i, hits)| match best {
                    Some((_, best_hits)) if best_hits >= hits => best,
                    _ => Some((i, hits)),
                });
            if let Some((i, _)) = best {
                collected[i].push(paragraph);
            }
        }

        let mut result = BTreeMap::new();
        for (rule, paragraphs) in self.rules.iter().zip(collected) {
            if paragraphs.is_empty() {
                continue;
            }
            let text = rule.formatter.format(&paragraphs);
            if !text.trim().is_empty() {
                result
                    .entry(rule.section.clone())
                    .and_modify(|existing: &mut String| {
                        existing.push_str("\n\n");
                        existing.push_str(&text);
                    })
                    .or_insert(text);
            }
        }
        result
    }

    fn best_rule_for_heading(&self, title: &str) -> Option<usize> {
        self.rules
            .iter()
            .enumerate()
            .filter_map(|(i, rule)| match_rank(&rule.section, title).map(|rank| (rank, i)))
            .min()
            .map(|(_, i)| i)
    }
}

/// Paragraphs of `lines`: runs of non-blank lines, trimmed at the ends.
///
/// A fenced code block is never split, blank lines included. A fence still
/// open at the end of `lines` is closed.
fn paragraphs(lines: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut fence: Option<&'static str> = None;

    for line in lines {
        let line = line.trim_end_matches('\r');
        if let Some(marker) = fence {
            if line.trim_start().starts_with(marker) {
                fence = None;
            }
            current.push(line);
        } else if let Some(marker) = markdown::fence_marker(line) {
            fence = Some(marker);
            current.push(line);
        } else if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }

    if let Some(marker) = fence {
        while current.last().is_some_and(|l| l.trim().is_empty()) {
            current.pop();
        }
        current.push(marker);
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }

    out
}

/// Built-in profiles: `pm`, `analyst` and `architect`.
pub fn builtin_profiles() -> BTreeMap<String, ExtractionProfile> {
    use Formatter::*;

    let pm = ExtractionProfile::new(vec![
        KeywordRule::new(
            "Problem Statement",
            &["problem", "issue", "pain", "challenge", "struggle"],
            Plain,
        ),
        KeywordRule::new(
            "Target Users",
            &["user", "target", "persona", "audience", "customer"],
            Plain,
        ),
        KeywordRule::new(
            "Goals",
            &["goal", "objective", "success", "metric", "kpi", "outcome"],
            Plain,
        ),
        KeywordRule::new("Features", &["feature", "capability", "functionality"], FeatureHeadings),
        KeywordRule::new(
            "Requirements",
            &["must", "should", "requirement", "shall"],
            BulletList,
        ),
    ]);

    let analyst = ExtractionProfile::new(vec![
        KeywordRule::new(
            "Functional Requirements",
            &["must", "shall", "should", "able to", "functional"],
            BulletList,
        ),
        KeywordRule::new(
            "Non-Functional Requirements",
            &[
                "performance",
                "latency",
                "security",
                "availability",
                "scalab",
                "reliab",
                "non-functional",
            ],
            BulletList,
        ),
        KeywordRule::new("Assumptions", &["assum", "expect", "presum"], Plain),
        KeywordRule::new(
            "Constraints",
            &["constraint", "limit", "budget", "deadline", "regulat", "complian"],
            Plain,
        ),
    ]);

    let architect = ExtractionProfile::new(vec![
        KeywordRule::new(
            "Architecture Overview",
            &["architecture", "overview", "system", "layer"],
            Plain,
        ),
        KeywordRule::new("Components", &["component", "service", "module"], FeatureHeadings),
        KeywordRule::new(
            "Data Model",
            &["data", "schema", "entity", "table", "model"],
            Plain,
        ),
        KeywordRule::new(
            "Technology Stack",
            &["technology", "stack", "framework", "language", "database", "library"],
            BulletList,
        ),
        KeywordRule::new("Risks", &["risk", "mitigat", "threat", "concern"], BulletList),
    ]);

    BTreeMap::from([
        ("analyst".to_string(), analyst),
        ("architect".to_string(), architect),
        ("pm".to_string(), pm),
    ])
}
