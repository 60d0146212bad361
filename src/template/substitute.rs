//! Placeholder substitution.
//!
//! Templates use `{{name}}` placeholders. Whitespace inside the braces is
//! tolerated (`{{ name }}`). A placeholder whose name is bound is replaced
//! with the bound text; anything else, including placeholders for unbound
//! names, is copied through verbatim. Substitution is a single left-to-right
//! pass, so substituted text is never re-scanned for placeholders.

use super::definition::is_valid_token;
use std::collections::BTreeMap;

/// A placeholder occurrence in a template body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The variable name between the braces.
    pub name: String,
    /// Byte offset of the opening `{{`.
    pub offset: usize,
}

/// Replace every bound `{{name}}` in `text`.
pub fn substitute(text: &str, bindings: &BTreeMap<String, String>) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];

        match token_at(after_open) {
            Some((name, consumed)) => match bindings.get(name) {
                Some(value) => {
                    result.push_str(value);
                    rest = &after_open[consumed..];
                }
                None => {
                    result.push_str(&rest[open..open + 2 + consumed]);
                    rest = &after_open[consumed..];
                }
            },
            None => {
                result.push_str("{{");
                rest = after_open;
            }
        }
    }

    result.push_str(rest);
    result
}

/// List the placeholders in `text`, in order of appearance.
pub fn placeholders(text: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    let mut offset = 0;

    while let Some(open) = text[offset..].find("{{") {
        let start = offset + open;
        let after_open = &text[start + 2..];

        match token_at(after_open) {
            Some((name, consumed)) => {
                found.push(Placeholder {
                    name: name.to_string(),
                    offset: start,
                });
                offset = start + 2 + consumed;
            }
            None => offset = start + 2,
        }
    }

    found
}

/// Parse `name }}` at the start of `s`, returning the trimmed name and the
/// number of bytes consumed including the closing braces.
fn token_at(s: &str) -> Option<(&str, usize)> {
    let close = s.find("}}")?;
    let inner = &s[..close];
    let name = inner.trim();

    if inner.contains('\n') || !is_valid_token(name) {
        return None;
    }

    Some((name, close + 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, String> {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_substitution() {
        let out = substitute("{{greeting}}, {{name}}!", &vars([("greeting", "Hello"), ("name", "Ada")]));
        assert_eq!(out, "Hello, Ada!");
    }

    #[test]
    fn test_repeated_tokens_get_identical_values() {
        let out = substitute("{{x}}-{{ x }}-{{x}}", &vars([("x", "X")]));
        assert_eq!(out, "X-X-X");
    }

    #[test]
    fn test_unbound_tokens_are_kept() {
        let out = substitute("Owner: {{owner}}", &vars([]));
        assert_eq!(out, "Owner: {{owner}}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let out = substitute("{{a}}", &vars([("a", "{{b}}"), ("b", "nope")]));
        assert_eq!(out, "{{b}}");
    }

    #[test]
    fn test_malformed_braces_pass_through() {
        let binding = vars([("x", "X")]);
        assert_eq!(substitute("{{", &binding), "{{");
        assert_eq!(substitute("{{x", &binding), "{{x");
        assert_eq!(substitute("{{ not a token }} {{x}}", &binding), "{{ not a token }} X");
        assert_eq!(substitute("{{{x}}}", &binding), "{{{x}}}");
        assert_eq!(substitute("fn main() { }", &binding), "fn main() { }");
    }

    #[test]
    fn test_multiline_values() {
        let out = substitute("## Notes\n{{notes}}\n", &vars([("notes", "a\nb")]));
        assert_eq!(out, "## Notes\na\nb\n");
    }

    #[test]
    fn test_placeholders_in_order() {
        let found = placeholders("# {{title}}\n\n{{ content }} and {{title}} {{bad token}}");
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["title", "content", "title"]);
        assert_eq!(found[0].offset, 2);
    }
}
