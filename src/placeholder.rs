//! Placeholder token scanning.
//!
//! Templates mark substitution points with `{{ name }}` tokens
//! (name = `[A-Za-z0-9_-]+`, surrounding whitespace ignored, case
//! sensitive, no nesting or escaping). The scanner is a byte-level pass
//! driven by `memchr`, shared by the introspector and the assembler.

use memchr::memchr_iter;

/// A token occurrence within a text: the name and the byte span of the
/// whole `{{...}}` sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// Find every well-formed token in the text, left to right.
pub fn find_tokens(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut skip_until = 0;

    for open in memchr_iter(b'{', bytes) {
        if open < skip_until || !bytes[open..].starts_with(b"{{") {
            continue;
        }
        if let Some(token) = parse_token_at(text, open) {
            skip_until = token.end;
            tokens.push(token);
        }
    }

    tokens
}

/// Try to parse a token starting at `start` (which must point at `{{`).
fn parse_token_at(text: &str, start: usize) -> Option<Token> {
    let bytes = text.as_bytes();
    let mut pos = start + 2;

    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }

    let name_start = pos;
    while pos < bytes.len() && is_name_byte(bytes[pos]) {
        pos += 1;
    }
    if pos == name_start {
        return None;
    }
    let name_end = pos;

    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    if !bytes[pos..].starts_with(b"}}") {
        return None;
    }

    Some(Token {
        name: text[name_start..name_end].to_string(),
        start,
        end: pos + 2,
    })
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Whether the text contains at least one well-formed token.
pub fn contains_token(text: &str) -> bool {
    !find_tokens(text).is_empty()
}

/// Replace every token with the value the resolver yields for its name.
pub fn replace_tokens<F>(text: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> String,
{
    let tokens = find_tokens(text);
    if tokens.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for token in &tokens {
        out.push_str(&text[cursor..token.start]);
        out.push_str(&resolve(&token.name));
        cursor = token.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Remove every token from the text.
pub fn strip_tokens(text: &str) -> String {
    replace_tokens(text, |_| String::new())
}

/// When the text, normalized (bullet glyphs and whitespace removed), is
/// exactly one token, return its name.
pub fn exact_token(text: &str) -> Option<String> {
    let tokens = find_tokens(text);
    if tokens.len() != 1 {
        return None;
    }
    let normalized: String = text
        .chars()
        .filter(|&c| c != '\u{2022}' && c != '\u{00B7}' && !c.is_whitespace())
        .collect();
    let name = &tokens[0].name;
    if normalized == format!("{{{{{name}}}}}") { Some(name.clone()) } else { None }
}

/// Whether a placeholder name reads like a list of items.
pub fn looks_like_list_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    ["list", "bullet", "points", "items", "lines", "outline"]
        .iter()
        .any(|kw| lower.contains(kw))
}

/// A short excerpt of the surrounding template text: tokens removed,
/// whitespace collapsed, at most 40 characters.
pub fn summarize_sample(text: &str) -> String {
    let stripped = strip_tokens(text);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > 40 {
        let head: String = collapsed.chars().take(40).collect();
        format!("{head}...")
    } else {
        collapsed
    }
}

/// Strip the leading bullet/number/symbol prefix a model or template may
/// put in front of a list item.
pub fn strip_list_marker(text: &str) -> &str {
    text.trim_start_matches(['\u{2022}', '\u{00B7}', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', ' ', '\t', '-'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_find_tokens() {
        let tokens = find_tokens("a {{one}} b {{ two_2 }} c {{bad name}} {{-ok-}}");
        let names: Vec<_> = tokens.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two_2", "-ok-"]);
    }

    #[test]
    fn test_find_tokens_overlapping_braces() {
        let tokens = find_tokens("{{{x}}");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].name, "x");
        assert_eq!(&"{{{x}}"[tokens[0].start..tokens[0].end], "{{x}}");
    }

    #[test]
    fn test_replace_and_strip() {
        let replaced = replace_tokens("Hi {{who}}!", |name| format!("<{name}>"));
        assert_eq!(replaced, "Hi <who>!");
        assert_eq!(strip_tokens("a {{x}} b"), "a  b");
        assert_eq!(strip_tokens("no tokens"), "no tokens");
    }

    #[test]
    fn test_exact_token() {
        assert_eq!(exact_token("{{title}}").as_deref(), Some("title"));
        assert_eq!(exact_token("  {{ title }}  ").as_deref(), Some("title"));
        assert_eq!(exact_token("\u{2022} {{items}}").as_deref(), Some("items"));
        assert_eq!(exact_token("intro {{title}}"), None);
        assert_eq!(exact_token("{{a}} {{b}}"), None);
    }

    #[test]
    fn test_looks_like_list_name() {
        assert!(looks_like_list_name("cover_bullets"));
        assert!(looks_like_list_name("OutlineSection"));
        assert!(looks_like_list_name("key_points"));
        assert!(!looks_like_list_name("cover_title"));
    }

    #[test]
    fn test_summarize_sample() {
        assert_eq!(summarize_sample("  Some   {{x}} spaced   text "), "Some spaced text");
        let long = "word ".repeat(20);
        let summary = summarize_sample(&long);
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), 43);
    }

    #[test]
    fn test_strip_list_marker() {
        assert_eq!(strip_list_marker("\u{2022} item"), "item");
        assert_eq!(strip_list_marker("1. item"), "item");
        assert_eq!(strip_list_marker("- item"), "item");
        assert_eq!(strip_list_marker("item 2"), "item 2");
    }

    proptest! {
        // The scanner never panics and every reported span round-trips to
        // a well-formed token
        #[test]
        fn scan_is_total(text in "\\PC{0,200}") {
            for token in find_tokens(&text) {
                let span = &text[token.start..token.end];
                prop_assert!(span.starts_with("{{"));
                prop_assert!(span.ends_with("}}"));
                prop_assert!(span.contains(&token.name));
            }
        }

        // Stripping removes exactly the token spans
        #[test]
        fn strip_removes_token(a in "[a-z ]{0,40}", b in "[a-z ]{0,40}") {
            let text = format!("{a}{{{{name}}}}{b}");
            prop_assert_eq!(strip_tokens(&text), format!("{a}{b}"));
        }
    }
}
