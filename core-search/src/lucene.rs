//! Lucene query-string helpers
//!
//! Escaping follows the classic Lucene `QueryParser` rules: every special
//! character is preceded by a backslash, including each `&` and `|`
//! individually so `&&` and `||` lose their operator meaning.

use serde::{Deserialize, Serialize};

/// Characters with meaning in the Lucene query syntax.
const SPECIAL_CHARS: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
    '/',
];

/// Per-term operators applied to free text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LuceneOptions {
    /// Append the similarity operator (`term~`)
    pub fuzzy: bool,
    /// Append the prefix wildcard (`term*`)
    pub wildcard: bool,
}

impl LuceneOptions {
    pub fn new(fuzzy: bool, wildcard: bool) -> Self {
        Self { fuzzy, wildcard }
    }
}

/// Backslash-escape every Lucene special character in `input`.
pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if SPECIAL_CHARS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Render a double-quoted phrase, escaping embedded quotes and backslashes.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Plain alphanumeric values are emitted bare; anything else is quoted.
pub fn value(raw: &str) -> String {
    if !raw.is_empty() && raw.chars().all(char::is_alphanumeric) {
        raw.to_string()
    } else {
        quote(raw)
    }
}

fn render_term(term: &str, options: LuceneOptions) -> String {
    let term = escape(term);
    match (options.fuzzy, options.wildcard) {
        (true, true) => format!("({}~ OR {}*)", term, term),
        (true, false) => format!("{}~", term),
        (false, true) => format!("{}*", term),
        (false, false) => term,
    }
}

/// Compile free text into `field:(t1 AND t2 ...)`.
///
/// Returns `None` when the text holds no terms.
pub fn field_query(field: &str, text: &str, options: LuceneOptions) -> Option<String> {
    let terms: Vec<String> = text
        .split_whitespace()
        .map(|term| render_term(term, options))
        .collect();

    if terms.is_empty() {
        return None;
    }

    Some(format!("{}:({})", field, terms.join(" AND ")))
}

/// `field:(a OR b ...)` over pre-validated values.
pub fn any_of(field: &str, values: &[String]) -> Option<String> {
    let rendered: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(value)
        .collect();

    if rendered.is_empty() {
        return None;
    }

    Some(format!("{}:({})", field, rendered.join(" OR ")))
}

/// `field:[min TO max]`, with `*` for an open bound. `None` when both are open.
pub fn range<T: ToString>(field: &str, min: Option<T>, max: Option<T>) -> Option<String> {
    if min.is_none() && max.is_none() {
        return None;
    }

    let bound = |b: Option<T>| b.map_or_else(|| "*".to_string(), |v| v.to_string());
    Some(format!("{}:[{} TO {}]", field, bound(min), bound(max)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape("!!!"), "\\!\\!\\!");
        assert_eq!(escape("AC/DC"), "AC\\/DC");
        assert_eq!(escape("a && b || c"), "a \\&\\& b \\|\\| c");
        assert_eq!(escape("C:\\path"), "C\\:\\\\path");
        assert_eq!(escape("plain words"), "plain words");
    }

    #[test]
    fn test_field_query_operators() {
        let plain = LuceneOptions::default();
        assert_eq!(
            field_query("releasegroup", "Abbey Road", plain).as_deref(),
            Some("releasegroup:(Abbey AND Road)")
        );
        assert_eq!(
            field_query("artist", "blur", LuceneOptions::new(true, false)).as_deref(),
            Some("artist:(blur~)")
        );
        assert_eq!(
            field_query("artist", "blur", LuceneOptions::new(false, true)).as_deref(),
            Some("artist:(blur*)")
        );
        assert_eq!(
            field_query("artist", "the blur", LuceneOptions::new(true, true)).as_deref(),
            Some("artist:((the~ OR the*) AND (blur~ OR blur*))")
        );
        assert_eq!(field_query("artist", "   ", plain), None);
    }

    #[test]
    fn test_value_quoting() {
        assert_eq!(value("Album"), "Album");
        assert_eq!(value("DJ-mix"), "\"DJ-mix\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_range_bounds() {
        assert_eq!(range("begin", Some(1990), None).as_deref(), Some("begin:[1990 TO *]"));
        assert_eq!(range("dur", None, Some(300000u64)).as_deref(), Some("dur:[* TO 300000]"));
        assert_eq!(range::<i32>("begin", None, None), None);
    }

    #[test]
    fn test_any_of_skips_blank_values() {
        assert_eq!(
            any_of("primarytype", &["Album".to_string(), " ".to_string(), "EP".to_string()])
                .as_deref(),
            Some("primarytype:(Album OR EP)")
        );
        assert_eq!(any_of("primarytype", &[]), None);
    }
}
