//! Line-level tokenizing shared by the parser and the writer.
//!
//! InkScript is line oriented with free-form whitespace. Values may be bare
//! (`visible=true`) or double-quoted (`name="My Layer"`); quoted values
//! support `\"` and `\\` escapes.

use std::borrow::Cow;

/// Directive keywords. None of them can start a style line, and each one
/// ends an unterminated path block.
pub(crate) const RESERVED_KEYWORDS: [&str; 7] =
    ["draw", "set", "layer", "transform", "erase", "canvas", "background"];

/// A `key=value` attribute with quotes already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attr {
    pub key: String,
    pub value: String,
}

/// Split on whitespace, keeping quoted runs together and unescaping them.
pub(crate) fn split_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                '"' => in_quotes = false,
                _ => current.push(c),
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                in_token = true;
            }
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            _ => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Split a token at its first `=`. Tokens without a key are not attributes.
fn to_attr(token: &str) -> Option<Attr> {
    let (key, value) = token.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    Some(Attr {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Every `key=value` attribute in `text`; other tokens are ignored.
pub(crate) fn parse_attrs(text: &str) -> Vec<Attr> {
    split_tokens(text).iter().filter_map(|t| to_attr(t)).collect()
}

/// Last value for `key`, if any.
pub(crate) fn attr<'a>(attrs: &'a [Attr], key: &str) -> Option<&'a str> {
    attrs.iter().rev().find(|a| a.key == key).map(|a| a.value.as_str())
}

/// The leading identifier of a line, e.g. `layer` for `layer id=1 {` and
/// also for `layer=3`.
pub(crate) fn leading_word(line: &str) -> &str {
    let trimmed = line.trim_start();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

pub(crate) fn starts_with_keyword(line: &str) -> bool {
    RESERVED_KEYWORDS.contains(&leading_word(line))
}

/// True if `line` is made only of `key=value` tokens and does not begin with
/// a reserved keyword.
pub(crate) fn is_style_line(line: &str) -> bool {
    if starts_with_keyword(line) {
        return false;
    }
    let tokens = split_tokens(line);
    !tokens.is_empty() && tokens.iter().all(|t| to_attr(t).is_some())
}

/// Byte offset of the first `needle` outside double quotes.
pub(crate) fn find_unquoted(line: &str, needle: char) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == needle {
            return Some(i);
        }
    }
    None
}

/// Blank lines and `#` comments carry no content.
pub(crate) fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Render a value as a single token, quoting it when it would not survive
/// whitespace splitting as a bare word.
pub(crate) fn quote_if_needed(value: &str) -> Cow<'_, str> {
    let bare = !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\\' | '{' | '}' | '='));
    if bare {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(quote(value))
    }
}

/// Always-quoted form with `"` and `\` escaped.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_quoted_runs() {
        let tokens = split_tokens(r#"layer id=1 name="My Layer" visible=true {"#);
        assert_eq!(tokens, vec!["layer", "id=1", "name=My Layer", "visible=true", "{"]);
    }

    #[test]
    fn test_split_unescapes() {
        let tokens = split_tokens(r#"name="say \"hi\" \\ bye""#);
        assert_eq!(tokens, vec![r#"name=say "hi" \ bye"#]);
    }

    #[test]
    fn test_parse_attrs_quoted_and_bare() {
        let attrs = parse_attrs(r#"id=3 name="Ink Layer" visible=false stray"#);
        assert_eq!(attr(&attrs, "id"), Some("3"));
        assert_eq!(attr(&attrs, "name"), Some("Ink Layer"));
        assert_eq!(attr(&attrs, "visible"), Some("false"));
        assert_eq!(attr(&attrs, "stray"), None);
    }

    #[test]
    fn test_style_line_detection() {
        assert!(is_style_line("stroke=#ff0000 strokeWidth=4"));
        assert!(is_style_line("  fill=#000  "));
        assert!(!is_style_line("erase ref=stroke_1"));
        assert!(!is_style_line("layer=2"));
        assert!(!is_style_line("stroke=#fff and more"));
        assert!(!is_style_line(""));
    }

    #[test]
    fn test_find_unquoted_skips_strings() {
        assert_eq!(find_unquoted(r#"name="a}b" }"#, '}'), Some(11));
        assert_eq!(find_unquoted("move 1 2", '}'), None);
    }

    #[test]
    fn test_quote_if_needed() {
        assert_eq!(quote_if_needed("stroke_1"), "stroke_1");
        assert_eq!(quote_if_needed("my id"), "\"my id\"");
        assert_eq!(quote_if_needed(""), "\"\"");
    }
}
