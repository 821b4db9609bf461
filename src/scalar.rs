//! Scalar quoting, unquoting and style selection.

use std::fmt;

/// Style of scalar representation in YAML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    /// Plain scalar (no quotes)
    Plain,
    /// Single-quoted scalar
    SingleQuoted,
    /// Double-quoted scalar
    DoubleQuoted,
    /// Literal block scalar (`|` or `|-`)
    Literal,
}

/// A scalar value with the style it will be written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarValue {
    value: String,
    style: ScalarStyle,
}

impl ScalarValue {
    /// A scalar for block context, plain whenever that reads back unchanged.
    ///
    /// Multi-line text becomes a literal block scalar when its lines allow it.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let style = Self::detect_style(&value, false, true);
        Self { value, style }
    }

    /// A scalar for use inside a flow collection.
    pub fn flow(value: impl Into<String>) -> Self {
        let value = value.into();
        let style = Self::detect_style(&value, true, false);
        Self { value, style }
    }

    /// A mapping key. Keys are never written as block scalars.
    pub fn key(value: impl Into<String>, flow: bool) -> Self {
        let value = value.into();
        let style = Self::detect_style(&value, flow, false);
        Self { value, style }
    }

    /// Get the raw value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get the style
    pub fn style(&self) -> ScalarStyle {
        self.style
    }

    fn detect_style(value: &str, flow: bool, allow_literal: bool) -> ScalarStyle {
        if value.contains('\n') && allow_literal && Self::literal_safe(value) {
            ScalarStyle::Literal
        } else if !Self::needs_quoting(value, flow) {
            ScalarStyle::Plain
        } else if value.contains('\'') || value.chars().any(char::is_control) {
            ScalarStyle::DoubleQuoted
        } else {
            ScalarStyle::SingleQuoted
        }
    }

    /// Whether writing `value` plain would read back differently or break the line structure.
    pub(crate) fn needs_quoting(value: &str, flow: bool) -> bool {
        let Some(first) = value.chars().next() else {
            return true;
        };
        if value != value.trim() || value.chars().any(char::is_control) {
            return true;
        }
        if matches!(
            first,
            '[' | ']' | '{' | '}' | ',' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`'
        ) {
            return true;
        }
        if matches!(first, '-' | '?' | ':') && value[1..].chars().next().map_or(true, |c| c == ' ')
        {
            return true;
        }
        if value.starts_with("---") || value.starts_with("...") {
            return true;
        }
        if value.contains(": ") || value.ends_with(':') || value.contains(" #") {
            return true;
        }
        flow && value.contains(|c: char| matches!(c, ',' | '[' | ']' | '{' | '}'))
    }

    /// Whether `value` survives a round trip through a `|` or `|-` block.
    fn literal_safe(value: &str) -> bool {
        let body = value.strip_suffix('\n').unwrap_or(value);
        !body.is_empty()
            && !body.ends_with('\n')
            && !body
                .chars()
                .any(|c| c != '\n' && c != '\t' && c.is_control())
            && body.split('\n').all(|line| !line.starts_with(is_space))
            && !body.starts_with('\n')
    }

    /// Block header for a literal scalar: `|` keeps the final line break, `|-` has none.
    pub fn literal_header(&self) -> &'static str {
        if self.value.ends_with('\n') {
            "|"
        } else {
            "|-"
        }
    }

    /// Content lines of a literal scalar, without indentation.
    pub fn literal_lines(&self) -> impl Iterator<Item = &str> {
        let body = self.value.strip_suffix('\n').unwrap_or(&self.value);
        body.split('\n')
    }

    /// Render the scalar as a YAML string with proper escaping
    ///
    /// Literal scalars are rendered with their content indented by two spaces.
    pub fn to_yaml_string(&self) -> String {
        match self.style {
            ScalarStyle::Plain => self.value.clone(),
            ScalarStyle::SingleQuoted => self.to_single_quoted(),
            ScalarStyle::DoubleQuoted => self.to_double_quoted(),
            ScalarStyle::Literal => {
                let mut out = self.literal_header().to_string();
                for line in self.literal_lines() {
                    out.push('\n');
                    if !line.is_empty() {
                        out.push_str("  ");
                        out.push_str(line);
                    }
                }
                out
            }
        }
    }

    fn to_single_quoted(&self) -> String {
        format!("'{}'", self.value.replace('\'', "''"))
    }

    fn to_double_quoted(&self) -> String {
        let mut result = String::from("\"");
        for ch in self.value.chars() {
            match ch {
                '"' => result.push_str("\\\""),
                '\\' => result.push_str("\\\\"),
                '\n' => result.push_str("\\n"),
                '\r' => result.push_str("\\r"),
                '\t' => result.push_str("\\t"),
                '\x08' => result.push_str("\\b"),
                '\x0C' => result.push_str("\\f"),
                '\0' => result.push_str("\\0"),
                c if c.is_control() => {
                    result.push_str(&format!("\\x{:02x}", c as u32));
                }
                c => result.push(c),
            }
        }
        result.push('"');
        result
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_yaml_string())
    }
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Join the lines of a flow scalar the way YAML folds them.
///
/// A single line break becomes a space, each empty line becomes a newline,
/// and indentation around the breaks is dropped.
pub(crate) fn fold_lines(text: &str) -> String {
    if !text.contains(|c: char| c == '\n' || c == '\r') {
        return text.to_string();
    }
    let lines: Vec<&str> = text.lines().collect();
    let last = lines.len().saturating_sub(1);
    let mut out = String::new();
    let mut breaks = 0;
    for (i, raw) in lines.iter().enumerate() {
        let mut line = *raw;
        if i > 0 {
            line = line.trim_start_matches(is_space);
        }
        if i < last {
            line = line.trim_end_matches(is_space);
        }
        if i > 0 && i < last && line.is_empty() {
            breaks += 1;
            continue;
        }
        if i > 0 {
            if breaks == 0 {
                out.push(' ');
            }
            for _ in 0..breaks {
                out.push('\n');
            }
            breaks = 0;
        }
        out.push_str(line);
    }
    out
}

fn strip_quotes(text: &str, quote: char) -> &str {
    let inner = text.strip_prefix(quote).unwrap_or(text);
    inner.strip_suffix(quote).unwrap_or(inner)
}

/// Value of a single-quoted scalar, quotes included in `text`.
pub(crate) fn unquote_single(text: &str) -> String {
    fold_lines(strip_quotes(text, '\'')).replace("''", "'")
}

/// Value of a double-quoted scalar, quotes included in `text`.
pub(crate) fn unquote_double(text: &str) -> String {
    let folded = fold_lines(strip_quotes(text, '"'));
    let mut out = String::with_capacity(folded.len());
    let mut chars = folded.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };
        let simple = match escape {
            '0' => Some('\0'),
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            't' | '\t' => Some('\t'),
            'n' => Some('\n'),
            'v' => Some('\x0B'),
            'f' => Some('\x0C'),
            'r' => Some('\r'),
            'e' => Some('\x1B'),
            ' ' => Some(' '),
            '"' => Some('"'),
            '/' => Some('/'),
            '\\' => Some('\\'),
            'N' => Some('\u{85}'),
            '_' => Some('\u{A0}'),
            'L' => Some('\u{2028}'),
            'P' => Some('\u{2029}'),
            _ => None,
        };
        if let Some(c) = simple {
            out.push(c);
            continue;
        }
        let digits = match escape {
            'x' => 2,
            'u' => 4,
            'U' => 8,
            other => {
                out.push('\\');
                out.push(other);
                continue;
            }
        };
        let hex: String = chars.clone().take(digits).collect();
        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
            Some(c) if hex.len() == digits => {
                out.push(c);
                for _ in 0..digits {
                    chars.next();
                }
            }
            _ => {
                out.push('\\');
                out.push(escape);
            }
        }
    }
    out
}

/// Value of a literal (`|`) or folded (`>`) block scalar, header included in `text`.
pub(crate) fn decode_block(text: &str) -> String {
    let mut lines = text.lines();
    let header = lines.next().unwrap_or_default();
    let folded = header.starts_with('>');
    let indicators = header
        .get(1..)
        .unwrap_or_default()
        .split(is_space)
        .next()
        .unwrap_or_default();
    let keep = indicators.contains('+');
    let strip = indicators.contains('-');

    let lines: Vec<&str> = lines.collect();
    let indent = lines
        .iter()
        .find(|line| !line.trim().is_empty())
        .map_or(0, |line| line.len() - line.trim_start_matches(' ').len());

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let content = line.get(indent..).unwrap_or_else(|| line.trim_start_matches(' '));
        if folded {
            if content.is_empty() {
                out.push('\n');
            } else {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push(' ');
                }
                out.push_str(content);
            }
        } else {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(content);
        }
    }
    if keep || (!strip && !out.is_empty()) {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_scalars() {
        for value in ["simple", "hello world", "AAABADlkY=", "true", "123", "a:b", "x#y"] {
            let scalar = ScalarValue::new(value);
            assert_eq!(scalar.style(), ScalarStyle::Plain, "{}", value);
            assert_eq!(scalar.to_yaml_string(), value);
        }
    }

    #[test]
    fn test_values_needing_quotes() {
        assert_eq!(ScalarValue::new("").to_yaml_string(), "''");
        assert_eq!(ScalarValue::new("  spaces  ").to_yaml_string(), "'  spaces  '");
        assert_eq!(
            ScalarValue::new("value: something").to_yaml_string(),
            "'value: something'"
        );
        assert_eq!(ScalarValue::new("# comment").to_yaml_string(), "'# comment'");
        assert_eq!(ScalarValue::new("a #b").to_yaml_string(), "'a #b'");
        assert_eq!(ScalarValue::new("ends:").to_yaml_string(), "'ends:'");
        assert_eq!(ScalarValue::new("- item").to_yaml_string(), "'- item'");
        assert_eq!(ScalarValue::new("*alias").to_yaml_string(), "'*alias'");
        assert_eq!(ScalarValue::new("[array]").to_yaml_string(), "'[array]'");
        assert_eq!(ScalarValue::new("---").to_yaml_string(), "'---'");
    }

    #[test]
    fn test_hyphen_prefix_stays_plain() {
        assert_eq!(ScalarValue::new("-item").to_yaml_string(), "-item");
        assert_eq!(ScalarValue::new("-1").to_yaml_string(), "-1");
    }

    #[test]
    fn test_double_quotes_for_single_quote() {
        assert_eq!(
            ScalarValue::new("'quoted' start").to_yaml_string(),
            "\"'quoted' start\""
        );
    }

    #[test]
    fn test_flow_context_quotes_indicators() {
        assert_eq!(ScalarValue::new("a,b").to_yaml_string(), "a,b");
        assert_eq!(ScalarValue::flow("a,b").to_yaml_string(), "'a,b'");
        assert_eq!(ScalarValue::flow("x}").to_yaml_string(), "'x}'");
    }

    #[test]
    fn test_multiline() {
        let scalar = ScalarValue::new("line1\nline2\n");
        assert_eq!(scalar.style(), ScalarStyle::Literal);
        assert_eq!(scalar.literal_header(), "|");
        assert_eq!(scalar.to_yaml_string(), "|\n  line1\n  line2");

        let scalar = ScalarValue::new("line1\n\nline3");
        assert_eq!(scalar.literal_header(), "|-");
        assert_eq!(scalar.to_yaml_string(), "|-\n  line1\n\n  line3");
    }

    #[test]
    fn test_multiline_falls_back_to_double_quotes() {
        assert_eq!(
            ScalarValue::new("  indented\nline").to_yaml_string(),
            "\"  indented\\nline\""
        );
        assert_eq!(ScalarValue::new("a\n\n").to_yaml_string(), "\"a\\n\\n\"");
        assert_eq!(ScalarValue::flow("a\nb").to_yaml_string(), "\"a\\nb\"");
        assert_eq!(ScalarValue::key("a\nb", false).to_yaml_string(), "\"a\\nb\"");
    }

    #[test]
    fn test_double_quoted_escapes() {
        assert_eq!(
            ScalarValue::new("tab\there").to_yaml_string(),
            "\"tab\\there\""
        );
    }

    #[test]
    fn test_fold_lines() {
        assert_eq!(fold_lines("one"), "one");
        assert_eq!(fold_lines("one\n  two\n  three"), "one two three");
        assert_eq!(fold_lines("one\n\n  two"), "one\ntwo");
        assert_eq!(fold_lines("one\r\n  two"), "one two");
    }

    #[test]
    fn test_unquote_single() {
        assert_eq!(unquote_single("'it''s'"), "it's");
        assert_eq!(unquote_single("' padded '"), " padded ");
        assert_eq!(unquote_single("''"), "");
    }

    #[test]
    fn test_unquote_double() {
        assert_eq!(unquote_double(r#""a\"b""#), "a\"b");
        assert_eq!(unquote_double(r#""line\nnext\ttab""#), "line\nnext\ttab");
        assert_eq!(unquote_double(r#""\x41é\U0001F600""#), "Aé😀");
        assert_eq!(unquote_double(r#""\q and \x4""#), "\\q and \\x4");
        assert_eq!(unquote_double("\"a\n  b\""), "a b");
    }

    #[test]
    fn test_decode_literal_block() {
        assert_eq!(decode_block("|\n  one\n  two"), "one\ntwo\n");
        assert_eq!(decode_block("|-\n  one\n\n  two"), "one\n\ntwo");
        assert_eq!(decode_block("|+\n  one"), "one\n");
        assert_eq!(decode_block("| # note\n    deep\n      deeper"), "deep\n  deeper\n");
    }

    #[test]
    fn test_decode_folded_block() {
        assert_eq!(decode_block(">\n  one\n  two\n\n  three"), "one two\nthree\n");
        assert_eq!(decode_block(">-\n  a\n  b"), "a b");
    }

    #[test]
    fn test_quoted_round_trip() {
        for value in ["it's", "a: b", "\tx", "q\"uote", "back\\slash", "\u{1b}esc"] {
            let rendered = ScalarValue::new(value).to_yaml_string();
            let decoded = if rendered.starts_with('\'') {
                unquote_single(&rendered)
            } else if rendered.starts_with('"') {
                unquote_double(&rendered)
            } else {
                rendered.clone()
            };
            assert_eq!(decoded, value, "{}", rendered);
        }
    }
}
