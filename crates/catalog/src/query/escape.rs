//! Literal escaping for double-quoted SQL string literals.

/// Escapes `text` for embedding between double quotes in a predicate fragment.
///
/// Backslash, double quote, carriage return and line feed get a leading
/// backslash; the SUB control character (0x1A) becomes `\Z`. Everything else,
/// the apostrophe included, passes through: literals are always enclosed in
/// double quotes and apostrophes are common in titles and names.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '\\' | '"' | '\r' | '\n' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '\u{1a}' => escaped.push_str("\\Z"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reads back a double-quoted literal the way the target store does.
    fn unescape(literal: &str) -> String {
        let mut out = String::new();
        let mut chars = literal.chars();
        while let Some(ch) = chars.next() {
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some('Z') => out.push('\u{1a}'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        }
        out
    }

    #[test]
    fn test_escape_empty() {
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_escape_plain_text_unchanged() {
        assert_eq!(escape("The Hobbit"), "The Hobbit");
        assert_eq!(escape("Ünïcødé"), "Ünïcødé");
    }

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape(r"C:\books"), r"C:\\books");
        assert_eq!(escape("a\nb\rc"), "a\\\nb\\\rc");
        assert_eq!(escape("end\u{1a}"), "end\\Z");
    }

    #[test]
    fn test_escape_leaves_apostrophe() {
        assert_eq!(escape("O'Brien"), "O'Brien");
    }

    #[test]
    fn test_escape_reads_back() {
        for original in [
            r#"quote " and backslash \"#,
            "line\nfeed and carriage\rreturn",
            "ctrl-z \u{1a} inside",
            "it's fine",
        ] {
            assert_eq!(unescape(&escape(original)), original);
        }
    }
}
