//! Lexer for search text.
//!
//! Produces a flat token stream with byte spans. Whitespace is skipped; the
//! parser checks adjacency through the spans, since `!entity:"literal"` must
//! be written without gaps while connectors may follow after whitespace.
//!
//! Literals are contextual: a double quote opens a literal only directly
//! after a colon, and only if a closing quote exists. Any other quote is an
//! ordinary [`TokenKind::Other`] character, so unterminated or stray quotes
//! never swallow the rest of the input.

/// Byte range of a token in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Offset of the first byte.
    pub start: usize,
    /// Offset just past the last byte.
    pub end: usize,
}

/// Token types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `!`
    Bang,
    /// `#`
    Hash,
    /// `:`
    Colon,
    /// A run of word characters (alphanumerics and `_`).
    Word(String),
    /// Text between double quotes, quotes stripped.
    Literal(String),
    /// Any other character.
    Other(char),
}

/// A token and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was read.
    pub kind: TokenKind,
    /// Where it was read.
    pub span: Span,
}

impl Token {
    /// Returns true if `next` starts exactly where this token ends.
    pub fn touches(&self, next: &Token) -> bool {
        self.span.end == next.span.start
    }
}

/// Returns true for characters that make up words.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lexer for search text.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    after_colon: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            after_colon: false,
        }
    }

    /// Tokenizes the entire input.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    /// Peeks at the next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Consumes and returns the next character.
    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.consume();
            self.after_colon = false;
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let start = self.pos;
        let after_colon = std::mem::take(&mut self.after_colon);

        let kind = match self.peek()? {
            '"' if after_colon => match self.read_literal() {
                Some(text) => TokenKind::Literal(text),
                None => {
                    self.consume();
                    TokenKind::Other('"')
                }
            },
            c if is_word_char(c) => TokenKind::Word(self.read_word()),
            '!' => {
                self.consume();
                TokenKind::Bang
            }
            '#' => {
                self.consume();
                TokenKind::Hash
            }
            ':' => {
                self.consume();
                self.after_colon = true;
                TokenKind::Colon
            }
            c => {
                self.consume();
                TokenKind::Other(c)
            }
        };

        Some(Token {
            kind,
            span: Span {
                start,
                end: self.pos,
            },
        })
    }

    fn read_word(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_word_char(c) {
                break;
            }
            self.consume();
        }
        self.input[start..self.pos].to_string()
    }

    /// Reads a quoted literal starting at the current quote. Leaves the
    /// position untouched and returns `None` if the quote is never closed.
    fn read_literal(&mut self) -> Option<String> {
        let body_start = self.pos + 1;
        let len = self.input[body_start..].find('"')?;
        self.pos = body_start + len + 1;
        Some(self.input[body_start..body_start + len].to_string())
    }
}

/// Tokenizes `input`.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_structured_term() {
        assert_eq!(
            kinds(r#"!tags:"~sci fi" AND"#),
            vec![
                TokenKind::Bang,
                TokenKind::Word("tags".into()),
                TokenKind::Colon,
                TokenKind::Literal("~sci fi".into()),
                TokenKind::Word("AND".into()),
            ]
        );
    }

    #[test]
    fn test_spans_track_adjacency() {
        let tokens = tokenize(r#"#genre:"=x"  or"#);
        assert!(tokens[0].touches(&tokens[1]));
        assert!(tokens[1].touches(&tokens[2]));
        assert!(tokens[2].touches(&tokens[3]));
        assert!(!tokens[3].touches(&tokens[4]));
        assert_eq!(tokens[4].span, Span { start: 13, end: 15 });
    }

    #[test]
    fn test_quote_without_colon_is_other() {
        assert_eq!(
            kinds(r#""dune""#),
            vec![
                TokenKind::Other('"'),
                TokenKind::Word("dune".into()),
                TokenKind::Other('"'),
            ]
        );
    }

    #[test]
    fn test_quote_after_space_is_not_literal() {
        assert_eq!(
            kinds(r#"title: "x""#),
            vec![
                TokenKind::Word("title".into()),
                TokenKind::Colon,
                TokenKind::Other('"'),
                TokenKind::Word("x".into()),
                TokenKind::Other('"'),
            ]
        );
    }

    #[test]
    fn test_unterminated_literal() {
        assert_eq!(
            kinds(r#"author:"Tolk"#),
            vec![
                TokenKind::Word("author".into()),
                TokenKind::Colon,
                TokenKind::Other('"'),
                TokenKind::Word("Tolk".into()),
            ]
        );
    }

    #[test]
    fn test_unicode_words() {
        assert_eq!(
            kinds("Müller straße_2"),
            vec![
                TokenKind::Word("Müller".into()),
                TokenKind::Word("straße_2".into()),
            ]
        );
    }

    #[test]
    fn test_empty_literal() {
        assert_eq!(
            kinds(r#"title:"""#),
            vec![
                TokenKind::Word("title".into()),
                TokenKind::Colon,
                TokenKind::Literal(String::new()),
            ]
        );
    }
}
