//! Parser for search text.
//!
//! Walks the token stream left to right and collects every structured term
//! `[!][#]entity:"[=|~]literal" [AND|OR]`. Tokens that do not start a
//! well-formed term are skipped; they only matter again when they follow the
//! last term and form the free-text remainder.

use super::expression::{Connector, Expression, FreeText, Matcher};
use super::lexer::{Token, TokenKind, is_word_char, tokenize};

/// The structured terms of an input and where scanning stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredScan {
    /// Recognized terms in input order.
    pub expressions: Vec<Expression>,
    /// Byte offset just past the last recognized term (0 if none).
    pub cursor: usize,
}

impl StructuredScan {
    /// Returns true if no structured term was recognized.
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

/// Parser over a token stream.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Creates a parser for `input`.
    pub fn new(input: &str) -> Self {
        Self {
            tokens: tokenize(input),
            pos: 0,
        }
    }

    /// Collects all structured terms.
    pub fn parse(mut self) -> StructuredScan {
        let mut scan = StructuredScan::default();

        while self.pos < self.tokens.len() {
            match self.structured_term(self.pos) {
                Some((expr, next)) => {
                    scan.expressions.push(expr);
                    scan.cursor = self.tokens[next - 1].span.end;
                    self.pos = next;
                }
                None => self.pos += 1,
            }
        }

        let skipped = self
            .tokens
            .iter()
            .filter(|t| t.span.end <= scan.cursor && matches!(t.kind, TokenKind::Word(_)))
            .count();
        let in_terms: usize = scan
            .expressions
            .iter()
            .map(|e| 1 + usize::from(e.connector.is_some()))
            .sum();
        if skipped > in_terms {
            tracing::debug!(
                words = skipped - in_terms,
                "Ignoring free text before the last structured term"
            );
        }

        scan
    }

    fn token(&self, idx: usize) -> Option<&Token> {
        self.tokens.get(idx)
    }

    /// Returns the token at `idx` if it directly follows the one before it.
    fn adjacent(&self, idx: usize) -> Option<&Token> {
        let prev = self.tokens.get(idx.checked_sub(1)?)?;
        self.token(idx).filter(|t| prev.touches(t))
    }

    /// Tries to read one term starting at `start`. Returns the expression and
    /// the index of the first token after it.
    fn structured_term(&self, start: usize) -> Option<(Expression, usize)> {
        let mut idx = start;

        let negated = matches!(self.token(idx)?.kind, TokenKind::Bang);
        if negated {
            idx += 1;
            self.adjacent(idx)?;
        }

        let mut entity = String::new();
        if matches!(self.token(idx)?.kind, TokenKind::Hash) {
            entity.push('#');
            idx += 1;
            self.adjacent(idx)?;
        }

        match &self.token(idx)?.kind {
            TokenKind::Word(word) => entity.push_str(word),
            _ => return None,
        }
        idx += 1;

        if !matches!(self.adjacent(idx)?.kind, TokenKind::Colon) {
            return None;
        }
        idx += 1;

        let literal = match &self.adjacent(idx)?.kind {
            TokenKind::Literal(literal) => literal,
            _ => return None,
        };
        idx += 1;

        let (matcher, term) = split_operator(literal);

        let connector = match self.token(idx).map(|t| &t.kind) {
            Some(TokenKind::Word(word)) => Connector::parse(word),
            _ => None,
        };
        if connector.is_some() {
            idx += 1;
        }

        let expr = Expression::new(entity, term)
            .with_matcher(matcher)
            .with_negation(negated)
            .with_connector(connector);
        Some((expr, idx))
    }
}

/// Splits the leading `=`/`~` off a literal; exact when absent.
fn split_operator(literal: &str) -> (Matcher, &str) {
    let mut chars = literal.chars();
    match chars.next().and_then(Matcher::from_symbol) {
        Some(matcher) => (matcher, chars.as_str()),
        None => (Matcher::Exact, literal),
    }
}

/// Collects the structured terms of `input`.
pub fn scan_structured(input: &str) -> StructuredScan {
    Parser::new(input).parse()
}

/// Finds the free-text remainder in `tail`.
///
/// The remainder is the first run of word characters and spaces, negated when
/// the nearest non-whitespace character before it is `!`. Whitespace-only runs
/// are not a remainder.
pub fn scan_remainder(tail: &str) -> Option<FreeText> {
    let (start, _) = tail.char_indices().find(|(_, c)| is_word_char(*c))?;

    let run = &tail[start..];
    let len = run
        .char_indices()
        .find(|(_, c)| !is_word_char(*c) && *c != ' ')
        .map_or(run.len(), |(i, _)| i);
    let text = run[..len].trim();

    let negated = tail[..start].trim_end().ends_with('!');

    if text.is_empty() {
        return None;
    }
    Some(FreeText {
        negated,
        text: text.to_string(),
    })
}
