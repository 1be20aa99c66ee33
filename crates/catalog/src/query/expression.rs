//! Search expression types.
//!
//! An [`Expression`] is one atomic clause: a field, how to match it, an
//! optional negation and the connector tying it to the next clause. The user
//! syntax is a flat left-to-right chain, so there is no tree here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a term is compared against a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// `=`: the field equals the term.
    #[default]
    Exact,
    /// `~`: the field contains the term.
    Substring,
}

impl Matcher {
    /// Parses the operator symbol leading a literal.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '=' => Some(Matcher::Exact),
            '~' => Some(Matcher::Substring),
            _ => None,
        }
    }

    /// Returns the operator symbol.
    pub fn symbol(&self) -> char {
        match self {
            Matcher::Exact => '=',
            Matcher::Substring => '~',
        }
    }
}

/// Boolean connector binding an expression to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    /// `AND`; an unresolved term after it becomes `(1=1)`.
    And,
    /// `OR`; an unresolved term after it becomes `(1=0)`.
    Or,
}

impl Connector {
    /// Parses a connector keyword, case-insensitively.
    pub fn parse(keyword: &str) -> Option<Self> {
        if keyword.eq_ignore_ascii_case("and") {
            Some(Connector::And)
        } else if keyword.eq_ignore_ascii_case("or") {
            Some(Connector::Or)
        } else {
            None
        }
    }

    /// Returns the SQL keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }

    /// The neutral fragment standing in for an unresolved field that follows
    /// this connector: always-true after AND, always-false after OR.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Connector::And => "(1=1)",
            Connector::Or => "(1=0)",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One atomic search clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    /// Lower-cased field selector, possibly `#`-prefixed.
    pub entity: String,
    /// How to compare.
    pub matcher: Matcher,
    /// Whether the comparison is negated.
    pub negated: bool,
    /// Connector to the next expression.
    pub connector: Option<Connector>,
    /// The raw, unescaped literal.
    pub term: String,
}

impl Expression {
    /// Creates an exact, non-negated expression without connector.
    pub fn new(entity: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            entity: entity.into().to_lowercase(),
            matcher: Matcher::Exact,
            negated: false,
            connector: None,
            term: term.into(),
        }
    }

    /// Sets the matcher.
    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Sets the negation flag.
    pub fn with_negation(mut self, negated: bool) -> Self {
        self.negated = negated;
        self
    }

    /// Sets the connector to the next expression.
    pub fn with_connector(mut self, connector: Option<Connector>) -> Self {
        self.connector = connector;
        self
    }
}

/// Free text searched across all bibliographic fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeText {
    /// Negates the match on every field.
    pub negated: bool,
    /// Trimmed search text.
    pub text: String,
}
