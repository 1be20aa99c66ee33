//! Search query compilation.
//!
//! Turns the search text typed by a user into a predicate fragment over the
//! catalog schema. The text mixes free words with structured terms:
//!
//! ```text
//! [!][#]field:"[=|~]value" [AND|OR]
//! ```
//!
//! - `!` negates the term
//! - `#` marks a custom field (optional, custom fields are also found without it)
//! - `=` matches the whole value, `~` a substring (exact when omitted)
//!
//! Free text following the last structured term is searched as a substring of
//! every bibliographic field. Text without any structured term is searched the
//! same way as a whole.
//!
//! Fields that do not resolve never fail the search: they are replaced by a
//! neutral `(1=1)` / `(1=0)` group that keeps the chain well formed.
//!
//! # Example
//!
//! ```
//! use folio_catalog::metadata::InMemoryMetadata;
//! use folio_catalog::query::{FieldResolver, SearchRequest};
//!
//! let resolver = FieldResolver::new(InMemoryMetadata::new());
//! let request = SearchRequest::new(r#"title:"=Dune" AND tags:"~scifi""#);
//!
//! let clause = request.clause(&resolver);
//! assert!(clause.starts_with(r#"WHERE (b.title = "Dune")AND "#));
//! ```

mod compiler;
mod escape;
mod expression;
mod fields;
mod lexer;
mod parser;
mod request;

pub use compiler::{CompiledPredicate, PredicateCompiler, compile};
pub use escape::escape;
pub use expression::{Connector, Expression, FreeText, Matcher};
pub use fields::{ALL_FIELDS, FieldPlan, FieldResolver, builtin_plan, is_safe_identifier, metadata_key};
pub use lexer::{Lexer, Span, Token, TokenKind, tokenize};
pub use parser::{Parser, StructuredScan, scan_remainder, scan_structured};
pub use request::SearchRequest;
