//! Folio catalog layer
//!
//! This crate compiles the search text typed into a book-catalog browser into a
//! predicate fragment over a Calibre-style `metadata.db`, and keeps the
//! pagination, sort and filter state of a browsing session.
//!
//! # Features
//!
//! - `sqlite` (default) - read field metadata and virtual libraries from a
//!   catalog database with [`SqliteMetadata`](metadata::SqliteMetadata)
//!
//! # Architecture
//!
//! - [`query`] - lexer, parser and predicate compiler for search text
//! - [`metadata`] - field metadata and virtual-library providers
//! - [`types`] - [`QueryOptions`] session state and its record format
//! - [`error`] - error types
//!
//! # Quick Start
//!
//! ```
//! use folio_catalog::metadata::InMemoryMetadata;
//! use folio_catalog::query::{FieldResolver, SearchRequest};
//!
//! let metadata = InMemoryMetadata::new().with_custom_category("#genre", "custom_column_2");
//! let resolver = FieldResolver::new(metadata);
//!
//! let request = SearchRequest::new(r#"#genre:"~epic" OR authors:"=Tolkien""#);
//! let clause = request.clause(&resolver);
//!
//! assert!(clause.starts_with("WHERE (b.id IN (SELECT lct.book FROM books_custom_column_2_link"));
//! assert!(clause.ends_with(r#"WHERE (a.name = "Tolkien")))"#));
//! ```
//!
//! Fields that cannot be resolved never fail a search:
//!
//! ```
//! use folio_catalog::metadata::InMemoryMetadata;
//! use folio_catalog::query::{FieldResolver, compile};
//!
//! let resolver = FieldResolver::new(InMemoryMetadata::new());
//! let predicate = compile(r#"title:"=Dune" AND shelf:"=top""#, &resolver);
//!
//! assert_eq!(predicate.as_str(), r#"(b.title = "Dune")AND (1=1)"#);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod metadata;
pub mod query;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{MetadataError, MetadataResult, OptionsError};
pub use metadata::{FieldMetadata, InMemoryMetadata, VirtualLibraries};
pub use query::{CompiledPredicate, FieldResolver, SearchRequest, compile};
pub use types::{QueryOptions, QueryOptionsForm};

#[cfg(feature = "sqlite")]
pub use metadata::SqliteMetadata;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
