//! Session state types.
//!
//! - [`QueryOptions`] - pagination, sort and filter state of a browsing session
//! - [`QueryOptionsForm`] - the request values merged into it
//! - [`SortBy`], [`GuiLang`], [`Layout`], [`Theme`] - presentation choices
//!
//! # Example
//!
//! ```
//! use folio_catalog::metadata::InMemoryMetadata;
//! use folio_catalog::types::{QueryOptions, QueryOptionsForm};
//!
//! let mut options = QueryOptions::new(24);
//! options.limit_start = 48;
//!
//! let form = QueryOptionsForm::new()
//!     .with("limitlength", "48").unwrap()
//!     .with("order", "descending").unwrap();
//! options.update(&form, &InMemoryMetadata::new());
//!
//! assert_eq!(options.limit_length, 48);
//! assert_eq!(options.limit_start, 0);
//!
//! let record = options.to_string();
//! assert_eq!(record.parse::<QueryOptions>().unwrap(), options);
//! ```

mod choices;
mod query_options;

pub use choices::{GuiLang, Layout, SortBy, Theme};
pub use query_options::{
    DEFAULT_PAGE_SIZE, NO_VIRTUAL_LIBRARY, PAGE_SIZES, QueryOptions, QueryOptionsForm,
};
