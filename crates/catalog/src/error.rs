//! Error types for the catalog layer.
//!
//! The search compiler itself never fails: unresolvable fields and malformed
//! syntax degrade to neutral fragments. The errors here cover the collaborators
//! around it, namely metadata lookups and the query-options record codec.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// Errors raised by a [`FieldMetadata`](crate::metadata::FieldMetadata) or
/// [`VirtualLibraries`](crate::metadata::VirtualLibraries) provider.
///
/// The field resolver treats every one of these as "field not searchable".
#[derive(Error, Debug)]
pub enum MetadataError {
    /// No metadata entry exists for the field key.
    #[error("field not found: {field}")]
    FieldNotFound { field: String },

    /// The field exists but does not carry the requested property.
    #[error("property '{property}' not found for field {field}")]
    PropertyNotFound { field: String, property: String },

    /// A stored preference could not be decoded.
    #[error("invalid preference '{key}': {message}")]
    InvalidPreference { key: String, message: String },

    /// The backing store failed.
    #[error("metadata backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MetadataError {
    /// Wraps a backend failure.
    pub fn backend(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        MetadataError::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for MetadataError {
    fn from(err: rusqlite::Error) -> Self {
        MetadataError::backend("sqlite query failed", err)
    }
}

/// Errors decoding a serialized [`QueryOptions`](crate::types::QueryOptions) record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// The record does not follow the `|a|b|...|` layout.
    #[error("malformed options record at position {position}: {message}")]
    MalformedRecord { position: usize, message: String },

    /// A slot holds a value of the wrong type.
    #[error("invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// Result type for metadata lookups.
pub type MetadataResult<T> = Result<T, MetadataError>;
