//! Search requests with a cached compiled predicate.

use std::fmt;
use std::sync::OnceLock;

use crate::metadata::FieldMetadata;

use super::compiler::{CompiledPredicate, compile};
use super::fields::FieldResolver;

/// A user-supplied search text.
///
/// The text is compiled on first use and the result is kept, so repeated
/// reads return the same predicate without parsing again.
#[derive(Debug, Default)]
pub struct SearchRequest {
    raw: String,
    compiled: OnceLock<CompiledPredicate>,
}

impl SearchRequest {
    /// Creates a request for `raw`.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            compiled: OnceLock::new(),
        }
    }

    /// Returns the search text as given.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns true once the predicate has been compiled.
    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// Returns the compiled predicate, compiling it on first call.
    ///
    /// The resolver of the first call wins; later calls return the cached
    /// predicate whatever resolver they pass.
    pub fn compiled<M: FieldMetadata>(&self, resolver: &FieldResolver<M>) -> &CompiledPredicate {
        self.compiled.get_or_init(|| compile(&self.raw, resolver))
    }

    /// Returns the predicate fragment without the `WHERE` keyword.
    pub fn predicate<M: FieldMetadata>(&self, resolver: &FieldResolver<M>) -> &str {
        self.compiled(resolver).as_str()
    }

    /// Returns `WHERE <fragment>`, or an empty string if nothing was compiled.
    pub fn clause<M: FieldMetadata>(&self, resolver: &FieldResolver<M>) -> String {
        self.compiled(resolver).clause()
    }
}

impl Clone for SearchRequest {
    fn clone(&self) -> Self {
        let compiled = OnceLock::new();
        if let Some(predicate) = self.compiled.get() {
            let _ = compiled.set(predicate.clone());
        }
        Self {
            raw: self.raw.clone(),
            compiled,
        }
    }
}

impl From<&str> for SearchRequest {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for SearchRequest {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let predicate = self.compiled.get().map_or("", CompiledPredicate::as_str);
        write!(f, "raw: '{}' | where: '{}'", self.raw, predicate)
    }
}
