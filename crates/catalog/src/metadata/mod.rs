//! Catalog metadata consumed by the search compiler and query options.
//!
//! Two read-only interfaces are defined here:
//!
//! - [`FieldMetadata`] - per-field properties (`is_custom`, `is_category`,
//!   `table`) used to decide whether an administrator-defined field is
//!   searchable
//! - [`VirtualLibraries`] - named, predefined search texts
//!
//! [`InMemoryMetadata`] implements both from plain maps. With the `sqlite`
//! feature, [`SqliteMetadata`] reads them from a catalog database.
//!
//! # Example
//!
//! ```
//! use folio_catalog::metadata::{FieldMetadata, InMemoryMetadata};
//!
//! let metadata = InMemoryMetadata::new().with_custom_category("#genre", "custom_column_2");
//!
//! let table = metadata.lookup_field_property("#genre", "table").unwrap();
//! assert_eq!(table, "custom_column_2");
//! ```

#[cfg(feature = "sqlite")]
mod sqlite;

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use crate::error::{MetadataError, MetadataResult};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteMetadata, SqliteMetadataConfig};

/// Property name flagging an administrator-defined field.
pub const PROP_IS_CUSTOM: &str = "is_custom";

/// Property name flagging a field whose values live in a lookup table.
pub const PROP_IS_CATEGORY: &str = "is_category";

/// Property name holding the backing table of a custom field.
pub const PROP_TABLE: &str = "table";

/// Read-only access to per-field metadata.
///
/// Field keys are `"#" + lowercase(name)` for custom fields.
pub trait FieldMetadata {
    /// Returns the value of `property` for the field `field_key`.
    fn lookup_field_property(&self, field_key: &str, property: &str) -> MetadataResult<Value>;
}

/// Read-only access to the catalog's virtual libraries.
pub trait VirtualLibraries {
    /// Returns all virtual libraries as name → predefined search text.
    fn virtual_libraries(&self) -> MetadataResult<BTreeMap<String, String>>;

    /// Returns the predefined search text of one library.
    fn virtual_library_query(&self, name: &str) -> MetadataResult<Option<String>> {
        Ok(self.virtual_libraries()?.remove(name))
    }
}

impl<T: FieldMetadata + ?Sized> FieldMetadata for &T {
    fn lookup_field_property(&self, field_key: &str, property: &str) -> MetadataResult<Value> {
        (**self).lookup_field_property(field_key, property)
    }
}

impl<T: VirtualLibraries + ?Sized> VirtualLibraries for &T {
    fn virtual_libraries(&self) -> MetadataResult<BTreeMap<String, String>> {
        (**self).virtual_libraries()
    }

    fn virtual_library_query(&self, name: &str) -> MetadataResult<Option<String>> {
        (**self).virtual_library_query(name)
    }
}

/// Looks up `property` in a decoded `field_metadata` map.
///
/// Shared by every provider that holds the metadata as JSON objects.
pub(crate) fn property_from_map(
    fields: &HashMap<String, Map<String, Value>>,
    field_key: &str,
    property: &str,
) -> MetadataResult<Value> {
    let field = fields
        .get(field_key)
        .ok_or_else(|| MetadataError::FieldNotFound {
            field: field_key.to_string(),
        })?;
    field
        .get(property)
        .cloned()
        .ok_or_else(|| MetadataError::PropertyNotFound {
            field: field_key.to_string(),
            property: property.to_string(),
        })
}

/// In-memory metadata provider.
///
/// Useful for tests and for embedding the compiler without a database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadata {
    fields: HashMap<String, Map<String, Value>>,
    libraries: BTreeMap<String, String>,
}

impl InMemoryMetadata {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one property of a field.
    pub fn with_property(
        mut self,
        field_key: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.fields
            .entry(field_key.into())
            .or_default()
            .insert(property.into(), value.into());
        self
    }

    /// Registers a searchable custom category backed by `table`.
    pub fn with_custom_category(self, field_key: impl Into<String>, table: &str) -> Self {
        let key = field_key.into();
        self.with_property(key.clone(), PROP_IS_CUSTOM, true)
            .with_property(key.clone(), PROP_IS_CATEGORY, true)
            .with_property(key, PROP_TABLE, table)
    }

    /// Registers a virtual library.
    pub fn with_virtual_library(
        mut self,
        name: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        self.libraries.insert(name.into(), query.into());
        self
    }

    /// Returns the number of fields with metadata.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field metadata is registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldMetadata for InMemoryMetadata {
    fn lookup_field_property(&self, field_key: &str, property: &str) -> MetadataResult<Value> {
        property_from_map(&self.fields, field_key, property)
    }
}

impl VirtualLibraries for InMemoryMetadata {
    fn virtual_libraries(&self) -> MetadataResult<BTreeMap<String, String>> {
        Ok(self.libraries.clone())
    }

    fn virtual_library_query(&self, name: &str) -> MetadataResult<Option<String>> {
        Ok(self.libraries.get(name).cloned())
    }
}
