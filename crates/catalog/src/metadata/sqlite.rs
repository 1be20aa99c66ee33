//! SQLite metadata provider.
//!
//! Reads the `field_metadata` and `virtual_libraries` preferences of a
//! catalog database (`preferences(key, val)`, `val` holding JSON).

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MetadataError, MetadataResult};

use super::{FieldMetadata, VirtualLibraries, property_from_map};

/// Preference key holding the per-field metadata object.
const FIELD_METADATA_KEY: &str = "field_metadata";

/// Preference key holding the virtual-library map.
const VIRTUAL_LIBRARIES_KEY: &str = "virtual_libraries";

/// Decoded preferences, cached until [`SqliteMetadata::reload`].
#[derive(Debug, Default)]
struct Preferences {
    fields: HashMap<String, Map<String, Value>>,
    libraries: BTreeMap<String, String>,
}

/// Metadata provider backed by a catalog's SQLite database.
pub struct SqliteMetadata {
    conn: Mutex<Connection>,
    config: SqliteMetadataConfig,
    cache: RwLock<Option<Arc<Preferences>>>,
}

impl Debug for SqliteMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteMetadata")
            .field("config", &self.config)
            .field("cached", &self.cache.read().is_some())
            .finish_non_exhaustive()
    }
}

/// Configuration for the SQLite metadata provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteMetadataConfig {
    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Open the database read-only.
    #[serde(default = "default_true")]
    pub read_only: bool,
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteMetadataConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: default_busy_timeout_ms(),
            read_only: true,
        }
    }
}

impl SqliteMetadata {
    /// Opens a catalog database read-only with default settings.
    pub fn open<P: AsRef<Path>>(path: P) -> MetadataResult<Self> {
        Self::with_config(path, SqliteMetadataConfig::default())
    }

    /// Opens a catalog database with custom configuration.
    pub fn with_config<P: AsRef<Path>>(
        path: P,
        config: SqliteMetadataConfig,
    ) -> MetadataResult<Self> {
        let flags = if config.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        };
        let conn = Connection::open_with_flags(path.as_ref(), flags).map_err(|e| {
            MetadataError::backend(
                format!("failed to open {}", path.as_ref().display()),
                e,
            )
        })?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

        tracing::debug!(path = %path.as_ref().display(), "Opened catalog metadata database");
        Ok(Self::from_parts(conn, config))
    }

    /// Wraps an already open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self::from_parts(conn, SqliteMetadataConfig::default())
    }

    fn from_parts(conn: Connection, config: SqliteMetadataConfig) -> Self {
        Self {
            conn: Mutex::new(conn),
            config,
            cache: RwLock::new(None),
        }
    }

    /// Returns the provider configuration.
    pub fn config(&self) -> &SqliteMetadataConfig {
        &self.config
    }

    /// Drops the cached preferences; the next lookup re-reads the database.
    pub fn reload(&self) {
        *self.cache.write() = None;
    }

    fn preferences(&self) -> MetadataResult<Arc<Preferences>> {
        if let Some(prefs) = self.cache.read().as_ref() {
            return Ok(Arc::clone(prefs));
        }

        let prefs = Arc::new(self.load_preferences()?);
        *self.cache.write() = Some(Arc::clone(&prefs));
        Ok(prefs)
    }

    fn load_preferences(&self) -> MetadataResult<Preferences> {
        let conn = self.conn.lock();
        let fields = match read_preference(&conn, FIELD_METADATA_KEY)? {
            Some(text) => decode_field_metadata(&text)?,
            None => HashMap::new(),
        };
        let libraries = match read_preference(&conn, VIRTUAL_LIBRARIES_KEY)? {
            Some(text) => serde_json::from_str(&text).map_err(|e| {
                MetadataError::InvalidPreference {
                    key: VIRTUAL_LIBRARIES_KEY.to_string(),
                    message: e.to_string(),
                }
            })?,
            None => BTreeMap::new(),
        };

        tracing::debug!(
            fields = fields.len(),
            virtual_libraries = libraries.len(),
            "Loaded catalog preferences"
        );
        Ok(Preferences { fields, libraries })
    }
}

fn read_preference(conn: &Connection, key: &str) -> MetadataResult<Option<String>> {
    let text = conn
        .query_row(
            "SELECT val FROM preferences WHERE key = ?1",
            [key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(text)
}

/// Decodes the `field_metadata` preference, skipping entries that are not
/// JSON objects.
fn decode_field_metadata(text: &str) -> MetadataResult<HashMap<String, Map<String, Value>>> {
    let value: Value = serde_json::from_str(text).map_err(|e| MetadataError::InvalidPreference {
        key: FIELD_METADATA_KEY.to_string(),
        message: e.to_string(),
    })?;
    let Value::Object(entries) = value else {
        return Err(MetadataError::InvalidPreference {
            key: FIELD_METADATA_KEY.to_string(),
            message: "expected a JSON object".to_string(),
        });
    };

    Ok(entries
        .into_iter()
        .filter_map(|(key, entry)| match entry {
            Value::Object(props) => Some((key, props)),
            _ => None,
        })
        .collect())
}

impl FieldMetadata for SqliteMetadata {
    fn lookup_field_property(&self, field_key: &str, property: &str) -> MetadataResult<Value> {
        let prefs = self.preferences()?;
        property_from_map(&prefs.fields, field_key, property)
    }
}

impl VirtualLibraries for SqliteMetadata {
    fn virtual_libraries(&self) -> MetadataResult<BTreeMap<String, String>> {
        Ok(self.preferences()?.libraries.clone())
    }

    fn virtual_library_query(&self, name: &str) -> MetadataResult<Option<String>> {
        Ok(self.preferences()?.libraries.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_with(prefs: &[(&str, &str)]) -> SqliteMetadata {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE preferences (id INTEGER PRIMARY KEY, key TEXT NOT NULL UNIQUE, val TEXT NOT NULL);",
        )
        .unwrap();
        for (key, val) in prefs {
            conn.execute(
                "INSERT INTO preferences (key, val) VALUES (?1, ?2)",
                [key, val],
            )
            .unwrap();
        }
        SqliteMetadata::from_connection(conn)
    }

    #[test]
    fn test_reads_field_metadata() {
        let metadata = catalog_with(&[(
            "field_metadata",
            r##"{"#genre": {"is_custom": true, "is_category": true, "table": "custom_column_1"}, "title": {"is_custom": false}}"##,
        )]);

        assert_eq!(
            metadata.lookup_field_property("#genre", "table").unwrap(),
            Value::from("custom_column_1")
        );
        assert_eq!(
            metadata.lookup_field_property("title", "is_custom").unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_missing_preferences_are_empty() {
        let metadata = catalog_with(&[]);
        assert!(matches!(
            metadata.lookup_field_property("#genre", "table"),
            Err(MetadataError::FieldNotFound { .. })
        ));
        assert!(metadata.virtual_libraries().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let metadata = catalog_with(&[("field_metadata", "{not json")]);
        assert!(matches!(
            metadata.lookup_field_property("#genre", "table"),
            Err(MetadataError::InvalidPreference { .. })
        ));
    }

    #[test]
    fn test_missing_table_is_backend_error() {
        let metadata = SqliteMetadata::from_connection(Connection::open_in_memory().unwrap());
        assert!(matches!(
            metadata.virtual_libraries(),
            Err(MetadataError::Backend { .. })
        ));
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let metadata = catalog_with(&[("virtual_libraries", r#"{"Fantasy": "tags:\"=fantasy\""}"#)]);
        assert_eq!(metadata.virtual_libraries().unwrap().len(), 1);

        metadata
            .conn
            .lock()
            .execute(
                "UPDATE preferences SET val = ?1 WHERE key = 'virtual_libraries'",
                [r#"{"Fantasy": "tags:\"=fantasy\"", "Crime": "tags:\"=crime\""}"#],
            )
            .unwrap();

        assert_eq!(metadata.virtual_libraries().unwrap().len(), 1);
        metadata.reload();
        assert_eq!(metadata.virtual_libraries().unwrap().len(), 2);
    }
}
