//! Field resolution: entity names to SQL templates.
//!
//! Built-in bibliographic fields map to precomputed templates against the
//! catalog schema (books aliased `b`). Any other name is treated as a custom
//! field and is only searchable when its metadata flags it as a custom
//! category; its backing table name must pass [`is_safe_identifier`] before
//! it is interpolated.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::metadata::{FieldMetadata, PROP_IS_CATEGORY, PROP_IS_CUSTOM, PROP_TABLE};

/// How a field is reached from the books table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPlan {
    /// `b.id IN (<select> WHERE (<column> ...))`.
    Subquery {
        /// Link-table query selecting book ids.
        select: Cow<'static, str>,
        /// Column compared inside the subquery.
        column: Cow<'static, str>,
    },
    /// A column on the book row itself.
    Column {
        /// Column of the `books` table.
        column: &'static str,
    },
}

impl FieldPlan {
    /// The column the comparison applies to.
    pub fn column(&self) -> &str {
        match self {
            FieldPlan::Subquery { column, .. } => &**column,
            FieldPlan::Column { column } => *column,
        }
    }
}

/// A built-in field with its accepted spellings.
struct BuiltinField {
    names: &'static [&'static str],
    select: Option<&'static str>,
    column: &'static str,
}

/// Built-in fields, in the order the all-fields search visits them.
static BUILTIN_FIELDS: [BuiltinField; 8] = [
    BuiltinField {
        names: &["authors", "author"],
        select: Some(
            "SELECT ba.book FROM books_authors_link ba JOIN authors a ON(ba.author = a.id)",
        ),
        column: "a.name",
    },
    BuiltinField {
        names: &["comment"],
        select: Some("SELECT c.book FROM comments c"),
        column: "c.text",
    },
    BuiltinField {
        names: &["format"],
        select: Some("SELECT d.book FROM data d"),
        column: "d.format",
    },
    BuiltinField {
        names: &["language", "languages"],
        select: Some(
            "SELECT bl.book FROM books_languages_link bl JOIN languages l ON(bl.lang_code = l.id)",
        ),
        column: "l.lang_code",
    },
    BuiltinField {
        names: &["publisher"],
        select: Some(
            "SELECT bp.book FROM books_publishers_link bp JOIN publishers p ON(bp.publisher = p.id)",
        ),
        column: "p.name",
    },
    BuiltinField {
        names: &["series"],
        select: Some(
            "SELECT bs.book FROM books_series_link bs JOIN series s ON(bs.series = s.id)",
        ),
        column: "s.name",
    },
    BuiltinField {
        names: &["tags", "tag"],
        select: Some("SELECT bt.book FROM books_tags_link bt JOIN tags t ON(bt.tag = t.id)"),
        column: "t.name",
    },
    BuiltinField {
        names: &["title"],
        select: None,
        column: "b.title",
    },
];

/// Canonical names searched by a free-text query, `title` last.
pub const ALL_FIELDS: [&str; 8] = [
    "authors",
    "comment",
    "format",
    "language",
    "publisher",
    "series",
    "tags",
    "title",
];

static SAFE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Returns true if `name` may be interpolated as a table name.
pub fn is_safe_identifier(name: &str) -> bool {
    SAFE_IDENTIFIER.is_match(name)
}

/// Returns the plan of a built-in field, if `entity` names one.
///
/// `entity` is matched case-insensitively.
pub fn builtin_plan(entity: &str) -> Option<FieldPlan> {
    let entity = entity.to_lowercase();
    BUILTIN_FIELDS
        .iter()
        .find(|field| field.names.contains(&entity.as_str()))
        .map(|field| match field.select {
            Some(select) => FieldPlan::Subquery {
                select: Cow::Borrowed(select),
                column: Cow::Borrowed(field.column),
            },
            None => FieldPlan::Column {
                column: field.column,
            },
        })
}

/// Normalizes an entity name to a metadata key: lower-cased, `#`-prefixed.
pub fn metadata_key(entity: &str) -> String {
    let lower = entity.to_lowercase();
    if lower.starts_with('#') {
        lower
    } else {
        format!("#{lower}")
    }
}

/// Resolves entity names to [`FieldPlan`]s.
///
/// Resolution never fails loudly: an unknown name, a metadata lookup error or
/// a custom field that is not a searchable category all yield `None`.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<M> {
    metadata: M,
}

impl<M: FieldMetadata> FieldResolver<M> {
    /// Creates a resolver consulting `metadata` for custom fields.
    pub fn new(metadata: M) -> Self {
        Self { metadata }
    }

    /// Returns the metadata provider.
    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    /// Resolves `entity` to a plan.
    pub fn resolve(&self, entity: &str) -> Option<FieldPlan> {
        if entity.is_empty() {
            return None;
        }
        if let Some(plan) = builtin_plan(entity) {
            return Some(plan);
        }
        self.resolve_custom(&metadata_key(entity))
    }

    fn resolve_custom(&self, key: &str) -> Option<FieldPlan> {
        if !self.flag(key, PROP_IS_CUSTOM) || !self.flag(key, PROP_IS_CATEGORY) {
            return None;
        }

        let table = match self.metadata.lookup_field_property(key, PROP_TABLE) {
            Ok(Value::String(table)) => table,
            Ok(other) => {
                tracing::debug!(field = %key, value = %other, "Custom field table is not a string");
                return None;
            }
            Err(e) => {
                tracing::debug!(field = %key, error = %e, "Custom field table lookup failed");
                return None;
            }
        };

        if !is_safe_identifier(&table) {
            tracing::warn!(field = %key, table = %table, "Rejected unsafe custom field table name");
            return None;
        }

        Some(FieldPlan::Subquery {
            select: Cow::Owned(format!(
                "SELECT lct.book FROM books_{table}_link lct JOIN {table} ct ON(lct.value = ct.id)"
            )),
            column: Cow::Borrowed("ct.value"),
        })
    }

    /// Returns true only if `property` is present and boolean `true`.
    fn flag(&self, key: &str, property: &str) -> bool {
        match self.metadata.lookup_field_property(key, property) {
            Ok(Value::Bool(flag)) => flag,
            Ok(_) => false,
            Err(e) => {
                tracing::debug!(field = %key, property, error = %e, "Field metadata lookup failed");
                false
            }
        }
    }
}
