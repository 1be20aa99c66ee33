//! Shared fixtures for the catalog integration tests.

#![allow(dead_code)]

use folio_catalog::metadata::{InMemoryMetadata, PROP_IS_CATEGORY, PROP_IS_CUSTOM, PROP_TABLE};
use folio_catalog::query::{FieldResolver, PredicateCompiler};

/// Predefined search of the "Fantasy" virtual library.
pub const FANTASY_QUERY: &str = r#"tags:"=fantasy""#;

/// Predefined search of the "Classics" virtual library.
pub const CLASSICS_QUERY: &str = r#"#genre:"=classic" OR authors:"~Austen""#;

/// Metadata of a small catalog.
///
/// - `#genre`: searchable custom category in `custom_column_1`
/// - `#read`: custom field that is not a category
/// - `#notes`: category flag without the custom flag
/// - virtual libraries `Fantasy` and `Classics`
pub fn catalog_metadata() -> InMemoryMetadata {
    InMemoryMetadata::new()
        .with_custom_category("#genre", "custom_column_1")
        .with_property("#read", PROP_IS_CUSTOM, true)
        .with_property("#read", PROP_IS_CATEGORY, false)
        .with_property("#read", PROP_TABLE, "custom_column_2")
        .with_property("#notes", PROP_IS_CATEGORY, true)
        .with_property("#notes", PROP_TABLE, "custom_column_3")
        .with_virtual_library("Fantasy", FANTASY_QUERY)
        .with_virtual_library("Classics", CLASSICS_QUERY)
}

/// Resolver over [`catalog_metadata`].
pub fn catalog_resolver() -> FieldResolver<InMemoryMetadata> {
    FieldResolver::new(catalog_metadata())
}

/// The all-fields chain for `text`.
pub fn all_fields(text: &str, negated: bool) -> String {
    let resolver = catalog_resolver();
    PredicateCompiler::new(&resolver).compile_all_fields(text, negated)
}

/// Splits a predicate into its top-level groups and the connectors between
/// them. Quoted literals are skipped.
pub fn top_level_groups(sql: &str) -> (Vec<String>, Vec<String>) {
    let mut groups = Vec::new();
    let mut connectors = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    let mut between = String::new();
    let mut in_literal = false;
    let mut escaped = false;

    for ch in sql.chars() {
        if in_literal {
            current.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_literal = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_literal = true;
                current.push(ch);
            }
            '(' => {
                if depth == 0 {
                    let connector = between.trim();
                    if !groups.is_empty() {
                        connectors.push(connector.to_string());
                    } else {
                        assert!(connector.is_empty(), "leading text before first group: {sql}");
                    }
                    between.clear();
                }
                depth += 1;
                current.push(ch);
            }
            ')' => {
                assert!(depth > 0, "unbalanced ')' in {sql}");
                depth -= 1;
                current.push(ch);
                if depth == 0 {
                    groups.push(std::mem::take(&mut current));
                }
            }
            _ if depth == 0 => between.push(ch),
            _ => current.push(ch),
        }
    }

    assert_eq!(depth, 0, "unbalanced '(' in {sql}");
    assert!(!in_literal, "unterminated literal in {sql}");
    assert!(between.trim().is_empty(), "dangling text after last group: {sql}");
    (groups, connectors)
}

/// Asserts that `sql` is empty or a connector-joined chain of groups.
pub fn assert_well_formed(sql: &str) {
    if sql.is_empty() {
        return;
    }
    let (groups, connectors) = top_level_groups(sql);
    assert_eq!(connectors.len() + 1, groups.len(), "groups and connectors disagree: {sql}");
    for connector in connectors {
        assert!(
            connector == "AND" || connector == "OR",
            "unexpected connector '{connector}' in {sql}"
        );
    }
}
