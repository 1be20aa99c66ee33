//! Predicate compiler.
//!
//! Turns parsed expressions into a predicate fragment over the catalog
//! schema. Each expression becomes one parenthesized group; groups are joined
//! by their connectors, written directly after the group (`(...)AND (...)`).

use std::fmt;

use tracing::{debug, trace};

use crate::metadata::FieldMetadata;

use super::escape::escape;
use super::expression::{Connector, Expression, Matcher};
use super::fields::{ALL_FIELDS, FieldPlan, FieldResolver};
use super::parser::{scan_remainder, scan_structured};

/// A compiled predicate fragment, without the `WHERE` keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompiledPredicate {
    sql: String,
}

impl CompiledPredicate {
    /// Creates a predicate from fragment text.
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    /// Returns the fragment text.
    pub fn as_str(&self) -> &str {
        &self.sql
    }

    /// Returns true if nothing was compiled.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Returns `WHERE <fragment>`, or an empty string for an empty predicate.
    pub fn clause(&self) -> String {
        if self.sql.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.sql)
        }
    }

}

impl fmt::Display for CompiledPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl AsRef<str> for CompiledPredicate {
    fn as_ref(&self) -> &str {
        &self.sql
    }
}

/// One emitted group and the connector that follows it.
struct Group {
    sql: String,
    connector: Option<Connector>,
}

/// Compiles search text against a [`FieldResolver`].
pub struct PredicateCompiler<'r, M> {
    resolver: &'r FieldResolver<M>,
}

impl<'r, M: FieldMetadata> PredicateCompiler<'r, M> {
    /// Creates a compiler that resolves fields through `resolver`.
    pub fn new(resolver: &'r FieldResolver<M>) -> Self {
        Self { resolver }
    }

    /// Compiles one expression, connector included.
    ///
    /// Returns an empty string if the entity is empty or does not resolve.
    pub fn compile_expression(&self, expr: &Expression) -> String {
        let Some(mut sql) = self.compile_group(expr) else {
            return String::new();
        };
        if let Some(connector) = expr.connector {
            sql.push_str(connector.as_str());
        }
        sql
    }

    /// Compiles one expression without its connector.
    fn compile_group(&self, expr: &Expression) -> Option<String> {
        let plan = self.resolver.resolve(&expr.entity)?;
        let comparison = comparison(expr.matcher, expr.negated, &escape(&expr.term));

        Some(match plan {
            FieldPlan::Subquery { select, column } => {
                format!("(b.id IN ({select} WHERE ({column} {comparison})))")
            }
            FieldPlan::Column { column } => format!("({column} {comparison})"),
        })
    }

    /// Compiles a substring search of `text` over every bibliographic field.
    ///
    /// Each field is OR-ed with the next, with no separating whitespace;
    /// negation applies to every field.
    pub fn compile_all_fields(&self, text: &str, negated: bool) -> String {
        let last = ALL_FIELDS.len() - 1;
        ALL_FIELDS
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let connector = (i < last).then_some(Connector::Or);
                let expr = Expression::new(*field, text)
                    .with_matcher(Matcher::Substring)
                    .with_negation(negated)
                    .with_connector(connector);
                self.compile_expression(&expr)
            })
            .collect::<Vec<_>>()
            .concat()
    }

    /// Compiles raw search text into a predicate.
    pub fn compile(&self, raw: &str) -> CompiledPredicate {
        let input = raw.trim();
        if input.is_empty() {
            return CompiledPredicate::default();
        }

        let scan = scan_structured(input);
        if scan.is_empty() {
            let predicate = CompiledPredicate::new(self.compile_all_fields(input, false));
            trace!(raw = %input, predicate = %predicate, "Compiled free-text search");
            return predicate;
        }

        let mut groups: Vec<Group> = Vec::with_capacity(scan.expressions.len());
        // Connector of the last recognized term, emitted or not.
        let mut previous: Option<Connector> = None;
        for expr in &scan.expressions {
            if let Some(sql) = self.compile_group(expr) {
                groups.push(Group {
                    sql,
                    connector: expr.connector,
                });
            } else if let Some(connector) = previous {
                debug!(
                    entity = %expr.entity,
                    placeholder = connector.placeholder(),
                    "Substituting placeholder for unresolved field"
                );
                groups.push(Group {
                    sql: connector.placeholder().to_string(),
                    connector: expr.connector,
                });
            } else {
                debug!(entity = %expr.entity, "Dropping unresolved field");
            }
            previous = expr.connector;
        }

        let remainder = scan_remainder(&input[scan.cursor..]);
        let mut sql = join_groups(&groups);
        if let Some(free) = remainder {
            let chain = self.compile_all_fields(&free.text, free.negated);
            if groups.is_empty() {
                sql = chain;
            } else {
                match previous {
                    Some(connector) => sql.push_str(connector.as_str()),
                    None => sql.push_str("OR "),
                }
                sql.push_str(&chain);
            }
        }

        let predicate = CompiledPredicate::new(sql);
        trace!(raw = %input, predicate = %predicate, "Compiled search");
        predicate
    }
}

/// Joins groups with the connector of each preceding group. Adjacent terms
/// written without a keyword are AND-ed; the last group's connector is
/// dropped.
fn join_groups(groups: &[Group]) -> String {
    let mut sql = String::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            let previous = groups[i - 1].connector.unwrap_or(Connector::And);
            sql.push_str(previous.as_str());
            sql.push(' ');
        }
        sql.push_str(&group.sql);
    }
    sql
}

/// Builds the comparison for an already escaped term.
fn comparison(matcher: Matcher, negated: bool, term: &str) -> String {
    match (matcher, negated) {
        (Matcher::Exact, false) => format!("= \"{term}\""),
        (Matcher::Exact, true) => format!("!= \"{term}\""),
        (Matcher::Substring, false) => format!("LIKE \"%{term}%\""),
        (Matcher::Substring, true) => format!("NOT LIKE \"%{term}%\""),
    }
}

/// Compiles `raw` with `resolver`.
pub fn compile<M: FieldMetadata>(raw: &str, resolver: &FieldResolver<M>) -> CompiledPredicate {
    PredicateCompiler::new(resolver).compile(raw)
}
