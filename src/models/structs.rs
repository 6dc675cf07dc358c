use serde::{Deserialize, Serialize};

use crate::models::enums::{JoinKind, StatementKind, TableOrigin};

/// Structural extraction result of one query string.
///
/// Collections are always present (possibly empty); only `order_by` and
/// `limit` are optional. Instances are never mutated after extraction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub kind: StatementKind,
    /// Effective table names (alias when present), first appearance order, deduplicated.
    pub tables: Vec<String>,
    /// One entry per name in `tables`, same order.
    pub table_refs: Vec<TableRef>,
    pub joins: Vec<JoinClause>,
    pub distinct: bool,
    pub select_columns: Vec<String>,
    pub where_conditions: Vec<String>,
    pub where_cells: Vec<WhereCell>,
    pub group_by_columns: Vec<String>,
    pub having_conditions: Vec<String>,
    pub order_by: Option<String>,
    pub limit: Option<String>,
}

impl ParsedQuery {
    /// True when the extractor found nothing to visualise.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table_ref(&self, key: &str) -> Option<&TableRef> {
        self.table_refs.iter().find(|r| r.key() == key)
    }

    /// Maps a column qualifier (alias or real table name) to its key in `tables`.
    pub fn resolve_qualifier(&self, qualifier: &str) -> Option<&str> {
        self.table_refs
            .iter()
            .find(|r| r.key() == qualifier)
            .or_else(|| self.table_refs.iter().find(|r| r.name == qualifier))
            .map(|r| r.key())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    /// Name as written, schema qualifier included (`public.users`).
    pub name: String,
    pub alias: Option<String>,
    pub origin: TableOrigin,
}

impl TableRef {
    /// The name the rest of the query uses for this table.
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinClause {
    pub table: String,
    pub condition: String,
    pub kind: JoinKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereCell {
    pub column: String,
    pub value: String,
}

impl WhereCell {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Qualifier part of a dotted column (`u` for `u.id`).
    pub fn qualifier(&self) -> Option<&str> {
        self.column.rsplit_once('.').map(|(q, _)| q)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}
