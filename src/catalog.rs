//! Known tables and columns, and which of them a query touches.

use serde::{Deserialize, Serialize};

use crate::errors::CatalogError;
use crate::models::structs::ParsedQuery;
use crate::query_ast::lexer::{TokenKind, tokenize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<String>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCatalog {
    pub tables: Vec<TableSchema>,
}

/// A table reference of the query matched against the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedTable {
    /// Key in `ParsedQuery::tables`.
    pub reference: String,
    /// Catalog table it names, if known.
    pub schema_table: Option<String>,
    /// Catalog columns of that table the query mentions, catalog order.
    pub columns: Vec<String>,
}

impl SchemaCatalog {
    pub fn new(tables: Vec<TableSchema>) -> Result<Self, CatalogError> {
        for (i, t) in tables.iter().enumerate() {
            if tables[..i].iter().any(|o| o.name.eq_ignore_ascii_case(&t.name)) {
                return Err(CatalogError::DuplicateTable(t.name.clone()));
            }
        }
        Ok(Self { tables })
    }

    /// `users`, `orders` and `products` sample schema.
    pub fn demo() -> Self {
        Self {
            tables: vec![
                TableSchema::new("users", &["id", "name", "email", "created_at"]),
                TableSchema::new(
                    "orders",
                    &["id", "user_id", "product_id", "quantity", "order_date"],
                ),
                TableSchema::new("products", &["id", "name", "price", "category"]),
            ],
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let parsed: SchemaCatalog = serde_json::from_str(json)?;
        Self::new(parsed.tables)
    }

    /// Case-insensitive lookup; a schema prefix (`public.users`) is ignored.
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        let bare = name.rsplit('.').next().unwrap_or(name);
        let bare = bare.trim_matches(|c| matches!(c, '"' | '`' | '[' | ']'));
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(bare))
    }

    pub fn resolve(&self, query: &ParsedQuery) -> Vec<ResolvedTable> {
        let mentions = column_mentions(query);
        let single_table = query.tables.len() == 1;

        query
            .table_refs
            .iter()
            .map(|r| {
                let key = r.key();
                let Some(schema) = self.table(&r.name) else {
                    return ResolvedTable {
                        reference: key.to_string(),
                        schema_table: None,
                        columns: Vec::new(),
                    };
                };
                let columns = schema
                    .columns
                    .iter()
                    .filter(|col| {
                        mentions.iter().any(|(qualifier, name)| {
                            name.eq_ignore_ascii_case(col)
                                && match qualifier {
                                    Some(q) => query.resolve_qualifier(q) == Some(key),
                                    None => single_table || !self.column_is_ambiguous(query, col),
                                }
                        })
                    })
                    .cloned()
                    .collect();
                ResolvedTable {
                    reference: key.to_string(),
                    schema_table: Some(schema.name.clone()),
                    columns,
                }
            })
            .collect()
    }

    /// True when more than one referenced catalog table has `column`.
    fn column_is_ambiguous(&self, query: &ParsedQuery, column: &str) -> bool {
        query
            .table_refs
            .iter()
            .filter_map(|r| self.table(&r.name))
            .filter(|t| t.columns.iter().any(|c| c.eq_ignore_ascii_case(column)))
            .count()
            > 1
    }
}

/// Every `(qualifier, column)` mention in the query's clause fragments.
fn column_mentions(query: &ParsedQuery) -> Vec<(Option<String>, String)> {
    let fragments = query
        .select_columns
        .iter()
        .chain(&query.where_conditions)
        .chain(&query.group_by_columns)
        .chain(&query.having_conditions)
        .chain(query.joins.iter().map(|j| &j.condition))
        .chain(query.order_by.iter());

    let mut out = Vec::new();
    for fragment in fragments {
        let tokens = tokenize(fragment);
        for (i, tok) in tokens.iter().enumerate() {
            if tok.kind != TokenKind::Word {
                continue;
            }
            let after_dot = i >= 2 && tokens[i - 1].is_symbol(fragment, '.');
            let before_dot = tokens.get(i + 1).is_some_and(|t| t.is_symbol(fragment, '.'));
            if before_dot {
                continue;
            }
            let qualifier = after_dot.then(|| tokens[i - 2].text(fragment).to_string());
            out.push((qualifier, tok.text(fragment).to_string()));
        }
    }
    out
}
