//! Which structural elements to emphasise for the current step.
//!
//! Pure: the same `(step, query)` always yields the same [`Highlights`].
//! Tables are matched by their key in `ParsedQuery::tables` (alias when the
//! query declares one); qualified column references are mapped through
//! [`ParsedQuery::resolve_qualifier`].

use serde::Serialize;

use crate::models::enums::{AnimationStep, TableOrigin};
use crate::models::structs::{ParsedQuery, WhereCell};
use crate::query_ast::lexer::{TokenKind, tokenize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableHighlight {
    pub table: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JoinHighlight {
    pub index: usize,
    pub table: String,
    pub active: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Highlights {
    pub step: Option<AnimationStep>,
    pub tables: Vec<TableHighlight>,
    pub joins: Vec<JoinHighlight>,
    pub columns: Vec<String>,
    pub conditions: Vec<String>,
    pub cells: Vec<WhereCell>,
}

impl Highlights {
    /// Everything inactive; used before any step is shown.
    pub fn none(query: &ParsedQuery) -> Self {
        Self {
            step: None,
            tables: flags(query, |_| false),
            joins: join_flags(query, false),
            ..Self::default()
        }
    }

    pub fn is_join_active(&self, index: usize) -> bool {
        self.joins.iter().any(|j| j.active && j.index == index)
    }

    pub fn active_tables(&self) -> Vec<&str> {
        self.tables.iter().filter(|t| t.active).map(|t| t.table.as_str()).collect()
    }
}

pub fn resolve(step: AnimationStep, query: &ParsedQuery) -> Highlights {
    let mut out = Highlights {
        step: Some(step),
        ..Highlights::none(query)
    };

    match step {
        AnimationStep::Parse => {}
        AnimationStep::Select => {
            out.columns = query.select_columns.clone();
        }
        AnimationStep::From => {
            out.tables = flags(query, |t| {
                query.table_ref(t).is_some_and(|r| r.origin == TableOrigin::From)
            });
        }
        AnimationStep::Join => {
            let mut active: Vec<&str> = query.joins.iter().map(|j| j.table.as_str()).collect();
            for join in &query.joins {
                active.extend(referenced_tables(query, &join.condition));
            }
            out.tables = flags(query, |t| active.contains(&t));
            out.joins = join_flags(query, true);
            out.conditions = query.joins.iter().map(|j| j.condition.clone()).collect();
        }
        AnimationStep::Where => {
            out.tables = fragment_tables(query, &query.where_conditions);
            out.conditions = query.where_conditions.clone();
            out.cells = query.where_cells.clone();
        }
        AnimationStep::GroupBy => {
            out.tables = fragment_tables(query, &query.group_by_columns);
            out.columns = query.group_by_columns.clone();
        }
        AnimationStep::Having => {
            out.tables = fragment_tables(query, &query.having_conditions);
            out.conditions = query.having_conditions.clone();
        }
        AnimationStep::OrderBy => {
            let order: Vec<String> = query.order_by.iter().cloned().collect();
            out.tables = fragment_tables(query, &order);
            out.columns = order;
        }
        AnimationStep::Result => {
            out.tables = flags(query, |_| true);
            out.columns = query.select_columns.clone();
        }
    }
    out
}

fn flags(query: &ParsedQuery, is_active: impl Fn(&str) -> bool) -> Vec<TableHighlight> {
    query
        .tables
        .iter()
        .map(|t| TableHighlight {
            table: t.clone(),
            active: is_active(t),
        })
        .collect()
}

fn join_flags(query: &ParsedQuery, active: bool) -> Vec<JoinHighlight> {
    query
        .joins
        .iter()
        .enumerate()
        .map(|(index, j)| JoinHighlight {
            index,
            table: j.table.clone(),
            active,
        })
        .collect()
}

/// Tables touched by a list of fragments. Unqualified references in a
/// single-table query belong to that table.
fn fragment_tables(query: &ParsedQuery, fragments: &[String]) -> Vec<TableHighlight> {
    let mut active: Vec<&str> = fragments
        .iter()
        .flat_map(|f| referenced_tables(query, f))
        .collect();
    if active.is_empty() && query.tables.len() == 1 && !fragments.is_empty() {
        active.push(query.tables[0].as_str());
    }
    flags(query, |t| active.contains(&t))
}

fn referenced_tables<'q>(query: &'q ParsedQuery, fragment: &str) -> Vec<&'q str> {
    qualifiers(fragment)
        .iter()
        .filter_map(|q| query.resolve_qualifier(q))
        .collect()
}

/// Qualifiers of dotted references: `u` in `u.id`, `public.users` in
/// `public.users.id`. Quoted literals are single tokens and never match.
pub fn qualifiers(fragment: &str) -> Vec<String> {
    let tokens = tokenize(fragment);
    let mut out: Vec<String> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if !matches!(tokens[i].kind, TokenKind::Word | TokenKind::QuotedIdent) {
            i += 1;
            continue;
        }
        // Collect the dotted chain starting here.
        let mut parts = vec![tokens[i].text(fragment)];
        let mut j = i + 1;
        while j + 1 < tokens.len() && tokens[j].is_symbol(fragment, '.') {
            let next = &tokens[j + 1];
            if !matches!(next.kind, TokenKind::Word | TokenKind::QuotedIdent)
                && !next.is_symbol(fragment, '*')
            {
                break;
            }
            parts.push(next.text(fragment));
            j += 2;
        }
        if parts.len() > 1 {
            let qualifier = parts[..parts.len() - 1].join(".");
            if !out.contains(&qualifier) {
                out.push(qualifier);
            }
        }
        i = j;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_ast::analyze;

    #[test]
    fn qualifiers_in_fragments() {
        assert_eq!(qualifiers("u.id = o.user_id"), vec!["u", "o"]);
        assert_eq!(qualifiers("public.users.id = 1"), vec!["public.users"]);
        assert_eq!(qualifiers("COUNT(o.*) > 2"), vec!["o"]);
        assert!(qualifiers("name = 'a.b'").is_empty());
        assert!(qualifiers("id = 1.5").is_empty());
    }

    #[test]
    fn parse_step_highlights_nothing() {
        let q = analyze("SELECT a FROM t WHERE a = 1");
        let h = resolve(AnimationStep::Parse, &q);
        assert!(h.active_tables().is_empty());
        assert!(h.columns.is_empty() && h.conditions.is_empty() && h.cells.is_empty());
    }

    #[test]
    fn from_step_skips_join_targets() {
        let q = analyze("SELECT * FROM users u JOIN orders o ON u.id = o.user_id");
        let h = resolve(AnimationStep::From, &q);
        assert_eq!(h.active_tables(), vec!["u"]);
        assert!(!h.is_join_active(0));
    }

    #[test]
    fn unqualified_where_in_single_table_query() {
        let q = analyze("SELECT * FROM users WHERE id = 7");
        let h = resolve(AnimationStep::Where, &q);
        assert_eq!(h.active_tables(), vec!["users"]);
        assert_eq!(h.cells, vec![WhereCell::new("id", "7")]);
    }

    #[test]
    fn qualifier_by_real_name_maps_to_alias_key() {
        let q = analyze(
            "SELECT * FROM users u JOIN orders o ON u.id = o.user_id ORDER BY orders.created_at",
        );
        let h = resolve(AnimationStep::OrderBy, &q);
        assert_eq!(h.active_tables(), vec!["o"]);
        assert_eq!(h.columns, vec!["orders.created_at"]);
    }
}
