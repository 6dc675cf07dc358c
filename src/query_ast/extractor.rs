//! Builds a [`ParsedQuery`] from the clause segments of a query.
//!
//! Best effort only: anything the scanner cannot place simply does not
//! show up in the result.

use once_cell::sync::Lazy;
use regex::Regex;

use super::clauses::{Clause, ClauseKind, scan_clauses};
use super::lexer::{Token, TokenKind, join_tokens, tokenize};
use crate::models::enums::{JoinKind, StatementKind, TableOrigin};
use crate::models::structs::{JoinClause, ParsedQuery, TableRef, WhereCell};

/// `<identifier>[.<identifier>]* = <value>`, value optionally quoted.
static CELL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)",
        r"\s*=\s*",
        r#"('(?:[^']|'')*'|"[^"]*"|[^\s'"=<>!]+)$"#,
    ))
    .expect("where-cell pattern compiles")
});

/// Words that end a table reference instead of naming its alias.
const NON_ALIAS_WORDS: &[&str] = &[
    "ON", "USING", "WHERE", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "OUTER", "CROSS", "NATURAL",
    "GROUP", "ORDER", "HAVING", "LIMIT", "OFFSET", "WITH", "FOR", "UNION", "SET",
];

pub fn extract(src: &str) -> ParsedQuery {
    let tokens = tokenize(src);
    let kind = match tokens.first() {
        None => StatementKind::Empty,
        Some(t) if t.kind == TokenKind::Word => StatementKind::from_keyword(t.text(src)),
        Some(_) => StatementKind::Other,
    };

    let clauses = scan_clauses(src, &tokens);
    let first = |wanted: ClauseKind| first_clause(&tokens, &clauses, wanted);

    let Some(from_body) = first(ClauseKind::From) else {
        log::debug!("no FROM clause found; nothing to visualise");
        return ParsedQuery {
            kind,
            ..ParsedQuery::default()
        };
    };

    let mut query = ParsedQuery {
        kind,
        ..ParsedQuery::default()
    };

    for item in split_top_level(src, from_body, |t| t.is_symbol(src, ',')) {
        if let Some(table) = parse_table_ref(src, item, TableOrigin::From) {
            push_table(&mut query, table);
        }
    }

    for clause in &clauses {
        if let ClauseKind::Join(join_kind) = clause.kind
            && let Some(join) = parse_join(src, clause_body(&tokens, clause), join_kind, &mut query)
        {
            query.joins.push(join);
        }
    }

    if let Some(select) = first(ClauseKind::Select) {
        let mut cols = select;
        if let Some(head) = cols.first() {
            if head.is_keyword(src, "DISTINCT") {
                query.distinct = true;
                cols = &cols[1..];
            } else if head.is_keyword(src, "ALL") {
                cols = &cols[1..];
            }
        }
        query.select_columns = comma_list(src, cols);
    }

    if let Some(filter) = first(ClauseKind::Where) {
        query.where_conditions = split_conditions(src, filter);
        query.where_cells = query.where_conditions.iter().filter_map(|c| parse_cell(c)).collect();
    }

    if let Some(group) = first(ClauseKind::GroupBy) {
        query.group_by_columns = comma_list(src, group);
    }
    if let Some(having) = first(ClauseKind::Having) {
        query.having_conditions = split_conditions(src, having);
    }

    query.order_by = first(ClauseKind::OrderBy)
        .map(|toks| join_tokens(src, toks))
        .filter(|s| !s.is_empty());
    query.limit = first(ClauseKind::Limit)
        .map(|toks| join_tokens(src, toks))
        .filter(|s| !s.is_empty());

    log::debug!(
        "extracted query: tables={:?} joins={} where={} group_by={} having={} order_by={:?}",
        query.tables,
        query.joins.len(),
        query.where_conditions.len(),
        query.group_by_columns.len(),
        query.having_conditions.len(),
        query.order_by
    );
    query
}

fn clause_body<'t>(tokens: &'t [Token], clause: &Clause) -> &'t [Token] {
    &tokens[clause.body.clone()]
}

fn first_clause<'t>(
    tokens: &'t [Token],
    clauses: &[Clause],
    wanted: ClauseKind,
) -> Option<&'t [Token]> {
    clauses
        .iter()
        .find(|c| c.kind == wanted)
        .map(|c| clause_body(tokens, c))
}

fn push_table(query: &mut ParsedQuery, table: TableRef) {
    if query.tables.iter().any(|t| t == table.key()) {
        return;
    }
    query.tables.push(table.key().to_string());
    query.table_refs.push(table);
}

fn parse_join(
    src: &str,
    toks: &[Token],
    kind: JoinKind,
    query: &mut ParsedQuery,
) -> Option<JoinClause> {
    let split = toks
        .iter()
        .enumerate()
        .scan(0usize, |depth, (idx, t)| {
            if t.is_symbol(src, '(') {
                *depth += 1;
            } else if t.is_symbol(src, ')') {
                *depth = depth.saturating_sub(1);
            }
            Some((idx, *depth, t))
        })
        .find(|(_, depth, t)| {
            *depth == 0 && (t.is_keyword(src, "ON") || t.is_keyword(src, "USING"))
        })
        .map(|(idx, _, _)| idx);

    let (target, condition) = match split {
        Some(idx) if toks[idx].is_keyword(src, "ON") => {
            (&toks[..idx], join_tokens(src, &toks[idx + 1..]))
        }
        Some(idx) => (&toks[..idx], join_tokens(src, &toks[idx..])),
        None => (toks, String::new()),
    };

    let table = parse_table_ref(src, target, TableOrigin::Join)?;
    let key = table.key().to_string();
    push_table(query, table);
    Some(JoinClause {
        table: key,
        condition,
        kind,
    })
}

/// `name`, `schema.name`, `name alias`, `name AS alias`, `(subquery) alias`.
fn parse_table_ref(src: &str, toks: &[Token], origin: TableOrigin) -> Option<TableRef> {
    let first = toks.first()?;
    let mut idx;
    let name;

    if first.is_symbol(src, '(') {
        // An unclosed subquery names nothing.
        let mut depth = 0usize;
        let mut close = None;
        for (i, t) in toks.iter().enumerate() {
            if t.is_symbol(src, '(') {
                depth += 1;
            } else if t.is_symbol(src, ')') {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    close = Some(i + 1);
                    break;
                }
            }
        }
        idx = close?;
        name = join_tokens(src, &toks[..idx]);
    } else {
        if !is_name_part(first) {
            return None;
        }
        idx = 1;
        while idx + 1 < toks.len()
            && toks[idx].is_symbol(src, '.')
            && is_name_part(&toks[idx + 1])
        {
            idx += 2;
        }
        name = join_tokens(src, &toks[..idx]);
    }

    if toks.get(idx).is_some_and(|t| t.is_keyword(src, "AS")) {
        idx += 1;
    }
    let alias = toks
        .get(idx)
        .filter(|t| is_name_part(t))
        .filter(|t| !NON_ALIAS_WORDS.iter().any(|w| t.is_keyword(src, w)))
        .map(|t| t.text(src).to_string());

    Some(TableRef {
        name,
        alias,
        origin,
    })
}

fn is_name_part(tok: &Token) -> bool {
    matches!(tok.kind, TokenKind::Word | TokenKind::QuotedIdent)
}

/// Splits at every depth-0 token matching `is_separator`; separators are dropped.
fn split_top_level<'t>(
    src: &str,
    toks: &'t [Token],
    is_separator: impl Fn(&Token) -> bool,
) -> Vec<&'t [Token]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, t) in toks.iter().enumerate() {
        if t.is_symbol(src, '(') {
            depth += 1;
        } else if t.is_symbol(src, ')') {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && is_separator(t) {
            parts.push(&toks[start..i]);
            start = i + 1;
        }
    }
    parts.push(&toks[start..]);
    parts.retain(|p| !p.is_empty());
    parts
}

fn comma_list(src: &str, toks: &[Token]) -> Vec<String> {
    split_top_level(src, toks, |t| t.is_symbol(src, ','))
        .into_iter()
        .map(|part| join_tokens(src, part))
        .collect()
}

/// Splits a predicate on depth-0 `AND`. String literals are single tokens and
/// so never split; the `AND` of a `BETWEEN x AND y` belongs to its range.
fn split_conditions(src: &str, toks: &[Token]) -> Vec<String> {
    let mut pending_between = false;
    let mut depth = 0usize;
    let mut separators = Vec::new();
    for (i, t) in toks.iter().enumerate() {
        if t.is_symbol(src, '(') {
            depth += 1;
        } else if t.is_symbol(src, ')') {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && t.is_keyword(src, "BETWEEN") {
            pending_between = true;
        } else if depth == 0 && t.is_keyword(src, "AND") {
            if pending_between {
                pending_between = false;
            } else {
                separators.push(i);
            }
        }
    }

    let mut parts = Vec::new();
    let mut start = 0;
    for sep in separators.into_iter().chain(std::iter::once(toks.len())) {
        let part = &toks[start..sep];
        if !part.is_empty() {
            parts.push(join_tokens(src, part));
        }
        start = sep + 1;
    }
    parts
}

fn parse_cell(condition: &str) -> Option<WhereCell> {
    let caps = CELL_PATTERN.captures(condition)?;
    let column = caps.get(1)?.as_str();
    let raw = caps.get(2)?.as_str();
    let value = if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        raw[1..raw.len() - 1].replace("''", "'")
    } else if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.to_string()
    };
    Some(WhereCell::new(column, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn where_cell_patterns() {
        assert_eq!(parse_cell("u.id = 1"), Some(WhereCell::new("u.id", "1")));
        assert_eq!(parse_cell("name = 'O''Brien'"), Some(WhereCell::new("name", "O'Brien")));
        assert_eq!(parse_cell("status=\"active\""), Some(WhereCell::new("status", "active")));
        assert_eq!(parse_cell("age >= 18"), None);
        assert_eq!(parse_cell("a != 1"), None);
        assert_eq!(parse_cell("(a = 1 OR b = 2)"), None);
    }

    #[test]
    fn table_ref_forms() {
        let check = |src: &str| {
            let toks = tokenize(src);
            parse_table_ref(src, &toks, TableOrigin::From).map(|t| (t.name, t.alias))
        };
        assert_eq!(check("users"), Some(("users".into(), None)));
        assert_eq!(check("users u"), Some(("users".into(), Some("u".into()))));
        assert_eq!(check("public.users AS u"), Some(("public.users".into(), Some("u".into()))));
        assert_eq!(check("orders ON x = y"), Some(("orders".into(), None)));
        assert_eq!(
            check("(SELECT id FROM t) sub"),
            Some(("(SELECT id FROM t)".into(), Some("sub".into())))
        );
        assert_eq!(check("42"), None);
        assert_eq!(check("("), None);
        assert_eq!(check("(SELECT id FROM t"), None);
    }

    #[test]
    fn between_keeps_its_and() {
        let src = "price BETWEEN 10 AND 20 AND active = 1";
        let toks = tokenize(src);
        assert_eq!(split_conditions(src, &toks), vec!["price BETWEEN 10 AND 20", "active = 1"]);
    }

    #[test]
    fn parenthesised_or_group_stays_whole() {
        let src = "(a = 1 AND b = 2) OR c = 3 AND d = 'x AND y'";
        let toks = tokenize(src);
        assert_eq!(
            split_conditions(src, &toks),
            vec!["(a = 1 AND b = 2) OR c = 3", "d = 'x AND y'"]
        );
    }
}
