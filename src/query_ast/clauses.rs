//! Ordered clause-boundary scanner.
//!
//! Walks the token stream of the first statement and cuts it into clause
//! segments. Only keywords at parenthesis depth 0 start a clause, so
//! subqueries and function calls stay inside the clause that contains them.

use std::ops::Range;

use super::lexer::{Token, TokenKind};
use crate::models::enums::JoinKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClauseKind {
    Select,
    From,
    Join(JoinKind),
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
}

/// A clause keyword plus the token range of its body (keyword excluded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clause {
    pub kind: ClauseKind,
    pub body: Range<usize>,
}

/// Result of matching a boundary at some token index.
enum Boundary {
    Clause { kind: ClauseKind, width: usize },
    /// UNION / INTERSECT / EXCEPT: the analysed branch ends here.
    SetOperation,
}

const JOIN_MODIFIERS: &[&str] = &["INNER", "LEFT", "RIGHT", "FULL", "OUTER", "CROSS", "NATURAL"];

pub fn scan_clauses(src: &str, tokens: &[Token]) -> Vec<Clause> {
    let mut clauses: Vec<Clause> = Vec::new();
    let mut depth: usize = 0;
    let mut i = 0;

    while i < tokens.len() {
        let tok = &tokens[i];
        if tok.kind == TokenKind::Symbol {
            match tok.text(src) {
                "(" => depth += 1,
                ")" => depth = depth.saturating_sub(1),
                ";" if depth == 0 => {
                    close_last(&mut clauses, i);
                    return clauses;
                }
                _ => {}
            }
            i += 1;
            continue;
        }

        if depth == 0 {
            match boundary_at(src, tokens, i) {
                Some(Boundary::Clause { kind, width }) => {
                    close_last(&mut clauses, i);
                    let body_start = i + width;
                    clauses.push(Clause {
                        kind,
                        body: body_start..tokens.len(),
                    });
                    i = body_start;
                    continue;
                }
                Some(Boundary::SetOperation) => {
                    close_last(&mut clauses, i);
                    return clauses;
                }
                None => {}
            }
        }
        i += 1;
    }

    clauses
}

fn close_last(clauses: &mut [Clause], end: usize) {
    if let Some(last) = clauses.last_mut() {
        last.body.end = end.max(last.body.start);
    }
}

fn boundary_at(src: &str, tokens: &[Token], i: usize) -> Option<Boundary> {
    let word = |idx: usize, kw: &str| tokens.get(idx).is_some_and(|t| t.is_keyword(src, kw));
    let tok = &tokens[i];
    if tok.kind != TokenKind::Word {
        return None;
    }

    let single = |kind| Some(Boundary::Clause { kind, width: 1 });
    let text = tok.text(src).to_ascii_uppercase();
    match text.as_str() {
        "SELECT" => single(ClauseKind::Select),
        "FROM" => single(ClauseKind::From),
        "WHERE" => single(ClauseKind::Where),
        "HAVING" => single(ClauseKind::Having),
        "LIMIT" => single(ClauseKind::Limit),
        "OFFSET" => single(ClauseKind::Offset),
        "GROUP" if word(i + 1, "BY") => Some(Boundary::Clause {
            kind: ClauseKind::GroupBy,
            width: 2,
        }),
        "ORDER" if word(i + 1, "BY") => Some(Boundary::Clause {
            kind: ClauseKind::OrderBy,
            width: 2,
        }),
        "UNION" | "INTERSECT" | "EXCEPT" => Some(Boundary::SetOperation),
        "JOIN" => Some(Boundary::Clause {
            kind: ClauseKind::Join(JoinKind::Inner),
            width: 1,
        }),
        m if JOIN_MODIFIERS.contains(&m) => join_with_modifiers(src, tokens, i),
        _ => None,
    }
}

/// `LEFT OUTER JOIN`, `CROSS JOIN`, `NATURAL LEFT JOIN`, ... A modifier run
/// that is not followed by JOIN (e.g. the `LEFT(...)` function) is no boundary.
fn join_with_modifiers(src: &str, tokens: &[Token], start: usize) -> Option<Boundary> {
    let mut kind = JoinKind::Inner;
    let mut natural = false;
    let mut idx = start;
    while let Some(tok) = tokens.get(idx) {
        if tok.kind != TokenKind::Word {
            return None;
        }
        let upper = tok.text(src).to_ascii_uppercase();
        match upper.as_str() {
            "JOIN" => {
                let kind = if natural { JoinKind::Natural } else { kind };
                return Some(Boundary::Clause {
                    kind: ClauseKind::Join(kind),
                    width: idx - start + 1,
                });
            }
            "LEFT" => kind = JoinKind::Left,
            "RIGHT" => kind = JoinKind::Right,
            "FULL" => kind = JoinKind::Full,
            "CROSS" => kind = JoinKind::Cross,
            "NATURAL" => natural = true,
            "INNER" | "OUTER" => {}
            _ => return None,
        }
        idx += 1;
    }
    None
}
