//! Clause-level structure extraction for raw SQL text.
//!
//! Pipeline: [`lexer`] → [`clauses`] (boundary scan) → [`extractor`].
//! Extraction never fails; text without a FROM clause yields an empty
//! [`ParsedQuery`](crate::models::structs::ParsedQuery).

pub mod clauses;
pub mod extractor;
pub mod lexer;

use crate::models::structs::ParsedQuery;

/// Extracts the clause structure of `raw`. Pure: equal input, equal output.
pub fn analyze(raw: &str) -> ParsedQuery {
    extractor::extract(raw)
}
