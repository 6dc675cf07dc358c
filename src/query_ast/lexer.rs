//! Byte-span tokenizer for SQL text.
//!
//! The lexer never fails: unknown characters become single-character
//! `Symbol` tokens and an unterminated literal runs to the end of input.
//! Comments and whitespace are dropped, but the spans of the surviving
//! tokens let callers recover the original text (and whether whitespace
//! separated two tokens).

use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare identifier or keyword.
    Word,
    Number,
    /// Single-quoted string literal.
    Str,
    /// `"ident"`, `` `ident` `` or `[ident]`.
    QuotedIdent,
    /// Bind parameter such as `:id`, `@user_id`, `$1` or `?`.
    Param,
    /// Run of operator characters (`=`, `<>`, `>=`, `||`, ...).
    Operator,
    /// Any other single character: `(`, `)`, `,`, `;`, `.`, `*`, ...
    Symbol,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.span.clone()]
    }

    /// Case-insensitive keyword test; only bare words can be keywords.
    pub fn is_keyword(&self, src: &str, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text(src).eq_ignore_ascii_case(keyword)
    }

    pub fn is_symbol(&self, src: &str, symbol: char) -> bool {
        self.kind == TokenKind::Symbol && self.text(src).starts_with(symbol)
    }
}

const OPERATOR_CHARS: &[char] = &['=', '<', '>', '!', '|', '+', '-', '/', '%', '&', '^', '~'];

pub fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }

        // Line comment
        if ch == '-' && matches!(chars.peek(), Some((_, '-'))) {
            for (_, c) in chars.by_ref() {
                if c == '\n' {
                    break;
                }
            }
            continue;
        }

        // Block comment
        if ch == '/' && matches!(chars.peek(), Some((_, '*'))) {
            chars.next();
            let mut prev = '\0';
            for (_, c) in chars.by_ref() {
                if prev == '*' && c == '/' {
                    break;
                }
                prev = c;
            }
            continue;
        }

        let (kind, end) = match ch {
            '\'' => (TokenKind::Str, scan_quoted(src, &mut chars, '\'')),
            '"' => (TokenKind::QuotedIdent, scan_quoted(src, &mut chars, '"')),
            '`' => (TokenKind::QuotedIdent, scan_quoted(src, &mut chars, '`')),
            '[' => (TokenKind::QuotedIdent, scan_quoted(src, &mut chars, ']')),
            c if c.is_alphabetic() || c == '_' => {
                let end =
                    scan_while(src, &mut chars, |c| c.is_alphanumeric() || c == '_' || c == '$');
                (TokenKind::Word, end)
            }
            c if c.is_ascii_digit() => {
                let end = scan_while(src, &mut chars, |c| c.is_alphanumeric() || c == '.');
                (TokenKind::Number, end)
            }
            ':' | '@' | '$'
                if matches!(chars.peek(), Some((_, c)) if c.is_alphanumeric() || *c == '_') =>
            {
                let end = scan_while(src, &mut chars, |c| c.is_alphanumeric() || c == '_');
                (TokenKind::Param, end)
            }
            '?' => (TokenKind::Param, start + 1),
            c if OPERATOR_CHARS.contains(&c) => {
                let end = scan_while(src, &mut chars, |c| OPERATOR_CHARS.contains(&c));
                (TokenKind::Operator, end)
            }
            c => (TokenKind::Symbol, start + c.len_utf8()),
        };

        tokens.push(Token {
            kind,
            span: start..end,
        });
    }

    tokens
}

/// Consumes characters while `pred` holds and returns the end offset.
fn scan_while<I>(
    src: &str,
    chars: &mut std::iter::Peekable<I>,
    pred: impl Fn(char) -> bool,
) -> usize
where
    I: Iterator<Item = (usize, char)>,
{
    while let Some(&(_, c)) = chars.peek() {
        if !pred(c) {
            break;
        }
        chars.next();
    }
    chars.peek().map(|&(idx, _)| idx).unwrap_or(src.len())
}

/// Consumes up to and including the closing quote; a doubled quote is an escape.
fn scan_quoted<I>(src: &str, chars: &mut std::iter::Peekable<I>, close: char) -> usize
where
    I: Iterator<Item = (usize, char)>,
{
    while let Some((idx, c)) = chars.next() {
        if c == close {
            if close != ']' && matches!(chars.peek(), Some((_, next)) if *next == close) {
                chars.next();
                continue;
            }
            return idx + c.len_utf8();
        }
    }
    src.len()
}

/// Rebuilds the source text covered by `tokens`, collapsing any gap
/// (whitespace or comments) between two tokens into one space.
pub fn join_tokens(src: &str, tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev_end: Option<usize> = None;
    for tok in tokens {
        if let Some(end) = prev_end
            && tok.span.start > end
        {
            out.push(' ');
        }
        out.push_str(tok.text(src));
        prev_end = Some(tok.span.end);
    }
    out
}
