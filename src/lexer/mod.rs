//! # Lexer
//!
//! Tokenizes PL/0 source text into a token stream.
//!
//! ## Features
//!
//! - **Identifiers & keywords**: maximal `[A-Za-z0-9]` runs starting with a
//!   letter, capped at 11 characters, matched against the closed reserved
//!   word table before falling back to `Ident`.
//! - **Numbers**: maximal `[A-Za-z0-9]` runs starting with a digit, capped at
//!   5 digits; any letter in the run is a `NonLetterVarInitial` error (a
//!   variable may not begin with a digit).
//! - **Comments**: `/* ... */`, skipped without emitting a token;
//!   end-of-source inside one is a lexical error.
//! - **Punctuators**: greedy two-character symbols (`:=`, `<=`, `<>`, `>=`)
//!   tried before their single-character prefixes.
//!
//! The lexer halts at the first error, retaining whatever tokens were
//! already produced (`spec.md` §4.1).

pub mod cursor;

#[cfg(test)]
mod tests;

use crate::error::{LexError, LexErrorKind};
use crate::token::{Token, TokenKind, MAX_IDENT_LEN, MAX_NUMBER_LEN};
use cursor::Cursor;

pub struct LexResult {
    pub tokens: Vec<Token>,
    pub error: Option<LexError>,
}

#[must_use]
pub fn tokenize(source: &str) -> LexResult {
    if source.is_empty() {
        return LexResult {
            tokens: Vec::new(),
            error: Some(LexError::new(LexErrorKind::NoSourceCode, 0)),
        };
    }

    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();

    loop {
        match lex_token(&mut cursor) {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) => {
                if cursor.is_at_end() {
                    tokens.push(Token::new(TokenKind::Eof, cursor.line()));
                    return LexResult {
                        tokens,
                        error: None,
                    };
                }
            }
            Err(error) => {
                return LexResult {
                    tokens,
                    error: Some(error),
                }
            }
        }
    }
}

fn lex_token(cursor: &mut Cursor) -> Result<Option<Token>, LexError> {
    skip_whitespace_and_comments(cursor)?;

    if cursor.is_at_end() {
        return Ok(None);
    }

    let line = cursor.line();
    let ch = cursor.peek().unwrap();

    if ch.is_ascii_alphabetic() {
        return lex_alpha(cursor, line).map(Some);
    }
    if ch.is_ascii_digit() {
        return lex_digit(cursor, line).map(Some);
    }
    lex_special(cursor, line).map(Some)
}

fn skip_whitespace_and_comments(cursor: &mut Cursor) -> Result<(), LexError> {
    loop {
        match cursor.peek() {
            Some(' ') | Some('\n') => {
                cursor.advance();
            }
            Some('/') if cursor.peek_at(1) == Some('*') => {
                let start_line = cursor.line();
                cursor.advance();
                cursor.advance();
                loop {
                    match cursor.peek() {
                        None => {
                            return Err(LexError::new(
                                LexErrorKind::UnterminatedComment,
                                start_line,
                            ))
                        }
                        Some('*') if cursor.peek_at(1) == Some('/') => {
                            cursor.advance();
                            cursor.advance();
                            break;
                        }
                        Some(_) => {
                            cursor.advance();
                        }
                    }
                }
            }
            _ => return Ok(()),
        }
    }
}

/// Alpha-start sub-automaton: maximal `[A-Za-z0-9]` run, reserved word or ident.
fn lex_alpha(cursor: &mut Cursor, line: usize) -> Result<Token, LexError> {
    let mut lexeme = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_alphanumeric()) {
        lexeme.push(cursor.advance().unwrap());
        if lexeme.len() > MAX_IDENT_LEN {
            return Err(LexError::new(LexErrorKind::NameTooLong, line));
        }
    }

    let kind = TokenKind::reserved(&lexeme).unwrap_or(TokenKind::Ident(lexeme));
    Ok(Token::new(kind, line))
}

/// Digit-start sub-automaton: maximal `[A-Za-z0-9]` run, must stay all-digit.
fn lex_digit(cursor: &mut Cursor, line: usize) -> Result<Token, LexError> {
    let mut lexeme = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_alphanumeric()) {
        let c = cursor.advance().unwrap();
        if c.is_ascii_alphabetic() {
            return Err(LexError::new(LexErrorKind::NonLetterVarInitial, line));
        }
        lexeme.push(c);
        if lexeme.len() > MAX_NUMBER_LEN {
            return Err(LexError::new(LexErrorKind::NumberTooLong, line));
        }
    }

    // Every character survived the alphabetic check above, so this always parses.
    let value: i32 = lexeme.parse().expect("digit run must be numeric");
    Ok(Token::new(TokenKind::Number(value), line))
}

/// Special-start sub-automaton: greedy two-character punctuators, then
/// single-character ones.
fn lex_special(cursor: &mut Cursor, line: usize) -> Result<Token, LexError> {
    let first = cursor.advance().unwrap();
    let second = cursor.peek();

    let kind = match (first, second) {
        (':', Some('=')) => {
            cursor.advance();
            TokenKind::Becomes
        }
        (':', _) => return Err(LexError::new(LexErrorKind::InvalidSymbol, line)),
        ('<', Some('=')) => {
            cursor.advance();
            TokenKind::Leq
        }
        ('<', Some('>')) => {
            cursor.advance();
            TokenKind::Neq
        }
        ('<', _) => TokenKind::Lss,
        ('>', Some('=')) => {
            cursor.advance();
            TokenKind::Geq
        }
        ('>', _) => TokenKind::Gtr,
        ('+', _) => TokenKind::Plus,
        ('-', _) => TokenKind::Minus,
        ('*', _) => TokenKind::Star,
        ('/', _) => TokenKind::Slash,
        ('(', _) => TokenKind::LParen,
        (')', _) => TokenKind::RParen,
        ('=', _) => TokenKind::Eq,
        (',', _) => TokenKind::Comma,
        ('.', _) => TokenKind::Period,
        (';', _) => TokenKind::Semicolon,
        _ => return Err(LexError::new(LexErrorKind::InvalidSymbol, line)),
    };

    Ok(Token::new(kind, line))
}
