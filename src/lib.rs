//! A lexer, a fused single-pass parser/code generator, and a stack-frame
//! virtual machine for a PL/0-family block-structured imperative language.
//!
//! ```text
//! source text -> lexer -> tokens -> codegen -> (symbols, code) -> vm -> output
//! ```
//!
//! Each stage is its own module with its own error type — see [`error`] for
//! why these stay three separate closed enums instead of one shared space.

pub mod codegen;
pub mod error;
pub mod lexer;
pub mod symbol;
pub mod token;
pub mod trace;
pub mod vm;

use codegen::CompiledProgram;
use error::{LexError, ParseError};

/// Either phase of compilation failing, surfaced as one error to callers
/// that don't care which phase produced it (the `pl0c` binary, tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Lex(LexError),
    Parse(ParseError),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "{}", e),
            CompileError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::Lex(e)
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

/// Run the full front end: tokenize, then parse/generate code in one pass.
pub fn compile_source(source: &str) -> Result<CompiledProgram, CompileError> {
    let lexed = lexer::tokenize(source);
    if let Some(error) = lexed.error {
        return Err(error.into());
    }
    Ok(codegen::compile(lexed.tokens)?)
}
