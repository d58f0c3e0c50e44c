//! Error types for every phase of the toolchain.
//!
//! The three phases (lexing, parsing/codegen, execution) produce disjoint
//! error kinds, so each gets its own closed enum rather than sharing a small
//! integer space (see the Design Note on error codes). Each carries exactly
//! the payload fields it needs.

use std::fmt;

/// Source location used by lexical and syntactic errors.
///
/// Unlike a byte-offset span, PL/0 diagnostics only ever need a line number
/// (see `spec.md` §4.1) — `line` is 0-based per the lexer's contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
}

impl Span {
    pub fn new(line: usize) -> Self {
        Self { line }
    }
}

/// Errors raised while tokenizing source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// An identifier exceeded 11 characters.
    NameTooLong,
    /// A number literal exceeded 5 digits.
    NumberTooLong,
    /// A digit-initial run contained a letter (a variable may not start with a digit).
    NonLetterVarInitial,
    /// A character (or character pair) didn't match any recognized token.
    InvalidSymbol,
    /// The source string passed to the lexer was empty or null.
    NoSourceCode,
    /// End of source was reached inside an unterminated `/* ... */` comment.
    UnterminatedComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
}

impl LexError {
    pub fn new(kind: LexErrorKind, line: usize) -> Self {
        Self { kind, line }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            LexErrorKind::NameTooLong => "identifier exceeds 11 characters",
            LexErrorKind::NumberTooLong => "number exceeds 5 digits",
            LexErrorKind::NonLetterVarInitial => "a variable may not begin with a digit",
            LexErrorKind::InvalidSymbol => "invalid symbol",
            LexErrorKind::NoSourceCode => "no source code provided",
            LexErrorKind::UnterminatedComment => "unterminated comment",
        };
        write!(f, "LEX ERROR (line {}): {}", self.line, msg)
    }
}

impl std::error::Error for LexError {}

/// Syntactic / static-semantic errors, numbered per `spec.md` §7.
///
/// The numeric code is kept (callers and tests reference it directly) but it
/// is now a field on a closed enum rather than the error's entire identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// 1: `=` must be followed by a number.
    ExpectedNumberAfterEq,
    /// 2: identifier must be followed by `=`.
    ExpectedEqAfterIdent,
    /// 3: keyword must be followed by an identifier.
    ExpectedIdentAfterKeyword,
    /// 4: semicolon or comma missing.
    ExpectedSemicolonOrComma,
    /// 5: semicolon missing.
    ExpectedSemicolon,
    /// 6: period expected.
    ExpectedPeriod,
    /// 7: `:=` expected.
    ExpectedBecomes,
    /// 8: `call` needs an identifier.
    ExpectedIdentAfterCall,
    /// 9: `then` expected.
    ExpectedThen,
    /// 10: `;` or `end` expected.
    ExpectedSemicolonOrEnd,
    /// 11: `do` expected.
    ExpectedDo,
    /// 12: relational operator expected.
    ExpectedRelop,
    /// 13: right parenthesis missing.
    ExpectedRightParen,
    /// 14: factor cannot begin with this symbol.
    InvalidFactorStart,
    /// 16: cannot assign to a constant or procedure.
    CannotAssignToConstOrProc,
    /// 17: cannot call a constant or variable.
    CannotCallConstOrVar,
    /// Referenced identifier has no visible declaration in scope.
    UndeclaredIdentifier,
    /// A name was declared twice in the same scope.
    DuplicateDeclaration,
    /// Code memory is full (`spec.md` §3, `MAX_CODE`).
    CodeMemoryExhausted,
    /// A procedure name was used where a value (constant or variable) was expected.
    ProcedureUsedAsValue,
}

impl ParseErrorKind {
    /// The numeric error code from `spec.md` §7, where one is assigned.
    pub fn code(self) -> Option<u8> {
        use ParseErrorKind::*;
        match self {
            ExpectedNumberAfterEq => Some(1),
            ExpectedEqAfterIdent => Some(2),
            ExpectedIdentAfterKeyword => Some(3),
            ExpectedSemicolonOrComma => Some(4),
            ExpectedSemicolon => Some(5),
            ExpectedPeriod => Some(6),
            ExpectedBecomes => Some(7),
            ExpectedIdentAfterCall => Some(8),
            ExpectedThen => Some(9),
            ExpectedSemicolonOrEnd => Some(10),
            ExpectedDo => Some(11),
            ExpectedRelop => Some(12),
            ExpectedRightParen => Some(13),
            InvalidFactorStart => Some(14),
            CannotAssignToConstOrProc => Some(16),
            CannotCallConstOrVar => Some(17),
            UndeclaredIdentifier | DuplicateDeclaration | CodeMemoryExhausted
            | ProcedureUsedAsValue => None,
        }
    }

    fn message(self) -> &'static str {
        use ParseErrorKind::*;
        match self {
            ExpectedNumberAfterEq => "'=' must be followed by a number",
            ExpectedEqAfterIdent => "identifier must be followed by '='",
            ExpectedIdentAfterKeyword => {
                "'const', 'var', 'procedure', 'read' or 'write' must be followed by an identifier"
            }
            ExpectedSemicolonOrComma => "semicolon or comma missing",
            ExpectedSemicolon => "semicolon missing",
            ExpectedPeriod => "period expected",
            ExpectedBecomes => "':=' expected",
            ExpectedIdentAfterCall => "'call' must be followed by an identifier",
            ExpectedThen => "'then' expected",
            ExpectedSemicolonOrEnd => "';' or 'end' expected",
            ExpectedDo => "'do' expected",
            ExpectedRelop => "relational operator expected",
            ExpectedRightParen => "right parenthesis missing",
            InvalidFactorStart => "a factor cannot begin with this symbol",
            CannotAssignToConstOrProc => "cannot assign to a constant or procedure",
            CannotCallConstOrVar => "cannot call a constant or variable",
            UndeclaredIdentifier => "identifier was never declared in this scope",
            DuplicateDeclaration => "name already declared in this scope",
            CodeMemoryExhausted => "maximum code memory exceeded",
            ProcedureUsedAsValue => "a procedure cannot be used as a value",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub name: Option<String>,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            name: None,
            span,
        }
    }

    pub fn with_name(kind: ParseErrorKind, name: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.code() {
            Some(code) => write!(
                f,
                "PARSE ERROR[{}] (line {}): {}",
                code, self.span.line, self.kind.message()
            )?,
            None => write!(
                f,
                "PARSE ERROR (line {}): {}",
                self.span.line,
                self.kind.message()
            )?,
        }
        if let Some(name) = &self.name {
            write!(f, " ('{}')", name)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Faults raised by the virtual machine while executing emitted code.
///
/// Unlike lexical/syntactic errors these don't abort compilation — they halt
/// an already-running VM, so they carry the faulting instruction address
/// instead of a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeFault {
    DivisionByZero { address: usize },
    ModuloByZero { address: usize },
    StackOverflow { address: usize },
    PcOutOfRange { address: usize },
    IllegalOpcode { address: usize, op: u8 },
}

impl RuntimeFault {
    pub fn address(&self) -> usize {
        match *self {
            RuntimeFault::DivisionByZero { address }
            | RuntimeFault::ModuloByZero { address }
            | RuntimeFault::StackOverflow { address }
            | RuntimeFault::PcOutOfRange { address }
            | RuntimeFault::IllegalOpcode { address, .. } => address,
        }
    }
}

impl fmt::Display for RuntimeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RuntimeFault::DivisionByZero { address } => {
                write!(f, "RUNTIME FAULT at {}: division by zero", address)
            }
            RuntimeFault::ModuloByZero { address } => {
                write!(f, "RUNTIME FAULT at {}: modulo by zero", address)
            }
            RuntimeFault::StackOverflow { address } => {
                write!(f, "RUNTIME FAULT at {}: stack overflow", address)
            }
            RuntimeFault::PcOutOfRange { address } => {
                write!(f, "RUNTIME FAULT at {}: program counter out of range", address)
            }
            RuntimeFault::IllegalOpcode { address, op } => {
                write!(f, "RUNTIME FAULT at {}: illegal opcode {}", address, op)
            }
        }
    }
}

impl std::error::Error for RuntimeFault {}
