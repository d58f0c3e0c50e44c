//! # Parser / Code Generator
//!
//! A single-pass recursive-descent parser that emits code as it recognizes
//! each production, rather than building an intermediate AST first. The
//! teacher keeps parsing (`parser/mod.rs`), label resolution
//! (`first_pass/mod.rs`) and encoding (`encoder/mod.rs`) as three separate
//! passes over three separate representations — LC-3's flat, single-scope
//! label space makes that split natural. PL/0's nested scoping and
//! forward-reference-free grammar (a name must be declared before use,
//! except a procedure calling itself) make a second pass unnecessary, so
//! this module fuses all three teacher stages into one: `Compiler` walks
//! tokens, resolves symbols and emits instructions in the same recursive
//! descent (`SPEC_FULL.md` §4.3).
//!
//! The one place a later patch is still required is forward jumps (`if`,
//! `while`, a procedure's entry `jmp`) — `emit` returns the index of the
//! instruction it just pushed so the caller can patch its `m` field once
//! the jump target is known, the same pattern the teacher's encoder uses
//! for branch displacements.

pub mod instruction;


use crate::error::{ParseError, ParseErrorKind, Span};
use crate::symbol::{Symbol, SymbolKind, SymbolTable};
use crate::token::{Token, TokenKind};
use instruction::{Instruction, Opcode};

/// Code memory is a fixed-size array in the original machine; `MAX_CODE`
/// bounds the compiled instruction stream the same way (`spec.md` §3).
pub const MAX_CODE: usize = 500;

/// The result of a successful compile: the symbol table (kept for trace
/// sinks that want to label addresses) and the emitted instruction stream.
pub struct CompiledProgram {
    pub symbols: SymbolTable,
    pub code: Vec<Instruction>,
}

/// Compile a token stream (as produced by [`crate::lexer::tokenize`]) into a
/// [`CompiledProgram`], or the first [`ParseError`] encountered.
pub fn compile(tokens: Vec<Token>) -> Result<CompiledProgram, ParseError> {
    let mut compiler = Compiler::new(tokens);
    compiler.program()?;
    Ok(CompiledProgram {
        symbols: compiler.symbols,
        code: compiler.code,
    })
}

/// All parser/codegen state threaded through one recursive descent (Design
/// Note: "Global compiler state → a context object").
struct Compiler {
    tokens: Vec<Token>,
    pos: usize,

    symbols: SymbolTable,
    code: Vec<Instruction>,

    /// Lexical nesting depth of the block currently being compiled.
    level: u32,
    /// Scope ids of every block still open, outermost first — `symbols.find`
    /// treats this as the set of visible scopes (see `symbol.rs`).
    scope_chain: Vec<u32>,
    next_scope_id: u32,

    /// Compile-time register-stack pointer (`SPEC_FULL.md` §4.3): always
    /// restored to its entry value by `expression`/`term`/`condition` before
    /// they return, with the computed value left in that register.
    cur_reg: u8,

    /// Next free frame slot for the block currently being compiled, one
    /// entry per open block (innermost last). `INC`'s header reservation is
    /// slots 0..3 (static link, dynamic link, return address); variables
    /// start at slot 4.
    next_addr_stack: Vec<i32>,
}

impl Compiler {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            symbols: SymbolTable::new(),
            code: Vec::new(),
            level: 0,
            scope_chain: vec![0],
            next_scope_id: 1,
            cur_reg: 0,
            next_addr_stack: Vec::new(),
        }
    }

    // === Token stream helpers ===

    fn cur(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn cur_line(&self) -> usize {
        self.tokens[self.pos].line
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: TokenKind, on_missing: ParseErrorKind) -> Result<(), ParseError> {
        if *self.cur() == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.err(on_missing))
        }
    }

    fn expect_ident(&mut self, on_missing: ParseErrorKind) -> Result<String, ParseError> {
        match self.cur().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.err(on_missing)),
        }
    }

    fn err(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, Span::new(self.cur_line()))
    }

    fn err_named(&self, kind: ParseErrorKind, name: impl Into<String>, line: usize) -> ParseError {
        ParseError::with_name(kind, name, Span::new(line))
    }

    // === Code emission ===

    fn emit(&mut self, op: Opcode, r: u8, l: i32, m: i32) -> Result<usize, ParseError> {
        if self.code.len() >= MAX_CODE {
            return Err(self.err(ParseErrorKind::CodeMemoryExhausted));
        }
        self.code.push(Instruction::new(op, r, l, m));
        Ok(self.code.len() - 1)
    }

    /// Patch a previously emitted instruction's `m` field once its jump
    /// target is known (forward `if`/`while`/procedure-entry jumps).
    fn patch(&mut self, index: usize, m: i32) {
        self.code[index].m = m;
    }

    // === Symbol resolution ===

    fn active_scope(&self) -> u32 {
        *self.scope_chain.last().expect("scope chain is never empty")
    }

    fn resolve(&self, name: &str) -> Option<Symbol> {
        self.symbols.find(name, &self.scope_chain).cloned()
    }

    /// `δL` is always the lexical distance from the current block to the
    /// symbol's own declaring level, taken from the symbol the lookup
    /// already resolved — not re-derived from whatever token the parser
    /// happens to be sitting on (`SPEC_FULL.md` §9, open question 5).
    fn delta_level(&self, symbol_level: u32) -> i32 {
        (self.level as i32 - symbol_level as i32).max(0)
    }

    /// Load a constant or variable's value into the current register,
    /// a leaf emission per the register-stack discipline (`spec.md` §4.3:
    /// "emit `LOD`/`LIT` … increment") — `cur_reg` always advances by one on
    /// success, the same as any other leaf.
    ///
    /// Resolves open question 6: a `CONST` has no frame slot to `LOD` from,
    /// so its value is inlined as a `LIT` instead of loading garbage.
    fn load_value(&mut self, symbol: &Symbol, line: usize) -> Result<(), ParseError> {
        match symbol.kind {
            SymbolKind::Const => {
                self.emit(Opcode::Lit, self.cur_reg, 0, symbol.value)?;
                self.cur_reg += 1;
            }
            SymbolKind::Var => {
                let dl = self.delta_level(symbol.level);
                self.emit(Opcode::Lod, self.cur_reg, dl, symbol.address)?;
                self.cur_reg += 1;
            }
            SymbolKind::Proc => {
                return Err(self.err_named(
                    ParseErrorKind::ProcedureUsedAsValue,
                    symbol.name.clone(),
                    line,
                ))
            }
        }
        Ok(())
    }

    /// Store the value left by a just-compiled expression (sitting in
    /// `cur_reg - 1`, per the register-stack discipline) into a variable's
    /// frame slot, then release that register — callers use this to return
    /// `cur_reg` to its pre-expression value, keeping a statement's net
    /// change at zero (`spec.md` §8).
    fn store_to(&mut self, symbol: &Symbol, line: usize) -> Result<(), ParseError> {
        match symbol.kind {
            SymbolKind::Var => {
                let reg = self.cur_reg - 1;
                let dl = self.delta_level(symbol.level);
                self.emit(Opcode::Sto, reg, dl, symbol.address)?;
                self.cur_reg -= 1;
                Ok(())
            }
            SymbolKind::Const | SymbolKind::Proc => Err(self.err_named(
                ParseErrorKind::CannotAssignToConstOrProc,
                symbol.name.clone(),
                line,
            )),
        }
    }

    // === Grammar ===

    fn program(&mut self) -> Result<(), ParseError> {
        self.block()?;
        self.expect(TokenKind::Period, ParseErrorKind::ExpectedPeriod)?;
        self.emit(Opcode::SioHalt, 0, 0, 3)?;
        Ok(())
    }

    /// `block = "const" ... ";" | "var" ... ";" | "procedure" ... ";" ,
    ///          statement`
    ///
    /// Every block — the program's outermost one and every procedure's body
    /// alike — opens with a frame-growing `INC` for its own locals. The
    /// original only emitted this inside `proc_declaration`, leaving the
    /// top-level program without a reserved local region (`SPEC_FULL.md` §9,
    /// open question 1); emitting it here, once, for every block closes
    /// that gap uniformly.
    fn block(&mut self) -> Result<(), ParseError> {
        self.next_addr_stack.push(4);
        self.emit(Opcode::Inc, 0, 0, 4)?;

        self.const_decl()?;
        self.var_decl()?;
        self.proc_decl()?;
        self.statement()?;

        self.next_addr_stack.pop();
        Ok(())
    }

    /// `const ident = number { "," ident = number } ";"`
    fn const_decl(&mut self) -> Result<(), ParseError> {
        if *self.cur() != TokenKind::Const {
            return Ok(());
        }
        self.advance();
        let scope_id = self.active_scope();

        loop {
            let line = self.cur_line();
            let name = self.expect_ident(ParseErrorKind::ExpectedIdentAfterKeyword)?;
            self.expect(TokenKind::Eq, ParseErrorKind::ExpectedEqAfterIdent)?;
            let value = match self.cur().clone() {
                TokenKind::Number(n) => {
                    self.advance();
                    n
                }
                _ => return Err(self.err(ParseErrorKind::ExpectedNumberAfterEq)),
            };
            if self.symbols.declared_in_scope(&name, scope_id) {
                return Err(self.err_named(ParseErrorKind::DuplicateDeclaration, name, line));
            }
            self.symbols
                .add(Symbol::constant(name, self.level, scope_id, value));

            if *self.cur() == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolonOrComma)
    }

    /// `var ident { "," ident } ";"` — each variable reserves one frame slot
    /// and emits its own `INC 0 0 1` (open question 1: one slot per
    /// variable, not two — the original's width-2 reservation wasted a slot
    /// per declaration for no documented reason).
    fn var_decl(&mut self) -> Result<(), ParseError> {
        if *self.cur() != TokenKind::Var {
            return Ok(());
        }
        self.advance();
        let scope_id = self.active_scope();

        loop {
            let line = self.cur_line();
            let name = self.expect_ident(ParseErrorKind::ExpectedIdentAfterKeyword)?;
            if self.symbols.declared_in_scope(&name, scope_id) {
                return Err(self.err_named(ParseErrorKind::DuplicateDeclaration, name, line));
            }

            let addr = *self
                .next_addr_stack
                .last()
                .expect("var_decl is only called inside an open block");
            *self.next_addr_stack.last_mut().unwrap() += 1;
            self.symbols
                .add(Symbol::variable(name, self.level, scope_id, addr));
            self.emit(Opcode::Inc, 0, 0, 1)?;

            if *self.cur() == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolonOrComma)
    }

    /// `{ "procedure" ident ";" block ";" }`
    fn proc_decl(&mut self) -> Result<(), ParseError> {
        while *self.cur() == TokenKind::Procedure {
            self.advance();
            let line = self.cur_line();
            let name = self.expect_ident(ParseErrorKind::ExpectedIdentAfterKeyword)?;
            let outer_scope = self.active_scope();
            if self.symbols.declared_in_scope(&name, outer_scope) {
                return Err(self.err_named(ParseErrorKind::DuplicateDeclaration, name, line));
            }
            // Declared at the enclosing level/scope, so the procedure is
            // callable by its siblings and by itself.
            let sym_index = self
                .symbols
                .add(Symbol::procedure(&name, self.level, outer_scope));
            self.expect(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;

            // Every call into this procedure must jump over its body; the
            // body's own entry is the `INC` that `block` is about to emit.
            let entry_jump = self.emit(Opcode::Jmp, 0, 0, 0)?;
            let entry = self.code.len() as i32;
            self.symbols.get_mut(sym_index).address = entry;

            self.level += 1;
            let body_scope = self.next_scope_id;
            self.next_scope_id += 1;
            self.scope_chain.push(body_scope);

            self.block()?;
            // The original never emitted a trailing return, relying on
            // control falling off the end of the procedure's code into
            // whatever followed it in memory (`SPEC_FULL.md` §9, open
            // question 3).
            self.emit(Opcode::Rtn, 0, 0, 0)?;

            self.scope_chain.pop();
            self.level -= 1;

            self.patch(entry_jump, self.code.len() as i32);
            self.expect(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;
        }
        Ok(())
    }

    /// `statement = [ ident ":=" expression
    ///              | "call" ident
    ///              | "begin" statement { ";" statement } "end"
    ///              | "if" condition "then" statement [ "else" statement ]
    ///              | "while" condition "do" statement
    ///              | "read" ident
    ///              | "write" ident ]`
    fn statement(&mut self) -> Result<(), ParseError> {
        match self.cur().clone() {
            TokenKind::Ident(name) => {
                let line = self.cur_line();
                self.advance();
                let symbol = self.resolve(&name).ok_or_else(|| {
                    self.err_named(ParseErrorKind::UndeclaredIdentifier, name.clone(), line)
                })?;
                self.expect(TokenKind::Becomes, ParseErrorKind::ExpectedBecomes)?;
                self.expression()?;
                self.store_to(&symbol, line)?;
            }
            TokenKind::Call => {
                self.advance();
                let line = self.cur_line();
                let name = self.expect_ident(ParseErrorKind::ExpectedIdentAfterCall)?;
                let symbol = self.resolve(&name).ok_or_else(|| {
                    self.err_named(ParseErrorKind::UndeclaredIdentifier, name.clone(), line)
                })?;
                if symbol.kind != SymbolKind::Proc {
                    return Err(self.err_named(
                        ParseErrorKind::CannotCallConstOrVar,
                        name,
                        line,
                    ));
                }
                let dl = self.delta_level(symbol.level);
                self.emit(Opcode::Cal, 0, dl, symbol.address)?;
            }
            TokenKind::Begin => {
                self.advance();
                self.statement()?;
                while *self.cur() == TokenKind::Semicolon {
                    self.advance();
                    self.statement()?;
                }
                self.expect(TokenKind::End, ParseErrorKind::ExpectedSemicolonOrEnd)?;
            }
            TokenKind::If => {
                self.advance();
                self.condition()?;
                self.expect(TokenKind::Then, ParseErrorKind::ExpectedThen)?;
                self.cur_reg -= 1;
                let jpc = self.emit(Opcode::Jpc, self.cur_reg, 0, 0)?;
                self.statement()?;
                if *self.cur() == TokenKind::Else {
                    self.advance();
                    let skip_else = self.emit(Opcode::Jmp, 0, 0, 0)?;
                    self.patch(jpc, self.code.len() as i32);
                    self.statement()?;
                    self.patch(skip_else, self.code.len() as i32);
                } else {
                    self.patch(jpc, self.code.len() as i32);
                }
            }
            TokenKind::While => {
                self.advance();
                let loop_top = self.code.len() as i32;
                self.condition()?;
                self.expect(TokenKind::Do, ParseErrorKind::ExpectedDo)?;
                self.cur_reg -= 1;
                let jpc = self.emit(Opcode::Jpc, self.cur_reg, 0, 0)?;
                self.statement()?;
                // The original never jumped back to re-test the condition,
                // so a `while` only ever ran its body once (`SPEC_FULL.md`
                // §9, open question 2).
                self.emit(Opcode::Jmp, 0, 0, loop_top)?;
                self.patch(jpc, self.code.len() as i32);
            }
            TokenKind::Read => {
                self.advance();
                let line = self.cur_line();
                let name = self.expect_ident(ParseErrorKind::ExpectedIdentAfterKeyword)?;
                let symbol = self.resolve(&name).ok_or_else(|| {
                    self.err_named(ParseErrorKind::UndeclaredIdentifier, name.clone(), line)
                })?;
                self.emit(Opcode::SioRead, self.cur_reg, 0, 2)?;
                self.cur_reg += 1;
                self.store_to(&symbol, line)?;
            }
            TokenKind::Write => {
                self.advance();
                let line = self.cur_line();
                let name = self.expect_ident(ParseErrorKind::ExpectedIdentAfterKeyword)?;
                let symbol = self.resolve(&name).ok_or_else(|| {
                    self.err_named(ParseErrorKind::UndeclaredIdentifier, name.clone(), line)
                })?;
                // The original emitted SIO_WRITE straight off whatever was
                // already sitting in the register, without a preceding LOD
                // to actually fetch the variable's value (`SPEC_FULL.md`
                // §9, open question 4).
                self.load_value(&symbol, line)?;
                self.cur_reg -= 1;
                self.emit(Opcode::SioWrite, self.cur_reg, 0, 1)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// `condition = "odd" expression | expression relop expression`
    ///
    /// Like `expression`/`term`, a condition nets `cur_reg` by exactly +1 on
    /// success, leaving its flag (0 or 1) in the pre-call register — callers
    /// that consume the flag (`if`/`while`) release it by decrementing
    /// `cur_reg` back themselves before emitting `JPC`.
    fn condition(&mut self) -> Result<(), ParseError> {
        if *self.cur() == TokenKind::Odd {
            self.advance();
            self.expression()?;
            let reg = self.cur_reg - 1;
            self.emit(Opcode::Odd, reg, 0, 0)?;
            return Ok(());
        }

        self.expression()?;
        if !self.cur().is_relop() {
            return Err(self.err(ParseErrorKind::ExpectedRelop));
        }
        let op = self.cur().clone();
        self.advance();

        self.expression()?;
        let opcode = match op {
            TokenKind::Eq => Opcode::Eql,
            TokenKind::Neq => Opcode::Neq,
            TokenKind::Lss => Opcode::Lss,
            TokenKind::Leq => Opcode::Leq,
            TokenKind::Gtr => Opcode::Gtr,
            TokenKind::Geq => Opcode::Geq,
            _ => unreachable!("checked by is_relop"),
        };
        let dest = self.cur_reg - 2;
        let rhs = self.cur_reg - 1;
        self.emit(opcode, dest, dest, rhs)?;
        self.cur_reg -= 1;
        Ok(())
    }

    /// `expression = [ "+" | "-" ] term { ("+" | "-") term }`
    ///
    /// Binary ops combine `RF[cur_reg-2]` and `RF[cur_reg-1]` into
    /// `RF[cur_reg-2]` and decrement, per the register-stack discipline
    /// (`spec.md` §4.3) — each sub-`term` already nets +1 on its own, so no
    /// manual pre-increment is needed before recursing.
    fn expression(&mut self) -> Result<(), ParseError> {
        let negate_first = match self.cur() {
            TokenKind::Minus => {
                self.advance();
                true
            }
            TokenKind::Plus => {
                self.advance();
                false
            }
            _ => false,
        };

        self.term()?;
        if negate_first {
            let reg = self.cur_reg - 1;
            self.emit(Opcode::Neg, reg, reg, 0)?;
        }

        loop {
            let op = match self.cur() {
                TokenKind::Plus => Opcode::Add,
                TokenKind::Minus => Opcode::Sub,
                _ => break,
            };
            self.advance();
            self.term()?;
            let dest = self.cur_reg - 2;
            let rhs = self.cur_reg - 1;
            self.emit(op, dest, dest, rhs)?;
            self.cur_reg -= 1;
        }
        Ok(())
    }

    /// `term = factor { ("*" | "/") factor }`
    fn term(&mut self) -> Result<(), ParseError> {
        self.factor()?;
        loop {
            let op = match self.cur() {
                TokenKind::Star => Opcode::Mul,
                TokenKind::Slash => Opcode::Div,
                _ => break,
            };
            self.advance();
            self.factor()?;
            let dest = self.cur_reg - 2;
            let rhs = self.cur_reg - 1;
            self.emit(op, dest, dest, rhs)?;
            self.cur_reg -= 1;
        }
        Ok(())
    }

    /// `factor = ident | number | "(" expression ")"`
    fn factor(&mut self) -> Result<(), ParseError> {
        match self.cur().clone() {
            TokenKind::Ident(name) => {
                let line = self.cur_line();
                self.advance();
                let symbol = self.resolve(&name).ok_or_else(|| {
                    self.err_named(ParseErrorKind::UndeclaredIdentifier, name.clone(), line)
                })?;
                self.load_value(&symbol, line)?;
            }
            TokenKind::Number(n) => {
                self.advance();
                self.emit(Opcode::Lit, self.cur_reg, 0, n)?;
                self.cur_reg += 1;
            }
            TokenKind::LParen => {
                self.advance();
                self.expression()?;
                self.expect(TokenKind::RParen, ParseErrorKind::ExpectedRightParen)?;
            }
            _ => return Err(self.err(ParseErrorKind::InvalidFactorStart)),
        }
        Ok(())
    }
}
