//! # Symbol Table
//!
//! Scoped name → (kind, level, address/value) bindings built up by the
//! parser/code generator as it walks declarations.
//!
//! Grounded on the teacher's `first_pass/symbol_table.rs`: a single
//! `Vec`-backed table in declaration order, linear-scan lookup — entirely
//! adequate for PL/0 programs, which rarely declare more than a few hundred
//! names. What's new relative to the teacher is `scope_id`: LC-3 labels are
//! globally flat, but PL/0 declarations nest, so `find` must honor lexical
//! scoping (see `SPEC_FULL.md` §3).

/// What a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Const,
    Var,
    Proc,
}

/// A single declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Lexical nesting depth at declaration (0 = program's outermost block).
    pub level: u32,
    /// The scope (block) this symbol was declared in. 0 is the global scope;
    /// every `procedure` declaration allocates a fresh id for its own body.
    pub scope_id: u32,
    /// `CONST` payload: the literal value. Unused (0) otherwise.
    pub value: i32,
    /// `VAR` payload: frame offset from the base of the activation record.
    /// `PROC` payload: code index of the procedure's first instruction.
    /// Unused (0) for `CONST`.
    pub address: i32,
}

impl Symbol {
    pub fn constant(name: impl Into<String>, level: u32, scope_id: u32, value: i32) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Const,
            level,
            scope_id,
            value,
            address: 0,
        }
    }

    pub fn variable(name: impl Into<String>, level: u32, scope_id: u32, address: i32) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Var,
            level,
            scope_id,
            value: 0,
            address,
        }
    }

    pub fn procedure(name: impl Into<String>, level: u32, scope_id: u32) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Proc,
            level,
            scope_id,
            value: 0,
            address: 0,
        }
    }
}

/// Insertion-ordered table of declared symbols.
///
/// A symbol is added exactly once and its `address`/`value` is never
/// rewritten after declaration — except a `Proc` symbol's `address`, which is
/// patched once its body's entry point is known (see `codegen::Compiler`).
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a symbol, returning its index (used later to patch a `Proc`'s
    /// `address` once its entry point is emitted).
    pub fn add(&mut self, symbol: Symbol) -> usize {
        self.entries.push(symbol);
        self.entries.len() - 1
    }

    /// Whether `name` is already declared directly in `scope_id` (not an
    /// ancestor scope) — used to reject duplicate declarations within the
    /// same block.
    pub fn declared_in_scope(&self, name: &str, scope_id: u32) -> bool {
        self.entries
            .iter()
            .any(|s| s.scope_id == scope_id && s.name == name)
    }

    /// Return the most-recently declared symbol named `name` whose
    /// `scope_id` is on the caller's active scope chain.
    ///
    /// Scanning backward and returning the first match gives classic
    /// shadowing: a redeclaration in an inner, still-open scope wins over an
    /// outer one. Symbols whose scope has already closed (popped off the
    /// chain, e.g. a sibling procedure's locals) are never matched, because
    /// their `scope_id` is no longer present in `active_scopes` — this is
    /// what keeps a sibling procedure's variables invisible to each other
    /// even when both happen to sit at the same lexical level.
    pub fn find(&self, name: &str, active_scopes: &[u32]) -> Option<&Symbol> {
        self.entries
            .iter()
            .rev()
            .find(|s| s.name == name && active_scopes.contains(&s.scope_id))
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Symbol {
        &mut self.entries[index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_prefers_innermost_active_scope() {
        let mut table = SymbolTable::new();
        table.add(Symbol::variable("x", 0, 0, 4));
        table.add(Symbol::variable("x", 1, 1, 4));

        // Both scopes active (nested procedure currently open): inner wins.
        let found = table.find("x", &[0, 1]).unwrap();
        assert_eq!(found.scope_id, 1);

        // Only the outer scope active (inner has closed): outer is found.
        let found = table.find("x", &[0]).unwrap();
        assert_eq!(found.scope_id, 0);
    }

    #[test]
    fn sibling_scope_variables_are_not_visible_to_each_other() {
        let mut table = SymbolTable::new();
        table.add(Symbol::variable("x", 1, 1, 4)); // procedure A's local
                                                     // procedure B (scope_id 2) never sees A's `x`, even at the same level.
        assert!(table.find("x", &[0, 2]).is_none());
    }

    #[test]
    fn declared_in_scope_checks_exact_scope_only() {
        let mut table = SymbolTable::new();
        table.add(Symbol::variable("x", 0, 0, 4));
        assert!(table.declared_in_scope("x", 0));
        assert!(!table.declared_in_scope("x", 1));
    }
}
