//! Hierarchical symbol table.
//!
//! Scopes live in an arena and link to their parent by index, so lookup walks
//! outward without back-pointers. The root scope holds module names; each
//! module gets its own scope, and `begin ... end` blocks get nested block
//! scopes. Exiting a scope only moves the cursor back to the parent: the
//! scope stays in the arena, so the finished table can still be queried.

use crate::ast::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vela_common::{BitVec, Ident, InternalError, VelaResult};
use vela_source::Span;

/// What a name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// A module definition.
    Module,
    /// A module port.
    Port,
    /// A `wire`.
    Wire,
    /// A `reg` or `integer`.
    Reg,
    /// A `parameter` or `localparam`.
    Parameter,
}

/// A declared name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// The name.
    pub name: Ident,
    /// What the name denotes.
    pub kind: SymbolKind,
    /// Bit width. 1 for scalars and modules.
    pub width: u32,
    /// Port direction; `None` for non-ports and for header ports whose
    /// direction has not been declared yet.
    pub direction: Option<Direction>,
    /// `true` for ports also declared `reg`.
    pub is_reg: bool,
    /// Constant value of a parameter.
    pub value: Option<BitVec>,
    /// Declaration site.
    pub span: Span,
}

impl Symbol {
    /// Creates a symbol with no direction, `reg` flag or value.
    pub fn new(name: Ident, kind: SymbolKind, width: u32, span: Span) -> Self {
        Self {
            name,
            kind,
            width,
            direction: None,
            is_reg: false,
            value: None,
            span,
        }
    }

    /// Sets the port direction.
    pub fn with_direction(mut self, direction: Option<Direction>) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the `reg` flag.
    pub fn with_reg(mut self, is_reg: bool) -> Self {
        self.is_reg = is_reg;
        self
    }

    /// Sets the constant value.
    pub fn with_value(mut self, value: Option<BitVec>) -> Self {
        self.value = value;
        self
    }

    /// `true` for procedural storage: `reg`, `integer`, and ports declared `reg`.
    pub fn is_storage(&self) -> bool {
        self.kind == SymbolKind::Reg || (self.kind == SymbolKind::Port && self.is_reg)
    }
}

/// Index of a scope in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The root scope, present in every table.
    pub const ROOT: ScopeId = ScopeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The outermost scope.
    Root,
    /// A module body.
    Module,
    /// A `begin ... end` block.
    Block,
}

/// One scope in the arena.
#[derive(Debug, Clone)]
pub struct Scope {
    /// Enclosing scope; `None` only for the root.
    pub parent: Option<ScopeId>,
    /// What opened this scope.
    pub kind: ScopeKind,
    /// Module name or block label.
    pub name: Option<Ident>,
    symbols: Vec<Symbol>,
    index: HashMap<Ident, usize>,
}

impl Scope {
    fn new(parent: Option<ScopeId>, kind: ScopeKind, name: Option<Ident>) -> Self {
        Self {
            parent,
            kind,
            name,
            symbols: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Symbols in declaration order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Finds a symbol declared directly in this scope.
    pub fn get(&self, name: Ident) -> Option<&Symbol> {
        self.index.get(&name).map(|&i| &self.symbols[i])
    }
}

/// A second declaration of a name already bound in the same scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateError {
    /// Where the first binding was declared.
    pub previous: Span,
}

/// Scope arena plus a cursor for the scope currently being filled.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl SymbolTable {
    /// Creates a table holding only the root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(None, ScopeKind::Root, None)],
            current: ScopeId::ROOT,
        }
    }

    /// The scope new declarations go into.
    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// Opens a child of the current scope and makes it current.
    pub fn enter_scope(&mut self, kind: ScopeKind, name: Option<Ident>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(Some(self.current), kind, name));
        self.current = id;
        id
    }

    /// Returns to the parent of the current scope.
    pub fn exit_scope(&mut self) -> VelaResult<ScopeId> {
        let parent = self.scopes[self.current.index()]
            .parent
            .ok_or_else(|| InternalError::new("exit_scope called at the root scope"))?;
        self.current = parent;
        Ok(parent)
    }

    /// Binds `symbol.name` in the current scope. An existing binding is kept
    /// and its declaration site returned as the error.
    pub fn declare(&mut self, symbol: Symbol) -> Result<(), DuplicateError> {
        let scope = &mut self.scopes[self.current.index()];
        if let Some(&i) = scope.index.get(&symbol.name) {
            return Err(DuplicateError {
                previous: scope.symbols[i].span,
            });
        }
        scope.index.insert(symbol.name, scope.symbols.len());
        scope.symbols.push(symbol);
        Ok(())
    }

    /// Resolves `name` from the current scope outward.
    pub fn lookup(&self, name: Ident) -> Option<&Symbol> {
        self.lookup_from(self.current, name)
    }

    /// Resolves `name` from `scope` outward.
    pub fn lookup_from(&self, scope: ScopeId, name: Ident) -> Option<&Symbol> {
        let mut next = Some(scope);
        while let Some(id) = next {
            let scope = self.scopes.get(id.index())?;
            if let Some(sym) = scope.get(name) {
                return Some(sym);
            }
            next = scope.parent;
        }
        None
    }

    /// Finds `name` in the current scope only.
    pub fn lookup_local(&self, name: Ident) -> Option<&Symbol> {
        self.scopes[self.current.index()].get(name)
    }

    /// Mutable access to a binding in the current scope, for completing a
    /// port declaration.
    pub fn lookup_local_mut(&mut self, name: Ident) -> Option<&mut Symbol> {
        let scope = &mut self.scopes[self.current.index()];
        let i = *scope.index.get(&name)?;
        scope.symbols.get_mut(i)
    }

    /// The scope with the given id.
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    /// The module scope opened for `module`, if any.
    pub fn module_scope(&self, module: Ident) -> Option<ScopeId> {
        self.scopes
            .iter()
            .position(|s| s.kind == ScopeKind::Module && s.name == Some(module))
            .map(|i| ScopeId(i as u32))
    }

    /// Number of scopes ever opened, including the root.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_source::FileId;

    fn span(start: u32) -> Span {
        Span::new(FileId::from_raw(0), start, start + 1)
    }

    fn reg(raw: u32, at: u32) -> Symbol {
        Symbol::new(Ident::from_raw(raw), SymbolKind::Reg, 1, span(at))
    }

    #[test]
    fn duplicate_keeps_first_binding() {
        let mut table = SymbolTable::new();
        table.declare(reg(1, 10)).unwrap();
        let mut second = reg(1, 20);
        second.width = 8;
        let err = table.declare(second).unwrap_err();
        assert_eq!(err.previous, span(10));
        let sym = table.lookup(Ident::from_raw(1)).unwrap();
        assert_eq!(sym.width, 1);
        assert_eq!(sym.span, span(10));
    }

    #[test]
    fn lookup_walks_outward() {
        let mut table = SymbolTable::new();
        let m = Ident::from_raw(100);
        table.declare(Symbol::new(m, SymbolKind::Module, 1, span(0))).unwrap();
        table.enter_scope(ScopeKind::Module, Some(m));
        table.declare(reg(1, 5)).unwrap();
        table.enter_scope(ScopeKind::Block, None);
        assert_eq!(table.lookup(Ident::from_raw(1)).unwrap().kind, SymbolKind::Reg);
        assert_eq!(table.lookup(m).unwrap().kind, SymbolKind::Module);
        assert!(table.lookup_local(Ident::from_raw(1)).is_none());
        assert!(table.lookup(Ident::from_raw(2)).is_none());
    }

    #[test]
    fn inner_scope_may_shadow() {
        let mut table = SymbolTable::new();
        table.enter_scope(ScopeKind::Module, None);
        table.declare(reg(1, 5)).unwrap();
        table.enter_scope(ScopeKind::Block, None);
        assert!(table.declare(reg(1, 9)).is_ok());
        assert_eq!(table.lookup(Ident::from_raw(1)).unwrap().span, span(9));
        table.exit_scope().unwrap();
        assert_eq!(table.lookup(Ident::from_raw(1)).unwrap().span, span(5));
    }

    #[test]
    fn exited_scopes_stay_queryable() {
        let mut table = SymbolTable::new();
        let m = Ident::from_raw(7);
        let id = table.enter_scope(ScopeKind::Module, Some(m));
        table.declare(reg(1, 5)).unwrap();
        table.exit_scope().unwrap();
        assert_eq!(table.current(), ScopeId::ROOT);
        assert_eq!(table.module_scope(m), Some(id));
        assert!(table.lookup_from(id, Ident::from_raw(1)).is_some());
        assert_eq!(table.scope(id).unwrap().symbols().len(), 1);
    }

    #[test]
    fn exit_at_root_is_an_error() {
        let mut table = SymbolTable::new();
        assert!(table.exit_scope().is_err());
    }

    #[test]
    fn port_completion_through_local_mut() {
        let mut table = SymbolTable::new();
        table.enter_scope(ScopeKind::Module, None);
        let q = Ident::from_raw(3);
        table.declare(Symbol::new(q, SymbolKind::Port, 1, span(1))).unwrap();
        let sym = table.lookup_local_mut(q).unwrap();
        sym.direction = Some(Direction::Output);
        sym.is_reg = true;
        assert!(table.lookup(q).unwrap().is_storage());
    }
}
