//! The scope table: a registry of every scope created for a compilation
//! unit plus the stack of scopes visible at the current point of a walk.

use crate::symbol::{Declaration, Resolution, ScopeError, Symbol};
use cminus_ast::types::{ScopeId, SymbolId};
use cminus_core::intern::InternedString;
use cminus_core::LineNumber;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

/// A named lexical region. Symbols keep their insertion order.
#[derive(Debug, Clone)]
pub struct Scope {
    pub name: InternedString,
    /// The enclosing scope; `None` only for the global scope.
    pub parent: Option<ScopeId>,
    symbols: IndexMap<InternedString, SymbolId, FxBuildHasher>,
}

impl Scope {
    fn new(name: InternedString, parent: Option<ScopeId>) -> Self {
        Self {
            name,
            parent,
            symbols: IndexMap::default(),
        }
    }

    pub fn get(&self, name: InternedString) -> Option<SymbolId> {
        self.symbols.get(&name).copied()
    }

    /// Symbols in insertion order.
    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols.values().copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// An open scope on the stack and its slot counter.
#[derive(Debug, Clone, Copy)]
struct Frame {
    scope: ScopeId,
    next_slot: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    stack: Vec<Frame>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Scope stack
    // ========================================================================

    /// Register a new scope whose parent is the current scope. The new scope
    /// is not pushed.
    pub fn create_scope(&mut self, name: InternedString) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let parent = self.current_scope();
        self.scopes.push(Scope::new(name, parent));
        log::debug!("created scope {:?} (parent {:?})", id, parent);
        id
    }

    /// Open `scope`, starting its slot counter at zero.
    pub fn push_scope(&mut self, scope: ScopeId) -> Result<(), ScopeError> {
        if scope.index() >= self.scopes.len() {
            return Err(ScopeError::UnknownScope(scope));
        }
        log::debug!("push scope {:?} at depth {}", scope, self.stack.len());
        self.stack.push(Frame { scope, next_slot: 0 });
        Ok(())
    }

    pub fn pop_scope(&mut self) -> Result<ScopeId, ScopeError> {
        let frame = self.stack.pop().ok_or(ScopeError::EmptyStack)?;
        log::debug!("pop scope {:?} at depth {}", frame.scope, self.stack.len());
        Ok(frame.scope)
    }

    /// The innermost open scope.
    pub fn current_scope(&self) -> Option<ScopeId> {
        self.stack.last().map(|frame| frame.scope)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Close every open scope. The registry is kept.
    pub fn reset_stack(&mut self) {
        self.stack.clear();
    }

    /// Forget every scope and symbol.
    pub fn clear(&mut self) {
        self.scopes.clear();
        self.symbols.clear();
        self.stack.clear();
    }

    /// Hand out the next memory slot of the current scope.
    pub fn allocate_slot(&mut self) -> Result<u32, ScopeError> {
        let frame = self.stack.last_mut().ok_or(ScopeError::EmptyStack)?;
        let slot = frame.next_slot;
        frame.next_slot += 1;
        Ok(slot)
    }

    // ========================================================================
    // Symbols
    // ========================================================================

    /// Bind `name` in the current scope. If the name is already bound there,
    /// the existing symbol is kept and returned unchanged.
    pub fn insert(
        &mut self,
        name: InternedString,
        line: LineNumber,
        slot: u32,
        declaration: Declaration,
    ) -> Result<SymbolId, ScopeError> {
        let scope = self.current_scope().ok_or(ScopeError::EmptyStack)?;
        if let Some(existing) = self.scopes[scope.index()].get(name) {
            return Ok(existing);
        }

        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name,
            kind: declaration.kind,
            ty: declaration.ty,
            origin: declaration.origin,
            scope,
            slot,
            lines: vec![line],
        });
        self.scopes[scope.index()].symbols.insert(name, id);
        log::debug!("insert {:?} as {} in scope {:?} slot {}", name, declaration.kind, scope, slot);
        Ok(id)
    }

    /// Append `line` to the symbol bound to `name` in the current scope only.
    /// Returns whether such a symbol exists.
    pub fn append_reference_line(&mut self, name: InternedString, line: LineNumber) -> bool {
        match self.lookup_in_current_scope(name) {
            Some(id) => {
                self.add_reference(id, line);
                true
            }
            None => false,
        }
    }

    /// Append `line` to a symbol's reference list.
    pub fn add_reference(&mut self, symbol: SymbolId, line: LineNumber) {
        self.symbols[symbol.index()].lines.push(line);
    }

    /// Find `name` in the current scope or, failing that, the nearest
    /// enclosing scope that binds it.
    pub fn lookup(&self, name: InternedString) -> Option<SymbolId> {
        let mut scope = self.current_scope();
        while let Some(id) = scope {
            let current = &self.scopes[id.index()];
            if let Some(symbol) = current.get(name) {
                return Some(symbol);
            }
            scope = current.parent;
        }
        None
    }

    /// Like [`lookup`](Self::lookup), distinguishing placeholders from real
    /// declarations.
    pub fn resolve(&self, name: InternedString) -> Option<Resolution> {
        self.lookup(name).map(|id| {
            if self.symbols[id.index()].is_placeholder() {
                Resolution::Undeclared(id)
            } else {
                Resolution::Resolved(id)
            }
        })
    }

    /// Find `name` in the current scope only.
    pub fn lookup_in_current_scope(&self, name: InternedString) -> Option<SymbolId> {
        let scope = self.current_scope()?;
        self.scopes[scope.index()].get(name)
    }

    // ========================================================================
    // Registry access
    // ========================================================================

    #[inline]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    #[inline]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Every scope in creation order. The first is the global scope.
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn global_scope(&self) -> Option<ScopeId> {
        (!self.scopes.is_empty()).then_some(ScopeId(0))
    }
}
