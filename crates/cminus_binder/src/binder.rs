//! The binder implementation.
//!
//! Walks the tree once and populates the scope table:
//! - the global scope, seeded with the built-in `input` and `output`
//! - one scope per function, shared by its parameters and body
//! - one scope per nested block, named after the enclosing function
//! - placeholder symbols for uses of undeclared names
//!
//! Every compound statement records the scope it opened, so the checker can
//! re-enter exactly the same scopes later.

use crate::scope::ScopeTable;
use crate::symbol::{Builtin, Declaration, ScopeError, SymbolKind};
use cminus_ast::node::{NodeKind, SyntaxTree};
use cminus_ast::types::{NodeId, SymbolId, Type};
use cminus_ast::visitor::{walk, TreeVisitor};
use cminus_core::intern::InternedString;
use cminus_core::text::{LineNumber, BUILTIN_LINE};
use cminus_diagnostics::{messages, Diagnostic, DiagnosticCategory, DiagnosticCollection, DiagnosticMessage};

/// The binder creates scopes and symbols for one compilation unit.
pub struct Binder {
    scopes: ScopeTable,
    diagnostics: DiagnosticCollection,
    /// Name of the function being walked; nested block scopes take this name.
    current_function: Option<InternedString>,
    /// Set between a function declaration and its body, whose compound
    /// statement reuses the function's scope instead of opening another.
    function_scope_pending: bool,
}

impl Binder {
    pub fn new() -> Self {
        Self {
            scopes: ScopeTable::new(),
            diagnostics: DiagnosticCollection::new(),
            current_function: None,
            function_scope_pending: false,
        }
    }

    /// Build the scope table for `tree`, annotating its compound statements.
    pub fn bind_program(&mut self, tree: &mut SyntaxTree) -> Result<(), ScopeError> {
        self.scopes.clear();
        self.current_function = None;
        self.function_scope_pending = false;

        let global_name = tree.interner().intern("global");
        let global = self.scopes.create_scope(global_name);
        self.scopes.push_scope(global)?;
        self.declare_builtins(tree)?;

        let root = tree.root();
        walk(tree, root, self)?;

        self.scopes.pop_scope()?;
        log::debug!(
            "bound {} symbols in {} scopes",
            self.scopes.symbols().len(),
            self.scopes.scopes().len()
        );
        Ok(())
    }

    pub fn scopes(&self) -> &ScopeTable {
        &self.scopes
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the scope table and the binding diagnostics.
    pub fn into_parts(self) -> (ScopeTable, DiagnosticCollection) {
        (self.scopes, self.diagnostics)
    }

    fn declare_builtins(&mut self, tree: &SyntaxTree) -> Result<(), ScopeError> {
        let interner = tree.interner();
        let input = interner.intern("input");
        let output = interner.intern("output");
        let value = interner.intern("value");

        let slot = self.scopes.allocate_slot()?;
        self.scopes.insert(input, BUILTIN_LINE, slot, Declaration::builtin(Builtin::Input))?;
        let slot = self.scopes.allocate_slot()?;
        self.scopes.insert(output, BUILTIN_LINE, slot, Declaration::builtin(Builtin::Output))?;

        let scope = self.scopes.create_scope(output);
        self.scopes.push_scope(scope)?;
        let slot = self.scopes.allocate_slot()?;
        self.scopes.insert(value, BUILTIN_LINE, slot, Declaration::builtin(Builtin::OutputValue))?;
        self.scopes.pop_scope()?;
        Ok(())
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn bind_variable(
        &mut self,
        tree: &mut SyntaxTree,
        node: NodeId,
        name: InternedString,
        has_size: bool,
    ) -> Result<(), ScopeError> {
        let line = tree.node(node).line;
        let mut ty = tree.node(node).ty;
        if ty.is_void() {
            self.report_void(tree, name, line);
        }
        if has_size {
            ty = Type::IntArray;
            tree.node_mut(node).ty = ty;
        }
        self.declare(tree, node, name, line, Declaration::declared(node, SymbolKind::Variable, ty))?;
        Ok(())
    }

    fn bind_function(&mut self, tree: &SyntaxTree, node: NodeId, name: InternedString) -> Result<(), ScopeError> {
        self.current_function = Some(name);
        let line = tree.node(node).line;
        let ty = tree.node(node).ty;
        self.declare(tree, node, name, line, Declaration::declared(node, SymbolKind::Function, ty))?;

        // A redefined function still gets a scope so its parameters and
        // locals never land in the enclosing one.
        let scope = self.scopes.create_scope(name);
        self.scopes.push_scope(scope)?;
        self.function_scope_pending = true;
        Ok(())
    }

    fn bind_param(
        &mut self,
        tree: &mut SyntaxTree,
        node: NodeId,
        name: InternedString,
        is_array: bool,
    ) -> Result<(), ScopeError> {
        let line = tree.node(node).line;
        let mut ty = tree.node(node).ty;
        if is_array {
            ty = ty.array_of();
            tree.node_mut(node).ty = ty;
        }
        if ty.is_void() {
            self.report_void(tree, name, line);
        }
        self.declare(tree, node, name, line, Declaration::declared(node, SymbolKind::Variable, ty))?;
        Ok(())
    }

    /// Bind a declaration in the current scope, or report a redefinition.
    /// Returns the new symbol, or `None` when the name was already bound.
    fn declare(
        &mut self,
        tree: &SyntaxTree,
        node: NodeId,
        name: InternedString,
        line: LineNumber,
        declaration: Declaration,
    ) -> Result<Option<SymbolId>, ScopeError> {
        if let Some(existing) = self.scopes.lookup_in_current_scope(name) {
            let earlier: String = self
                .scopes
                .symbol(existing)
                .lines
                .iter()
                .map(|line| format!("{} ", line))
                .collect();
            let line_text = line.to_string();
            self.report(
                DiagnosticCategory::Binding,
                line,
                &messages::SYMBOL_REDEFINED,
                &[tree.name_text(name), &line_text, &earlier],
            );
            self.scopes.append_reference_line(name, line);
            log::debug!("redefinition of {:?} by {:?}", existing, node);
            return Ok(None);
        }

        let slot = self.scopes.allocate_slot()?;
        self.scopes.insert(name, line, slot, declaration).map(Some)
    }

    // ========================================================================
    // Blocks and uses
    // ========================================================================

    fn enter_block(&mut self, tree: &mut SyntaxTree, node: NodeId) -> Result<(), ScopeError> {
        let scope = if std::mem::take(&mut self.function_scope_pending) {
            self.scopes.current_scope().ok_or(ScopeError::EmptyStack)?
        } else {
            let name = match self.current_function {
                Some(name) => name,
                None => tree.interner().intern("global"),
            };
            let scope = self.scopes.create_scope(name);
            self.scopes.push_scope(scope)?;
            scope
        };
        tree.set_compound_scope(node, scope);
        Ok(())
    }

    /// A call or variable reference. Unknown names get a placeholder in the
    /// current scope, so later uses in the same scope are not reported again.
    fn bind_use(
        &mut self,
        tree: &SyntaxTree,
        node: NodeId,
        name: InternedString,
        kind: SymbolKind,
    ) -> Result<(), ScopeError> {
        let line = tree.node(node).line;
        if let Some(symbol) = self.scopes.lookup(name) {
            self.scopes.add_reference(symbol, line);
            return Ok(());
        }

        let slot = self.scopes.allocate_slot()?;
        self.scopes.insert(name, line, slot, Declaration::placeholder(kind))?;
        let message = match kind {
            SymbolKind::Function => &messages::UNDECLARED_FUNCTION,
            SymbolKind::Variable => &messages::UNDECLARED_VARIABLE,
        };
        let line_text = line.to_string();
        self.report(DiagnosticCategory::Binding, line, message, &[tree.name_text(name), &line_text]);
        Ok(())
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    fn report(&mut self, category: DiagnosticCategory, line: LineNumber, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.add(Diagnostic::new(category, line, message, args));
    }

    fn report_void(&mut self, tree: &SyntaxTree, name: InternedString, line: LineNumber) {
        let line_text = line.to_string();
        self.report(
            DiagnosticCategory::Binding,
            line,
            &messages::VOID_TYPE_VARIABLE,
            &[tree.name_text(name), &line_text],
        );
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeVisitor for Binder {
    type Error = ScopeError;

    fn enter(&mut self, tree: &mut SyntaxTree, node: NodeId) -> Result<(), ScopeError> {
        match tree.node(node).kind.clone() {
            NodeKind::VarDecl { name, size } => self.bind_variable(tree, node, name, size.is_some()),
            NodeKind::FunDecl { name, .. } => self.bind_function(tree, node, name),
            NodeKind::Param { name: Some(name), is_array } => self.bind_param(tree, node, name, is_array),
            NodeKind::Compound { .. } => self.enter_block(tree, node),
            NodeKind::Call { name, .. } => self.bind_use(tree, node, name, SymbolKind::Function),
            NodeKind::VarRef { name, .. } => self.bind_use(tree, node, name, SymbolKind::Variable),
            _ => Ok(()),
        }
    }

    fn exit(&mut self, tree: &mut SyntaxTree, node: NodeId) -> Result<(), ScopeError> {
        if let NodeKind::Compound { .. } = tree.node(node).kind {
            self.scopes.pop_scope()?;
        }
        Ok(())
    }
}
