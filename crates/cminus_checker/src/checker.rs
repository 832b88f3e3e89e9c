//! The type checker implementation.
//!
//! Typing happens in the post-order callback, so every child is typed
//! before its parent is checked. A node whose type cannot be computed is
//! left undetermined.

use crate::types::Signature;
use cminus_ast::node::{NodeKind, SyntaxTree};
use cminus_ast::types::{NodeId, Type};
use cminus_ast::visitor::{walk, TreeVisitor};
use cminus_binder::{Binder, ScopeError, ScopeTable};
use cminus_core::intern::InternedString;
use cminus_core::LineNumber;
use cminus_diagnostics::{messages, Diagnostic, DiagnosticCategory, DiagnosticCollection, DiagnosticMessage};

/// The outcome of semantic analysis, handed on with the annotated tree.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub scopes: ScopeTable,
    /// Binding and type diagnostics, in the order they were found.
    pub diagnostics: DiagnosticCollection,
}

impl Analysis {
    pub fn succeeded(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Run the binder and then the checker over `tree`.
pub fn analyze(tree: &mut SyntaxTree) -> Result<Analysis, ScopeError> {
    let mut binder = Binder::new();
    binder.bind_program(tree)?;
    let mut checker = Checker::new(binder);
    checker.check_program(tree)?;
    Ok(checker.into_analysis())
}

/// The checker validates and annotates node types using the scopes built
/// by the binder.
pub struct Checker {
    scopes: ScopeTable,
    diagnostics: DiagnosticCollection,
    /// The function declaration enclosing the current node.
    current_function: Option<NodeId>,
}

impl Checker {
    /// Continue from a binder that has bound the program.
    pub fn new(binder: Binder) -> Self {
        let (scopes, diagnostics) = binder.into_parts();
        Self {
            scopes,
            diagnostics,
            current_function: None,
        }
    }

    pub fn check_program(&mut self, tree: &mut SyntaxTree) -> Result<(), ScopeError> {
        self.scopes.reset_stack();
        self.current_function = None;

        let global = self.scopes.global_scope().ok_or(ScopeError::EmptyStack)?;
        self.scopes.push_scope(global)?;
        let root = tree.root();
        walk(tree, root, self)?;
        self.scopes.pop_scope()?;
        log::debug!("type checking finished with {} diagnostics", self.diagnostics.len());
        Ok(())
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn into_analysis(self) -> Analysis {
        Analysis {
            scopes: self.scopes,
            diagnostics: self.diagnostics,
        }
    }

    // ========================================================================
    // Node checks
    // ========================================================================

    fn check_condition(&mut self, tree: &SyntaxTree, node: NodeId, condition: NodeId) {
        if tree.node(condition).ty != Type::Int {
            self.report_at_line(tree, node, &messages::INVALID_CONDITION);
        }
    }

    fn check_return(&mut self, tree: &SyntaxTree, node: NodeId, value: Option<NodeId>) {
        let Some(function) = self.current_function else {
            return;
        };
        let expected = tree.node(function).ty;
        let valid = match value {
            Some(value) => expected != Type::Void && tree.node(value).ty == expected,
            None => expected == Type::Void,
        };
        if !valid {
            self.report_at_line(tree, node, &messages::INVALID_RETURN);
        }
    }

    fn check_assign(&mut self, tree: &mut SyntaxTree, node: NodeId, target: NodeId, value: NodeId) {
        let lhs = tree.node(target).ty;
        let rhs = tree.node(value).ty;
        let usable = |ty: Type| ty.is_determined() && ty != Type::Void;
        if usable(lhs) && usable(rhs) && lhs == rhs {
            tree.node_mut(node).ty = lhs;
        } else {
            self.report_at_line(tree, node, &messages::INVALID_ASSIGNMENT);
        }
    }

    fn check_binary(&mut self, tree: &mut SyntaxTree, node: NodeId, lhs: NodeId, rhs: NodeId) {
        if tree.node(lhs).ty == Type::Int && tree.node(rhs).ty == Type::Int {
            tree.node_mut(node).ty = Type::Int;
        } else {
            self.report_at_line(tree, node, &messages::INVALID_OPERATION);
            tree.node_mut(node).ty = Type::Undetermined;
        }
    }

    fn check_call(&mut self, tree: &mut SyntaxTree, node: NodeId, name: InternedString, args: Option<NodeId>) {
        // Placeholders were already reported as undeclared by the binder.
        let ty = match self.scopes.resolve(name) {
            Some(resolution) => match Signature::of(tree, self.scopes.symbol(resolution.symbol())) {
                Some(signature) => {
                    let arguments: Vec<Type> = tree.siblings(args).map(|arg| tree.node(arg).ty).collect();
                    if !signature.accepts(&arguments) {
                        self.report_named(tree, node, name, &messages::INVALID_FUNCTION_CALL);
                    }
                    signature.return_type
                }
                None => {
                    self.report_named(tree, node, name, &messages::INVALID_FUNCTION_CALL);
                    Type::Undetermined
                }
            },
            None => {
                self.report_named(tree, node, name, &messages::UNDECLARED_FUNCTION);
                Type::Undetermined
            }
        };
        tree.node_mut(node).ty = ty;
    }

    fn check_var_ref(&mut self, tree: &mut SyntaxTree, node: NodeId, name: InternedString, index: Option<NodeId>) {
        let declared = match self.scopes.resolve(name) {
            Some(resolution) => self.scopes.symbol(resolution.symbol()).ty,
            None => {
                self.report_named(tree, node, name, &messages::UNDECLARED_VARIABLE);
                tree.node_mut(node).ty = Type::Undetermined;
                return;
            }
        };

        if declared.is_void() {
            self.report_named(tree, node, name, &messages::VOID_TYPE_VARIABLE);
        }

        let Some(index) = index else {
            tree.node_mut(node).ty = declared;
            return;
        };
        let index_is_int = tree.node(index).ty == Type::Int;
        if !index_is_int {
            self.report_named(tree, node, name, &messages::INVALID_ARRAY_INDEX_TYPE);
        }
        let ty = if declared != Type::IntArray {
            self.report_named(tree, node, name, &messages::INVALID_ARRAY_INDEX_TARGET);
            declared
        } else if index_is_int {
            Type::Int
        } else {
            declared
        };
        tree.node_mut(node).ty = ty;
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    fn report(&mut self, line: LineNumber, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics
            .add(Diagnostic::new(DiagnosticCategory::Type, line, message, args));
    }

    /// A message whose only argument is the node's line.
    fn report_at_line(&mut self, tree: &SyntaxTree, node: NodeId, message: &DiagnosticMessage) {
        let line = tree.node(node).line;
        self.report(line, message, &[&line.to_string()]);
    }

    /// A message taking the name and then the node's line.
    fn report_named(&mut self, tree: &SyntaxTree, node: NodeId, name: InternedString, message: &DiagnosticMessage) {
        let line = tree.node(node).line;
        self.report(line, message, &[tree.name_text(name), &line.to_string()]);
    }
}

impl TreeVisitor for Checker {
    type Error = ScopeError;

    fn enter(&mut self, tree: &mut SyntaxTree, node: NodeId) -> Result<(), ScopeError> {
        match tree.node(node).kind {
            NodeKind::Compound { scope, .. } => {
                let scope = scope.ok_or(ScopeError::UnboundBlock(node))?;
                self.scopes.push_scope(scope)?;
            }
            NodeKind::FunDecl { .. } => self.current_function = Some(node),
            _ => {}
        }
        Ok(())
    }

    fn exit(&mut self, tree: &mut SyntaxTree, node: NodeId) -> Result<(), ScopeError> {
        match tree.node(node).kind.clone() {
            NodeKind::Compound { .. } => {
                self.scopes.pop_scope()?;
            }
            NodeKind::If { condition, .. } | NodeKind::While { condition, .. } => {
                self.check_condition(tree, node, condition);
            }
            NodeKind::Return { value } => self.check_return(tree, node, value),
            NodeKind::Assign { target, value } => self.check_assign(tree, node, target, value),
            NodeKind::Binary { lhs, rhs, .. } => self.check_binary(tree, node, lhs, rhs),
            NodeKind::Call { name, args } => self.check_call(tree, node, name, args),
            NodeKind::VarRef { name, index } => self.check_var_ref(tree, node, name, index),
            NodeKind::Const { .. } => tree.node_mut(node).ty = Type::Int,
            _ => {}
        }
        Ok(())
    }
}
