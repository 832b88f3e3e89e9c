//! cminus_printer: text listings of the front end's data structures.
//!
//! - [`print_tree`] renders the syntax tree as an indented outline, one node
//!   per line, children two spaces deeper than their parent.
//! - [`print_symbol_table`] renders every symbol of every scope as a table.

use cminus_ast::node::{Node, NodeKind, SyntaxTree};
use cminus_ast::types::{NodeId, Type};
use cminus_binder::ScopeTable;
use std::fmt::Write;

const INDENT_WIDTH: usize = 2;

/// Render the syntax tree listing.
pub fn print_tree(tree: &SyntaxTree) -> String {
    let mut printer = TreePrinter::new(tree);
    printer.print_outline(tree.root());
    printer.output
}

/// Render the symbol table listing. Scopes appear in creation order and
/// symbols in declaration order within their scope.
pub fn print_symbol_table(tree: &SyntaxTree, scopes: &ScopeTable) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str("< Symbol Table >\n");
    out.push_str(" Symbol Name   Symbol Kind   Symbol Type    Scope Name   Location  Line Numbers\n");
    out.push_str("-------------  -----------  -------------  ------------  --------  ------------\n");

    for scope in scopes.scopes() {
        let scope_name = tree.name_text(scope.name);
        for id in scope.symbols() {
            let symbol = scopes.symbol(id);
            let _ = write!(
                out,
                "{:<13}  {:<11}  {:<13}  {:<13}  {:<8}  ",
                tree.name_text(symbol.name),
                symbol.kind.to_string(),
                symbol.ty.to_string(),
                scope_name,
                symbol.slot,
            );
            for line in &symbol.lines {
                let _ = write!(out, "{:>3} ", line);
            }
            out.push('\n');
        }
    }
    out
}

/// Writes the tree outline.
struct TreePrinter<'t> {
    tree: &'t SyntaxTree,
    output: String,
}

impl<'t> TreePrinter<'t> {
    fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            tree,
            output: String::with_capacity(4096),
        }
    }

    /// Print the sibling chain starting at `first` at level 1, each child
    /// list one level deeper than its parent. Uses an explicit stack, so
    /// long operator chains cannot exhaust the thread's stack.
    fn print_outline(&mut self, first: Option<NodeId>) {
        let tree = self.tree;
        let mut pending: Vec<(NodeId, usize)> = first.map(|id| (id, 1)).into_iter().collect();
        while let Some((id, level)) = pending.pop() {
            let node = tree.node(id);
            self.write_indent(level);
            self.print_node(node);
            self.output.push('\n');
            if let Some(next) = node.sibling {
                pending.push((next, level));
            }
            pending.extend(node.children().into_iter().rev().flatten().map(|child| (child, level + 1)));
        }
    }

    fn print_node(&mut self, node: &Node) {
        let tree = self.tree;
        let out = &mut self.output;
        let _ = match node.kind {
            NodeKind::VarDecl { name, size } => {
                let ty = if size.is_some() { node.ty.array_of() } else { node.ty };
                write!(
                    out,
                    "Variable Declaration: name = {}, type = {}",
                    tree.name_text(name),
                    declared(ty)
                )
            }
            NodeKind::FunDecl { name, .. } => write!(
                out,
                "Function Declaration: name = {}, return type = {}",
                tree.name_text(name),
                declared(node.ty)
            ),
            NodeKind::Param { name: None, .. } => write!(out, "Void Parameter"),
            NodeKind::Param {
                name: Some(name),
                is_array,
            } => {
                let ty = if is_array { node.ty.array_of() } else { node.ty };
                write!(out, "Parameter: name = {}, type = {}", tree.name_text(name), declared(ty))
            }
            NodeKind::Compound { .. } => write!(out, "Compound Statement:"),
            NodeKind::If { else_branch: Some(_), .. } => write!(out, "If-Else Statement:"),
            NodeKind::If { else_branch: None, .. } => write!(out, "If Statement:"),
            NodeKind::While { .. } => write!(out, "While Statement:"),
            NodeKind::Return { value: Some(_) } => write!(out, "Return Statement:"),
            NodeKind::Return { value: None } => write!(out, "Non-value Return Statement"),
            NodeKind::Assign { .. } => write!(out, "Assign:"),
            NodeKind::Binary { op, .. } => write!(out, "Op: {}", op),
            NodeKind::VarRef { name, .. } => write!(out, "Variable: name = {}", tree.name_text(name)),
            NodeKind::Const { value } => write!(out, "Const: {}", value),
            NodeKind::Call { name, .. } => write!(out, "Call: function name = {}", tree.name_text(name)),
        };
    }

    fn write_indent(&mut self, level: usize) {
        for _ in 0..level * INDENT_WIDTH {
            self.output.push(' ');
        }
    }
}

/// A declared type as the listing shows it.
fn declared(ty: Type) -> String {
    if ty.is_determined() {
        ty.to_string()
    } else {
        "<Type Error>".to_string()
    }
}
