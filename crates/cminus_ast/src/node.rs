//! Syntax tree node definitions.
//!
//! Nodes live in a [`SyntaxTree`] arena and refer to each other by
//! [`NodeId`]. Each node category carries its own payload; the optional
//! else-branch and the optional return value are plain `Option` fields.

use crate::types::*;
use cminus_core::intern::{InternedString, StringInterner};
use cminus_core::LineNumber;

/// The maximum number of children any node has.
pub const MAX_CHILDREN: usize = 3;

/// Category-specific payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `int x;`, `int x[10];`. `size` is the constant array length.
    VarDecl {
        name: InternedString,
        size: Option<NodeId>,
    },
    /// `int f(params) { ... }`. The node type is the return type.
    FunDecl {
        name: InternedString,
        params: Option<NodeId>,
        body: NodeId,
    },
    /// A parameter. An unnamed `void` parameter means "no parameters".
    Param {
        name: Option<InternedString>,
        is_array: bool,
    },
    /// `{ locals statements }`. `scope` is filled in by the binder.
    Compound {
        locals: Option<NodeId>,
        statements: Option<NodeId>,
        scope: Option<ScopeId>,
    },
    If {
        condition: NodeId,
        then_branch: Option<NodeId>,
        else_branch: Option<NodeId>,
    },
    While {
        condition: NodeId,
        body: Option<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    Assign {
        target: NodeId,
        value: NodeId,
    },
    Binary {
        op: BinaryOperator,
        lhs: NodeId,
        rhs: NodeId,
    },
    /// `x` or `x[index]`.
    VarRef {
        name: InternedString,
        index: Option<NodeId>,
    },
    Const {
        value: i64,
    },
    Call {
        name: InternedString,
        args: Option<NodeId>,
    },
}

/// A syntax tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub line: LineNumber,
    /// Declared type for declarations, computed type for expressions.
    pub ty: Type,
    /// Next node of the enclosing list.
    pub sibling: Option<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind, line: LineNumber, ty: Type) -> Self {
        Self {
            kind,
            line,
            ty,
            sibling: None,
        }
    }

    /// The children in traversal order.
    pub fn children(&self) -> [Option<NodeId>; MAX_CHILDREN] {
        match self.kind {
            NodeKind::VarDecl { size, .. } => [size, None, None],
            NodeKind::FunDecl { params, body, .. } => [params, Some(body), None],
            NodeKind::Param { .. } => [None, None, None],
            NodeKind::Compound { locals, statements, .. } => [locals, statements, None],
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => [Some(condition), then_branch, else_branch],
            NodeKind::While { condition, body } => [Some(condition), body, None],
            NodeKind::Return { value } => [value, None, None],
            NodeKind::Assign { target, value } => [Some(target), Some(value), None],
            NodeKind::Binary { lhs, rhs, .. } => [Some(lhs), Some(rhs), None],
            NodeKind::VarRef { index, .. } => [index, None, None],
            NodeKind::Const { .. } => [None, None, None],
            NodeKind::Call { args, .. } => [args, None, None],
        }
    }

    /// The declared or referenced name, if this node category has one.
    pub fn name(&self) -> Option<InternedString> {
        match self.kind {
            NodeKind::VarDecl { name, .. }
            | NodeKind::FunDecl { name, .. }
            | NodeKind::VarRef { name, .. }
            | NodeKind::Call { name, .. } => Some(name),
            NodeKind::Param { name, .. } => name,
            _ => None,
        }
    }

    /// Whether this is the unnamed `void` parameter standing for an empty list.
    pub fn is_void_param(&self) -> bool {
        matches!(self.kind, NodeKind::Param { name: None, .. }) && self.ty == Type::Void
    }
}

/// The syntax tree of one compilation unit.
///
/// Owns every node and the interner that resolves node names.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    interner: StringInterner,
}

impl SyntaxTree {
    pub fn new(interner: StringInterner) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            interner,
        }
    }

    /// First top-level declaration.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Resolve an interned name to its text.
    pub fn name_text(&self, name: InternedString) -> &str {
        self.interner.resolve(name)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Thread `items` into a sibling chain and return its head.
    pub fn link(&mut self, items: &[NodeId]) -> Option<NodeId> {
        for pair in items.windows(2) {
            self.nodes[pair[0].index()].sibling = Some(pair[1]);
        }
        items.first().copied()
    }

    /// Iterate a sibling chain starting at `first`.
    pub fn siblings(&self, first: Option<NodeId>) -> Siblings<'_> {
        Siblings {
            tree: self,
            next: first,
        }
    }

    /// The scope the binder recorded on a compound statement.
    pub fn compound_scope(&self, id: NodeId) -> Option<ScopeId> {
        match self.node(id).kind {
            NodeKind::Compound { scope, .. } => scope,
            _ => None,
        }
    }

    pub fn set_compound_scope(&mut self, id: NodeId, new_scope: ScopeId) {
        if let NodeKind::Compound { ref mut scope, .. } = self.node_mut(id).kind {
            *scope = Some(new_scope);
        }
    }

    // ========================================================================
    // Node construction
    // ========================================================================

    pub fn var_decl(&mut self, line: LineNumber, ty: Type, name: &str, size: Option<i64>) -> NodeId {
        let name = self.interner.intern(name);
        let size = size.map(|value| self.constant(line, value));
        self.alloc(Node::new(NodeKind::VarDecl { name, size }, line, ty))
    }

    pub fn fun_decl(
        &mut self,
        line: LineNumber,
        return_type: Type,
        name: &str,
        params: &[NodeId],
        body: NodeId,
    ) -> NodeId {
        let name = self.interner.intern(name);
        let params = self.link(params);
        self.alloc(Node::new(NodeKind::FunDecl { name, params, body }, line, return_type))
    }

    pub fn param(&mut self, line: LineNumber, ty: Type, name: &str, is_array: bool) -> NodeId {
        let name = Some(self.interner.intern(name));
        self.alloc(Node::new(NodeKind::Param { name, is_array }, line, ty))
    }

    pub fn void_param(&mut self, line: LineNumber) -> NodeId {
        self.alloc(Node::new(
            NodeKind::Param {
                name: None,
                is_array: false,
            },
            line,
            Type::Void,
        ))
    }

    pub fn compound(&mut self, line: LineNumber, locals: &[NodeId], statements: &[NodeId]) -> NodeId {
        let locals = self.link(locals);
        let statements = self.link(statements);
        self.alloc(Node::new(
            NodeKind::Compound {
                locals,
                statements,
                scope: None,
            },
            line,
            Type::Undetermined,
        ))
    }

    pub fn if_stmt(
        &mut self,
        line: LineNumber,
        condition: NodeId,
        then_branch: Option<NodeId>,
        else_branch: Option<NodeId>,
    ) -> NodeId {
        self.alloc(Node::new(
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            },
            line,
            Type::Undetermined,
        ))
    }

    pub fn while_stmt(&mut self, line: LineNumber, condition: NodeId, body: Option<NodeId>) -> NodeId {
        self.alloc(Node::new(NodeKind::While { condition, body }, line, Type::Undetermined))
    }

    pub fn return_stmt(&mut self, line: LineNumber, value: Option<NodeId>) -> NodeId {
        self.alloc(Node::new(NodeKind::Return { value }, line, Type::Undetermined))
    }

    pub fn assign(&mut self, line: LineNumber, target: NodeId, value: NodeId) -> NodeId {
        self.alloc(Node::new(NodeKind::Assign { target, value }, line, Type::Undetermined))
    }

    pub fn binary(&mut self, line: LineNumber, op: BinaryOperator, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.alloc(Node::new(NodeKind::Binary { op, lhs, rhs }, line, Type::Undetermined))
    }

    pub fn var_ref(&mut self, line: LineNumber, name: &str, index: Option<NodeId>) -> NodeId {
        let name = self.interner.intern(name);
        self.alloc(Node::new(NodeKind::VarRef { name, index }, line, Type::Undetermined))
    }

    pub fn constant(&mut self, line: LineNumber, value: i64) -> NodeId {
        self.alloc(Node::new(NodeKind::Const { value }, line, Type::Undetermined))
    }

    pub fn call(&mut self, line: LineNumber, name: &str, args: &[NodeId]) -> NodeId {
        let name = self.interner.intern(name);
        let args = self.link(args);
        self.alloc(Node::new(NodeKind::Call { name, args }, line, Type::Undetermined))
    }
}

/// Iterator over a sibling chain.
pub struct Siblings<'t> {
    tree: &'t SyntaxTree,
    next: Option<NodeId>,
}

impl<'t> Iterator for Siblings<'t> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.node(current).sibling;
        Some(current)
    }
}
