//! Symbol definitions.

use cminus_ast::types::{NodeId, ScopeId, SymbolId, Type};
use cminus_core::intern::InternedString;
use cminus_core::LineNumber;
use std::fmt;
use thiserror::Error;

/// What a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Function,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Variable => write!(f, "Variable"),
            SymbolKind::Function => write!(f, "Function"),
        }
    }
}

/// Declarations the compiler provides without source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `int input(void)`
    Input,
    /// `void output(int value)`
    Output,
    /// The `value` parameter of `output`.
    OutputValue,
}

impl Builtin {
    pub fn kind(self) -> SymbolKind {
        match self {
            Builtin::Input | Builtin::Output => SymbolKind::Function,
            Builtin::OutputValue => SymbolKind::Variable,
        }
    }

    /// Declared type; the return type for functions.
    pub fn ty(self) -> Type {
        match self {
            Builtin::Input | Builtin::OutputValue => Type::Int,
            Builtin::Output => Type::Void,
        }
    }

    /// Parameter types. Empty means `(void)`.
    pub fn parameters(self) -> &'static [Type] {
        match self {
            Builtin::Output => &[Type::Int],
            Builtin::Input | Builtin::OutputValue => &[],
        }
    }
}

/// Where a symbol came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolOrigin {
    /// A declaration node in the tree.
    Declared(NodeId),
    Builtin(Builtin),
    /// Synthesized for a use of an undeclared name.
    Placeholder,
}

/// Everything about a symbol except its placement in a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    pub kind: SymbolKind,
    pub ty: Type,
    pub origin: SymbolOrigin,
}

impl Declaration {
    pub fn declared(node: NodeId, kind: SymbolKind, ty: Type) -> Self {
        Self {
            kind,
            ty,
            origin: SymbolOrigin::Declared(node),
        }
    }

    pub fn builtin(builtin: Builtin) -> Self {
        Self {
            kind: builtin.kind(),
            ty: builtin.ty(),
            origin: SymbolOrigin::Builtin(builtin),
        }
    }

    /// A stand-in for an undeclared name, typed undetermined.
    pub fn placeholder(kind: SymbolKind) -> Self {
        Self {
            kind,
            ty: Type::Undetermined,
            origin: SymbolOrigin::Placeholder,
        }
    }
}

/// One identifier bound in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: InternedString,
    pub kind: SymbolKind,
    /// Declared type after array coercion; the return type for functions.
    pub ty: Type,
    pub origin: SymbolOrigin,
    pub scope: ScopeId,
    /// Memory slot, unique within the owning scope.
    pub slot: u32,
    /// Every line the name was declared or referenced at; the first entry
    /// is the declaration (or first use, for placeholders).
    pub lines: Vec<LineNumber>,
}

impl Symbol {
    pub fn is_placeholder(&self) -> bool {
        self.origin == SymbolOrigin::Placeholder
    }

    pub fn is_function(&self) -> bool {
        self.kind == SymbolKind::Function
    }
}

/// Result of resolving a name through the scope chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(SymbolId),
    /// The nearest match is a placeholder for an undeclared name.
    Undeclared(SymbolId),
}

impl Resolution {
    pub fn symbol(self) -> SymbolId {
        match self {
            Resolution::Resolved(id) | Resolution::Undeclared(id) => id,
        }
    }
}

/// Misuse of the scope stack. These indicate a bug in a pass, not a
/// problem in the program being compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("no scope is open")]
    EmptyStack,

    #[error("scope {0:?} is not in the registry")]
    UnknownScope(ScopeId),

    #[error("compound statement {0:?} has no recorded scope")]
    UnboundBlock(NodeId),
}
