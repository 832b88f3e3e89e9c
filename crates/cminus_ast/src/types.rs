//! Semantic types, operator tags and the lightweight handles used to refer
//! to nodes, scopes and symbols.

use crate::syntax_kind::TokenKind;
use std::fmt;

/// The semantic type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Type {
    /// Not yet computed, or not computable because of an earlier error.
    #[default]
    Undetermined,
    Int,
    Void,
    IntArray,
    /// Only ever produced for an erroneous `void x[..]` declaration.
    VoidArray,
}

impl Type {
    /// `int` / `void` as written in a declaration, before array coercion.
    pub fn from_specifier(kind: TokenKind) -> Option<Type> {
        match kind {
            TokenKind::Int => Some(Type::Int),
            TokenKind::Void => Some(Type::Void),
            _ => None,
        }
    }

    /// The type of an array declared with this element specifier.
    pub fn array_of(self) -> Type {
        match self {
            Type::Void | Type::VoidArray => Type::VoidArray,
            _ => Type::IntArray,
        }
    }

    #[inline]
    pub fn is_void(self) -> bool {
        matches!(self, Type::Void | Type::VoidArray)
    }

    #[inline]
    pub fn is_determined(self) -> bool {
        self != Type::Undetermined
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Undetermined => write!(f, "undetermined"),
            Type::Int => write!(f, "int"),
            Type::Void => write!(f, "void"),
            Type::IntArray => write!(f, "int[]"),
            Type::VoidArray => write!(f, "void[]"),
        }
    }
}

/// Binary operator tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Times,
    Over,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    EqualsEquals,
    NotEquals,
}

impl BinaryOperator {
    pub fn from_token(kind: TokenKind) -> Option<BinaryOperator> {
        let op = match kind {
            TokenKind::Plus => BinaryOperator::Plus,
            TokenKind::Minus => BinaryOperator::Minus,
            TokenKind::Times => BinaryOperator::Times,
            TokenKind::Over => BinaryOperator::Over,
            TokenKind::LessThan => BinaryOperator::LessThan,
            TokenKind::LessThanEquals => BinaryOperator::LessThanEquals,
            TokenKind::GreaterThan => BinaryOperator::GreaterThan,
            TokenKind::GreaterThanEquals => BinaryOperator::GreaterThanEquals,
            TokenKind::EqualsEquals => BinaryOperator::EqualsEquals,
            TokenKind::NotEquals => BinaryOperator::NotEquals,
            _ => return None,
        };
        Some(op)
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOperator::LessThan
                | BinaryOperator::LessThanEquals
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanEquals
                | BinaryOperator::EqualsEquals
                | BinaryOperator::NotEquals
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Times => "*",
            BinaryOperator::Over => "/",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanEquals => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanEquals => ">=",
            BinaryOperator::EqualsEquals => "==",
            BinaryOperator::NotEquals => "!=",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node ID for referencing tree nodes by index.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a scope in the scope registry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a symbol in the symbol arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SymbolId(pub u32);

impl SymbolId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}
