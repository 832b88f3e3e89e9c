//! cminus_ast: Syntax tree definitions for the C-Minus front end.
//!
//! The tree is an index-based arena ([`SyntaxTree`]) of [`Node`]s. Each
//! node has at most [`MAX_CHILDREN`] children and a sibling link, so a
//! statement or declaration list is a right-threaded sibling chain. Both
//! analysis passes drive the same pre/post walker in [`visitor`].

pub mod node;
pub mod syntax_kind;
pub mod types;
pub mod visitor;

pub use node::*;
pub use syntax_kind::TokenKind;
pub use types::*;
pub use visitor::{walk, TreeVisitor};
