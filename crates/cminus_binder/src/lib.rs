//! cminus_binder: Scope table construction for C-Minus.
//!
//! The binder walks the syntax tree once, creating a scope per function and
//! per nested block, inserting a symbol for every declaration, and recording
//! on each compound statement the scope it opened. Uses of undeclared names
//! get placeholder symbols so the checker can still run.

mod binder;
mod scope;
mod symbol;

pub use binder::Binder;
pub use scope::{Scope, ScopeTable};
pub use symbol::{Builtin, Declaration, Resolution, ScopeError, Symbol, SymbolKind, SymbolOrigin};
