//! cminus_checker: Type checking for C-Minus.
//!
//! The checker runs after the binder. It re-enters the scopes the binder
//! recorded on each compound statement and computes node types bottom-up,
//! reporting every type error without stopping.

mod checker;
mod types;

pub use checker::{analyze, Analysis, Checker};
pub use types::Signature;
