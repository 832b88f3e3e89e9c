//! cminus_core: Core utilities shared by every phase of the C-Minus front end.
//!
//! Provides identifier interning and the source line type used for
//! diagnostics and symbol reference lists.

pub mod intern;
pub mod text;

pub use intern::{InternedString, StringInterner};
pub use text::LineNumber;
