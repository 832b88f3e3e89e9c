//! Source location types.

/// A 1-based source line number. Line 0 is reserved for built-in
/// declarations that have no source position.
pub type LineNumber = u32;

/// The line assigned to compiler-provided declarations.
pub const BUILTIN_LINE: LineNumber = 0;
