//! cminus_parser: Recursive descent parser for C-Minus.
//!
//! Pulls tokens from the scanner and builds the arena syntax tree. Syntax
//! errors become diagnostics; the parser resynchronizes at the next `;` or
//! `}` and keeps going, so one compilation reports every problem it can.

mod parser;

pub use parser::{ParseOutput, Parser};
