//! cminus_scanner: Lexer for C-Minus source code.
//!
//! A finite-automaton scanner over a line-buffered source stream:
//! - reserved words and identifiers (letters only, then letters/digits)
//! - unsigned integer literals
//! - `= == != < <= > >=` with one character of lookahead
//! - `/* ... */` comments, skipped without producing a token
//! - error tokens for unrecognized characters and a lone `!`

mod scanner;
mod source;
mod token;

pub use scanner::Scanner;
pub use source::SourceReader;
pub use token::{Token, MAX_TOKEN_LEN};
