//! Token information produced by the scanner.

use cminus_ast::syntax_kind::TokenKind;
use cminus_core::LineNumber;
use std::fmt;

/// Lexemes longer than this are truncated.
pub const MAX_TOKEN_LEN: usize = 40;

/// A scanned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The saved text of the token. Empty for the operators starting with
    /// `=`, `<`, `>` or `/` and for end of file, whose first character is
    /// never saved.
    pub lexeme: String,
    pub line: LineNumber,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, line: LineNumber) -> Self {
        Self { kind, lexeme, line }
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfFile
    }
}

/// The token listing format used by trace output.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            k if k.is_reserved_word() => write!(f, "reserved word: {}", self.lexeme),
            TokenKind::Number => write!(f, "NUM, val= {}", self.lexeme),
            TokenKind::Identifier => write!(f, "ID, name= {}", self.lexeme),
            TokenKind::EndOfFile => write!(f, "EOF"),
            TokenKind::Error => write!(f, "ERROR: {}", self.lexeme),
            k => write!(f, "{}", k),
        }
    }
}
