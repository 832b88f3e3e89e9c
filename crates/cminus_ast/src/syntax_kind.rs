//! Token kinds produced by the scanner.

use std::fmt;

/// The kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Reserved words
    If,
    Else,
    While,
    Return,
    Int,
    Void,

    // Multi-character tokens
    Identifier,
    Number,

    // Special symbols
    Assign,
    EqualsEquals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    Plus,
    Minus,
    Times,
    Over,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Semicolon,
    Comma,

    EndOfFile,
    Error,
}

/// Reserved words, searched linearly by [`TokenKind::reserved_word`].
pub const RESERVED_WORDS: [(&str, TokenKind); 6] = [
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("return", TokenKind::Return),
    ("int", TokenKind::Int),
    ("void", TokenKind::Void),
];

impl TokenKind {
    /// Map an identifier lexeme to its keyword kind, if it is reserved.
    pub fn reserved_word(lexeme: &str) -> Option<TokenKind> {
        RESERVED_WORDS
            .iter()
            .find(|(word, _)| *word == lexeme)
            .map(|&(_, kind)| kind)
    }

    pub fn is_reserved_word(self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Return
                | TokenKind::Int
                | TokenKind::Void
        )
    }

    /// The fixed source text of a symbol token, `None` for tokens whose
    /// text is their lexeme.
    pub fn symbol_text(self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Assign => "=",
            TokenKind::EqualsEquals => "==",
            TokenKind::NotEquals => "!=",
            TokenKind::LessThan => "<",
            TokenKind::LessThanEquals => "<=",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterThanEquals => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Times => "*",
            TokenKind::Over => "/",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.symbol_text() {
            return write!(f, "{}", text);
        }
        match self {
            TokenKind::If => write!(f, "if"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::While => write!(f, "while"),
            TokenKind::Return => write!(f, "return"),
            TokenKind::Int => write!(f, "int"),
            TokenKind::Void => write!(f, "void"),
            TokenKind::Identifier => write!(f, "ID"),
            TokenKind::Number => write!(f, "NUM"),
            TokenKind::EndOfFile => write!(f, "EOF"),
            _ => write!(f, "ERROR"),
        }
    }
}
