//! The C-Minus scanner.
//!
//! An explicit-state DFA. Every call to [`Scanner::scan`] starts in
//! `Start`, consumes characters until it reaches `Done`, and returns one
//! token. A character read only to decide where a token ends is pushed
//! back to the source reader.

use crate::source::SourceReader;
use crate::token::{Token, MAX_TOKEN_LEN};
use cminus_ast::syntax_kind::TokenKind;
use cminus_diagnostics::{messages, Diagnostic, DiagnosticCategory, DiagnosticCollection};
use std::io::{self, BufRead};

/// States of the scanner DFA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    InNum,
    InId,
    /// Seen `=`.
    InEq,
    /// Seen `<`.
    InLt,
    /// Seen `>`.
    InGt,
    /// Seen `!`.
    InNe,
    /// Seen `/`: division or the start of a comment.
    InOver,
    /// Inside `/* ...`.
    InComment,
    /// Inside a comment, just after a `*`.
    InCommentStar,
    Done,
}

/// Single-character punctuation recognized directly from `Start`.
fn single_char_token(c: char) -> Option<TokenKind> {
    let kind = match c {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Times,
        '(' => TokenKind::OpenParen,
        ')' => TokenKind::CloseParen,
        '[' => TokenKind::OpenBracket,
        ']' => TokenKind::CloseBracket,
        '{' => TokenKind::OpenBrace,
        '}' => TokenKind::CloseBrace,
        ';' => TokenKind::Semicolon,
        ',' => TokenKind::Comma,
        _ => return None,
    };
    Some(kind)
}

#[inline]
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// The scanner converts C-Minus source text into tokens.
pub struct Scanner<R> {
    source: SourceReader<R>,
    /// Echoed source lines interleaved with token lines (`"\t{line}: {token}"`).
    listing: String,
    trace: bool,
    diagnostics: DiagnosticCollection,
}

impl<'a> Scanner<&'a [u8]> {
    /// Scan an in-memory source text.
    pub fn from_source(text: &'a str) -> Self {
        Scanner::new(text.as_bytes())
    }
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            source: SourceReader::new(reader),
            listing: String::new(),
            trace: false,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Echo each source line into the listing as it is read.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.source = self.source.with_echo(echo);
        self
    }

    /// Record every scanned token in the listing.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// The current source line.
    pub fn line(&self) -> u32 {
        self.source.line()
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Take the echo and token listing produced so far.
    pub fn take_listing(&mut self) -> String {
        self.listing.push_str(&self.source.take_echo());
        std::mem::take(&mut self.listing)
    }

    /// Take the I/O error that ended the input early, if any.
    pub fn take_io_error(&mut self) -> Option<io::Error> {
        self.source.take_error()
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    /// Scan the next token. Returns an end-of-file token forever once the
    /// input is exhausted.
    pub fn scan(&mut self) -> Token {
        let mut lexeme = String::new();
        let mut saved = 0usize;
        let mut state = State::Start;
        let mut kind = TokenKind::Error;

        while state != State::Done {
            let c = self.source.next_char();
            let mut save = true;

            match state {
                State::Start => match c {
                    Some(ch) if ch.is_ascii_digit() => state = State::InNum,
                    Some(ch) if ch.is_ascii_alphabetic() => state = State::InId,
                    Some(ch) if is_whitespace(ch) => save = false,
                    Some('=') => {
                        save = false;
                        state = State::InEq;
                    }
                    Some('<') => {
                        save = false;
                        state = State::InLt;
                    }
                    Some('>') => {
                        save = false;
                        state = State::InGt;
                    }
                    // Saved, so a lone `!` shows up in the error token.
                    Some('!') => state = State::InNe,
                    Some('/') => {
                        save = false;
                        state = State::InOver;
                    }
                    None => {
                        save = false;
                        state = State::Done;
                        kind = TokenKind::EndOfFile;
                    }
                    Some(ch) => {
                        state = State::Done;
                        kind = single_char_token(ch).unwrap_or(TokenKind::Error);
                    }
                },

                State::InEq => {
                    save = false;
                    state = State::Done;
                    kind = self.fork(c, TokenKind::EqualsEquals, TokenKind::Assign);
                }

                State::InLt => {
                    save = false;
                    state = State::Done;
                    kind = self.fork(c, TokenKind::LessThanEquals, TokenKind::LessThan);
                }

                State::InGt => {
                    save = false;
                    state = State::Done;
                    kind = self.fork(c, TokenKind::GreaterThanEquals, TokenKind::GreaterThan);
                }

                State::InNe => {
                    save = false;
                    state = State::Done;
                    kind = self.fork(c, TokenKind::NotEquals, TokenKind::Error);
                }

                State::InOver => {
                    save = false;
                    match c {
                        Some('*') => state = State::InComment,
                        None => {
                            state = State::Done;
                            kind = TokenKind::EndOfFile;
                        }
                        Some(_) => {
                            self.source.unread();
                            state = State::Done;
                            kind = TokenKind::Over;
                        }
                    }
                }

                State::InComment => {
                    save = false;
                    match c {
                        Some('*') => state = State::InCommentStar,
                        None => {
                            state = State::Done;
                            kind = TokenKind::EndOfFile;
                        }
                        Some(_) => {}
                    }
                }

                State::InCommentStar => {
                    save = false;
                    match c {
                        Some('/') => state = State::Start,
                        Some('*') => {}
                        None => {
                            state = State::Done;
                            kind = TokenKind::EndOfFile;
                        }
                        Some(_) => state = State::InComment,
                    }
                }

                State::InNum => {
                    if !c.is_some_and(|ch| ch.is_ascii_digit()) {
                        self.source.unread();
                        save = false;
                        state = State::Done;
                        kind = TokenKind::Number;
                    }
                }

                State::InId => {
                    if !c.is_some_and(|ch| ch.is_ascii_alphanumeric()) {
                        self.source.unread();
                        save = false;
                        state = State::Done;
                        kind = TokenKind::Identifier;
                    }
                }

                State::Done => unreachable!("scanner loop exits on Done"),
            }

            if save && saved < MAX_TOKEN_LEN {
                if let Some(ch) = c {
                    lexeme.push(ch);
                    saved += 1;
                }
            }
        }

        if kind == TokenKind::Identifier {
            kind = TokenKind::reserved_word(&lexeme).unwrap_or(TokenKind::Identifier);
        }

        let token = Token::new(kind, lexeme, self.source.line());
        self.record(&token);
        token
    }

    /// Resolve a two-character operator: consume `=` for `long`, otherwise
    /// push the lookahead back and yield `short`.
    fn fork(&mut self, c: Option<char>, long: TokenKind, short: TokenKind) -> TokenKind {
        if c == Some('=') {
            long
        } else {
            self.source.unread();
            short
        }
    }

    fn record(&mut self, token: &Token) {
        log::trace!("{}: {}", token.line, token);
        self.listing.push_str(&self.source.take_echo());
        if self.trace {
            self.listing.push_str(&format!("\t{}: {}\n", token.line, token));
        }
        if token.kind == TokenKind::Error {
            let line = token.line.to_string();
            self.diagnostics.add(Diagnostic::new(
                DiagnosticCategory::Lexical,
                token.line,
                &messages::INVALID_TOKEN,
                &[&token.lexeme, &line],
            ));
        }
    }
}
