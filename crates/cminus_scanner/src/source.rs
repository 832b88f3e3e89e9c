//! Line-buffered source stream.

use cminus_core::LineNumber;
use std::io::{self, BufRead};

/// Reads the source one line at a time and hands out characters from the
/// current line, with a single character of pushback.
pub struct SourceReader<R> {
    reader: R,
    line_buf: Vec<char>,
    pos: usize,
    line: LineNumber,
    at_eof: bool,
    echo: Option<String>,
    error: Option<io::Error>,
}

impl<R: BufRead> SourceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_buf: Vec::new(),
            pos: 0,
            line: 0,
            at_eof: false,
            echo: None,
            error: None,
        }
    }

    /// Copy every line read into an echo listing (`"{:4}: {line}"`).
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo.then(String::new);
        self
    }

    /// The line of the most recently read character. Stays on the last
    /// line once the input is exhausted.
    #[inline]
    pub fn line(&self) -> LineNumber {
        self.line
    }

    /// Next character, reading a new line when the buffer is exhausted.
    /// `None` means end of input.
    pub fn next_char(&mut self) -> Option<char> {
        if self.pos >= self.line_buf.len() {
            if self.at_eof || !self.fill_line() {
                return None;
            }
        }
        let c = self.line_buf[self.pos];
        self.pos += 1;
        Some(c)
    }

    /// Push back the most recently read character. No effect at end of input.
    pub fn unread(&mut self) {
        if !self.at_eof && self.pos > 0 {
            self.pos -= 1;
        }
    }

    /// Take the echo listing collected so far.
    pub fn take_echo(&mut self) -> String {
        self.echo.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Take the first I/O error hit while reading, if any. Reading stops at
    /// the first error as if the input had ended.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn fill_line(&mut self) -> bool {
        let mut bytes = Vec::new();
        match self.reader.read_until(b'\n', &mut bytes) {
            Ok(0) => {
                self.at_eof = true;
                false
            }
            Ok(_) => {
                self.line += 1;
                let text = String::from_utf8_lossy(&bytes);
                if let Some(echo) = self.echo.as_mut() {
                    echo.push_str(&format!("{:4}: {}", self.line, text));
                    if !text.ends_with('\n') {
                        echo.push('\n');
                    }
                }
                self.line_buf = text.chars().collect();
                self.pos = 0;
                true
            }
            Err(e) => {
                log::debug!("source read failed after line {}: {}", self.line, e);
                self.error = Some(e);
                self.at_eof = true;
                false
            }
        }
    }
}
