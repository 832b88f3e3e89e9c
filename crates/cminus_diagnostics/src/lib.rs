//! cminus_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Every problem the front end finds in a program (lexical, syntactic,
//! binding or typing) is a [`Diagnostic`] accumulated in a
//! [`DiagnosticCollection`]; none of them stop the pipeline. Rendering is
//! one line per diagnostic in a stable format suitable for golden files.

use cminus_core::LineNumber;
use std::fmt;

/// The phase that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Lexical,
    Syntax,
    Binding,
    Type,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Lexical => write!(f, "lexical"),
            DiagnosticCategory::Syntax => write!(f, "syntax"),
            DiagnosticCategory::Binding => write!(f, "binding"),
            DiagnosticCategory::Type => write!(f, "type"),
        }
    }
}

/// A diagnostic message template with a code.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code (1xxx lexical/syntax, 2xxx binding, 3xxx type).
    pub code: u32,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with its source line and resolved message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub line: LineNumber,
    pub message_text: String,
}

impl Diagnostic {
    pub fn new(
        category: DiagnosticCategory,
        line: LineNumber,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            category,
            code: message.code,
            line,
            message_text: format_message(message.message, args),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message_text)
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Diagnostics accumulated while compiling one unit, in emission order.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// The shared "compilation failed" flag: every diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn count_of(&self, category: DiagnosticCategory) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.category == category)
            .count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// Render every diagnostic, one per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for d in &self.diagnostics {
            out.push_str(&d.to_string());
            out.push('\n');
        }
        out
    }
}

impl<'a> IntoIterator for &'a DiagnosticCollection {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, $msg:expr) => {
            DiagnosticMessage { code: $code, message: $msg }
        };
    }

    // ========================================================================
    // Scanner and parser errors (1000-1199)
    // ========================================================================
    pub const INVALID_TOKEN: DiagnosticMessage = diag!(1001, "invalid token \"{0}\" at line {1}");
    pub const SYNTAX_ERROR_UNEXPECTED_TOKEN: DiagnosticMessage = diag!(1101, "syntax error at line {0}: unexpected token {1}");
    pub const NUMERIC_LITERAL_OUT_OF_RANGE: DiagnosticMessage = diag!(1102, "numeric literal \"{0}\" is out of range at line {1}");
    pub const NESTING_TOO_DEEP: DiagnosticMessage = diag!(1103, "nesting is too deep at line {0}");

    // ========================================================================
    // Binding errors (2000-2099)
    // ========================================================================
    pub const UNDECLARED_FUNCTION: DiagnosticMessage = diag!(2001, "undeclared function \"{0}\" is called at line {1}");
    pub const UNDECLARED_VARIABLE: DiagnosticMessage = diag!(2002, "undeclared variable \"{0}\" is used at line {1}");
    pub const VOID_TYPE_VARIABLE: DiagnosticMessage = diag!(2003, "The void-type variable is declared at line {1} (name : \"{0}\")");
    pub const SYMBOL_REDEFINED: DiagnosticMessage = diag!(2004, "Symbol \"{0}\" is redefined at line {1} (already defined at line {2})");

    // ========================================================================
    // Type errors (3000-3099)
    // ========================================================================
    pub const INVALID_ARRAY_INDEX_TYPE: DiagnosticMessage = diag!(3001, "Invalid array indexing at line {1} (name : \"{0}\"). indicies should be integer");
    pub const INVALID_ARRAY_INDEX_TARGET: DiagnosticMessage = diag!(3002, "Invalid array indexing at line {1} (name : \"{0}\"). indexing can only allowed for int[] variables");
    pub const INVALID_FUNCTION_CALL: DiagnosticMessage = diag!(3003, "Invalid function call at line {1} (name : \"{0}\")");
    pub const INVALID_RETURN: DiagnosticMessage = diag!(3004, "Invalid return at line {0}");
    pub const INVALID_ASSIGNMENT: DiagnosticMessage = diag!(3005, "invalid assignment at line {0}");
    pub const INVALID_OPERATION: DiagnosticMessage = diag!(3006, "invalid operation at line {0}");
    pub const INVALID_CONDITION: DiagnosticMessage = diag!(3007, "invalid condition at line {0}");
}
