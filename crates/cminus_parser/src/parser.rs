//! The C-Minus parser implementation.
//!
//! One method per grammar rule. Every method returns a [`ParseResult`]; an
//! `Err` means the error has already been reported and the caller should
//! resynchronize. Declarations take the line of their name, statements the
//! line of their first token, and assignments and binary operations the line
//! of the operator.

use cminus_ast::{BinaryOperator, NodeId, NodeKind, SyntaxTree, TokenKind, Type};
use cminus_core::StringInterner;
use cminus_diagnostics::{messages, Diagnostic, DiagnosticCategory, DiagnosticCollection, DiagnosticMessage};
use cminus_scanner::{Scanner, Token};
use std::io::{self, BufRead};

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
const MAX_RECURSION_DEPTH: u32 = 200;

/// A syntax error that has already been reported.
#[derive(Debug)]
struct SyntaxError;

type ParseResult<T> = Result<T, SyntaxError>;

/// Everything produced while parsing one compilation unit.
#[derive(Debug)]
pub struct ParseOutput {
    pub tree: SyntaxTree,
    /// Lexical and syntax diagnostics in source order.
    pub diagnostics: DiagnosticCollection,
    /// Source echo and token trace, when enabled on the scanner.
    pub listing: String,
    /// The I/O error that cut the source short, if any.
    pub io_error: Option<io::Error>,
}

/// The parser produces a [`SyntaxTree`] from C-Minus source.
pub struct Parser<R> {
    scanner: Scanner<R>,
    token: Token,
    tree: SyntaxTree,
    diagnostics: DiagnosticCollection,
    recursion_depth: u32,
}

impl<'a> Parser<&'a [u8]> {
    pub fn from_source(text: &'a str, interner: StringInterner) -> Self {
        Parser::new(Scanner::from_source(text), interner)
    }
}

impl<R: BufRead> Parser<R> {
    pub fn new(scanner: Scanner<R>, interner: StringInterner) -> Self {
        let mut parser = Self {
            scanner,
            token: Token::new(TokenKind::EndOfFile, String::new(), 0),
            tree: SyntaxTree::new(interner),
            diagnostics: DiagnosticCollection::new(),
            recursion_depth: 0,
        };
        parser.next_token();
        parser
    }

    /// Parse a whole program: one or more declarations.
    pub fn parse_program(mut self) -> ParseOutput {
        let mut declarations = Vec::new();
        if self.at(TokenKind::EndOfFile) {
            let _ = self.unexpected();
        }
        while !self.at(TokenKind::EndOfFile) {
            match self.parse_declaration() {
                Ok(declaration) => declarations.push(declaration),
                Err(SyntaxError) => self.synchronize(true),
            }
        }
        let root = self.tree.link(&declarations);
        self.tree.set_root(root);
        log::debug!(
            "parsed {} declarations ({} nodes, {} diagnostics)",
            declarations.len(),
            self.tree.len(),
            self.diagnostics.len()
        );

        ParseOutput {
            listing: self.scanner.take_listing(),
            io_error: self.scanner.take_io_error(),
            tree: self.tree,
            diagnostics: self.diagnostics,
        }
    }

    // ========================================================================
    // Token management
    // ========================================================================

    /// Advance to the next token the grammar can see. Error tokens were
    /// already reported by the scanner and are skipped.
    fn next_token(&mut self) {
        loop {
            let token = self.scanner.scan();
            self.diagnostics.extend(self.scanner.take_diagnostics());
            if token.kind != TokenKind::Error {
                self.token = token;
                return;
            }
        }
    }

    /// Consume the current token and return it.
    fn advance(&mut self) -> Token {
        let previous = self.token.clone();
        self.next_token();
        previous
    }

    #[inline]
    fn at(&self, kind: TokenKind) -> bool {
        self.token.kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    fn error(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.add(Diagnostic::new(
            DiagnosticCategory::Syntax,
            self.token.line,
            message,
            args,
        ));
    }

    fn unexpected(&mut self) -> SyntaxError {
        let line = self.token.line.to_string();
        let token = self.token.to_string();
        self.error(&messages::SYNTAX_ERROR_UNEXPECTED_TOKEN, &[&line, &token]);
        SyntaxError
    }

    /// Skip past the broken construct: up to and including a `;` at the
    /// current nesting level, or up to the `}` closing the enclosing block.
    /// At the top level a balanced `{ ... }` is skipped as a whole.
    fn synchronize(&mut self, top_level: bool) {
        let mut depth = 0u32;
        loop {
            match self.token.kind {
                TokenKind::EndOfFile => return,
                TokenKind::Semicolon if depth == 0 => {
                    self.next_token();
                    return;
                }
                TokenKind::OpenBrace => depth += 1,
                TokenKind::CloseBrace if depth == 0 => {
                    if top_level {
                        self.next_token();
                    }
                    return;
                }
                TokenKind::CloseBrace => {
                    depth -= 1;
                    if depth == 0 && top_level {
                        self.next_token();
                        return;
                    }
                }
                _ => {}
            }
            self.next_token();
        }
    }

    fn enter_nested(&mut self) -> ParseResult<()> {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            let line = self.token.line.to_string();
            self.error(&messages::NESTING_TOO_DEEP, &[&line]);
            return Err(SyntaxError);
        }
        self.recursion_depth += 1;
        Ok(())
    }

    /// The value of a numeric literal. C-Minus `int` is 32 bits wide.
    fn number_value(&mut self, token: &Token) -> i64 {
        match token.lexeme.parse::<i32>() {
            Ok(value) => i64::from(value),
            Err(_) => {
                let line = token.line.to_string();
                self.error(&messages::NUMERIC_LITERAL_OUT_OF_RANGE, &[&token.lexeme, &line]);
                0
            }
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_declaration(&mut self) -> ParseResult<NodeId> {
        let ty = self.parse_type_specifier()?;
        let name = self.expect(TokenKind::Identifier)?;
        if self.at(TokenKind::OpenParen) {
            self.parse_function_rest(ty, name)
        } else {
            self.parse_variable_rest(ty, name)
        }
    }

    fn parse_type_specifier(&mut self) -> ParseResult<Type> {
        match Type::from_specifier(self.token.kind) {
            Some(ty) => {
                self.next_token();
                Ok(ty)
            }
            None => Err(self.unexpected()),
        }
    }

    fn parse_variable_declaration(&mut self) -> ParseResult<NodeId> {
        let ty = self.parse_type_specifier()?;
        let name = self.expect(TokenKind::Identifier)?;
        self.parse_variable_rest(ty, name)
    }

    fn parse_variable_rest(&mut self, ty: Type, name: Token) -> ParseResult<NodeId> {
        let size = if self.eat(TokenKind::OpenBracket) {
            let size = self.expect(TokenKind::Number)?;
            self.expect(TokenKind::CloseBracket)?;
            Some(self.number_value(&size))
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(self.tree.var_decl(name.line, ty, &name.lexeme, size))
    }

    fn parse_function_rest(&mut self, return_type: Type, name: Token) -> ParseResult<NodeId> {
        self.expect(TokenKind::OpenParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::CloseParen)?;
        let body = self.parse_compound()?;
        Ok(self.tree.fun_decl(name.line, return_type, &name.lexeme, &params, body))
    }

    /// `void`, an empty list, or a comma-separated parameter list. The first
    /// two both produce the single unnamed void parameter.
    fn parse_params(&mut self) -> ParseResult<Vec<NodeId>> {
        let line = self.token.line;
        if self.at(TokenKind::CloseParen) {
            return Ok(vec![self.tree.void_param(line)]);
        }
        let first_type = self.parse_type_specifier()?;
        if first_type == Type::Void && self.at(TokenKind::CloseParen) {
            return Ok(vec![self.tree.void_param(line)]);
        }
        let mut params = vec![self.parse_param_rest(first_type)?];
        while self.eat(TokenKind::Comma) {
            let ty = self.parse_type_specifier()?;
            params.push(self.parse_param_rest(ty)?);
        }
        Ok(params)
    }

    fn parse_param_rest(&mut self, ty: Type) -> ParseResult<NodeId> {
        let name = self.expect(TokenKind::Identifier)?;
        let is_array = self.eat(TokenKind::OpenBracket);
        if is_array {
            self.expect(TokenKind::CloseBracket)?;
        }
        Ok(self.tree.param(name.line, ty, &name.lexeme, is_array))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_compound(&mut self) -> ParseResult<NodeId> {
        let open = self.expect(TokenKind::OpenBrace)?;

        let mut locals = Vec::new();
        while matches!(self.token.kind, TokenKind::Int | TokenKind::Void) {
            match self.parse_variable_declaration() {
                Ok(local) => locals.push(local),
                Err(SyntaxError) => self.synchronize(false),
            }
        }

        let mut statements = Vec::new();
        while !matches!(self.token.kind, TokenKind::CloseBrace | TokenKind::EndOfFile) {
            match self.parse_statement() {
                Ok(Some(statement)) => statements.push(statement),
                Ok(None) => {}
                Err(SyntaxError) => self.synchronize(false),
            }
        }

        self.expect(TokenKind::CloseBrace)?;
        Ok(self.tree.compound(open.line, &locals, &statements))
    }

    /// A statement, or `None` for the empty statement `;`.
    fn parse_statement(&mut self) -> ParseResult<Option<NodeId>> {
        self.enter_nested()?;
        let result = self.parse_statement_worker();
        self.recursion_depth -= 1;
        result
    }

    fn parse_statement_worker(&mut self) -> ParseResult<Option<NodeId>> {
        match self.token.kind {
            TokenKind::OpenBrace => self.parse_compound().map(Some),
            TokenKind::If => self.parse_if().map(Some),
            TokenKind::While => self.parse_while().map(Some),
            TokenKind::Return => self.parse_return().map(Some),
            TokenKind::Semicolon => {
                self.next_token();
                Ok(None)
            }
            _ => {
                let expression = self.parse_expression()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Some(expression))
            }
        }
    }

    fn parse_if(&mut self) -> ParseResult<NodeId> {
        let keyword = self.advance();
        self.expect(TokenKind::OpenParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::CloseParen)?;
        let then_branch = self.parse_statement()?;
        let else_branch = if self.eat(TokenKind::Else) {
            self.parse_statement()?
        } else {
            None
        };
        Ok(self.tree.if_stmt(keyword.line, condition, then_branch, else_branch))
    }

    fn parse_while(&mut self) -> ParseResult<NodeId> {
        let keyword = self.advance();
        self.expect(TokenKind::OpenParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::CloseParen)?;
        let body = self.parse_statement()?;
        Ok(self.tree.while_stmt(keyword.line, condition, body))
    }

    fn parse_return(&mut self) -> ParseResult<NodeId> {
        let keyword = self.advance();
        let value = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(self.tree.return_stmt(keyword.line, value))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression(&mut self) -> ParseResult<NodeId> {
        self.enter_nested()?;
        let result = self.parse_expression_worker();
        self.recursion_depth -= 1;
        result
    }

    /// `var = expression` or a simple expression. The target is parsed as
    /// an ordinary operand and must turn out to be a variable.
    fn parse_expression_worker(&mut self) -> ParseResult<NodeId> {
        let target = self.parse_simple_expression()?;
        if !self.at(TokenKind::Assign) {
            return Ok(target);
        }
        if !matches!(self.tree.node(target).kind, NodeKind::VarRef { .. }) {
            return Err(self.unexpected());
        }
        let operator = self.advance();
        let value = self.parse_expression()?;
        Ok(self.tree.assign(operator.line, target, value))
    }

    /// An additive expression, optionally compared with a second one.
    /// Relational operators do not chain.
    fn parse_simple_expression(&mut self) -> ParseResult<NodeId> {
        let lhs = self.parse_additive_expression()?;
        match BinaryOperator::from_token(self.token.kind) {
            Some(op) if op.is_relational() => {
                let line = self.advance().line;
                let rhs = self.parse_additive_expression()?;
                Ok(self.tree.binary(line, op, lhs, rhs))
            }
            _ => Ok(lhs),
        }
    }

    fn parse_additive_expression(&mut self) -> ParseResult<NodeId> {
        self.parse_left_associative(&[BinaryOperator::Plus, BinaryOperator::Minus], Self::parse_term)
    }

    fn parse_term(&mut self) -> ParseResult<NodeId> {
        self.parse_left_associative(&[BinaryOperator::Times, BinaryOperator::Over], Self::parse_factor)
    }

    fn parse_left_associative(
        &mut self,
        operators: &[BinaryOperator],
        operand: fn(&mut Self) -> ParseResult<NodeId>,
    ) -> ParseResult<NodeId> {
        let mut lhs = operand(self)?;
        while let Some(op) = BinaryOperator::from_token(self.token.kind).filter(|op| operators.contains(op)) {
            let line = self.advance().line;
            let rhs = operand(self)?;
            lhs = self.tree.binary(line, op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> ParseResult<NodeId> {
        match self.token.kind {
            TokenKind::OpenParen => {
                self.next_token();
                let expression = self.parse_expression()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(expression)
            }
            TokenKind::Number => {
                let token = self.advance();
                let value = self.number_value(&token);
                Ok(self.tree.constant(token.line, value))
            }
            TokenKind::Identifier => {
                let name = self.advance();
                match self.token.kind {
                    TokenKind::OpenParen => self.parse_call_rest(name),
                    TokenKind::OpenBracket => {
                        self.next_token();
                        let index = self.parse_expression()?;
                        self.expect(TokenKind::CloseBracket)?;
                        Ok(self.tree.var_ref(name.line, &name.lexeme, Some(index)))
                    }
                    _ => Ok(self.tree.var_ref(name.line, &name.lexeme, None)),
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_call_rest(&mut self, name: Token) -> ParseResult<NodeId> {
        self.expect(TokenKind::OpenParen)?;
        let mut args = Vec::new();
        if !self.at(TokenKind::CloseParen) {
            args.push(self.parse_expression()?);
            while self.eat(TokenKind::Comma) {
                args.push(self.parse_expression()?);
            }
        }
        self.expect(TokenKind::CloseParen)?;
        Ok(self.tree.call(name.line, &name.lexeme, &args))
    }
}
