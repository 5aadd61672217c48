use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::ast::{
    BlockStatement, CallExpression, Expression, FunctionLiteral, IdentifierLiteral,
    IfExpression, InfixExpression, PrefixExpression, Program, Statement,
};
use crate::lexer::TokenSource;
use crate::span::{Span, WithSpan};
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {} instead {}", .got.kind(), .span.at_str())]
    Expected {
        expected: TokenKind,
        got: Token,
        span: Span,
    },
    #[error("no prefix parse function for {kind} found {}", .span.at_str())]
    NoPrefixParseFn { kind: TokenKind, span: Span },
}

type ParseResult<T> = Result<T, ParseError>;

type PrefixParseFn<S> = fn(&mut Parser<S>) -> ParseResult<Expression>;
type InfixParseFn<S> = fn(&mut Parser<S>, Expression) -> ParseResult<Expression>;

/// Binding power of operators, from loosest to tightest.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Precedence {
    Lowest,
    Equals,      // ==
    LessGreater, // > or <
    Sum,         // +
    Product,     // *
    Prefix,      // -X or !X
    Call,        // myFunction(X)
}

impl Precedence {
    pub fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::EqualEqual | TokenKind::BangEqual => Precedence::Equals,
            TokenKind::LessThan
            | TokenKind::GreaterThan
            | TokenKind::LessEqual
            | TokenKind::GreaterEqual => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Star | TokenKind::Slash => Precedence::Product,
            TokenKind::LeftParen => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

pub struct Parser<S: TokenSource> {
    source: S,

    current_token: WithSpan<Token>,
    peek_token: WithSpan<Token>,

    errors: Vec<ParseError>,
    /// Blocks entered but not yet closed by the statement being parsed
    open_blocks: usize,

    prefix_fns: HashMap<TokenKind, PrefixParseFn<S>>,
    infix_fns: HashMap<TokenKind, InfixParseFn<S>>,
}

impl<S: TokenSource> Parser<S> {
    pub fn new(mut source: S) -> Parser<S> {
        let cur = source.next_token();
        let next = source.next_token();

        let mut parser = Parser {
            source,
            current_token: cur,
            peek_token: next,
            errors: Vec::new(),
            open_blocks: 0,
            prefix_fns: HashMap::new(),
            infix_fns: HashMap::new(),
        };

        parser.register_prefix(TokenKind::Identifier, Self::parse_identifier);
        parser.register_prefix(TokenKind::Integer, Self::parse_integer_literal);
        parser.register_prefix(TokenKind::True, Self::parse_boolean);
        parser.register_prefix(TokenKind::False, Self::parse_boolean);
        parser.register_prefix(TokenKind::Bang, Self::parse_prefix_expression);
        parser.register_prefix(TokenKind::Minus, Self::parse_prefix_expression);
        parser.register_prefix(TokenKind::LeftParen, Self::parse_grouped_expression);
        parser.register_prefix(TokenKind::If, Self::parse_if_expression);
        parser.register_prefix(TokenKind::Fn, Self::parse_function_literal);

        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::EqualEqual,
            TokenKind::BangEqual,
            TokenKind::LessThan,
            TokenKind::GreaterThan,
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
        ] {
            parser.register_infix(kind, Self::parse_infix_expression);
        }
        parser.register_infix(TokenKind::LeftParen, Self::parse_call_expression);

        parser
    }

    fn register_prefix(&mut self, kind: TokenKind, func: PrefixParseFn<S>) {
        self.prefix_fns.insert(kind, func);
    }

    fn register_infix(&mut self, kind: TokenKind, func: InfixParseFn<S>) {
        self.infix_fns.insert(kind, func);
    }

    /// Errors collected by the last call to `parse_program`. A program should
    /// only be evaluated if this is empty.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();

        while !self.current_token_is(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(statement) => {
                    trace!(%statement, "parsed statement");
                    program.statements.push(statement);
                }
                Err(error) => {
                    debug!(%error, "parse error, resynchronizing");
                    self.errors.push(error);
                    self.synchronize();
                }
            }
            self.next_token();
        }

        program
    }

    /// Skip tokens until the end of the broken statement: a `;` or the token
    /// before a statement keyword, once every block the error happened in has
    /// been closed. Stops at the end of input regardless.
    fn synchronize(&mut self) {
        let mut depth = std::mem::take(&mut self.open_blocks);

        loop {
            match self.current_token.value.kind() {
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => depth = depth.saturating_sub(1),
                TokenKind::Eof => break,
                _ => {}
            }

            if depth == 0
                && (self.current_token_is(TokenKind::Semicolon)
                    || self.peek_token_is(TokenKind::Let)
                    || self.peek_token_is(TokenKind::Return))
            {
                break;
            }

            self.next_token();
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current_token.value {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> ParseResult<Statement> {
        let name = self.expect_peek_identifier()?;

        self.expect_peek(TokenKind::Equal)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Ok(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        // Bare `return`
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
            return Ok(Statement::Return { value: None });
        }
        if self.peek_token_is(TokenKind::Eof) || self.peek_token_is(TokenKind::RightBrace) {
            return Ok(Statement::Return { value: None });
        }

        // Consume the `return` token
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Ok(Statement::Return { value: Some(value) })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Ok(Statement::Expression { expression })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        ensure_sufficient_stack(|| {
            let prefix = match self.prefix_fns.get(&self.current_token.value.kind()) {
                Some(&prefix) => prefix,
                None => {
                    return Err(ParseError::NoPrefixParseFn {
                        kind: self.current_token.value.kind(),
                        span: self.current_token.span,
                    })
                }
            };

            let mut left = prefix(self)?;

            while precedence < self.peek_precedence() {
                let infix = match self.infix_fns.get(&self.peek_token.value.kind()) {
                    Some(&infix) => infix,
                    None => return Ok(left),
                };

                self.next_token();

                left = infix(self, left)?;
            }

            Ok(left)
        })
    }

    fn parse_identifier(&mut self) -> ParseResult<Expression> {
        let ident = self.current_identifier()?;
        Ok(Expression::Identifier(ident))
    }

    fn parse_integer_literal(&mut self) -> ParseResult<Expression> {
        match self.current_token.value {
            Token::Integer(value) => Ok(Expression::Integer(value)),
            _ => Err(self.current_error(TokenKind::Integer)),
        }
    }

    fn parse_boolean(&mut self) -> ParseResult<Expression> {
        Ok(Expression::Boolean(self.current_token_is(TokenKind::True)))
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Expression> {
        let operator = self.current_token.value.clone();

        // Consume the operator
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;

        Ok(Expression::Prefix(Box::new(PrefixExpression {
            operator,
            right,
        })))
    }

    fn parse_grouped_expression(&mut self) -> ParseResult<Expression> {
        // Consume the `(`
        self.next_token();

        let expression = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(TokenKind::RightParen)?;

        Ok(expression)
    }

    /// Parentheses around the condition are optional, `if (x) {}` is just a grouped expression.
    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        // Consume the `if`
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_token_is(TokenKind::Else) {
            self.next_token();

            if self.peek_token_is(TokenKind::If) {
                // `else if` is sugar for an else block holding a single if expression
                self.next_token();
                let nested = self.parse_if_expression()?;
                Some(BlockStatement {
                    statements: vec![Statement::Expression { expression: nested }],
                })
            } else {
                self.expect_peek(TokenKind::LeftBrace)?;
                Some(self.parse_block_statement()?)
            }
        } else {
            None
        };

        Ok(Expression::If(Box::new(IfExpression {
            condition,
            consequence,
            alternative,
        })))
    }

    /// Expects the current token to be the opening `{`, ends on the closing `}`.
    fn parse_block_statement(&mut self) -> ParseResult<BlockStatement> {
        let mut block = BlockStatement::default();

        // Consume the `{`
        self.next_token();
        self.open_blocks += 1;

        while !self.current_token_is(TokenKind::RightBrace) {
            if self.current_token_is(TokenKind::Eof) {
                return Err(self.current_error(TokenKind::RightBrace));
            }

            block.statements.push(self.parse_statement()?);
            self.next_token();
        }

        self.open_blocks -= 1;
        Ok(block)
    }

    fn parse_function_literal(&mut self) -> ParseResult<Expression> {
        self.expect_peek(TokenKind::LeftParen)?;
        let parameters = self.parse_function_parameters()?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let body = self.parse_block_statement()?;

        Ok(Expression::Function(Box::new(FunctionLiteral {
            parameters,
            body: Rc::new(body),
        })))
    }

    /// Expects the current token to be the opening `(`, ends on the closing `)`.
    fn parse_function_parameters(&mut self) -> ParseResult<Vec<IdentifierLiteral>> {
        let mut parameters = Vec::new();

        if self.peek_token_is(TokenKind::RightParen) {
            self.next_token();
            return Ok(parameters);
        }

        parameters.push(self.expect_peek_identifier()?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            parameters.push(self.expect_peek_identifier()?);
        }

        self.expect_peek(TokenKind::RightParen)?;

        Ok(parameters)
    }

    fn parse_infix_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        let operator = self.current_token.value.clone();
        let precedence = self.current_precedence();

        // Consume the operator
        self.next_token();

        let right = self.parse_expression(precedence)?;

        Ok(Expression::Infix(Box::new(InfixExpression {
            left,
            operator,
            right,
        })))
    }

    fn parse_call_expression(&mut self, function: Expression) -> ParseResult<Expression> {
        let arguments = self.parse_call_arguments()?;

        Ok(Expression::Call(Box::new(CallExpression {
            function,
            arguments,
        })))
    }

    fn parse_call_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut arguments = Vec::new();

        if self.peek_token_is(TokenKind::RightParen) {
            self.next_token();
            return Ok(arguments);
        }

        self.next_token();
        arguments.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            arguments.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(TokenKind::RightParen)?;

        Ok(arguments)
    }

    fn next_token(&mut self) {
        self.current_token = std::mem::replace(&mut self.peek_token, self.source.next_token());
    }

    fn current_token_is(&self, kind: TokenKind) -> bool {
        self.current_token.value.kind() == kind
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.value.kind() == kind
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(self.current_token.value.kind())
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek_token.value.kind())
    }

    fn expect_peek(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.peek_token_is(kind) {
            self.next_token();
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected: kind,
                got: self.peek_token.value.clone(),
                span: self.peek_token.span,
            })
        }
    }

    fn expect_peek_identifier(&mut self) -> ParseResult<IdentifierLiteral> {
        self.expect_peek(TokenKind::Identifier)?;
        self.current_identifier()
    }

    fn current_identifier(&self) -> ParseResult<IdentifierLiteral> {
        match &self.current_token.value {
            Token::Identifier(name) => Ok(IdentifierLiteral::from(name.as_str())),
            _ => Err(self.current_error(TokenKind::Identifier)),
        }
    }

    fn current_error(&self, expected: TokenKind) -> ParseError {
        ParseError::Expected {
            expected,
            got: self.current_token.value.clone(),
            span: self.current_token.span,
        }
    }
}
