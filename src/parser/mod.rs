pub mod error;
pub mod expression;
pub mod formatter;
mod program;
pub mod statement;

use std::rc::Rc;

use crate::{
    lexer::{Lexer, Span, Token, TokenKind},
    string::Lexeme,
};
pub use error::{ParserError, ParserErrorKind};
use expression::{
    Expression, ExpressionAtom, ExpressionAtomKind, InfixAssignmentOperator, InfixOperator,
    InfixShortCircuitOperator, PostfixOperator, PrefixOperator,
};
pub use program::Program;
use statement::{
    BlockStatement, ExpressionStatement, FunctionDecl, IfStatement, PrintStatement,
    ReturnStatement, Statement, VariableDecl, WhileStatement,
};

/// The maximum number of parameters a function may declare, and of arguments a call may pass.
pub const MAX_ARITY: usize = 8;

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    errors: Vec<ParserError>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut parser = Self {
            lexer: Lexer::new(source),
            current: Token {
                kind: TokenKind::Eof,
                span: Span::default(),
                line: 1,
            },
            errors: Vec::new(),
        };
        parser.advance();
        parser
    }

    /// Parse the whole source. Every syntax error found is reported, not just the first.
    pub fn parse(&mut self) -> Result<Program, Vec<ParserError>> {
        let mut statements = Vec::new();
        while self.current.kind != TokenKind::Eof {
            match self.parse_declaration() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    tracing::debug!(%error, "recovering from syntax error");
                    self.errors.push(error);
                    self.synchronize();
                }
            }
        }

        if self.errors.is_empty() {
            Ok(Program::new(statements))
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    /// Consume the current token and return it. Lexical errors are recorded and skipped.
    fn advance(&mut self) -> Token {
        let previous = self.current;
        loop {
            match self.lexer.next_token() {
                Ok(token) => {
                    self.current = token;
                    break;
                }
                Err(error) => self.errors.push(ParserError::from(error)),
            }
        }
        previous
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn eat_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &'static str) -> Result<Token, ParserError> {
        match self.eat_if(kind) {
            Some(token) => Ok(token),
            None => Err(self.error_at(self.current, ParserErrorKind::Expected(what))),
        }
    }

    fn lexeme(&self, token: &Token) -> Lexeme {
        Lexeme {
            text: self.lexer.get_lexeme(&token.span).unwrap_or_default().into(),
            line: token.line,
            span: token.span,
        }
    }

    fn error_at(&self, token: Token, kind: ParserErrorKind) -> ParserError {
        let lexeme = (token.kind != TokenKind::Eof).then(|| self.lexeme(&token));
        ParserError {
            kind,
            lexeme,
            line: token.line,
            span: token.span,
        }
    }

    /// Skip tokens until just after a `;` or just before a statement keyword.
    fn synchronize(&mut self) {
        let mut previous = self.advance();
        while !self.check(TokenKind::Eof) {
            if previous.kind == TokenKind::Semicolon || self.current.kind.starts_statement() {
                return;
            }
            previous = self.advance();
        }
    }
}

// Recursive descent for statements
impl Parser<'_> {
    fn parse_declaration(&mut self) -> Result<Statement, ParserError> {
        if self.eat_if(TokenKind::KeywordVar).is_some() {
            self.parse_variable_declaration()
        } else if self.eat_if(TokenKind::KeywordFun).is_some() {
            self.parse_function_declaration()
        } else {
            self.parse_statement()
        }
    }

    fn parse_variable_declaration(&mut self) -> Result<Statement, ParserError> {
        let name = self.expect(TokenKind::Ident, "variable name")?;
        let initial = match self.eat_if(TokenKind::Equal) {
            Some(_) => Some(self.parse_expression()?),
            None => None,
        };
        self.expect(TokenKind::Semicolon, "';' after variable declaration")?;

        Ok(Statement::VariableDecl(VariableDecl {
            name: self.lexeme(&name),
            initial,
        }))
    }

    fn parse_function_declaration(&mut self) -> Result<Statement, ParserError> {
        let name = self.expect(TokenKind::Ident, "function name")?;
        self.expect(TokenKind::LeftParenthesis, "'(' after function name")?;

        let mut parameters = Vec::new();
        if !self.check(TokenKind::RightParenthesis) {
            loop {
                if parameters.len() >= MAX_ARITY {
                    return Err(self.error_at(self.current, ParserErrorKind::TooManyParameters));
                }
                let parameter = self.expect(TokenKind::Ident, "parameter name")?;
                parameters.push(self.lexeme(&parameter));
                if self.eat_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParenthesis, "')' after parameters")?;
        self.expect(TokenKind::LeftBrace, "'{' before function body")?;
        let body = self.parse_block()?;

        Ok(Statement::FunctionDecl(Rc::new(FunctionDecl {
            name: self.lexeme(&name),
            parameters,
            body,
        })))
    }

    fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        match self.current.kind {
            TokenKind::KeywordPrint => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "';' after value")?;
                Ok(Statement::Print(PrintStatement { expr }))
            }
            TokenKind::LeftBrace => {
                self.advance();
                let body = self.parse_block()?;
                Ok(Statement::Block(BlockStatement { body }))
            }
            TokenKind::KeywordIf => {
                self.advance();
                self.parse_if_statement()
            }
            TokenKind::KeywordWhile => {
                self.advance();
                self.expect(TokenKind::LeftParenthesis, "'(' after 'while'")?;
                let condition = self.parse_expression()?;
                self.expect(TokenKind::RightParenthesis, "')' after condition")?;
                let body = Box::new(self.parse_statement()?);
                Ok(Statement::While(WhileStatement { condition, body }))
            }
            TokenKind::KeywordFor => {
                let keyword = self.advance();
                self.parse_for_statement(keyword)
            }
            TokenKind::KeywordReturn => {
                let keyword = self.advance();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect(TokenKind::Semicolon, "';' after return value")?;
                Ok(Statement::Return(ReturnStatement {
                    keyword: self.lexeme(&keyword),
                    value,
                }))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "';' after expression")?;
                Ok(Statement::Expression(ExpressionStatement { expr }))
            }
        }
    }

    /// Statements up to the closing brace. The opening brace is already consumed.
    fn parse_block(&mut self) -> Result<Vec<Statement>, ParserError> {
        let mut body = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            body.push(self.parse_declaration()?);
        }
        self.expect(TokenKind::RightBrace, "'}' after block")?;
        Ok(body)
    }

    fn parse_if_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect(TokenKind::LeftParenthesis, "'(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParenthesis, "')' after if condition")?;

        let success = Box::new(self.parse_statement()?);
        let failure = match self.eat_if(TokenKind::KeywordElse) {
            Some(_) => Some(Box::new(self.parse_statement()?)),
            None => None,
        };

        Ok(Statement::If(IfStatement {
            condition,
            success,
            failure,
        }))
    }

    /// `for` has no node of its own. It becomes a `while` loop wrapped in blocks.
    fn parse_for_statement(&mut self, keyword: Token) -> Result<Statement, ParserError> {
        self.expect(TokenKind::LeftParenthesis, "'(' after 'for'")?;

        let initializer = if self.eat_if(TokenKind::Semicolon).is_some() {
            None
        } else if self.eat_if(TokenKind::KeywordVar).is_some() {
            Some(self.parse_variable_declaration()?)
        } else {
            let expr = self.parse_expression()?;
            self.expect(TokenKind::Semicolon, "';' after loop initializer")?;
            Some(Statement::Expression(ExpressionStatement { expr }))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, "';' after loop condition")?;

        let increment = if self.check(TokenKind::RightParenthesis) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RightParenthesis, "')' after for clauses")?;

        let mut body = self.parse_statement()?;
        if let Some(expr) = increment {
            body = Statement::Block(BlockStatement {
                body: vec![body, Statement::Expression(ExpressionStatement { expr })],
            });
        }

        let condition = condition.unwrap_or_else(|| {
            Expression::Atom(ExpressionAtom {
                kind: ExpressionAtomKind::Bool(true),
                lexeme: self.lexeme(&keyword),
            })
        });
        body = Statement::While(WhileStatement {
            condition,
            body: Box::new(body),
        });

        if let Some(initializer) = initializer {
            body = Statement::Block(BlockStatement {
                body: vec![initializer, body],
            });
        }

        Ok(body)
    }
}

// Pratt parser for expressions
impl Parser<'_> {
    pub fn parse_expression(&mut self) -> Result<Expression, ParserError> {
        self.parse_expression_pratt(0)
    }

    fn parse_expression_pratt(&mut self, min_bp: u8) -> Result<Expression, ParserError> {
        let mut lhs = self.expect_left_expression()?;

        loop {
            let token = self.current;

            if token.kind == TokenKind::LeftParenthesis {
                if PostfixOperator::Call.get_binding_power() < min_bp {
                    break;
                }
                self.advance();
                lhs = self.finish_call(lhs)?;
                continue;
            }

            if let Some(operator) = InfixOperator::from_token(token.kind) {
                let (l_bp, r_bp) = operator.get_binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let rhs = self.parse_expression_pratt(r_bp)?;
                lhs = Expression::Infix {
                    operator,
                    token: self.lexeme(&token),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                continue;
            }

            if let Some(operator) = InfixShortCircuitOperator::from_token(token.kind) {
                let (l_bp, r_bp) = operator.get_binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let rhs = self.parse_expression_pratt(r_bp)?;
                lhs = Expression::InfixShortCircuit {
                    operator,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                continue;
            }

            if token.kind == TokenKind::Equal {
                let (l_bp, r_bp) = InfixAssignmentOperator::Assign.get_binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let rhs = self.parse_expression_pratt(r_bp)?;
                let Some(target) = lhs.get_l_value() else {
                    return Err(self.error_at(token, ParserErrorKind::InvalidAssignmentTarget));
                };
                lhs = Expression::InfixAssignment {
                    lhs: target.clone(),
                    rhs: Box::new(rhs),
                };
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    fn expect_left_expression(&mut self) -> Result<Expression, ParserError> {
        let token = self.current;

        if let Some(operator) = PrefixOperator::from_token(token.kind) {
            self.advance();
            let rhs = self.parse_expression_pratt(operator.get_binding_power())?;
            return Ok(Expression::Prefix {
                operator,
                token: self.lexeme(&token),
                rhs: Box::new(rhs),
            });
        }

        if token.kind == TokenKind::LeftParenthesis {
            self.advance();
            let inner = self.parse_expression_pratt(0)?;
            self.expect(TokenKind::RightParenthesis, "')' after expression")?;
            return Ok(Expression::Group {
                inner: Box::new(inner),
            });
        }

        let lexeme = self.lexeme(&token);
        let kind = match token.kind {
            TokenKind::NumericLiteral => match lexeme.text.parse() {
                Ok(value) => ExpressionAtomKind::Number(value),
                Err(_) => return Err(self.error_at(token, ParserErrorKind::Expected("number"))),
            },
            TokenKind::StringLiteral => {
                let text = &lexeme.text;
                let value = text.get(1..text.len().saturating_sub(1)).unwrap_or_default();
                ExpressionAtomKind::StringLiteral(value.into())
            }
            TokenKind::Ident => ExpressionAtomKind::Identifier(lexeme.text.clone()),
            TokenKind::KeywordTrue => ExpressionAtomKind::Bool(true),
            TokenKind::KeywordFalse => ExpressionAtomKind::Bool(false),
            TokenKind::KeywordNil => ExpressionAtomKind::Nil,
            _ => return Err(self.error_at(token, ParserErrorKind::Expected("expression"))),
        };
        self.advance();

        Ok(Expression::Atom(ExpressionAtom { kind, lexeme }))
    }

    /// Arguments up to the closing parenthesis. The opening parenthesis is already consumed.
    fn finish_call(&mut self, callee: Expression) -> Result<Expression, ParserError> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParenthesis) {
            loop {
                arguments.push(self.parse_expression()?);
                if self.eat_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        if arguments.len() > MAX_ARITY {
            return Err(self.error_at(self.current, ParserErrorKind::TooManyArguments));
        }
        let closing_paren = self.expect(TokenKind::RightParenthesis, "')' after arguments")?;

        Ok(Expression::Call {
            callee: Box::new(callee),
            arguments,
            closing_paren: self.lexeme(&closing_paren),
        })
    }
}
