use crate::lexer::{LexicalError, Span};
use crate::string::Lexeme;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ParserErrorKind {
    #[error("Expected {0}.")]
    Expected(&'static str),
    #[error("Cannot have more than 8 parameters.")]
    TooManyParameters,
    #[error("Cannot have more than 8 arguments.")]
    TooManyArguments,
    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget,
    #[error("{0}")]
    LexicalError(#[from] LexicalError),
}

/// A syntax error and the token it was found at. A missing lexeme means the end of input.
#[derive(Debug, Clone)]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub lexeme: Option<Lexeme>,
    pub line: u32,
    pub span: Span,
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let line = self.line;
        match (&self.kind, &self.lexeme) {
            (ParserErrorKind::LexicalError(_), _) => {
                write!(f, "[Line {line}] Error: {}", self.kind)
            }
            (kind, Some(lexeme)) => write!(f, "[Line {line}] Error at '{lexeme}': {kind}"),
            (kind, None) => write!(f, "[Line {line}] Error at end: {kind}"),
        }
    }
}

impl std::error::Error for ParserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<LexicalError> for ParserError {
    fn from(error: LexicalError) -> Self {
        Self {
            line: error.line,
            span: error.span,
            lexeme: None,
            kind: ParserErrorKind::LexicalError(error),
        }
    }
}

impl ParserError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::Expected(_) => "PE001",
            ParserErrorKind::TooManyParameters => "PE002",
            ParserErrorKind::TooManyArguments => "PE003",
            ParserErrorKind::InvalidAssignmentTarget => "PE004",
            ParserErrorKind::LexicalError(_) => "LE001",
        }
    }
}
