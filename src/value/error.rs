use super::Literal;
use crate::lexer::Span;
use crate::string::{IdentName, Lexeme};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum RuntimeErrorKind {
    #[error("Operands must be numbers.")]
    NonNumeric(Literal),
    #[error("Operands must be numbers.")]
    NonNumerics(Literal, Literal),
    #[error("Operands must be two numbers or two strings.")]
    NonAddable(Literal, Literal),
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(IdentName),
    #[error("Can only call functions and classes.")]
    InvalidCallee(Literal),
    #[error("Expected {expected} arguments but got {actual}.")]
    InvalidArgumentCount { actual: usize, expected: usize },
    #[error("Stack overflow.")]
    StackOverflow { depth: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    TypeError,
    NameError,
    ArityError,
    RecursionError,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::TypeError => write!(f, "TypeError"),
            ErrorCategory::NameError => write!(f, "NameError"),
            ErrorCategory::ArityError => write!(f, "ArityError"),
            ErrorCategory::RecursionError => write!(f, "RecursionError"),
        }
    }
}

impl RuntimeErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RuntimeErrorKind::NonNumeric(_)
            | RuntimeErrorKind::NonNumerics(_, _)
            | RuntimeErrorKind::NonAddable(_, _)
            | RuntimeErrorKind::InvalidCallee(_) => ErrorCategory::TypeError,
            RuntimeErrorKind::UndefinedVariable(_) => ErrorCategory::NameError,
            RuntimeErrorKind::InvalidArgumentCount { .. } => ErrorCategory::ArityError,
            RuntimeErrorKind::StackOverflow { .. } => ErrorCategory::RecursionError,
        }
    }

    /// Attaches the token the failure is blamed on.
    pub fn at(self, lexeme: &Lexeme) -> RuntimeError {
        RuntimeError {
            kind: self,
            lexeme: lexeme.clone(),
        }
    }
}

/// A runtime failure attributed to a token in the source.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub lexeme: Lexeme,
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[Line {}] Error '{}': {}",
            self.lexeme.line, self.lexeme.text, self.kind
        )
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl RuntimeError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::NonNumeric(_) => "RT001",
            RuntimeErrorKind::NonNumerics(_, _) => "RT002",
            RuntimeErrorKind::NonAddable(_, _) => "RT003",
            RuntimeErrorKind::UndefinedVariable(_) => "RT004",
            RuntimeErrorKind::InvalidCallee(_) => "RT005",
            RuntimeErrorKind::InvalidArgumentCount { .. } => "RT006",
            RuntimeErrorKind::StackOverflow { .. } => "RT007",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn line(&self) -> u32 {
        self.lexeme.line
    }

    pub fn span(&self) -> Span {
        self.lexeme.span
    }
}
