use crate::lexer::Span;
use std::rc::Rc;

/// A piece of source text tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lexeme {
    pub text: IdentName,
    pub line: u32,
    pub span: Span,
}

impl std::fmt::Display for Lexeme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

pub type IdentName = Rc<str>;
