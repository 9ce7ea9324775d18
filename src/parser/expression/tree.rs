use compact_str::CompactString;

use super::{InfixOperator, InfixShortCircuitOperator, PrefixOperator};
use crate::string::{IdentName, Lexeme};

#[derive(Debug, Clone)]
pub enum ExpressionAtomKind {
    Number(f64),
    Bool(bool),
    Nil,
    Identifier(IdentName),
    StringLiteral(CompactString),
}

#[derive(Debug, Clone)]
pub struct ExpressionAtom {
    pub kind: ExpressionAtomKind,
    pub lexeme: Lexeme,
}

#[derive(Debug, Clone)]
pub enum Expression {
    Atom(ExpressionAtom),
    Group {
        inner: Box<Expression>,
    },
    Prefix {
        operator: PrefixOperator,
        token: Lexeme,
        rhs: Box<Expression>,
    },
    Infix {
        operator: InfixOperator,
        token: Lexeme,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    InfixAssignment {
        lhs: Lexeme,
        rhs: Box<Expression>,
    },
    InfixShortCircuit {
        operator: InfixShortCircuitOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
        closing_paren: Lexeme,
    },
}

impl Expression {
    pub fn get_l_value(&self) -> Option<&Lexeme> {
        match self {
            Expression::Atom(ExpressionAtom {
                kind: ExpressionAtomKind::Identifier(_),
                lexeme,
            }) => Some(lexeme),
            _ => None,
        }
    }
}
