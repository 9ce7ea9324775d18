pub mod error;
pub mod formatter;

use crate::environment::Environment;
use crate::interpreter::{ProgramState, TreeWalkInterpreter};
use crate::parser::statement::FunctionDecl;
use compact_str::{CompactString, CompactStringExt};
use error::{RuntimeError, RuntimeErrorKind};
use std::rc::Rc;

/// Anything that can be invoked from a call expression.
///
/// The call site checks the argument count against [`Callable::arity`] before
/// [`Callable::call`] runs, so implementations may assume `arguments.len() == self.arity()`.
pub trait Callable: std::fmt::Debug {
    fn name(&self) -> &str;
    fn arity(&self) -> usize;
    fn call(
        &self,
        interpreter: &mut TreeWalkInterpreter<'_>,
        arguments: Vec<Literal>,
    ) -> Result<Literal, RuntimeError>;
}

/// A user defined function together with the scope it was declared in.
#[derive(Debug, Clone)]
pub struct Function {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Environment,
}

impl Callable for Function {
    fn name(&self) -> &str {
        &self.declaration.name.text
    }

    fn arity(&self) -> usize {
        self.declaration.parameters.len()
    }

    fn call(
        &self,
        interpreter: &mut TreeWalkInterpreter<'_>,
        arguments: Vec<Literal>,
    ) -> Result<Literal, RuntimeError> {
        // Parameters live in a fresh child of the closure, not of the caller's scope.
        let environment = self.closure.new_scope();
        for (parameter, argument) in self.declaration.parameters.iter().zip(arguments) {
            environment.declare(&parameter.text, argument);
        }

        match interpreter.execute_block(&self.declaration.body, environment)? {
            ProgramState::Run => Ok(Literal::Nil),
            ProgramState::Return(value) => Ok(value),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Literal {
    Nil,
    Bool(bool),
    Number(f64),
    String(CompactString),
    Callable(Rc<dyn Callable>),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::Callable(fun) => write!(f, "<fn {}>", fun.name()),
        }
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Number(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.into())
    }
}

// Unary operators
impl Literal {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Literal::Bool(false) | Literal::Nil)
    }

    pub fn logical_not(&self) -> bool {
        !self.is_truthy()
    }

    pub fn numeric_negate(&self) -> Result<Literal, RuntimeErrorKind> {
        match self {
            Literal::Number(v) => Ok(Literal::Number(-v)),
            v => Err(RuntimeErrorKind::NonNumeric(v.clone())),
        }
    }
}

impl Literal {
    // Arithmetic + string concatenation
    pub fn add(&self, other: &Literal) -> Result<Literal, RuntimeErrorKind> {
        match (self, other) {
            (Literal::Number(lhs), Literal::Number(rhs)) => Ok(Literal::Number(lhs + rhs)),
            (Literal::String(lhs), Literal::String(rhs)) => {
                Ok(Literal::String([lhs, rhs].concat_compact()))
            }
            (lhs, rhs) => Err(RuntimeErrorKind::NonAddable(lhs.clone(), rhs.clone())),
        }
    }

    fn numeric_binary(
        &self,
        other: &Literal,
        operation: impl FnOnce(f64, f64) -> Literal,
    ) -> Result<Literal, RuntimeErrorKind> {
        match (self, other) {
            (Literal::Number(lhs), Literal::Number(rhs)) => Ok(operation(*lhs, *rhs)),
            (lhs, rhs) => Err(RuntimeErrorKind::NonNumerics(lhs.clone(), rhs.clone())),
        }
    }

    pub fn subtract(&self, other: &Literal) -> Result<Literal, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| Literal::Number(lhs - rhs))
    }

    pub fn multiply(&self, other: &Literal) -> Result<Literal, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| Literal::Number(lhs * rhs))
    }

    pub fn divide(&self, other: &Literal) -> Result<Literal, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| Literal::Number(lhs / rhs))
    }

    // Comparison
    pub fn less_than(&self, other: &Literal) -> Result<Literal, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| Literal::Bool(lhs < rhs))
    }

    pub fn less_than_or_equal(&self, other: &Literal) -> Result<Literal, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| Literal::Bool(lhs <= rhs))
    }

    pub fn greater_than(&self, other: &Literal) -> Result<Literal, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| Literal::Bool(lhs > rhs))
    }

    pub fn greater_than_or_equal(&self, other: &Literal) -> Result<Literal, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| Literal::Bool(lhs >= rhs))
    }

    // Equality
    pub fn is_equal(&self, other: &Literal) -> bool {
        match (self, other) {
            (Literal::Number(lhs), Literal::Number(rhs)) => lhs == rhs,
            (Literal::String(lhs), Literal::String(rhs)) => lhs == rhs,
            (Literal::Nil, Literal::Nil) => true,
            (Literal::Bool(lhs), Literal::Bool(rhs)) => lhs == rhs,
            (Literal::Callable(lhs), Literal::Callable(rhs)) => Rc::ptr_eq(lhs, rhs),
            _ => false,
        }
    }

    pub fn is_not_equal(&self, other: &Literal) -> bool {
        !self.is_equal(other)
    }
}
