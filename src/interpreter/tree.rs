use std::rc::Rc;

use super::{ProgramState, SystemContext};
use crate::environment::Environment;
use crate::parser::{
    expression::{
        Expression, ExpressionAtom, ExpressionAtomKind, InfixOperator, InfixShortCircuitOperator,
        PrefixOperator,
    },
    statement::{
        ExpressionStatement, FunctionDecl, IfStatement, PrintStatement, ReturnStatement,
        Statement, VariableDecl, WhileStatement,
    },
    Program,
};
use crate::string::Lexeme;
use crate::value::error::{RuntimeError, RuntimeErrorKind};
use crate::value::{Function, Literal};

/// Deepest nesting of calls before a script is stopped with a stack overflow.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 255;

pub struct TreeWalkInterpreter<'ctx> {
    environment: Environment,
    globals: Environment,
    result: Literal,
    call_depth: usize,
    max_call_depth: usize,
    context: &'ctx mut dyn SystemContext,
}

impl<'ctx> TreeWalkInterpreter<'ctx> {
    pub fn new(context: &'ctx mut dyn SystemContext) -> Self {
        Self::with_max_call_depth(context, DEFAULT_MAX_CALL_DEPTH)
    }

    pub fn with_max_call_depth(
        context: &'ctx mut dyn SystemContext,
        max_call_depth: usize,
    ) -> Self {
        let globals = Environment::new();
        Self {
            environment: globals.clone(),
            globals,
            result: Literal::Nil,
            call_depth: 0,
            max_call_depth,
            context,
        }
    }

    /// Number of calls currently in progress.
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    /// The scope statements currently execute in.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// The most recently computed value.
    pub fn result(&self) -> &Literal {
        &self.result
    }

    pub fn into_result(self) -> Literal {
        self.result
    }

    /// Execute every statement in order. A top level `return` stops the program early.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        tracing::debug!(statements = program.len(), "running program");
        for statement in program {
            if let ProgramState::Return(value) = self.interpret_statement(statement)? {
                tracing::debug!(%value, "program returned early");
                self.result = value;
                break;
            }
        }
        Ok(())
    }

    pub fn interpret_statement(
        &mut self,
        statement: &Statement,
    ) -> Result<ProgramState, RuntimeError> {
        match statement {
            Statement::VariableDecl(decl) => self.interpret_variable_declaration(decl),
            Statement::FunctionDecl(decl) => self.interpret_function_declaration(decl),
            Statement::Expression(statement) => self.interpret_expression_statement(statement),
            Statement::Print(statement) => self.interpret_print_statement(statement),
            Statement::Block(block) => {
                let scope = self.environment.new_scope();
                self.execute_block(&block.body, scope)
            }
            Statement::If(statement) => self.interpret_if_statement(statement),
            Statement::While(statement) => self.interpret_while_statement(statement),
            Statement::Return(statement) => self.interpret_return_statement(statement),
        }
    }

    /// Run `body` inside `environment`. The previous scope is restored however the block exits.
    pub fn execute_block(
        &mut self,
        body: &[Statement],
        environment: Environment,
    ) -> Result<ProgramState, RuntimeError> {
        tracing::trace!(statements = body.len(), "enter scope");
        let previous = std::mem::replace(&mut self.environment, environment);
        let mut outcome = Ok(ProgramState::Run);
        for statement in body {
            match self.interpret_statement(statement) {
                Ok(ProgramState::Run) => {}
                state => {
                    outcome = state;
                    break;
                }
            }
        }
        self.environment = previous;
        outcome
    }

    fn interpret_variable_declaration(
        &mut self,
        decl: &VariableDecl,
    ) -> Result<ProgramState, RuntimeError> {
        let value = match decl.initial {
            Some(ref initial) => self.evaluate(initial)?,
            None => Literal::Nil,
        };
        tracing::trace!(name = %decl.name, %value, "declare");
        self.environment.declare(&decl.name.text, value);
        Ok(ProgramState::Run)
    }

    fn interpret_function_declaration(
        &mut self,
        decl: &Rc<FunctionDecl>,
    ) -> Result<ProgramState, RuntimeError> {
        let function = Function {
            declaration: Rc::clone(decl),
            closure: self.environment.clone(),
        };
        self.environment
            .declare(&decl.name.text, Literal::Callable(Rc::new(function)));
        Ok(ProgramState::Run)
    }

    fn interpret_expression_statement(
        &mut self,
        statement: &ExpressionStatement,
    ) -> Result<ProgramState, RuntimeError> {
        self.evaluate(&statement.expr)?;
        Ok(ProgramState::Run)
    }

    fn interpret_print_statement(
        &mut self,
        statement: &PrintStatement,
    ) -> Result<ProgramState, RuntimeError> {
        let value = self.evaluate(&statement.expr)?;
        self.context.writeln(&value.to_string());
        Ok(ProgramState::Run)
    }

    fn interpret_if_statement(
        &mut self,
        statement: &IfStatement,
    ) -> Result<ProgramState, RuntimeError> {
        if self.evaluate(&statement.condition)?.is_truthy() {
            self.interpret_statement(&statement.success)
        } else if let Some(ref failure) = statement.failure {
            self.interpret_statement(failure)
        } else {
            Ok(ProgramState::Run)
        }
    }

    fn interpret_while_statement(
        &mut self,
        statement: &WhileStatement,
    ) -> Result<ProgramState, RuntimeError> {
        while self.evaluate(&statement.condition)?.is_truthy() {
            if let state @ ProgramState::Return(_) = self.interpret_statement(&statement.body)? {
                return Ok(state);
            }
        }
        Ok(ProgramState::Run)
    }

    fn interpret_return_statement(
        &mut self,
        statement: &ReturnStatement,
    ) -> Result<ProgramState, RuntimeError> {
        let value = match statement.value {
            Some(ref value) => self.evaluate(value)?,
            None => Literal::Nil,
        };
        self.result = value.clone();
        Ok(ProgramState::Return(value))
    }
}

// Expressions
impl TreeWalkInterpreter<'_> {
    /// Evaluate `expr` and store the value as the latest result.
    pub fn evaluate(&mut self, expr: &Expression) -> Result<Literal, RuntimeError> {
        let value = self.evaluate_expression(expr)?;
        self.result = value.clone();
        Ok(value)
    }

    fn evaluate_expression(&mut self, expr: &Expression) -> Result<Literal, RuntimeError> {
        match expr {
            Expression::Atom(atom) => self.evaluate_atom(atom),
            Expression::Group { inner } => self.evaluate_expression(inner),
            Expression::Prefix {
                operator,
                token,
                rhs,
            } => self.evaluate_prefix(*operator, token, rhs),
            Expression::Infix {
                operator,
                token,
                lhs,
                rhs,
            } => self.evaluate_infix(*operator, token, lhs, rhs),
            Expression::InfixAssignment { lhs, rhs } => {
                let value = self.evaluate_expression(rhs)?;
                self.environment
                    .assign(&lhs.text, value.clone())
                    .map_err(|kind| kind.at(lhs))?;
                Ok(value)
            }
            Expression::InfixShortCircuit { operator, lhs, rhs } => {
                self.evaluate_infix_short_circuit(*operator, lhs, rhs)
            }
            Expression::Call {
                callee,
                arguments,
                closing_paren,
            } => self.evaluate_call(callee, arguments, closing_paren),
        }
    }

    fn evaluate_atom(&self, atom: &ExpressionAtom) -> Result<Literal, RuntimeError> {
        match atom.kind {
            ExpressionAtomKind::Identifier(ref name) => self
                .environment
                .access(name)
                .map_err(|kind| kind.at(&atom.lexeme)),
            ExpressionAtomKind::Number(v) => Ok(Literal::Number(v)),
            ExpressionAtomKind::Bool(v) => Ok(Literal::Bool(v)),
            ExpressionAtomKind::Nil => Ok(Literal::Nil),
            ExpressionAtomKind::StringLiteral(ref v) => Ok(Literal::String(v.clone())),
        }
    }

    fn evaluate_prefix(
        &mut self,
        operator: PrefixOperator,
        token: &Lexeme,
        rhs: &Expression,
    ) -> Result<Literal, RuntimeError> {
        let rhs = self.evaluate_expression(rhs)?;

        type Operator = PrefixOperator;
        let result = match operator {
            Operator::Bang => Ok(Literal::Bool(rhs.logical_not())),
            Operator::Minus => rhs.numeric_negate(),
        };
        result.map_err(|kind| kind.at(token))
    }

    fn evaluate_infix(
        &mut self,
        operator: InfixOperator,
        token: &Lexeme,
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<Literal, RuntimeError> {
        let lhs = self.evaluate_expression(lhs)?;
        let rhs = self.evaluate_expression(rhs)?;

        type Operator = InfixOperator;
        let result = match operator {
            Operator::Add => lhs.add(&rhs),
            Operator::Subtract => lhs.subtract(&rhs),
            Operator::Multiply => lhs.multiply(&rhs),
            Operator::Divide => lhs.divide(&rhs),
            Operator::LessThan => lhs.less_than(&rhs),
            Operator::LessThanEqual => lhs.less_than_or_equal(&rhs),
            Operator::GreaterThan => lhs.greater_than(&rhs),
            Operator::GreaterThanEqual => lhs.greater_than_or_equal(&rhs),
            Operator::EqualEqual => Ok(Literal::Bool(lhs.is_equal(&rhs))),
            Operator::BangEqual => Ok(Literal::Bool(lhs.is_not_equal(&rhs))),
        };
        result.map_err(|kind| kind.at(token))
    }

    fn evaluate_infix_short_circuit(
        &mut self,
        operator: InfixShortCircuitOperator,
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<Literal, RuntimeError> {
        let lhs = self.evaluate_expression(lhs)?;

        type Operator = InfixShortCircuitOperator;
        match operator {
            Operator::Or if lhs.is_truthy() => Ok(lhs),
            Operator::And if !lhs.is_truthy() => Ok(lhs),
            _ => self.evaluate_expression(rhs),
        }
    }

    fn evaluate_call(
        &mut self,
        callee: &Expression,
        arguments: &[Expression],
        closing_paren: &Lexeme,
    ) -> Result<Literal, RuntimeError> {
        let callee = match self.evaluate_expression(callee)? {
            Literal::Callable(callee) => callee,
            other => return Err(RuntimeErrorKind::InvalidCallee(other).at(closing_paren)),
        };
        let arguments = arguments
            .iter()
            .map(|argument| self.evaluate_expression(argument))
            .collect::<Result<Vec<_>, _>>()?;

        if arguments.len() != callee.arity() {
            return Err(RuntimeErrorKind::InvalidArgumentCount {
                actual: arguments.len(),
                expected: callee.arity(),
            }
            .at(closing_paren));
        }

        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeErrorKind::StackOverflow {
                depth: self.max_call_depth,
            }
            .at(closing_paren));
        }

        tracing::debug!(name = callee.name(), depth = self.call_depth, "call");
        self.call_depth += 1;
        let value = callee.call(self, arguments);
        self.call_depth -= 1;
        value
    }
}
