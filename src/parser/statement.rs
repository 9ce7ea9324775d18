use std::rc::Rc;

use super::expression::Expression;
use crate::string::Lexeme;

#[derive(Debug, Clone)]
pub enum Statement {
    // Declarations
    VariableDecl(VariableDecl),
    FunctionDecl(Rc<FunctionDecl>),
    // Non-declarations
    Expression(ExpressionStatement),
    Print(PrintStatement),
    Block(BlockStatement),
    If(IfStatement),
    While(WhileStatement),
    Return(ReturnStatement),
}

#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: Lexeme,
    pub initial: Option<Expression>,
}

/// Shared between the syntax tree and every closure created from it.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Lexeme,
    pub parameters: Vec<Lexeme>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub expr: Expression,
}

#[derive(Debug, Clone)]
pub struct PrintStatement {
    pub expr: Expression,
}

#[derive(Debug, Clone)]
pub struct BlockStatement {
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub condition: Expression,
    pub success: Box<Statement>,
    pub failure: Option<Box<Statement>>,
}

#[derive(Debug, Clone)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone)]
pub struct ReturnStatement {
    pub keyword: Lexeme,
    pub value: Option<Expression>,
}
