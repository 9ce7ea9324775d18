mod operator;
mod tree;

pub use operator::{
    InfixAssignmentOperator, InfixOperator, InfixShortCircuitOperator, PostfixOperator,
    PrefixOperator,
};
pub use tree::{Expression, ExpressionAtom, ExpressionAtomKind};
