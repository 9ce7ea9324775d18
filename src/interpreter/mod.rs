pub mod context;
mod tree;

use crate::value::Literal;
pub use tree::{TreeWalkInterpreter, DEFAULT_MAX_CALL_DEPTH};

/// How a statement finished.
#[derive(Debug, Clone)]
pub enum ProgramState {
    Run,
    Return(Literal),
}

/// Where the output of `print` goes.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}
