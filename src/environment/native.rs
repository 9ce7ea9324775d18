use crate::interpreter::TreeWalkInterpreter;
use crate::value::{error::RuntimeError, Callable, Literal};
use std::time::{SystemTime, UNIX_EPOCH};

/// `clock()`: seconds since the UNIX epoch.
#[derive(Debug)]
pub struct NativeClock;

impl NativeClock {
    pub fn get_name(&self) -> &'static str {
        "clock"
    }
}

impl Callable for NativeClock {
    fn name(&self) -> &str {
        self.get_name()
    }

    fn arity(&self) -> usize {
        0
    }

    fn call(
        &self,
        _interpreter: &mut TreeWalkInterpreter<'_>,
        _arguments: Vec<Literal>,
    ) -> Result<Literal, RuntimeError> {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or_default();
        Ok(Literal::Number(seconds))
    }
}
