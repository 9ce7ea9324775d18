pub mod native;

use crate::string::IdentName;
use crate::value::{error::RuntimeErrorKind, Literal};
use native::NativeClock;
use std::{cell::RefCell, rc::Rc};

/// One lexical scope frame.
///
/// Cloning an `Environment` clones the handle, not the frame: closures and
/// nested scopes share their ancestors and keep them alive for as long as they
/// are held.
#[derive(Debug, Clone)]
pub struct Environment {
    inner: Rc<RefCell<EnvironmentImpl>>,
}

#[derive(Debug)]
struct EnvironmentImpl {
    values: Vec<(IdentName, Literal)>,
    parent: Option<Environment>,
}

impl Environment {
    /// Creates the global scope with the native functions already bound.
    pub fn new() -> Self {
        let environment = Self::empty();

        // Inject native functions here
        {
            let clock = NativeClock;
            environment.declare(clock.get_name(), Literal::Callable(Rc::new(clock)));
        }

        environment
    }

    /// Creates a scope with no bindings and no parent.
    pub fn empty() -> Self {
        Self {
            inner: Rc::new(RefCell::new(EnvironmentImpl {
                values: Vec::new(),
                parent: None,
            })),
        }
    }

    pub fn new_scope(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EnvironmentImpl {
                values: Vec::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Reads the nearest binding of `name`, searching outwards.
    pub fn access(&self, name: &str) -> Result<Literal, RuntimeErrorKind> {
        let inner = self.inner.borrow();
        if let Some(index) = inner.position(name) {
            Ok(inner.values[index].1.clone())
        } else if let Some(ref parent) = inner.parent {
            parent.access(name)
        } else {
            Err(RuntimeErrorKind::UndefinedVariable(name.into()))
        }
    }

    /// Overwrites the nearest binding of `name`. Never creates a binding.
    pub fn assign(&self, name: &str, value: Literal) -> Result<(), RuntimeErrorKind> {
        let mut inner = self.inner.borrow_mut();
        if let Some(index) = inner.position(name) {
            inner.values[index].1 = value;
            return Ok(());
        }
        match inner.parent {
            Some(ref parent) => parent.assign(name, value),
            None => Err(RuntimeErrorKind::UndefinedVariable(name.into())),
        }
    }

    /// Binds `name` in this frame, overwriting an existing binding in the same frame.
    pub fn declare(&self, name: &str, value: Literal) {
        let mut inner = self.inner.borrow_mut();
        match inner.position(name) {
            Some(index) => inner.values[index].1 = value,
            None => inner.values.push((name.into(), value)),
        }
    }

    pub fn is_global(&self) -> bool {
        self.inner.borrow().parent.is_none()
    }

    pub fn same_scope(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl EnvironmentImpl {
    fn position(&self, name: &str) -> Option<usize> {
        self.values.iter().position(|(key, _)| &**key == name)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
