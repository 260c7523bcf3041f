use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// A single scope holding name to value bindings, chained to the scope
/// enclosing it. Blocks, calls and class bodies each get a fresh
/// environment; closures keep theirs alive past the block that created it,
/// so environments are shared through reference counting.
#[derive(Debug, Clone)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    pub variables: HashMap<String, Object>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment {
            enclosing,
            variables: HashMap::new(),
        }
    }

    /// Binds a name in this scope, redefining it if it already exists.
    /// Inner scopes are guarded against redefinition by the resolver.
    pub fn define(&mut self, name: &str, value: Object) {
        self.variables.insert(name.to_string(), value);
    }

    /// Follows the enclosing chain for exactly `distance` hops.
    fn ancestor(&self, distance: usize) -> Rc<RefCell<Environment>> {
        let parent = self.enclosing.clone()
            .unwrap_or_else(|| panic!("enclosing environment to exist at depth {}", 1));
        let mut environment = Rc::clone(&parent);

        for i in 1..distance {
            let parent = environment.borrow().enclosing.clone()
                .unwrap_or_else(|| panic!("enclosing environment to exist at depth {}", i));
            environment = Rc::clone(&parent);
        }

        environment
    }

    /// Assigns to an existing binding, walking outward through the
    /// enclosing scopes. Assigning to an undefined name is an error.
    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.variables.contains_key(&name.lexeme) {
            self.variables.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &mut self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'", name.lexeme),
        })
    }

    /// Assigns directly at a resolver-computed distance. Unlike `assign`,
    /// this does not fall back to outer scopes; the resolver guarantees
    /// the binding lives exactly there.
    pub fn assign_at(&mut self, distance: usize, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if distance > 0 {
            let ancestor = self.ancestor(distance);
            let mut ancestor = ancestor.borrow_mut();

            if ancestor.variables.contains_key(&name.lexeme) {
                ancestor.variables.insert(name.lexeme.clone(), value);
                Ok(())
            } else {
                Err(RuntimeError {
                    token: name.clone(),
                    message: format!("Undefined variable '{}'", name.lexeme),
                })
            }
        } else if self.variables.contains_key(&name.lexeme) {
            self.variables.insert(name.lexeme.clone(), value);
            Ok(())
        } else {
            Err(RuntimeError {
                token: name.clone(),
                message: format!("Undefined variable '{}'", name.lexeme),
            })
        }
    }

    /// Reads a binding, walking outward through the enclosing scopes.
    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(variable) = self.variables.get(&name.lexeme) {
            return Ok(variable.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'", name.lexeme)
        })
    }

    /// Reads a binding directly at a resolver-computed distance. Unlike
    /// `get`, this does not fall back to outer scopes; the resolver
    /// guarantees the binding lives exactly there.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Object, RuntimeError> {
        if distance > 0 {
            match self.ancestor(distance).borrow().variables.get(&name.lexeme) {
                Some(variable) => Ok(variable.clone()),
                None => Err(RuntimeError {
                    token: name.clone(),
                    message: format!("Undefined variable '{}'", name.lexeme),
                }),
            }
        } else {
            match self.variables.get(&name.lexeme) {
                Some(variable) => Ok(variable.clone()),
                None => Err(RuntimeError {
                    token: name.clone(),
                    message: format!("Undefined variable '{}'", name.lexeme),
                }),
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None)
    }
}
