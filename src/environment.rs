use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One frame of the lexical environment chain.  Keys borrow the source
/// text, so a frame never outlives the token buffer it was built from.
#[derive(Debug, Clone)]
pub struct Environment<'a> {
    values: HashMap<&'a str, Value<'a>>,
    enclosing: Option<Rc<RefCell<Environment<'a>>>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment<'a>>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind `name` in this frame, overwriting any existing binding here.
    pub fn define(&mut self, name: &'a str, value: Value<'a>) {
        self.values.insert(name, value);
    }

    /// Look `name` up through the whole chain.  `None` means unbound;
    /// the caller decides how to report that.
    pub fn get(&self, name: &str) -> Option<Value<'a>> {
        if let Some(value) = self.values.get(name) {
            Some(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            None
        }
    }

    /// Overwrite the nearest existing binding of `name`.  Returns whether
    /// a binding was found; assignment never creates one.
    pub fn assign(&mut self, name: &str, value: Value<'a>) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            true
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            false
        }
    }

    /// Read `name` exactly `depth` frames up the chain.
    pub fn get_at(&self, depth: usize, name: &str) -> Option<Value<'a>> {
        if depth == 0 {
            return self.values.get(name).cloned();
        }

        match &self.enclosing {
            Some(parent) => parent.borrow().get_at(depth - 1, name),
            None => None,
        }
    }

    /// Overwrite `name` exactly `depth` frames up the chain.  Returns
    /// whether that frame held a binding.
    pub fn assign_at(&mut self, depth: usize, name: &str, value: Value<'a>) -> bool {
        if depth == 0 {
            if let Some(slot) = self.values.get_mut(name) {
                *slot = value;
                return true;
            }
            return false;
        }

        match &self.enclosing {
            Some(parent) => parent.borrow_mut().assign_at(depth - 1, name, value),
            None => false,
        }
    }
}
