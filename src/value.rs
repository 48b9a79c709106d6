use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::environment::Environment;
use crate::parser::Stmt;
use crate::token::Token;

/// A runtime value.  `Function` is reference-counted so that every
/// occurrence of a function value shares one callable identity.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    Number(f64),
    String(String),
    Bool(bool),
    Function(Rc<LoxFunction<'a>>),
    Nil,
}

/// A user-declared function together with its captured defining
/// environment.  Parameter and body slices borrow straight from the AST.
pub struct LoxFunction<'a> {
    pub name: &'a Token<'a>,
    pub params: &'a [&'a Token<'a>],
    pub body: &'a [Stmt<'a>],
    pub closure: Rc<RefCell<Environment<'a>>>,
}

impl<'a> LoxFunction<'a> {
    #[inline(always)]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Debug for LoxFunction<'_> {
    // The closure chain can reach back to this function, so the derived
    // impl would recurse.  Print the identity only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name.lexeme)
    }
}

impl PartialEq for Value<'_> {
    /// Structural equality between like variants; functions compare by
    /// identity; mismatched variants are simply unequal, never an error.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Nil, Value::Nil) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    // 3.0 prints as 3
                    let mut buffer: itoa::Buffer = itoa::Buffer::new();
                    write!(f, "{}", buffer.format(*n as i64))
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Function(func) => write!(f, "<fn {}>", func.name.lexeme),

            Value::Nil => write!(f, "nil"),
        }
    }
}
