/*!
Tree‑walking evaluator.

Walks the parsed statement list directly, threading values through a
chain of [`Environment`] frames.  Three semantic rules set this dialect
apart and are worth keeping in mind when reading the match arms below:

* **Truthiness is strict.**  Only the boolean `true` is truthy; every
  other value (`nil`, `0`, `""`, functions) is falsy.  `!`, `if`,
  `while`, `and` and `or` all go through [`is_truthy`].
* **Logical operators produce booleans.**  `a or b` / `a and b`
  short‑circuit on the left operand but always evaluate to a `Bool`,
  never to either operand itself.
* **`return` is a completion, not an error.**  Statement execution
  yields a [`Completion`]; `Return` unwinds block and loop execution
  until the nearest function call boundary catches it.  Runtime faults
  stay on the `Err` channel and abort the program.

Variable occurrences resolved by the static pass carry a frame distance
in the [`Locals`] side table and are read with a direct hop; everything
else goes straight to the global frame.  Walking the runtime chain for
unresolved names would be wrong, not just slow: a closure resolved
before a later `var` in the same block must keep seeing the global,
even once the block frame holds a binding with that name.
*/

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use log::{debug, info};

use crate::environment::Environment;
use crate::error::{Result, RuntimeError};
use crate::parser::{Expr, ExprId, LiteralValue, Stmt};
use crate::resolver::Locals;
use crate::token::{Token, TokenType};
use crate::value::{LoxFunction, Value};

/// How a statement finished: fell off the end, or hit `return`.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<'a> {
    Normal,
    Return(Value<'a>),
}

pub struct Interpreter<'a> {
    globals: Rc<RefCell<Environment<'a>>>,
    environment: Rc<RefCell<Environment<'a>>>,
    locals: Locals,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter whose current frame is the global frame.
    pub fn new() -> Self {
        info!("Initializing Interpreter");

        let globals: Rc<RefCell<Environment<'a>>> = Rc::new(RefCell::new(Environment::new()));

        Self {
            environment: globals.clone(),
            globals,
            locals: Locals::new(),
        }
    }

    /// Interprets a list of statements (a "program") under the binding
    /// distances recorded by the resolver.
    pub fn interpret(&mut self, statements: &'a [Stmt<'a>], locals: Locals) -> Result<()> {
        debug!(
            "Interpreting {} statements with {} resolved local(s)",
            statements.len(),
            locals.len()
        );

        self.locals = locals;

        for stmt in statements {
            debug!("Executing statement: {:?}", stmt);

            if let Completion::Return(value) = self.execute(stmt)? {
                // The resolver rejects top-level `return`; if one slips
                // through (unresolved input), stop the program here.
                debug!("Top-level return with value {}; halting", value);
                break;
            }
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &'a Stmt<'a>) -> Result<Completion<'a>> {
        match stmt {
            Stmt::Expression(expr) => {
                debug!("Evaluating expression statement");
                let _ = self.evaluate(expr)?;
                Ok(Completion::Normal)
            }

            Stmt::Print(expr) => {
                debug!("Evaluating print statement");
                let value: Value<'a> = self.evaluate(expr)?;
                println!("{}", value);
                info!("Printed value: {}", value);
                Ok(Completion::Normal)
            }

            Stmt::Var { name, initializer } => {
                debug!("Defining variable '{}'", name.lexeme);
                // `var x;` parses with a Nop initializer, which evaluates
                // to nil; the declaration always binds something.
                let value: Value<'a> = self.evaluate(initializer)?;
                self.environment
                    .borrow_mut()
                    .define(name.lexeme, value.clone());
                info!("Variable '{}' defined with value: {}", name.lexeme, value);
                Ok(Completion::Normal)
            }

            Stmt::Block(statements) => {
                debug!("Entering block with {} statements", statements.len());
                let frame: Environment<'a> =
                    Environment::with_enclosing(self.environment.clone());
                self.execute_block(statements, frame)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                debug!("Evaluating if condition");
                let cond_value: Value<'a> = self.evaluate(condition)?;
                if is_truthy(&cond_value) {
                    debug!("Condition is truthy; executing then branch");
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    debug!("Condition is falsy; executing else branch");
                    self.execute(else_stmt)
                } else {
                    Ok(Completion::Normal)
                }
            }

            Stmt::While { condition, body } => {
                debug!("Entering while loop");
                while is_truthy(&self.evaluate(condition)?) {
                    debug!("While condition is truthy; executing body");
                    if let Completion::Return(value) = self.execute(body)? {
                        return Ok(Completion::Return(value));
                    }
                }
                info!("Exited while loop");
                Ok(Completion::Normal)
            }

            Stmt::Function { name, params, body } => {
                debug!("Defining function '{}'", name.lexeme);
                // Capture the current frame; the body borrows the AST.
                let function: LoxFunction<'a> = LoxFunction {
                    name,
                    params,
                    body,
                    closure: self.environment.clone(),
                };
                self.environment
                    .borrow_mut()
                    .define(name.lexeme, Value::Function(Rc::new(function)));
                info!(
                    "Function '{}' defined with {} parameters",
                    name.lexeme,
                    params.len()
                );
                Ok(Completion::Normal)
            }

            Stmt::Return { value, .. } => {
                debug!("Executing return statement");
                let result: Value<'a> = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", result);
                Ok(Completion::Return(result))
            }
        }
    }

    /// Run `statements` inside `frame`, restoring the previous frame on
    /// every exit path (normal completion, `return`, or runtime error).
    fn execute_block(
        &mut self,
        statements: &'a [Stmt<'a>],
        frame: Environment<'a>,
    ) -> Result<Completion<'a>> {
        let previous: Rc<RefCell<Environment<'a>>> =
            mem::replace(&mut self.environment, Rc::new(RefCell::new(frame)));

        let mut outcome: Result<Completion<'a>> = Ok(Completion::Normal);
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Completion::Normal) => continue,
                other => {
                    outcome = other;
                    break;
                }
            }
        }

        self.environment = previous;
        outcome
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &'a Expr<'a>) -> Result<Value<'a>> {
        debug!("Evaluating expression: {:?}", expr);

        let value: Value<'a> = match expr {
            Expr::Literal(lit) => match lit {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            },

            Expr::Nop => Value::Nil,

            Expr::Grouping(inner) => self.evaluate(inner)?,

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right)?,

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right)?,

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right)?,

            Expr::Variable { name, id } => self.lookup_variable(name, *id)?,

            Expr::Assign { name, id, value } => {
                debug!("Assigning to variable '{}'", name.lexeme);
                let val: Value<'a> = self.evaluate(value)?;

                let assigned: bool = match self.locals.get(id) {
                    Some(&depth) => self.environment.borrow_mut().assign_at(
                        depth,
                        name.lexeme,
                        val.clone(),
                    ),
                    None => self.globals.borrow_mut().assign(name.lexeme, val.clone()),
                };

                if !assigned {
                    return Err(
                        RuntimeError::undefined_variable(name.line, name.lexeme).into()
                    );
                }

                info!("Assigned value {} to '{}'", val, name.lexeme);
                val
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                debug!("Evaluating function call");
                let callee_val: Value<'a> = self.evaluate(callee)?;

                let Value::Function(function) = callee_val else {
                    return Err(RuntimeError::NotCallable { line: paren.line }.into());
                };

                let mut arg_values: Vec<Value<'a>> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    let av: Value<'a> = self.evaluate(arg)?;
                    debug!("Evaluated argument => {}", av);
                    arg_values.push(av);
                }

                if arg_values.len() != function.arity() {
                    return Err(RuntimeError::ArityMismatch {
                        expected: function.arity(),
                        got: arg_values.len(),
                        line: paren.line,
                    }
                    .into());
                }

                self.call_function(&function, arg_values)?
            }
        };

        debug!("Expression evaluated to: {}", value);
        Ok(value)
    }

    /// Runs a user function: one fresh frame over the captured closure,
    /// parameters bound, body executed against that frame.
    fn call_function(
        &mut self,
        function: &Rc<LoxFunction<'a>>,
        arg_values: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("Calling function '{}'", function.name.lexeme);

        let mut frame: Environment<'a> = Environment::with_enclosing(function.closure.clone());
        for (param, arg_val) in function.params.iter().zip(arg_values) {
            debug!("Binding parameter '{}' to {}", param.lexeme, arg_val);
            frame.define(param.lexeme, arg_val);
        }

        match self.execute_block(function.body, frame)? {
            Completion::Return(value) => {
                info!("Function '{}' returned: {}", function.name.lexeme, value);
                Ok(value)
            }
            Completion::Normal => {
                info!("Function '{}' returned nil", function.name.lexeme);
                Ok(Value::Nil)
            }
        }
    }

    /// Evaluates a unary expression.
    fn evaluate_unary(&mut self, op: &'a Token<'a>, expr: &'a Expr<'a>) -> Result<Value<'a>> {
        debug!("Evaluating unary operation: {}", op.lexeme);
        let right_val: Value<'a> = self.evaluate(expr)?;

        match op.token_type {
            TokenType::MINUS => {
                if let Value::Number(n) = right_val {
                    Ok(Value::Number(-n))
                } else {
                    Err(RuntimeError::type_mismatch(op.line, "Operand must be a number").into())
                }
            }

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&right_val))),

            _ => Err(RuntimeError::type_mismatch(op.line, "Invalid unary operator").into()),
        }
    }

    /// Short-circuiting `and` / `or`.  The result is always a boolean;
    /// the right operand is only evaluated when the left does not decide.
    fn evaluate_logical(
        &mut self,
        left: &'a Expr<'a>,
        op: &'a Token<'a>,
        right: &'a Expr<'a>,
    ) -> Result<Value<'a>> {
        debug!("Evaluating logical operation: {}", op.lexeme);
        let left_val: Value<'a> = self.evaluate(left)?;

        match op.token_type {
            TokenType::OR => {
                if is_truthy(&left_val) {
                    return Ok(Value::Bool(true));
                }
                let right_val: Value<'a> = self.evaluate(right)?;
                Ok(Value::Bool(is_truthy(&right_val)))
            }

            TokenType::AND => {
                if !is_truthy(&left_val) {
                    return Ok(Value::Bool(false));
                }
                let right_val: Value<'a> = self.evaluate(right)?;
                Ok(Value::Bool(is_truthy(&right_val)))
            }

            _ => Err(RuntimeError::type_mismatch(op.line, "Invalid logical operator").into()),
        }
    }

    /// Evaluates a binary expression.
    fn evaluate_binary(
        &mut self,
        left: &'a Expr<'a>,
        op: &'a Token<'a>,
        right: &'a Expr<'a>,
    ) -> Result<Value<'a>> {
        debug!("Evaluating binary operation: {}", op.lexeme);
        let left_val: Value<'a> = self.evaluate(left)?;
        let right_val: Value<'a> = self.evaluate(right)?;
        debug!("Left operand: {}, Right operand: {}", left_val, right_val);

        match op.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(RuntimeError::type_mismatch(
                    op.line,
                    "Operands must be two numbers or two strings",
                )
                .into()),
            },

            TokenType::MINUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
                _ => {
                    Err(RuntimeError::type_mismatch(op.line, "Operands must be numbers").into())
                }
            },

            TokenType::STAR => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
                _ => {
                    Err(RuntimeError::type_mismatch(op.line, "Operands must be numbers").into())
                }
            },

            // IEEE-754 division: x/0 is ±inf (or NaN for 0/0), not an error.
            TokenType::SLASH => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
                _ => {
                    Err(RuntimeError::type_mismatch(op.line, "Operands must be numbers").into())
                }
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),

            TokenType::LESS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),
                _ => {
                    Err(RuntimeError::type_mismatch(op.line, "Operands must be numbers").into())
                }
            },

            TokenType::LESS_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),
                _ => {
                    Err(RuntimeError::type_mismatch(op.line, "Operands must be numbers").into())
                }
            },

            TokenType::GREATER => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),
                _ => {
                    Err(RuntimeError::type_mismatch(op.line, "Operands must be numbers").into())
                }
            },

            TokenType::GREATER_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),
                _ => {
                    Err(RuntimeError::type_mismatch(op.line, "Operands must be numbers").into())
                }
            },

            _ => Err(RuntimeError::type_mismatch(op.line, "Invalid binary operator").into()),
        }
    }

    /// Resolved occurrences hop straight to their frame; unresolved ones
    /// read the global frame directly, never the intervening locals.
    fn lookup_variable(&self, name: &'a Token<'a>, id: ExprId) -> Result<Value<'a>> {
        debug!("Looking up variable '{}'", name.lexeme);

        let found: Option<Value<'a>> = match self.locals.get(&id) {
            Some(&depth) => self.environment.borrow().get_at(depth, name.lexeme),
            None => self.globals.borrow().get(name.lexeme),
        };

        match found {
            Some(value) => {
                debug!("Variable '{}' evaluated to: {}", name.lexeme, value);
                Ok(value)
            }
            None => Err(RuntimeError::undefined_variable(name.line, name.lexeme).into()),
        }
    }

    // ──────────────────────── state inspection ────────────────────────

    /// Is `name` bound anywhere on the current chain?  Test support.
    pub fn is_defined(&self, name: &str) -> bool {
        self.environment.borrow().get(name).is_some()
    }

    /// Current binding of `name`, if any.  Test support.
    pub fn get_value(&self, name: &str) -> Option<Value<'a>> {
        self.environment.borrow().get(name)
    }
}

/// Strict truthiness: `true` and nothing else.
fn is_truthy(value: &Value) -> bool {
    let result: bool = matches!(value, Value::Bool(true));
    debug!("Truthiness of {} => {}", value, result);
    result
}
