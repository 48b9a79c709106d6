//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) must convert their
//! internal failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow`, while still preserving rich diagnostic detail.
//!
//! Every kind is fatal at its stage: a single error terminates the whole run.
//! Runtime failures are a separate [`RuntimeError`] enum so that a host
//! embedding the interpreter can match on the failure *kind* (type mismatch,
//! arity, undefined variable, not callable) without parsing a message string.
//!
//! The module **does not** print diagnostics itself

use std::io;
use thiserror::Error;

use log::info;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    /// The only fatal lexical condition is an unterminated string literal.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.  Always aborts the entire parse.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },

    /// Static‑analysis or resolution failure (e.g. early‑binding errors).
    #[error("[line {line}] Error: {message}")]
    Resolve { message: String, line: usize },

    /// Runtime evaluation error, categorised by kind.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 validation failure when ingesting external source text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

/// Runtime failure kinds raised during evaluation.
///
/// Each variant carries the 1‑based source line of the token that triggered
/// it, so a host can report locations without re‑scanning the source.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// An operand does not satisfy an operator's type requirement.
    #[error("[line {line}] Runtime error: {message}")]
    TypeMismatch { message: String, line: usize },

    /// A call supplied the wrong number of arguments.
    #[error("[line {line}] Runtime error: Expected {expected} arguments but got {got}")]
    ArityMismatch {
        expected: usize,
        got: usize,
        line: usize,
    },

    /// A read or assignment targeted a name absent from the entire
    /// environment chain.
    #[error("[line {line}] Runtime error: Undefined variable '{name}'")]
    UndefinedVariable { name: String, line: usize },

    /// The target of a call expression is not a function value.
    #[error("[line {line}] Runtime error: Can only call functions")]
    NotCallable { line: usize },
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        LoxError::Parse { message, line }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", line, message);

        LoxError::Resolve { message, line }
    }
}

impl RuntimeError {
    /// Helper constructor for operand type failures.
    pub fn type_mismatch<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating TypeMismatch error: line={}, msg={}", line, message);

        RuntimeError::TypeMismatch { message, line }
    }

    /// Helper constructor for undefined variable reads/assignments.
    pub fn undefined_variable<S: Into<String>>(line: usize, name: S) -> Self {
        let name: String = name.into();

        info!(
            "Creating UndefinedVariable error: line={}, name={}",
            line, name
        );

        RuntimeError::UndefinedVariable { name, line }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
