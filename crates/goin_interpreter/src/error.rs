use thiserror::Error;

use goin_parser::token::Token;

/// Failures while evaluating a program.
///
/// These are never raised as host errors; the evaluator wraps them in
/// `Object::Error` and lets them bubble up like a return value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    /// When referencing an identifier that has not been bound in any enclosing scope
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    /// When attempting a prefix operation on an invalid type (e.g. -true)
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: Token,
        right: &'static str,
    },
    /// When attempting an infix operation the operand types don't support (e.g. true + false)
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        operator: Token,
        left: &'static str,
        right: &'static str,
    },
    /// When the operands of an infix operation are of different types (e.g. 5 + true)
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        operator: Token,
        left: &'static str,
        right: &'static str,
    },
    /// When an object that is not a function is used with call syntax
    #[error("not a function: {0}")]
    NotAFunction(&'static str),
    /// When a call's argument count does not match the function's parameter count
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    BadArity { expected: usize, got: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow: {expression}")]
    IntegerOverflow { expression: String },
    /// When nested function calls go deeper than the evaluator allows
    #[error("maximum call depth of {0} exceeded")]
    MaxCallDepthExceeded(usize),
}
