use std::{cell::RefCell, fmt::Display, rc::Rc};

use crate::{environment::Environment, error::RuntimeError};

use goin_parser::ast::{join, BlockStatement, IdentifierLiteral};

thread_local! {
    static TRUE: Rc<Object> = Rc::new(Object::Boolean(true));
    static FALSE: Rc<Object> = Rc::new(Object::Boolean(false));
    static NULL: Rc<Object> = Rc::new(Object::Null);
}

#[derive(Debug, PartialEq)]
pub enum Object {
    Integer(i64),
    /// Only ever created through `Object::native_bool`
    Boolean(bool),
    /// Only ever created through `Object::null`
    Null,
    /// Special object to encapsulate a return-ed value while it goes up scopes.
    /// This is never seen by the user.
    ReturnValue(Rc<Object>),
    Error(RuntimeError),
    Function(Function),
}

impl Object {
    /// The shared `true` or `false` instance.
    ///
    /// Booleans are compared by identity, so every boolean the evaluator
    /// hands out must come from here.
    pub fn native_bool(value: bool) -> Rc<Object> {
        if value {
            TRUE.with(Rc::clone)
        } else {
            FALSE.with(Rc::clone)
        }
    }

    /// The shared `null` instance.
    pub fn null() -> Rc<Object> {
        NULL.with(Rc::clone)
    }

    pub fn typename(&self) -> &'static str {
        use Object::*;

        match self {
            Integer(_) => "INTEGER",
            Boolean(_) => "BOOLEAN",
            Null => "NULL",
            Function(_) => "FUNCTION",
            ReturnValue(obj) => obj.typename(),
            Error(_) => "ERROR",
        }
    }

    /// Whether this value must stop the evaluation of whatever encloses it.
    pub fn is_return_or_error(&self) -> bool {
        matches!(self, Self::ReturnValue(_) | Self::Error(_))
    }

    /// Only `false` and `null` are falsy, everything else (including `0`) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Boolean(value) => *value,
            Object::Null => false,
            _ => true,
        }
    }

    /// Converts the given value to the text shown to the user (e.g. in the REPL).
    ///
    /// # Examples
    /// ```rust
    /// use goin_interpreter::object::Object;
    ///
    /// assert_eq!(Object::Integer(5).inspect(), "5");
    /// assert_eq!(Object::null().inspect(), "null");
    /// ```
    pub fn inspect(&self) -> String {
        self.to_string()
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Object::*;

        match self {
            Integer(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),
            Null => write!(f, "null"),
            Function(func) => write!(f, "{}", func),
            ReturnValue(obj) => write!(f, "{}", obj),
            Error(err) => write!(f, "ERROR: {}", err),
        }
    }
}

pub struct Function {
    pub parameters: Vec<IdentifierLiteral>,
    pub body: Rc<BlockStatement>,
    /// The environment the function was defined in, shared rather than copied
    pub env: Rc<RefCell<Environment>>,
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn({}) {{ {} }}", join(&self.parameters), self.body)
    }
}

// The captured environment usually contains the function itself, so it is left out.
impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body.to_string())
            .finish()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Function) -> bool {
        self.parameters == other.parameters
            && Rc::ptr_eq(&self.body, &other.body)
            && Rc::ptr_eq(&self.env, &other.env)
    }
}
