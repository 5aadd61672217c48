use std::{cell::RefCell, rc::Rc};

use tracing::{debug, trace};

use crate::{
    environment::Environment,
    error::RuntimeError,
    object::{Function, Object},
};

use goin_parser::{
    ast::{BlockStatement, Expression, IfExpression, Program, Statement},
    stack::ensure_sufficient_stack,
    token::Token,
};

/// How many nested function calls are allowed before evaluation gives up.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 2048;

/// Evaluate `program` against `env`, returning the value of the last statement.
///
/// Errors are returned as `Object::Error` values. The program must come from a
/// parse that produced no errors.
pub fn eval(program: &Program, env: &Rc<RefCell<Environment>>) -> Rc<Object> {
    Evaluator::new_with_env(Rc::clone(env)).eval(program)
}

pub struct Evaluator {
    env: Rc<RefCell<Environment>>,
    max_call_depth: usize,
    call_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::new_with_env(Rc::new(RefCell::new(Environment::new())))
    }

    pub fn new_with_env(env: Rc<RefCell<Environment>>) -> Self {
        Evaluator {
            env,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            call_depth: 0,
        }
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn eval(&mut self, prog: &Program) -> Rc<Object> {
        let mut result = Object::null();

        for stmt in &prog.statements {
            let val = self.eval_statement(stmt);

            match val.as_ref() {
                // If a return value is found, immediately return and stop evaluating statements
                // Unwrap the return value into a final value so the program can use it
                Object::ReturnValue(inner_value) => return Rc::clone(inner_value),
                Object::Error(_) => return val,
                _ => result = val,
            }
        }

        result
    }

    // Similar to eval (for programs) but doesn't unwrap return values
    fn eval_block_statement(&mut self, block: &BlockStatement) -> Rc<Object> {
        let mut result = Object::null();

        for stmt in &block.statements {
            let val = self.eval_statement(stmt);

            match val.as_ref() {
                // Don't unwrap the return value, we might be in a nested block which also needs to return
                Object::ReturnValue(_) | Object::Error(_) => return val,
                _ => result = val,
            }
        }

        result
    }

    fn eval_statement(&mut self, stmt: &Statement) -> Rc<Object> {
        match stmt {
            Statement::Expression { expression } => self.eval_expression(expression),
            Statement::Return { value } => {
                let obj = match value {
                    Some(value) => self.eval_expression(value),
                    None => Object::null(),
                };

                // Errors and nested returns already bubble up, so they are not wrapped again
                if obj.is_return_or_error() {
                    return obj;
                }

                Rc::new(Object::ReturnValue(obj))
            }
            Statement::Let { name, value } => {
                let obj = self.eval_expression(value);
                if obj.is_return_or_error() {
                    return obj;
                }

                // Always the current environment, shadowing any outer binding
                self.env.borrow_mut().set(name.name.clone(), obj);

                Object::null()
            }
        }
    }

    fn eval_expression(&mut self, expr: &Expression) -> Rc<Object> {
        ensure_sufficient_stack(|| match expr {
            Expression::Integer(value) => Rc::new(Object::Integer(*value)),
            Expression::Boolean(value) => Object::native_bool(*value),
            Expression::Identifier(identifier) => self.eval_identifier(&identifier.name),

            Expression::Prefix(prefix) => {
                let right = self.eval_expression(&prefix.right);
                if right.is_return_or_error() {
                    return right;
                }
                self.eval_prefix_expression(&prefix.operator, right)
            }
            Expression::Infix(infix) => {
                let left = self.eval_expression(&infix.left);
                if left.is_return_or_error() {
                    return left;
                }
                let right = self.eval_expression(&infix.right);
                if right.is_return_or_error() {
                    return right;
                }
                self.eval_infix_expression(&infix.operator, left, right)
            }

            Expression::If(if_expr) => self.eval_if_expression(if_expr),

            Expression::Function(func) => Rc::new(Object::Function(Function {
                parameters: func.parameters.clone(),
                body: Rc::clone(&func.body),
                env: Rc::clone(&self.env),
            })),
            Expression::Call(call) => {
                let func = self.eval_expression(&call.function);
                if func.is_return_or_error() {
                    return func;
                }
                let args = match self.eval_expressions(&call.arguments) {
                    Ok(args) => args,
                    Err(err) => return err,
                };

                self.apply_function(func, args)
            }
        })
    }

    /// Evaluate expressions left to right, stopping at the first error or `return`.
    fn eval_expressions(&mut self, exprs: &[Expression]) -> Result<Vec<Rc<Object>>, Rc<Object>> {
        let mut result = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let evaluated = self.eval_expression(expr);
            if evaluated.is_return_or_error() {
                return Err(evaluated);
            }
            result.push(evaluated);
        }
        Ok(result)
    }

    fn eval_identifier(&self, name: &str) -> Rc<Object> {
        let result = self.env.borrow().get(name);

        match result {
            Some(obj) => obj,
            None => error(RuntimeError::IdentifierNotFound(name.to_owned())),
        }
    }

    fn eval_prefix_expression(&self, operator: &Token, right: Rc<Object>) -> Rc<Object> {
        match operator {
            Token::Bang => Object::native_bool(!right.is_truthy()),
            Token::Minus => self.eval_minus_prefix_operator_expression(right),
            _ => error(RuntimeError::UnknownPrefixOperator {
                operator: operator.clone(),
                right: right.typename(),
            }),
        }
    }

    fn eval_minus_prefix_operator_expression(&self, right: Rc<Object>) -> Rc<Object> {
        match *right {
            Object::Integer(value) => match value.checked_neg() {
                Some(negated) => Rc::new(Object::Integer(negated)),
                None => error(RuntimeError::IntegerOverflow {
                    expression: format!("-{}", value),
                }),
            },
            _ => error(RuntimeError::UnknownPrefixOperator {
                operator: Token::Minus,
                right: right.typename(),
            }),
        }
    }

    fn eval_infix_expression(
        &self,
        operator: &Token,
        left: Rc<Object>,
        right: Rc<Object>,
    ) -> Rc<Object> {
        match (left.as_ref(), right.as_ref()) {
            (Object::Integer(left_value), Object::Integer(right_value)) => {
                self.eval_integer_infix_expression(operator, *left_value, *right_value)
            }

            (l, r) if std::mem::discriminant(l) != std::mem::discriminant(r) => {
                error(RuntimeError::TypeMismatch {
                    operator: operator.clone(),
                    left: l.typename(),
                    right: r.typename(),
                })
            }

            // Booleans and null are singletons, so identity is equality
            _ => match operator {
                Token::EqualEqual => Object::native_bool(Rc::ptr_eq(&left, &right)),
                Token::BangEqual => Object::native_bool(!Rc::ptr_eq(&left, &right)),
                operator => error(RuntimeError::UnknownInfixOperator {
                    operator: operator.clone(),
                    left: left.typename(),
                    right: right.typename(),
                }),
            },
        }
    }

    fn eval_integer_infix_expression(
        &self,
        operator: &Token,
        left_value: i64,
        right_value: i64,
    ) -> Rc<Object> {
        let result = match operator {
            Token::Plus => left_value.checked_add(right_value),
            Token::Minus => left_value.checked_sub(right_value),
            Token::Star => left_value.checked_mul(right_value),
            Token::Slash if right_value == 0 => return error(RuntimeError::DivisionByZero),
            Token::Slash => left_value.checked_div(right_value),

            Token::LessThan => return Object::native_bool(left_value < right_value),
            Token::LessEqual => return Object::native_bool(left_value <= right_value),
            Token::GreaterThan => return Object::native_bool(left_value > right_value),
            Token::GreaterEqual => return Object::native_bool(left_value >= right_value),
            Token::EqualEqual => return Object::native_bool(left_value == right_value),
            Token::BangEqual => return Object::native_bool(left_value != right_value),

            operator => {
                return error(RuntimeError::UnknownInfixOperator {
                    operator: operator.clone(),
                    left: "INTEGER",
                    right: "INTEGER",
                })
            }
        };

        match result {
            Some(value) => Rc::new(Object::Integer(value)),
            None => error(RuntimeError::IntegerOverflow {
                expression: format!("{} {} {}", left_value, operator, right_value),
            }),
        }
    }

    fn eval_if_expression(&mut self, if_expr: &IfExpression) -> Rc<Object> {
        let condition = self.eval_expression(&if_expr.condition);
        if condition.is_return_or_error() {
            return condition;
        }

        if condition.is_truthy() {
            self.eval_block_statement(&if_expr.consequence)
        } else if let Some(alternative) = &if_expr.alternative {
            self.eval_block_statement(alternative)
        } else {
            Object::null()
        }
    }

    fn apply_function(&mut self, func: Rc<Object>, args: Vec<Rc<Object>>) -> Rc<Object> {
        let func = match func.as_ref() {
            Object::Function(func) => func,
            obj => return error(RuntimeError::NotAFunction(obj.typename())),
        };

        // Check that number of args & params matches
        if args.len() != func.parameters.len() {
            return error(RuntimeError::BadArity {
                expected: func.parameters.len(),
                got: args.len(),
            });
        }

        if self.call_depth >= self.max_call_depth {
            return error(RuntimeError::MaxCallDepthExceeded(self.max_call_depth));
        }

        // Create a new scoped environment for the function, enclosed by the one it was defined in
        let mut scoped_env = Environment::new_enclosed(Rc::clone(&func.env));

        // Add arguments as variables in function's environment
        for (ident, obj) in func.parameters.iter().zip(args) {
            scoped_env.set(ident.name.clone(), obj);
        }

        let scoped_env = Rc::new(RefCell::new(scoped_env));
        trace!(
            depth = scoped_env.borrow().depth(),
            call_depth = self.call_depth,
            "entering function"
        );

        // Remember current environment (when exiting from call)
        let current_env = std::mem::replace(&mut self.env, scoped_env);
        self.call_depth += 1;

        let result = self.eval_block_statement(&func.body);

        self.call_depth -= 1;
        self.env = current_env;

        trace!(call_depth = self.call_depth, "leaving function");

        match result.as_ref() {
            Object::ReturnValue(inner_value) => Rc::clone(inner_value),
            _ => result,
        }
    }
}

fn error(err: RuntimeError) -> Rc<Object> {
    debug!(error = %err, "runtime error");
    Rc::new(Object::Error(err))
}
