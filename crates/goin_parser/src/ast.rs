use crate::{stack::ensure_sufficient_stack, token::Token};
use std::{fmt::Display, rc::Rc};

/// Behaviour shared by every node of the tree.
///
/// `Display` renders the node back into canonical source, with every
/// expression fully parenthesised so that precedence is visible.
pub trait Node: Display {
    /// The literal of the node's leading token. Only meant for debugging and tests.
    fn token_literal(&self) -> String;
}

#[derive(Debug, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            statements: Vec::new(),
        }
    }
}

impl Node for Program {
    fn token_literal(&self) -> String {
        match self.statements.first() {
            Some(stmt) => stmt.token_literal(),
            None => String::new(),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub enum Statement {
    Let {
        /// The name/identifier of the variable
        name: IdentifierLiteral,
        /// The value being assigned
        value: Expression,
    },
    Return {
        /// The value being returned, absent for a bare `return;`
        value: Option<Expression>,
    },
    Expression {
        /// The expression for this statement
        expression: Expression,
    },
}

impl Node for Statement {
    fn token_literal(&self) -> String {
        match self {
            Statement::Let { .. } => Token::Let.literal(),
            Statement::Return { .. } => Token::Return.literal(),
            Statement::Expression { expression } => expression.token_literal(),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;

        match self {
            Let { name, value } => write!(
                f,
                "{tok} {ident} = {val};",
                tok = Token::Let,
                ident = name,
                val = value
            ),
            Return { value: Some(value) } => write!(f, "{} {};", Token::Return, value),
            Return { value: None } => write!(f, "{};", Token::Return),
            Expression { expression } => write!(f, "{}", expression),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Expression {
    // Literal
    Identifier(IdentifierLiteral),
    Integer(i64),
    Boolean(bool),

    // Complex
    Prefix(Box<PrefixExpression>),
    Infix(Box<InfixExpression>),
    If(Box<IfExpression>),
    Function(Box<FunctionLiteral>),
    Call(Box<CallExpression>),
}

impl Node for Expression {
    fn token_literal(&self) -> String {
        use Expression::*;

        match self {
            Identifier(ident) => ident.name.clone(),
            Integer(value) => Token::Integer(*value).literal(),
            Boolean(value) => value.to_string(),

            Prefix(prefix) => prefix.operator.literal(),
            Infix(infix) => infix.operator.literal(),
            If(_) => Token::If.literal(),
            Function(_) => Token::Fn.literal(),
            Call(_) => Token::LeftParen.literal(),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;

        ensure_sufficient_stack(|| match self {
            Identifier(name) => write!(f, "{}", name),
            Integer(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),

            Prefix(prefix) => write!(f, "{}", prefix),
            Infix(infix) => write!(f, "{}", infix),
            If(if_exp) => write!(f, "{}", if_exp),
            Function(func) => write!(f, "{}", func),
            Call(call) => write!(f, "{}", call),
        })
    }
}

// The derived drop glue recurses once per nesting level, so nested children
// are moved onto a worklist and freed one at a time instead.
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);

        while let Some(mut expr) = pending.pop() {
            expr.take_children(&mut pending);
        }
    }
}

impl Expression {
    fn has_children(&self) -> bool {
        !matches!(
            self,
            Expression::Identifier(_) | Expression::Integer(_) | Expression::Boolean(_)
        )
    }

    /// Move every nested child expression into `out`, leaving leaves behind.
    fn take_children(&mut self, out: &mut Vec<Expression>) {
        let mut take = |expr: &mut Expression| {
            if expr.has_children() {
                out.push(std::mem::replace(expr, Expression::Boolean(false)));
            }
        };

        match self {
            Expression::Identifier(_) | Expression::Integer(_) | Expression::Boolean(_) => {}
            Expression::Prefix(prefix) => take(&mut prefix.right),
            Expression::Infix(infix) => {
                take(&mut infix.left);
                take(&mut infix.right);
            }
            Expression::If(if_exp) => {
                take(&mut if_exp.condition);
                take_block(&mut if_exp.consequence, &mut take);
                if let Some(alternative) = &mut if_exp.alternative {
                    take_block(alternative, &mut take);
                }
            }
            // A body still shared with a function object is freed by its last owner
            Expression::Function(func) => {
                if let Some(body) = Rc::get_mut(&mut func.body) {
                    take_block(body, &mut take);
                }
            }
            Expression::Call(call) => {
                take(&mut call.function);
                call.arguments.iter_mut().for_each(&mut take);
            }
        }
    }
}

fn take_block(block: &mut BlockStatement, take: &mut impl FnMut(&mut Expression)) {
    for stmt in &mut block.statements {
        match stmt {
            Statement::Let { value, .. } => take(value),
            Statement::Return { value: Some(value) } => take(value),
            Statement::Return { value: None } => {}
            Statement::Expression { expression } => take(expression),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct IdentifierLiteral {
    pub name: String,
}

impl Display for IdentifierLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for IdentifierLiteral {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

impl From<String> for IdentifierLiteral {
    fn from(name: String) -> Self {
        Self { name }
    }
}

#[derive(Debug, PartialEq)]
pub struct PrefixExpression {
    pub operator: Token,
    pub right: Expression,
}

impl Display for PrefixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({op}{r})", op = self.operator, r = self.right)
    }
}

#[derive(Debug, PartialEq)]
pub struct InfixExpression {
    pub left: Expression,
    pub operator: Token,
    pub right: Expression,
}

impl Display for InfixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({l} {op} {r})",
            l = self.left,
            op = self.operator,
            r = self.right
        )
    }
}

#[derive(Debug, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl Node for BlockStatement {
    fn token_literal(&self) -> String {
        Token::LeftBrace.literal()
    }
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub struct IfExpression {
    pub condition: Expression,
    /// Block if condition is truthy
    pub consequence: BlockStatement,
    /// Block if condition is falsy
    pub alternative: Option<BlockStatement>,
}

impl Display for IfExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "if {} {}", self.condition, self.consequence)?;

        if let Some(ref alt) = self.alternative {
            write!(f, " else {}", alt)?;
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub struct FunctionLiteral {
    /// Parameter identifiers
    pub parameters: Vec<IdentifierLiteral>,
    /// Shared with every function object created from this literal
    pub body: Rc<BlockStatement>,
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) {}",
            Token::Fn,
            join(&self.parameters),
            self.body
        )
    }
}

#[derive(Debug, PartialEq)]
pub struct CallExpression {
    /// Identifier or function literal
    pub function: Expression,
    pub arguments: Vec<Expression>,
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function, join(&self.arguments))
    }
}

/// Comma-separate the given nodes.
pub fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    use crate::ast::{
        BlockStatement, Expression, FunctionLiteral, IdentifierLiteral, InfixExpression, Node,
        PrefixExpression, Program, Statement,
    };
    use crate::token::Token;

    #[test]
    fn test_display_program() {
        let program = Program {
            statements: vec![Statement::Let {
                name: IdentifierLiteral::from("myVar"),
                value: Expression::Identifier(IdentifierLiteral::from("anotherVar".to_string())),
            }],
        };

        assert_eq!(program.to_string(), "let myVar = anotherVar;");
        assert_eq!(program.token_literal(), "let");
    }

    #[test]
    fn test_display_return() {
        let program = Program {
            statements: vec![
                Statement::Return {
                    value: Some(Expression::Integer(5)),
                },
                Statement::Return { value: None },
            ],
        };

        assert_eq!(program.to_string(), "return 5;return;");
    }

    #[test]
    fn test_display_nested_expressions() {
        // -a * b
        let expression = Expression::Infix(Box::new(InfixExpression {
            left: Expression::Prefix(Box::new(PrefixExpression {
                operator: Token::Minus,
                right: Expression::Identifier(IdentifierLiteral::from("a")),
            })),
            operator: Token::Star,
            right: Expression::Identifier(IdentifierLiteral::from("b")),
        }));

        assert_eq!(expression.to_string(), "((-a) * b)");
        assert_eq!(expression.token_literal(), "*");
    }

    #[test]
    fn test_display_function() {
        let func = Expression::Function(Box::new(FunctionLiteral {
            parameters: vec![IdentifierLiteral::from("x"), IdentifierLiteral::from("y")],
            body: Rc::new(BlockStatement {
                statements: vec![Statement::Expression {
                    expression: Expression::Infix(Box::new(InfixExpression {
                        left: Expression::Identifier(IdentifierLiteral::from("x")),
                        operator: Token::Plus,
                        right: Expression::Identifier(IdentifierLiteral::from("y")),
                    })),
                }],
            }),
        }));

        assert_eq!(func.to_string(), "fn(x, y) (x + y)");
        assert_eq!(func.token_literal(), "fn");
    }

    #[test]
    fn test_empty_program_token_literal() {
        assert_eq!(Program::new().token_literal(), "");
    }
}
