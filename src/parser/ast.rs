use std::fmt;

use crate::lexer::Token;

/// An identifier carries its own token so `token_literal` stays cheap and
/// uniform across every node kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl Identifier {
    pub fn token_literal(&self) -> &str {
        &self.token.literal
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Statements: the things a `Program` or a `Block` is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let {
        token: Token,
        name: Identifier,
        value: Expression,
    },
    Return {
        token: Token,
        value: Expression,
    },
    Expression {
        token: Token,
        expression: Expression,
    },
    /// Not independently introducible by the user — only as a function body
    /// or an `if` branch.
    Block {
        token: Token,
        statements: Vec<Statement>,
    },
}

impl Statement {
    pub fn token_literal(&self) -> &str {
        match self {
            Statement::Let { token, .. }
            | Statement::Return { token, .. }
            | Statement::Expression { token, .. }
            | Statement::Block { token, .. } => &token.literal,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value, .. } => write!(f, "let {name} = {value};"),
            Statement::Return { value, .. } => write!(f, "return {value};"),
            Statement::Expression { expression, .. } => write!(f, "{expression}"),
            Statement::Block { statements, .. } => {
                for stmt in statements {
                    write!(f, "{stmt}")?;
                }
                Ok(())
            }
        }
    }
}

/// Expressions: every AST node that produces a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral {
        token: Token,
        value: i64,
    },
    BooleanLiteral {
        token: Token,
        value: bool,
    },
    StringLiteral {
        token: Token,
        value: String,
    },
    ArrayLiteral {
        token: Token,
        elements: Vec<Expression>,
    },
    FunctionLiteral {
        token: Token,
        parameters: Vec<Identifier>,
        body: Box<Statement>,
    },
    Prefix {
        token: Token,
        operator: String,
        right: Box<Expression>,
    },
    Infix {
        token: Token,
        left: Box<Expression>,
        operator: String,
        right: Box<Expression>,
    },
    If {
        token: Token,
        condition: Box<Expression>,
        consequence: Box<Statement>,
        alternative: Option<Box<Statement>>,
    },
    Call {
        token: Token,
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// Reserved for array subscription. Parsed but, per the evaluator's
    /// contract, only ever evaluated through the `[]`-natural-semantics path
    /// documented in DESIGN.md.
    Index {
        token: Token,
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

impl Expression {
    pub fn token_literal(&self) -> &str {
        match self {
            Expression::Identifier(ident) => ident.token_literal(),
            Expression::IntegerLiteral { token, .. }
            | Expression::BooleanLiteral { token, .. }
            | Expression::StringLiteral { token, .. }
            | Expression::ArrayLiteral { token, .. }
            | Expression::FunctionLiteral { token, .. }
            | Expression::Prefix { token, .. }
            | Expression::Infix { token, .. }
            | Expression::If { token, .. }
            | Expression::Call { token, .. }
            | Expression::Index { token, .. } => &token.literal,
        }
    }
}

fn join(items: &[impl fmt::Display], sep: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{ident}"),
            Expression::IntegerLiteral { token, .. } => write!(f, "{}", token.literal),
            Expression::BooleanLiteral { token, .. } => write!(f, "{}", token.literal),
            Expression::StringLiteral { token, .. } => write!(f, "{}", token.literal),
            Expression::ArrayLiteral { elements, .. } => {
                write!(f, "[{}]", join(elements, ", "))
            }
            Expression::FunctionLiteral {
                token,
                parameters,
                body,
            } => {
                write!(
                    f,
                    "{}({}) {}",
                    token.literal,
                    join(parameters, ", "),
                    body
                )
            }
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({operator}{right})"),
            Expression::Infix {
                left,
                operator,
                right,
                ..
            } => write!(f, "({left} {operator} {right})"),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if{condition} {consequence}")?;
                if let Some(alt) = alternative {
                    write!(f, " else {alt}")?;
                }
                Ok(())
            }
            Expression::Call {
                function,
                arguments,
                ..
            } => write!(f, "{function}({})", join(arguments, ", ")),
            Expression::Index { left, index, .. } => write!(f, "({left}[{index}])"),
        }
    }
}

/// The AST root: an ordered sequence of statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn token_literal(&self) -> &str {
        self.statements
            .first()
            .map(Statement::token_literal)
            .unwrap_or("")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}
