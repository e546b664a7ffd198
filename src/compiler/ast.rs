use std::fmt::{Display, Formatter};
use crate::compiler::lexer::{Token, TokenType};

/// Renders `items` separated by `separator`.
fn join<T: Display>(items: &[T], separator: &str) -> String {
    items.iter().map(|item| item.to_string()).collect::<Vec<String>>().join(separator)
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
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
}

impl Statement {
    pub fn token(&self) -> &Token {
        match self {
            Statement::Let { token, .. } | Statement::Return { token, .. } | Statement::Expression { token, .. } => token,
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Let { token, name, value } => write!(f, "{} {} = {};", token.literal(), name, value),
            Statement::Return { token, value } => write!(f, "{} {};", token.literal(), value),
            Statement::Expression { expression, .. } => write!(f, "{}", expression),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub name: String,
}

impl Identifier {
    pub fn new(token: Token) -> Identifier {
        let name = token.literal().to_owned();
        Identifier { token, name }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixOperator {
    Not,
    Negate,
}

impl Display for PrefixOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixOperator::Not => f.write_str("!"),
            PrefixOperator::Negate => f.write_str("-"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InfixOperator {
    Add, Subtract, Multiply, Divide,
    Equal, NotEqual,
    Less, LessEqual,
    Greater, GreaterEqual,
    And, Or,
}

impl InfixOperator {
    pub fn from_token_type(token_type: TokenType) -> Option<InfixOperator> {
        Some(match token_type {
            TokenType::Plus => InfixOperator::Add,
            TokenType::Minus => InfixOperator::Subtract,
            TokenType::Multiply => InfixOperator::Multiply,
            TokenType::Divide => InfixOperator::Divide,
            TokenType::Equal => InfixOperator::Equal,
            TokenType::NotEqual => InfixOperator::NotEqual,
            TokenType::Less => InfixOperator::Less,
            TokenType::LessEqual => InfixOperator::LessEqual,
            TokenType::Greater => InfixOperator::Greater,
            TokenType::GreaterEqual => InfixOperator::GreaterEqual,
            TokenType::And => InfixOperator::And,
            TokenType::Or => InfixOperator::Or,
            _ => return None,
        })
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, InfixOperator::Equal | InfixOperator::NotEqual
            | InfixOperator::Less | InfixOperator::LessEqual
            | InfixOperator::Greater | InfixOperator::GreaterEqual)
    }
}

impl Display for InfixOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            InfixOperator::Add => "+",
            InfixOperator::Subtract => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::Equal => "==",
            InfixOperator::NotEqual => "!=",
            InfixOperator::Less => "<",
            InfixOperator::LessEqual => "<=",
            InfixOperator::Greater => ">",
            InfixOperator::GreaterEqual => ">=",
            InfixOperator::And => "&&",
            InfixOperator::Or => "||",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionLiteral {
    pub token: Token,
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}) {{ {} }}", self.token.literal(), join(&self.parameters, ", "), self.body)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Variable(Identifier),

    IntegerLiteral {
        token: Token,
        value: i64,
    },
    FloatLiteral {
        token: Token,
        value: f64,
    },
    StringLiteral {
        token: Token,
        value: String,
    },
    Boolean {
        token: Token,
        value: bool,
    },

    Prefix {
        token: Token,
        operator: PrefixOperator,
        right: Box<Expression>,
    },
    Infix {
        token: Token,
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
    },

    If {
        token: Token,
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    Function(FunctionLiteral),
    Call {
        token: Token,
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },

    Array {
        token: Token,
        elements: Vec<Expression>,
    },
    Index {
        token: Token,
        left: Box<Expression>,
        index: Box<Expression>,
    },

    /// Placeholder left behind by a parse error.
    Error,
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Variable(identifier) => write!(f, "{}", identifier),
            Expression::IntegerLiteral { token, .. }
            | Expression::FloatLiteral { token, .. }
            | Expression::StringLiteral { token, .. }
            | Expression::Boolean { token, .. } => f.write_str(token.literal()),

            Expression::Prefix { operator, right, .. } => write!(f, "({}{})", operator, right),
            Expression::Infix { left, operator, right, .. } => write!(f, "({} {} {})", left, operator, right),

            Expression::If { token, condition, consequence, alternative } => {
                write!(f, "{} {} {{ {} }}", token.literal(), condition, consequence)?;

                if let Some(alternative) = alternative {
                    write!(f, " RepEra {{ {} }}", alternative)?;
                }

                Ok(())
            },
            Expression::Function(function) => write!(f, "{}", function),
            Expression::Call { function, arguments, .. } => write!(f, "{}({})", function, join(arguments, ", ")),

            Expression::Array { elements, .. } => write!(f, "[{}]", join(elements, ", ")),
            Expression::Index { left, index, .. } => write!(f, "({}[{}])", left, index),

            Expression::Error => f.write_str("<error>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::lexer::TokenPos;
    use super::*;

    #[test]
    pub fn test_let_statement_rendering() {
        let program = Program {
            statements: vec![Statement::Let {
                token: Token::new(TokenType::Let, "enchanted", TokenPos::begin()),
                name: Identifier::new(Token::new(TokenType::Identifier, "myVar", TokenPos::begin())),
                value: Expression::Variable(Identifier::new(Token::new(TokenType::Identifier, "anotherVar", TokenPos::begin()))),
            }],
        };

        assert_eq!("enchanted myVar = anotherVar;", program.to_string());
    }

    #[test]
    pub fn test_infix_rendering() {
        let int = |value: i64| Expression::IntegerLiteral {
            token: Token::new(TokenType::Int, value.to_string(), TokenPos::begin()),
            value,
        };

        let expr = Expression::Infix {
            token: Token::new(TokenType::Plus, "+", TokenPos::begin()),
            left: Box::new(int(1)),
            operator: InfixOperator::Add,
            right: Box::new(Expression::Prefix {
                token: Token::new(TokenType::Minus, "-", TokenPos::begin()),
                operator: PrefixOperator::Negate,
                right: Box::new(int(2)),
            }),
        };

        assert_eq!("(1 + (-2))", expr.to_string());
    }
}
