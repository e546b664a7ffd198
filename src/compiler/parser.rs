use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use lazy_static::lazy_static;
use crate::compiler::lexer::{Lexer, Token, TokenPos, TokenType};
use crate::compiler::ast::{BlockStatement, Expression, FunctionLiteral, Identifier, InfixOperator, PrefixOperator, Program, Statement};

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Or,
    And,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

lazy_static! {
    static ref PRECEDENCES: HashMap<TokenType, Precedence> = HashMap::from([
        (TokenType::Or, Precedence::Or),
        (TokenType::And, Precedence::And),
        (TokenType::Equal, Precedence::Equals),
        (TokenType::NotEqual, Precedence::Equals),
        (TokenType::Less, Precedence::LessGreater),
        (TokenType::LessEqual, Precedence::LessGreater),
        (TokenType::Greater, Precedence::LessGreater),
        (TokenType::GreaterEqual, Precedence::LessGreater),
        (TokenType::Plus, Precedence::Sum),
        (TokenType::Minus, Precedence::Sum),
        (TokenType::Multiply, Precedence::Product),
        (TokenType::Divide, Precedence::Product),
        (TokenType::ParenthesisLeft, Precedence::Call),
        (TokenType::SquareBracketLeft, Precedence::Index),
    ]);
}

fn precedence_of(token_type: TokenType) -> Precedence {
    PRECEDENCES.get(&token_type).copied().unwrap_or(Precedence::Lowest)
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
    UnexpectedToken {
        pos: TokenPos,
        found: Token,
        message: String,
    },
    NoPrefixRule {
        pos: TokenPos,
        found: Token,
    },
    IllegalToken {
        pos: TokenPos,
        literal: String,
    },
    InvalidInteger {
        pos: TokenPos,
        literal: String,
    },
    InvalidFloat {
        pos: TokenPos,
        literal: String,
    },
}

impl ParseError {
    pub fn pos(&self) -> TokenPos {
        match self {
            ParseError::UnexpectedToken { pos, .. }
            | ParseError::NoPrefixRule { pos, .. }
            | ParseError::IllegalToken { pos, .. }
            | ParseError::InvalidInteger { pos, .. }
            | ParseError::InvalidFloat { pos, .. } => *pos,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::UnexpectedToken { pos, found, message } => if found.token_type() == TokenType::Eof {
                write!(f, "{} Error at EOF: {}", pos, message)
            } else {
                write!(f, "{} Error at '{}': {}", pos, found.literal(), message)
            },
            ParseError::NoPrefixRule { pos, found } => write!(f, "{} Error: no prefix parse rule for {}", pos, found),
            ParseError::IllegalToken { pos, literal } => write!(f, "{} Error: illegal token '{}'", pos, literal),
            ParseError::InvalidInteger { pos, literal } => write!(f, "{} Error: could not parse '{}' as integer", pos, literal),
            ParseError::InvalidFloat { pos, literal } => write!(f, "{} Error: could not parse '{}' as float", pos, literal),
        }
    }
}

impl std::error::Error for ParseError {}

type PrefixRule<'source> = fn(&mut Parser<'source>) -> Expression;
type InfixRule<'source> = fn(&mut Parser<'source>, Expression) -> Expression;

/// Operator-precedence parser. Errors are collected rather than returned; check
/// [`Parser::had_error`] before trusting the resulting [`Program`].
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    previous: Token, current: Token,

    errors: Vec<ParseError>,
    panic_mode: bool,
}

impl<'source> Parser<'source> {
    pub fn new(lexer: Lexer<'source>) -> Parser<'source> {
        Parser {
            lexer,
            previous: Token::empty(), current: Token::empty(),
            errors: Vec::new(), panic_mode: false,
        }
    }

    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    // Statement parsing

    pub fn parse(&mut self) -> Program {
        self.consume();

        let mut statements = Vec::new();

        while !self.is_eof() {
            statements.push(self.parse_statement());
        }

        Program { statements }
    }

    fn parse_statement(&mut self) -> Statement {
        let stmt = if self.matches(TokenType::Let) {
            self.parse_let_statement()
        } else if self.matches(TokenType::Return) {
            self.parse_return_statement()
        } else {
            self.parse_expression_statement()
        };

        if self.panic_mode {
            self.synchronize();
        }

        stmt
    }

    fn parse_let_statement(&mut self) -> Statement {
        let token = self.previous.clone();

        self.expect(TokenType::Identifier, "Expected name after 'enchanted'");
        let name = Identifier::new(self.previous.clone());

        self.expect(TokenType::Assign, "Expected '=' after variable name");

        let value = self.parse_expression(Precedence::Lowest);
        self.matches(TokenType::Semicolon);

        Statement::Let { token, name, value }
    }

    fn parse_return_statement(&mut self) -> Statement {
        let token = self.previous.clone();

        let value = self.parse_expression(Precedence::Lowest);
        self.matches(TokenType::Semicolon);

        Statement::Return { token, value }
    }

    fn parse_expression_statement(&mut self) -> Statement {
        let token = self.current.clone();

        let expression = self.parse_expression(Precedence::Lowest);
        self.matches(TokenType::Semicolon);

        Statement::Expression { token, expression }
    }

    /// Parses statements up to the closing `}`; the opening `{` must already be consumed.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let token = self.previous.clone();
        let mut statements = Vec::new();

        while !self.check(TokenType::BracketRight) && !self.is_eof() {
            statements.push(self.parse_statement());
        }

        self.matches(TokenType::BracketRight);
        BlockStatement { token, statements }
    }

    // Expression parsing

    fn parse_expression(&mut self, precedence: Precedence) -> Expression {
        self.consume();

        let mut left = match Self::prefix_rule(self.previous.token_type()) {
            Some(rule) => rule(self),
            None => {
                self.error_no_prefix_rule();
                return Expression::Error;
            },
        };

        while precedence < precedence_of(self.current.token_type()) {
            let rule = match Self::infix_rule(self.current.token_type()) {
                Some(rule) => rule,
                None => return left,
            };

            self.consume();
            left = rule(self, left);
        }

        left
    }

    fn prefix_rule(token_type: TokenType) -> Option<PrefixRule<'source>> {
        let rule: PrefixRule<'source> = match token_type {
            TokenType::Identifier => Self::parse_variable,
            TokenType::Int => Self::parse_integer,
            TokenType::Float => Self::parse_float,
            TokenType::String => Self::parse_string,
            TokenType::True | TokenType::False => Self::parse_boolean,
            TokenType::Not | TokenType::Minus => Self::parse_prefix,
            TokenType::ParenthesisLeft => Self::parse_group,
            TokenType::If => Self::parse_if,
            TokenType::Function => Self::parse_function,
            TokenType::SquareBracketLeft => Self::parse_array,
            _ => return None,
        };

        Some(rule)
    }

    fn infix_rule(token_type: TokenType) -> Option<InfixRule<'source>> {
        let rule: InfixRule<'source> = match token_type {
            TokenType::ParenthesisLeft => Self::parse_call,
            TokenType::SquareBracketLeft => Self::parse_index,
            token_type if InfixOperator::from_token_type(token_type).is_some() => Self::parse_infix,
            _ => return None,
        };

        Some(rule)
    }

    fn parse_variable(&mut self) -> Expression {
        Expression::Variable(Identifier::new(self.previous.clone()))
    }

    fn parse_integer(&mut self) -> Expression {
        let token = self.previous.clone();

        match token.literal().parse::<i64>() {
            Ok(value) => Expression::IntegerLiteral { token, value },
            Err(_) => {
                self.report(ParseError::InvalidInteger { pos: *token.start(), literal: token.literal().to_owned() }, true);
                Expression::Error
            },
        }
    }

    fn parse_float(&mut self) -> Expression {
        let token = self.previous.clone();

        match token.literal().parse::<f64>() {
            Ok(value) => Expression::FloatLiteral { token, value },
            Err(_) => {
                self.report(ParseError::InvalidFloat { pos: *token.start(), literal: token.literal().to_owned() }, true);
                Expression::Error
            },
        }
    }

    fn parse_string(&mut self) -> Expression {
        let token = self.previous.clone();
        let value = token.literal().to_owned();

        Expression::StringLiteral { token, value }
    }

    fn parse_boolean(&mut self) -> Expression {
        let token = self.previous.clone();
        let value = token.token_type() == TokenType::True;

        Expression::Boolean { token, value }
    }

    fn parse_prefix(&mut self) -> Expression {
        let token = self.previous.clone();
        let operator = if token.token_type() == TokenType::Not { PrefixOperator::Not } else { PrefixOperator::Negate };

        let right = self.parse_expression(Precedence::Prefix);
        Expression::Prefix { token, operator, right: Box::new(right) }
    }

    fn parse_infix(&mut self, left: Expression) -> Expression {
        let token = self.previous.clone();
        let precedence = precedence_of(token.token_type());

        let operator = match InfixOperator::from_token_type(token.token_type()) {
            Some(operator) => operator,
            None => return left,
        };

        // Same precedence on the right makes equal-precedence chains left-associative
        let right = self.parse_expression(precedence);
        Expression::Infix { token, left: Box::new(left), operator, right: Box::new(right) }
    }

    fn parse_group(&mut self) -> Expression {
        let expr = self.parse_expression(Precedence::Lowest);
        self.expect(TokenType::ParenthesisRight, "Expected ')' after expression");

        expr
    }

    fn parse_if(&mut self) -> Expression {
        let token = self.previous.clone();

        self.expect(TokenType::ParenthesisLeft, "Expected '(' after 'LoverEra'");
        let condition = self.parse_expression(Precedence::Lowest);
        self.expect(TokenType::ParenthesisRight, "Expected ')' after condition");

        self.expect(TokenType::BracketLeft, "Expected '{' after condition");
        let consequence = self.parse_block_statement();

        let alternative = if self.matches(TokenType::Else) {
            self.expect(TokenType::BracketLeft, "Expected '{' after 'RepEra'");
            Some(self.parse_block_statement())
        } else {
            None
        };

        Expression::If { token, condition: Box::new(condition), consequence, alternative }
    }

    fn parse_function(&mut self) -> Expression {
        let token = self.previous.clone();

        self.expect(TokenType::ParenthesisLeft, "Expected '(' after 'isme'");
        let mut parameters = vec![];

        if !self.check(TokenType::ParenthesisRight) {
            self.expect(TokenType::Identifier, "Expected parameter name after '('");
            parameters.push(Identifier::new(self.previous.clone()));

            while self.matches(TokenType::Comma) {
                self.expect(TokenType::Identifier, "Expected parameter name after ','");
                parameters.push(Identifier::new(self.previous.clone()));
            }
        }

        self.expect(TokenType::ParenthesisRight, "Expected ')' after parameters");
        self.expect(TokenType::BracketLeft, "Expected '{' after parameter list");

        let body = self.parse_block_statement();
        Expression::Function(FunctionLiteral { token, parameters, body })
    }

    fn parse_call(&mut self, function: Expression) -> Expression {
        let token = self.previous.clone();
        let arguments = self.parse_expression_list(TokenType::ParenthesisRight, "Expected ')' after call arguments");

        Expression::Call { token, function: Box::new(function), arguments }
    }

    fn parse_array(&mut self) -> Expression {
        let token = self.previous.clone();
        let elements = self.parse_expression_list(TokenType::SquareBracketRight, "Expected ']' after array elements");

        Expression::Array { token, elements }
    }

    fn parse_index(&mut self, left: Expression) -> Expression {
        let token = self.previous.clone();

        let index = self.parse_expression(Precedence::Lowest);
        self.expect(TokenType::SquareBracketRight, "Expected ']' after index expression");

        Expression::Index { token, left: Box::new(left), index: Box::new(index) }
    }

    fn parse_expression_list(&mut self, end: TokenType, message: &str) -> Vec<Expression> {
        let mut expressions = vec![];

        if !self.check(end) {
            expressions.push(self.parse_expression(Precedence::Lowest));

            while self.matches(TokenType::Comma) {
                expressions.push(self.parse_expression(Precedence::Lowest));
            }
        }

        self.expect(end, message);
        expressions
    }

    // Token handling

    fn consume(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current); // self.previous = self.current; self.current gets replaced below
        self.current = self.lexer.next_token();
    }

    fn expect(&mut self, token_type: TokenType, message: &str) {
        if self.current.token_type() == token_type {
            self.consume();
            return;
        }

        self.error_at_current(message);
    }

    fn matches(&mut self, token_type: TokenType) -> bool {
        if !self.check(token_type) {
            return false;
        }

        self.consume();
        true
    }

    #[inline]
    fn check(&self, token_type: TokenType) -> bool {
        self.current.token_type() == token_type
    }

    fn is_eof(&self) -> bool {
        self.current.token_type() == TokenType::Eof
    }

    // Error handling

    fn synchronize(&mut self) {
        self.panic_mode = false;

        while self.current.token_type() != TokenType::Eof {
            if self.previous.token_type() == TokenType::Semicolon {
                return;
            }

            match self.current.token_type() {
                TokenType::Let | TokenType::Return | TokenType::BracketRight => return,
                _ => {},
            };

            self.consume();
        }
    }

    fn error_at_current(&mut self, message: &str) {
        let error = ParseError::UnexpectedToken {
            pos: *self.current.start(),
            found: self.current.clone(),
            message: message.to_owned(),
        };

        self.report(error, true);
    }

    fn error_no_prefix_rule(&mut self) {
        let token = self.previous.clone();

        let error = if token.token_type() == TokenType::Illegal {
            ParseError::IllegalToken { pos: *token.start(), literal: token.literal().to_owned() }
        } else {
            ParseError::NoPrefixRule { pos: *token.start(), found: token }
        };

        self.report(error, true);
    }

    fn report(&mut self, error: ParseError, panic: bool) {
        if self.panic_mode {
            return;
        } else if panic {
            self.panic_mode = true;
        }

        self.errors.push(error);
    }
}
