use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use lazy_static::lazy_static;
use crate::util;

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenPos {
    pub line: i32,
    pub column: i32,
}

impl TokenPos {
    pub fn new(line: i32, column: i32) -> TokenPos {
        TokenPos { line, column }
    }

    pub fn begin() -> TokenPos {
        TokenPos::new(1, 1)
    }
}

impl Display for TokenPos {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line {} column {}]", self.line, self.column)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenType {
    Illegal,
    Eof,

    Identifier,
    Int, Float,
    String,

    Assign,
    Plus, Minus,
    Not,
    Multiply, Divide,

    Less, LessEqual,
    Greater, GreaterEqual,
    Equal, NotEqual,
    And, Or,

    Comma, Semicolon, Colon,
    ParenthesisLeft, ParenthesisRight,
    BracketLeft, BracketRight,
    SquareBracketLeft, SquareBracketRight,

    // Keywords
    Function,
    Let,
    True, False,
    If, Else,
    Return,
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenType> = HashMap::from([
        ("isme", TokenType::Function),
        ("enchanted", TokenType::Let),
        ("SparksFly", TokenType::True),
        ("BadBlood", TokenType::False),
        ("LoverEra", TokenType::If),
        ("RepEra", TokenType::Else),
        ("hi", TokenType::Return),
    ]);
}

/// Classifies identifier-shaped text: reserved spellings map to their keyword kind,
/// everything else is an identifier.
pub fn lookup_identifier(name: &str) -> TokenType {
    KEYWORDS.get(name).copied().unwrap_or(TokenType::Identifier)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    token_type: TokenType,
    literal: String,
    start: TokenPos,
}

impl Token {
    pub fn new(token_type: TokenType, literal: impl Into<String>, start: TokenPos) -> Token {
        Token {
            token_type,
            literal: literal.into(),
            start,
        }
    }

    pub fn empty() -> Token {
        Token::new(TokenType::Eof, "", TokenPos::begin())
    }

    pub fn token_type(&self) -> TokenType { self.token_type }
    pub fn literal(&self) -> &str { &self.literal }
    pub fn start(&self) -> &TokenPos { &self.start }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.token_type {
            TokenType::Eof => f.write_str("EOF"),
            TokenType::String => write!(f, "`\"{}\"`", self.literal),
            _ => write!(f, "`{}`", self.literal),
        }
    }
}

/// Byte-cursor lexer. Once the input is exhausted every further call to
/// [`Lexer::next_token`] yields an EOF token.
pub struct Lexer<'source> {
    input: &'source str,
    bytes: &'source [u8],

    start_index: usize,
    current_index: usize,

    start_pos: TokenPos,
    current_pos: TokenPos,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Lexer<'source> {
        Lexer {
            input: source,
            bytes: source.as_bytes(),

            start_index: 0,
            current_index: 0,

            start_pos: TokenPos::begin(),
            current_pos: TokenPos::begin(),
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start_index = self.current_index;
        self.start_pos = self.current_pos;

        let c = match self.consume() {
            Some(c) => c,
            None => return self.make_token(TokenType::Eof),
        };

        match c {
            b'(' => self.make_token(TokenType::ParenthesisLeft),
            b')' => self.make_token(TokenType::ParenthesisRight),
            b'{' => self.make_token(TokenType::BracketLeft),
            b'}' => self.make_token(TokenType::BracketRight),
            b'[' => self.make_token(TokenType::SquareBracketLeft),
            b']' => self.make_token(TokenType::SquareBracketRight),
            b',' => self.make_token(TokenType::Comma),
            b';' => self.make_token(TokenType::Semicolon),
            b':' => self.make_token(TokenType::Colon),

            b'+' => self.make_token(TokenType::Plus),
            b'-' => self.make_token(TokenType::Minus),
            b'*' => self.make_token(TokenType::Multiply),
            b'/' => self.make_token(TokenType::Divide),

            b'=' => if self.expect(b'=') { self.make_token(TokenType::Equal) } else {
                self.make_token(TokenType::Assign)
            },
            b'!' => if self.expect(b'=') { self.make_token(TokenType::NotEqual) } else {
                self.make_token(TokenType::Not)
            },
            b'<' => if self.expect(b'=') { self.make_token(TokenType::LessEqual) } else {
                self.make_token(TokenType::Less)
            },
            b'>' => if self.expect(b'=') { self.make_token(TokenType::GreaterEqual) } else {
                self.make_token(TokenType::Greater)
            },
            b'&' => if self.expect(b'&') { self.make_token(TokenType::And) } else {
                self.make_token(TokenType::Illegal)
            },
            b'|' => if self.expect(b'|') { self.make_token(TokenType::Or) } else {
                self.make_token(TokenType::Illegal)
            },

            b'"' => self.scan_string(),
            c if util::is_digit(c) => self.scan_number(),
            c if util::is_letter(c) => self.scan_identifier(),

            c if !c.is_ascii() => {
                // Swallow the rest of the UTF-8 sequence so the literal stays a whole character
                let width = self.input[self.start_index..].chars().next().map_or(1, char::len_utf8);
                self.current_index = self.start_index + width;
                self.make_token(TokenType::Illegal)
            },
            _ => self.make_token(TokenType::Illegal),
        }
    }

    fn scan_string(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c == b'"' {
                break;
            }

            self.consume();
        }

        if self.is_eof() {
            return self.make_token(TokenType::Illegal);
        }

        self.consume(); // the trailing '"'

        // Don't add leading and trailing '"' characters to token
        Token {
            token_type: TokenType::String,
            literal: self.input[(self.start_index + 1)..(self.current_index - 1)].to_owned(),
            start: self.start_pos,
        }
    }

    fn scan_number(&mut self) -> Token {
        while let Some(b'0'..=b'9') = self.peek() {
            self.consume();
        }

        if let Some(b'.') = self.peek() {
            self.consume();

            return if let Some(b'0'..=b'9') = self.peek() {
                while let Some(b'0'..=b'9') = self.peek() {
                    self.consume();
                }

                self.make_token(TokenType::Float)
            } else {
                self.make_token(TokenType::Illegal)
            };
        }

        self.make_token(TokenType::Int)
    }

    fn scan_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if !util::is_letter(c) {
                break;
            }

            self.consume();
        }

        let name = &self.input[self.start_index..self.current_index];
        Token { literal: name.to_owned(), token_type: lookup_identifier(name), start: self.start_pos }
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        Token {
            token_type,
            literal: self.input[self.start_index..self.current_index].to_owned(),
            start: self.start_pos,
        }
    }

    fn consume(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.current_index += 1;

        if c == b'\n' {
            self.current_pos.line += 1;
            self.current_pos.column = 1;
        } else if c & 0xC0 != 0x80 {
            // Columns count characters, so UTF-8 continuation bytes don't advance them
            self.current_pos.column += 1;
        }

        Some(c)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.current_index).copied()
    }

    fn expect(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.consume();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !util::is_whitespace(c) {
                return;
            }

            self.consume();
        }
    }

    fn is_eof(&self) -> bool {
        self.current_index >= self.bytes.len()
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();

        if token.token_type() == TokenType::Eof {
            None
        } else {
            Some(token)
        }
    }
}
