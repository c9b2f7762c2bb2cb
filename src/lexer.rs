use std::{fmt, sync::LazyLock};

use regex::Regex;

use crate::ast::{Operator, Token};

/// Integer, plain real, or scientific-notation real, with optional sign
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.\d*|\.\d+|\d+)(?:[eE][+-]?\d+)?").expect("valid number pattern")
});

/// Location of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 0-based character index
    pub index: usize,
}

impl Position {
    /// 1-based character offset, as reported in errors
    pub fn offset(&self) -> usize {
        self.index + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.position.index)
    }
}

impl std::error::Error for LexError {}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    token_start: usize,
    /// The previous token was `(`, so a sign is an operator
    after_lparen: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            token_start: 0,
            after_lparen: false,
        }
    }

    /// Position of the first character of the most recently returned token
    pub fn token_position(&self) -> Position {
        Position {
            index: self.token_start,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn error(&self, message: impl Into<String>) -> LexError {
        LexError {
            message: message.into(),
            position: Position {
                index: self.token_start,
            },
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_delimiter(ch: Option<char>) -> bool {
        match ch {
            None => true,
            Some(c) => c.is_whitespace() || c == '(' || c == ')',
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\n' => break,
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(self.error("Unterminated string: missing closing quote"))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let rest: String = self.input[self.position..]
            .iter()
            .take_while(|c| !Self::is_delimiter(Some(**c)))
            .collect();

        let literal = match NUMBER.find(&rest) {
            Some(m) if m.end() == rest.len() => m.as_str(),
            _ => return Err(self.error(format!("Invalid number literal '{}'", rest))),
        };
        self.position += literal.chars().count();

        if literal.contains(['.', 'e', 'E']) {
            literal
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.error(format!("Invalid number literal '{}'", literal)))
        } else {
            literal
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| self.error(format!("Integer literal '{}' out of range", literal)))
        }
    }

    fn starts_number(&self) -> bool {
        let digit_at = |offset: usize| self.peek_char(offset).is_some_and(|c| c.is_ascii_digit());
        match self.current_char() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => digit_at(1),
            Some('+') | Some('-') if !self.after_lparen => {
                digit_at(1) || (self.peek_char(1) == Some('.') && digit_at(2))
            }
            _ => false,
        }
    }

    fn single(&mut self, op: Operator) -> Token {
        self.advance();
        Token::Operator(op)
    }

    fn double(&mut self, op: Operator) -> Token {
        self.advance();
        self.advance();
        Token::Operator(op)
    }

    /// Next token. In function position (right after `(`) a sign is
    /// always an operator, so `(+1 2)` reads as `(+ 1 2)`.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let token = self.lex_token()?;
        self.after_lparen = token == Token::LParen;
        Ok(token)
    }

    fn lex_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.position;

        if self.starts_number() {
            return self.read_number();
        }

        let token = match self.current_char() {
            None => Token::Eof,
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('+') => self.single(Operator::Add),
            Some('-') => self.single(Operator::Subtract),
            Some('*') => self.single(Operator::Multiply),
            Some('/') => self.single(Operator::Divide),
            Some('&') => self.single(Operator::BitAnd),
            Some('|') => self.single(Operator::BitOr),
            Some('<') if self.peek_char(1) == Some('=') => self.double(Operator::LessEqual),
            Some('<') => self.single(Operator::LessThan),
            Some('>') if self.peek_char(1) == Some('=') => self.double(Operator::GreaterEqual),
            Some('>') => self.single(Operator::GreaterThan),
            Some('=') if self.peek_char(1) == Some('=') => self.double(Operator::Equal),
            Some('=') => return Err(self.error("Unexpected '=' (did you mean '=='?)")),
            Some('!') if self.peek_char(1) == Some('=') => self.double(Operator::NotEqual),
            Some('!') => return Err(self.error("Unexpected '!' (did you mean '!=' or 'not'?)")),
            Some('"') => Token::String(self.read_string('"')?),
            Some('\'') => Token::String(self.read_string('\'')?),
            Some(':') => {
                self.advance();
                let mut name = String::new();
                while let Some(ch) = self.current_char() {
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        name.push(ch);
                        self.advance();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    return Err(self.error("Expected a keyword name after ':'"));
                }
                Token::Keyword(name)
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "null" => Token::Null,
                    _ => Token::Symbol(ident),
                }
            }
            Some(ch) => return Err(self.error(format!("Unexpected character '{}'", ch))),
        };

        Ok(token)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("null true false nullable");
    assert_eq!(lexer.next_token().unwrap(), Token::Null);
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::Symbol("nullable".to_string())
    );
}

#[test]
fn test_call_form() {
    let mut lexer = Lexer::new("(+ 125 (* 0.1 (read 1)))");
    assert_eq!(lexer.next_token().unwrap(), Token::LParen);
    assert_eq!(lexer.next_token().unwrap(), Token::Operator(Operator::Add));
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(125));
    assert_eq!(lexer.next_token().unwrap(), Token::LParen);
    assert_eq!(lexer.next_token().unwrap(), Token::Operator(Operator::Multiply));
    assert_eq!(lexer.next_token().unwrap(), Token::Float(0.1));
    assert_eq!(lexer.next_token().unwrap(), Token::LParen);
    assert_eq!(lexer.next_token().unwrap(), Token::Symbol("read".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(1));
    assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_token_position() {
    let mut lexer = Lexer::new("(+  b 1)");
    lexer.next_token().unwrap();
    lexer.next_token().unwrap();
    assert_eq!(lexer.next_token().unwrap(), Token::Symbol("b".to_string()));
    assert_eq!(lexer.token_position(), Position { index: 4 });
    assert_eq!(lexer.token_position().offset(), 5);
}
