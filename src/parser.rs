use std::mem;

use crate::{
    ast::{Head, HigherOrder, Node, Operator, Token},
    context::Resolver,
    error::{ErrorKind, ExpressionError},
    function::{Callable, FunctionTable},
    lexer::{LexError, Lexer, Position},
    value::Value,
};

/// Default limit on parenthesis nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Recursive-descent parser for call forms.
///
/// Bare symbols are resolved while parsing: operands through the
/// [`Resolver`] (normally the evaluation [`Context`](crate::Context)),
/// function names through the [`FunctionTable`]. The resulting tree holds
/// no unresolved names.
pub struct Parser<'a> {
    lexer: Lexer,
    source: &'a str,
    current_token: Token,
    current_position: Position,
    resolver: &'a dyn Resolver,
    functions: &'a FunctionTable,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(
        source: &'a str,
        resolver: &'a dyn Resolver,
        functions: &'a FunctionTable,
    ) -> Result<Self, ExpressionError> {
        let mut parser = Parser {
            lexer: Lexer::new(source),
            source,
            current_token: Token::Eof,
            current_position: Position::default(),
            resolver,
            functions,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        };
        parser.advance()?;
        Ok(parser)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn advance(&mut self) -> Result<(), ExpressionError> {
        self.current_token = self.lexer.next_token().map_err(|e| self.lex_error(e))?;
        self.current_position = self.lexer.token_position();
        Ok(())
    }

    fn lex_error(&self, e: LexError) -> ExpressionError {
        ExpressionError::new(ErrorKind::Syntax, e.message, self.source, e.position.offset())
    }

    fn error_at(&self, kind: ErrorKind, message: impl Into<String>, position: Position) -> ExpressionError {
        ExpressionError::new(kind, message, self.source, position.offset())
    }

    fn syntax_error(&self, message: impl Into<String>) -> ExpressionError {
        self.error_at(ErrorKind::Syntax, message, self.current_position)
    }

    fn expect_rparen(&mut self) -> Result<(), ExpressionError> {
        match self.current_token {
            Token::RParen => self.advance(),
            Token::Eof => Err(self.syntax_error("expected ')'")),
            _ => Err(self.syntax_error(format!(
                "expected ')', got {}",
                self.current_token.describe()
            ))),
        }
    }

    /// Parse a complete expression; trailing input is an error.
    pub fn parse(&mut self) -> Result<Node, ExpressionError> {
        let node = match &self.current_token {
            Token::Keyword(name) => {
                return Err(self.syntax_error(format!(
                    "keyword argument ':{}' outside of a call form",
                    name
                )));
            }
            _ => self.parse_operand()?,
        };

        if self.current_token != Token::Eof {
            return Err(self.syntax_error(format!(
                "unexpected {} after expression",
                self.current_token.describe()
            )));
        }
        Ok(node)
    }

    /// Parse one operand: a form, a literal, a keyword marker, or a
    /// variable resolved against the context.
    fn parse_operand(&mut self) -> Result<Node, ExpressionError> {
        let position = self.current_position;
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::LParen => {
                self.current_token = Token::LParen;
                self.parse_form()
            }
            Token::Float(n) => {
                self.advance()?;
                Ok(Node::Atom(Value::Float(n)))
            }
            Token::Integer(n) => {
                self.advance()?;
                Ok(Node::Atom(Value::Integer(n)))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Node::Atom(Value::String(s)))
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Node::Atom(Value::Boolean(b)))
            }
            Token::Null => {
                self.advance()?;
                Ok(Node::Atom(Value::Null))
            }
            Token::Keyword(name) => {
                self.advance()?;
                Ok(Node::Keyword(name))
            }
            Token::Symbol(name) => match self.resolver.resolve(&name) {
                Some(value) => {
                    self.advance()?;
                    Ok(Node::Atom(value))
                }
                None => Err(self.error_at(
                    ErrorKind::Name,
                    format!("name '{}' is not defined", name),
                    position,
                )),
            },
            token => {
                self.current_token = token;
                Err(self.syntax_error(match &self.current_token {
                    Token::Eof => "unexpected end of expression".to_string(),
                    other => format!("expected an operand, got {}", other.describe()),
                }))
            }
        }
    }

    /// Parse `( head operand ... )` where the current token is `(`.
    fn parse_form(&mut self) -> Result<Node, ExpressionError> {
        let open = self.current_position;
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.error_at(
                ErrorKind::Syntax,
                format!("expression nests deeper than {} levels", self.max_depth),
                open,
            ));
        }
        self.advance()?; // consume '('

        let higher = match &self.current_token {
            Token::Symbol(word) => HigherOrder::from_name(word),
            _ => None,
        };

        let node = match higher {
            Some(h) => {
                self.advance()?;
                self.parse_higher_rest(h, open)?
            }
            None => {
                let head = self.parse_head()?;
                let args = self.parse_operands(1)?;
                Node::Form {
                    head,
                    args,
                    offset: open.offset(),
                }
            }
        };

        self.expect_rparen()?;
        self.depth -= 1;
        log::trace!("parsed form at char {}", open.offset());
        Ok(node)
    }

    /// Function position of a call form.
    fn parse_head(&mut self) -> Result<Head, ExpressionError> {
        let position = self.current_position;
        match &self.current_token {
            Token::Operator(op) => {
                let op = *op;
                self.advance()?;
                Ok(Head::Callable(Callable::Operator(op)))
            }
            Token::Symbol(_) => Ok(Head::Callable(self.parse_function_symbol()?)),
            Token::LParen => {
                let inner = self.parse_form()?;
                match &inner {
                    Node::Form {
                        head: Head::Callable(Callable::Higher(_)),
                        ..
                    } => Ok(Head::Form(Box::new(inner))),
                    _ => Err(self.error_at(
                        ErrorKind::Syntax,
                        "expected a function or operator",
                        position,
                    )),
                }
            }
            _ => Err(self.syntax_error("expected a function or operator")),
        }
    }

    /// A bare word naming a word operator or a registered function.
    fn parse_function_symbol(&mut self) -> Result<Callable, ExpressionError> {
        let position = self.current_position;
        let Token::Symbol(word) = &self.current_token else {
            return Err(self.syntax_error("expected a function or operator"));
        };

        let callable = match Operator::from_word(word) {
            Some(op) => Callable::Operator(op),
            None => self.functions.resolve(word).ok_or_else(|| {
                self.error_at(
                    ErrorKind::Function,
                    format!("'{}' is not a function or operator", word),
                    position,
                )
            })?,
        };
        self.advance()?;
        Ok(callable)
    }

    /// After `(map`: the first argument may name an operator or function,
    /// which is passed as a value, or be `null`, a form, or operands.
    fn parse_higher_rest(&mut self, h: HigherOrder, open: Position) -> Result<Node, ExpressionError> {
        let mut args = vec![];

        match &self.current_token {
            Token::Operator(op) => {
                let op = *op;
                self.advance()?;
                args.push(Node::Atom(Value::Function(Callable::Operator(op))));
            }
            Token::Symbol(_) => {
                let callable = self.parse_function_symbol()?;
                args.push(Node::Atom(Value::Function(callable)));
            }
            Token::RParen | Token::Eof => {
                return Err(self.syntax_error("expected a function or operator"));
            }
            _ => {}
        }

        let min = if args.is_empty() { 1 } else { 0 };
        args.extend(self.parse_operands(min)?);

        Ok(Node::Form {
            head: Head::Callable(Callable::Higher(h)),
            args,
            offset: open.offset(),
        })
    }

    /// Operands up to the closing parenthesis; at least `min` of them.
    /// Every keyword marker must be followed by its value.
    fn parse_operands(&mut self, min: usize) -> Result<Vec<Node>, ExpressionError> {
        let mut args = vec![];
        let mut pending_keyword: Option<(String, Position)> = None;

        while !matches!(self.current_token, Token::RParen | Token::Eof) {
            let position = self.current_position;
            let node = self.parse_operand()?;

            if let Node::Keyword(name) = &node {
                if let Some((prev, at)) = pending_keyword.take() {
                    return Err(self.error_at(
                        ErrorKind::Syntax,
                        format!("keyword argument ':{}' has no value", prev),
                        at,
                    ));
                }
                pending_keyword = Some((name.clone(), position));
            } else {
                pending_keyword = None;
            }
            args.push(node);
        }

        if let Some((name, at)) = pending_keyword {
            return Err(self.error_at(
                ErrorKind::Syntax,
                format!("keyword argument ':{}' has no value", name),
                at,
            ));
        }

        if args.len() < min {
            return Err(match self.current_token {
                Token::Eof => self.syntax_error("unexpected end of expression"),
                _ => self.syntax_error("expected an operand"),
            });
        }
        Ok(args)
    }
}
