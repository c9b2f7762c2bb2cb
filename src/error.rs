use std::fmt;

/// Which stage of parsing rejected an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed expression: unbalanced parens, unexpected token,
    /// unterminated string, nesting too deep
    Syntax,
    /// A bare symbol that is not bound in the evaluation context
    Name,
    /// A word in function position that is neither an operator, a
    /// higher-order function, nor a registered function
    Function,
}

/// A parse-time failure, located in the source text.
///
/// `offset` is 1-based and points at the first character of the
/// offending token, so a caller can print `source` and place a caret
/// underneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionError {
    pub kind: ErrorKind,
    pub message: String,
    pub source: String,
    pub offset: usize,
}

impl ExpressionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, source: &str, offset: usize) -> Self {
        ExpressionError {
            kind,
            message: message.into(),
            source: source.to_string(),
            offset,
        }
    }
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at char {})", self.message, self.offset)
    }
}

impl std::error::Error for ExpressionError {}

/// Errors raised while invoking operators and functions.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Operand of the wrong type for the operation
    Type(String),

    /// Wrong number of arguments
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    /// Right type, unusable value (shape mismatch, unknown dtype, ...)
    Value(String),

    /// Positional lookup or array index out of range
    Index(String),

    /// Missing object key
    Key(String),

    /// Name not bound in the context; the evaluation-time counterpart of
    /// [`ErrorKind::Name`]
    Name(String),

    /// Missing attribute or method
    Attribute(String),

    /// Something in function position that cannot be called
    NotCallable(String),
}

impl EvalError {
    /// Arity and type failures are the only ones eligible for the
    /// retry-as-one-list fallback.
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self, EvalError::Type(_) | EvalError::Arity { .. })
    }

    pub fn arity(name: &str, expected: impl Into<String>, got: usize) -> Self {
        EvalError::Arity {
            name: name.to_string(),
            expected: expected.into(),
            got,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Type(msg) => write!(f, "Type error: {}", msg),
            EvalError::Arity {
                name,
                expected,
                got,
            } => write!(
                f,
                "Arity error: '{}' takes {} argument(s), got {}",
                name, expected, got
            ),
            EvalError::Value(msg) => write!(f, "Value error: {}", msg),
            EvalError::Index(msg) => write!(f, "Index error: {}", msg),
            EvalError::Key(msg) => write!(f, "Key error: {}", msg),
            EvalError::Name(msg) => write!(f, "Name error: {}", msg),
            EvalError::Attribute(msg) => write!(f, "Attribute error: {}", msg),
            EvalError::NotCallable(type_name) => {
                write!(f, "Type error: '{}' object is not callable", type_name)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Everything `evaluate` can fail with.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Expression(ExpressionError),
    Evaluation(EvalError),
}

impl Error {
    pub fn as_expression(&self) -> Option<&ExpressionError> {
        match self {
            Error::Expression(e) => Some(e),
            Error::Evaluation(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Expression(e) => write!(f, "Expression error: {}", e),
            Error::Evaluation(e) => write!(f, "Evaluation error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Expression(e) => Some(e),
            Error::Evaluation(e) => Some(e),
        }
    }
}

impl From<ExpressionError> for Error {
    fn from(e: ExpressionError) -> Self {
        Error::Expression(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Evaluation(e)
    }
}
