use crate::ast::Operator;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Real number, plain or scientific notation
    ///
    /// # Examples
    /// ```text
    /// 0.95
    /// -1.5
    /// .5
    /// 2e-3
    /// ```
    Float(f64),

    /// Signed integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -10
    /// +3
    /// ```
    Integer(i64),

    /// String literal enclosed in single or double quotes.
    ///
    /// There are no escape sequences: the content runs up to the next
    /// matching quote on the same line.
    ///
    /// # Examples
    /// ```text
    /// 'uint8'
    /// "fast"
    /// ```
    String(String),

    /// `true` or `false`
    Boolean(bool),

    /// `null`
    Null,

    // Names
    /// Bare word: a bound variable in operand position, a function,
    /// word operator (`not`, `is`, `truth`) or higher-order function in
    /// function position.
    ///
    /// Must start with a letter or underscore, followed by letters,
    /// digits, or underscores.
    ///
    /// # Examples
    /// ```text
    /// read
    /// a
    /// _i1
    /// ```
    Symbol(String),

    /// Keyword-argument marker; the name without its leading colon
    ///
    /// # Examples
    /// ```text
    /// :mode
    /// :dtype
    /// ```
    Keyword(String),

    /// Punctuation operator
    ///
    /// # Examples
    /// ```text
    /// + - * / & | < <= == != >= >
    /// ```
    Operator(Operator),

    // Delimiters
    /// Left parenthesis opening a call form
    LParen,

    /// Right parenthesis
    RParen,

    /// End of input
    Eof,
}

impl Token {
    /// Short description for syntax error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Float(n) => format!("number {}", n),
            Token::Integer(n) => format!("number {}", n),
            Token::String(s) => format!("string '{}'", s),
            Token::Boolean(b) => format!("'{}'", b),
            Token::Null => "'null'".to_string(),
            Token::Symbol(s) => format!("'{}'", s),
            Token::Keyword(k) => format!("':{}'", k),
            Token::Operator(op) => format!("operator '{}'", op.symbol()),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Eof => "end of expression".to_string(),
        }
    }
}
