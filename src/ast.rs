//! # Calc Expression Language - Syntax Tree
//!
//! Expressions are s-expressions in prefix (Polish) notation. Every call is
//! explicitly parenthesized, so there is no operator precedence:
//!
//! ```text
//! (+ 125 (* 0.1 (read 1)))
//! ```
//!
//! ## Submodules
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[nodes]** - Parse tree nodes handed to the evaluator
//! - **[operators]** - The closed sets of built-in operators and
//!   higher-order functions
//!
//! ## Forms
//!
//! - **Call form** `(head operand ...)` - `head` is an operator, a
//!   registered function, or a parenthesized higher-order form.
//! - **Higher-order form** `(map f xs)` - the first argument may name an
//!   operator or function directly, which is passed as a value.
//!
//! ## Keyword arguments
//!
//! A `:name` token in operand position binds the operand that follows it
//! by name instead of by position:
//!
//! ```text
//! (read 1 :dtype 'float32')
//! ```
//!
//! ## Variables
//!
//! Bare words in operand position are looked up in the evaluation context
//! while parsing. An unbound word fails the parse, with the offset of the
//! word.
pub mod nodes;
pub mod operators;
pub mod tokens;

pub use nodes::{Head, Node};
pub use operators::{HigherOrder, Operator};
pub use tokens::Token;
