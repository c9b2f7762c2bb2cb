pub mod ast;
pub mod builtins;
pub mod cli;
pub mod context;
pub mod dtype;
pub mod error;
pub mod evaluator;
pub mod function;
pub mod higher;
pub mod lexer;
pub mod methods;
pub mod ops;
pub mod parser;
pub mod value;

pub use ast::{Head, HigherOrder, Node, Operator, Token};
pub use context::{Context, Resolver};
pub use dtype::DType;
pub use error::{Error, ErrorKind, EvalError, ExpressionError};
pub use evaluator::{Evaluator, evaluate};
pub use function::{Args, Callable, FunctionTable};
pub use lexer::{LexError, Lexer, Position};
pub use parser::Parser;
pub use value::Value;
