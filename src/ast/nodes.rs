use crate::{function::Callable, value::Value};

/// A node of the parse tree.
///
/// Symbols never survive parsing: operand symbols are replaced by their
/// bound value and function-position symbols by the callable they name.
#[derive(Debug, Clone)]
pub enum Node {
    /// Literal or already-resolved variable
    Atom(Value),

    /// Keyword-argument marker (`:name`); always followed by its value
    /// node within the same form
    Keyword(String),

    /// Parenthesized call form `(head arg ...)`
    Form {
        head: Head,
        args: Vec<Node>,
        /// 1-based offset of the opening parenthesis
        offset: usize,
    },
}

/// What sits in function position of a form.
#[derive(Debug, Clone)]
pub enum Head {
    /// Operator, higher-order function or registered function
    Callable(Callable),

    /// A nested higher-order form whose result is called, as in
    /// `((partial + 1) 2)`
    Form(Box<Node>),
}

