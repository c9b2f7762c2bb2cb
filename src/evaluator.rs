use indexmap::IndexMap;

use crate::{
    ast::{Head, Node},
    builtins,
    context::Context,
    error::{Error, EvalError, ExpressionError},
    function::{Args, Callable, FunctionTable},
    parser::{DEFAULT_MAX_DEPTH, Parser},
    value::Value,
};

/// The expression evaluator.
///
/// Holds the host function table and the nesting limit. Every call to
/// [`evaluate`](Evaluator::evaluate) builds its own [`Context`], so one
/// evaluator can be shared between threads and bindings never outlive the
/// call that supplied them.
#[derive(Debug, Clone)]
pub struct Evaluator {
    functions: FunctionTable,
    max_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator {
            functions: FunctionTable::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Evaluator {
    /// Creates an evaluator with an empty function table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an evaluator with the raster-calculator functions
    /// (`read`, `take`, `asarray`, ...) registered.
    pub fn with_builtins() -> Self {
        let mut evaluator = Self::new();
        builtins::register(&mut evaluator.functions);
        evaluator
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Register a host function under `name`.
    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&Context, &Args) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.functions.register(name, func);
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionTable {
        &mut self.functions
    }

    /// Parses `source`, resolving variables against `ctx`.
    pub fn parse(&self, source: &str, ctx: &Context) -> Result<Node, ExpressionError> {
        Parser::new(source, ctx, &self.functions)?
            .with_max_depth(self.max_depth)
            .parse()
    }

    /// Evaluates `source` with the given bindings.
    ///
    /// Bindings keep their order, which backs positional lookup through
    /// `read`. The context is dropped when the call returns, on success
    /// and on failure alike.
    ///
    /// # Examples
    ///
    /// ```
    /// use rcalc::{Evaluator, Value};
    ///
    /// let evaluator = Evaluator::new();
    /// let result = evaluator
    ///     .evaluate("(+ a 1)", [("a", Value::Integer(5))])
    ///     .unwrap();
    /// assert_eq!(result, Value::Integer(6));
    /// ```
    pub fn evaluate<I, K>(&self, source: &str, bindings: I) -> Result<Value, Error>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let ctx = Context::from_bindings(bindings);
        self.evaluate_in(source, &ctx)
    }

    /// Evaluates `source` against an existing context.
    pub fn evaluate_in(&self, source: &str, ctx: &Context) -> Result<Value, Error> {
        log::debug!("evaluating {:?} with {} binding(s)", source, ctx.len());
        let node = self.parse(source, ctx)?;
        Ok(self.eval_node(&node, ctx)?)
    }

    /// Reduces a parsed tree to its value.
    pub fn eval_node(&self, node: &Node, ctx: &Context) -> Result<Value, EvalError> {
        match node {
            Node::Atom(value) => Ok(value.clone()),
            Node::Keyword(name) => Err(EvalError::Value(format!(
                "keyword argument ':{}' outside of a call form",
                name
            ))),
            Node::Form { head, args, offset } => {
                log::trace!("evaluating form at char {}", offset);
                let callable = self.eval_head(head, ctx)?;
                let args = self.bind_args(args, ctx)?;
                self.invoke(&callable, args, ctx)
            }
        }
    }

    fn eval_head(&self, head: &Head, ctx: &Context) -> Result<Callable, EvalError> {
        match head {
            Head::Callable(callable) => Ok(callable.clone()),
            Head::Form(inner) => match self.eval_node(inner, ctx)? {
                Value::Function(callable) => Ok(callable),
                other => Err(EvalError::NotCallable(other.type_name().to_string())),
            },
        }
    }

    /// Evaluate arguments left to right, pairing each keyword marker with
    /// the value that follows it.
    fn bind_args(&self, nodes: &[Node], ctx: &Context) -> Result<Args, EvalError> {
        let mut positional = Vec::with_capacity(nodes.len());
        let mut keywords = IndexMap::new();

        let mut iter = nodes.iter();
        while let Some(node) = iter.next() {
            match node {
                Node::Keyword(name) => {
                    let value = match iter.next() {
                        Some(value_node) => self.eval_node(value_node, ctx)?,
                        None => {
                            return Err(EvalError::Value(format!(
                                "keyword argument ':{}' has no value",
                                name
                            )));
                        }
                    };
                    keywords.insert(name.clone(), value);
                }
                other => positional.push(self.eval_node(other, ctx)?),
            }
        }

        Ok(Args::with_keywords(positional, keywords))
    }

    /// Call with unpacked arguments; if the callable rejects their number
    /// or types, call once more with all positional arguments packed into
    /// a single array. This is what lets `(asarray a b c)` and
    /// `(list 1 2 3)` reach one-argument constructors.
    fn invoke(&self, callable: &Callable, args: Args, ctx: &Context) -> Result<Value, EvalError> {
        match callable.call(ctx, &args) {
            Err(e) if e.is_signature_mismatch() => {
                log::debug!(
                    "'{}' rejected unpacked arguments ({}); retrying as a single list",
                    callable.name(),
                    e
                );
                let Args {
                    positional,
                    keywords,
                } = args;
                callable.call(ctx, &Args::with_keywords(vec![Value::Array(positional)], keywords))
            }
            result => result,
        }
    }
}

/// Evaluates `source` with an evaluator that has no host functions.
///
/// # Examples
///
/// ```
/// use rcalc::{evaluate, Value};
///
/// let result = evaluate("(- 10 2 3)", Vec::<(String, Value)>::new()).unwrap();
/// assert_eq!(result, Value::Integer(5));
/// ```
pub fn evaluate<I, K>(source: &str, bindings: I) -> Result<Value, Error>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    Evaluator::new().evaluate(source, bindings)
}
