//! Callables and the host-extensible function table.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;

use crate::{
    ast::{HigherOrder, Operator},
    context::Context,
    error::EvalError,
    higher, ops,
    value::Value,
};

/// Signature of host functions and derived callables.
///
/// Arguments are borrowed, so a call rejected for its signature can be
/// retried with the same values packed into a list.
pub type NativeFn = dyn Fn(&Context, &Args) -> Result<Value, EvalError> + Send + Sync;

/// Arguments of one call: positional in order, then keywords by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    pub positional: Vec<Value>,
    pub keywords: IndexMap<String, Value>,
}

impl Args {
    pub fn new(positional: Vec<Value>) -> Self {
        Args {
            positional,
            keywords: IndexMap::new(),
        }
    }

    pub fn with_keywords(positional: Vec<Value>, keywords: IndexMap<String, Value>) -> Self {
        Args {
            positional,
            keywords,
        }
    }

    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
    }

    /// Fail if any keyword argument was given to `name`
    pub fn reject_keywords(&self, name: &str) -> Result<(), EvalError> {
        self.allow_keywords(name, &[])
    }

    /// Fail on any keyword argument not listed in `allowed`
    pub fn allow_keywords(&self, name: &str, allowed: &[&str]) -> Result<(), EvalError> {
        match self.keywords.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(key) => Err(EvalError::Type(format!(
                "'{}' got an unexpected keyword argument '{}'",
                name, key
            ))),
            None => Ok(()),
        }
    }

    /// Fail unless the positional count lies within `min..=max`
    pub fn expect_count(&self, name: &str, min: usize, max: usize) -> Result<(), EvalError> {
        let got = self.positional.len();
        if got < min || got > max {
            let expected = if min == max {
                min.to_string()
            } else if max == usize::MAX {
                format!("at least {}", min)
            } else {
                format!("{} to {}", min, max)
            };
            return Err(EvalError::arity(name, expected, got));
        }
        Ok(())
    }

    /// Take the parameter `param` either from position `index` or by
    /// keyword. Giving it both ways is a type error.
    pub fn param(&self, name: &str, index: usize, param: &str) -> Result<Option<&Value>, EvalError> {
        match (self.positional.get(index), self.keywords.get(param)) {
            (Some(_), Some(_)) => Err(EvalError::Type(format!(
                "'{}' got multiple values for argument '{}'",
                name, param
            ))),
            (Some(v), None) | (None, Some(v)) => Ok(Some(v)),
            (None, None) => Ok(None),
        }
    }
}

/// Something that can sit in function position.
#[derive(Clone)]
pub enum Callable {
    Operator(Operator),
    Higher(HigherOrder),
    Native {
        name: Arc<str>,
        func: Arc<NativeFn>,
    },
}

impl Callable {
    /// Wrap a closure as a named callable.
    pub fn native<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Context, &Args) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Callable::Native {
            name: Arc::from(name.into()),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Callable::Operator(op) => op.symbol(),
            Callable::Higher(h) => h.name(),
            Callable::Native { name, .. } => name,
        }
    }

    pub fn call(&self, ctx: &Context, args: &Args) -> Result<Value, EvalError> {
        match self {
            Callable::Operator(op) => ops::apply(*op, args),
            Callable::Higher(h) => higher::apply(*h, ctx, args),
            Callable::Native { func, .. } => func(ctx, args),
        }
    }

    /// Identity: same operator, same higher-order function, or the very
    /// same native closure.
    pub fn same(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Operator(a), Callable::Operator(b)) => a == b,
            (Callable::Higher(a), Callable::Higher(b)) => a == b,
            (Callable::Native { func: a, .. }, Callable::Native { func: b, .. }) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Operator(op) => write!(f, "<operator {}>", op.symbol()),
            Callable::Higher(h) => write!(f, "<higher-order function {}>", h.name()),
            Callable::Native { name, .. } => write!(f, "<function {}>", name),
        }
    }
}

/// Host functions available in function position, keyed by name.
///
/// Populated before evaluation and read-only while evaluating.
#[derive(Clone, Default)]
pub struct FunctionTable {
    functions: IndexMap<String, Callable>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `func` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&Context, &Args) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.insert(name, Callable::native(name, func));
    }

    /// Register an existing callable under `name`
    pub fn insert(&mut self, name: &str, callable: Callable) {
        self.functions.insert(name.to_string(), callable);
    }

    pub fn resolve(&self, name: &str) -> Option<Callable> {
        self.functions.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.functions.keys()).finish()
    }
}
