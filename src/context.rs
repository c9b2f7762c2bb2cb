//! Bindings visible to a single evaluation.

use indexmap::IndexMap;

use crate::{error::EvalError, value::Value};

/// Name lookup used by the parser for bare symbols in operand position.
pub trait Resolver {
    fn resolve(&self, name: &str) -> Option<Value>;
}

/// An ordered name to value environment, owned by one `evaluate` call.
///
/// Insertion order backs positional lookup: the first binding is input 1,
/// the second input 2, and so on.
///
/// # Examples
///
/// ```
/// use rcalc::{Context, Value};
///
/// let mut ctx = Context::new();
/// ctx.add("a", Value::from(vec![1i64, 2, 3]));
/// ctx.add("b", Value::Integer(7));
///
/// assert_eq!(ctx.get("b").unwrap(), &Value::Integer(7));
/// assert_eq!(ctx.lookup_by_position(1, Some(2)).unwrap(), Value::Integer(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    bindings: IndexMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from bindings, keeping their order.
    pub fn from_bindings<I, K>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut ctx = Context::new();
        for (name, value) in bindings {
            ctx.add(name, value);
        }
        ctx
    }

    /// Insert or overwrite a binding. Overwriting keeps the original slot.
    pub fn add(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up `name`; an unbound name is an [`EvalError::Name`].
    pub fn get(&self, name: &str) -> Result<&Value, EvalError> {
        self.bindings
            .get(name)
            .ok_or_else(|| EvalError::Name(format!("name '{}' is not defined", name)))
    }

    /// 1-based lookup by insertion order. With `subindex`, index one level
    /// further into the bound value, e.g. to select a band.
    pub fn lookup_by_position(&self, index: i64, subindex: Option<i64>) -> Result<Value, EvalError> {
        let value = usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.bindings.get_index(i))
            .map(|(_, v)| v)
            .ok_or_else(|| {
                EvalError::Index(format!(
                    "input {} out of range (1..={})",
                    index,
                    self.bindings.len()
                ))
            })?;

        let Some(subindex) = subindex else {
            return Ok(value.clone());
        };

        let items = value.as_array().ok_or_else(|| {
            EvalError::Type(format!(
                "cannot select item {} of a {} input",
                subindex,
                value.type_name()
            ))
        })?;

        usize::try_from(subindex)
            .ok()
            .and_then(|j| j.checked_sub(1))
            .and_then(|j| items.get(j))
            .cloned()
            .ok_or_else(|| {
                EvalError::Index(format!(
                    "item {} of input {} out of range (1..={})",
                    subindex,
                    index,
                    items.len()
                ))
            })
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Binding names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}

impl Resolver for Context {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }
}
