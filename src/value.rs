use indexmap::IndexMap;

use crate::function::Callable;

/// A value produced or consumed by the expression evaluator.
///
/// Raster inputs are represented as nested arrays: a dataset is an array
/// of bands, a band an array of rows, a row an array of numbers.
///
/// # Type Preservation
///
/// Integers and floats are kept apart:
/// - `+ - *` on two integers stay integers
/// - any float operand promotes the result to a float
/// - `/` is true division and always yields a float
///
/// # Examples
///
/// ```
/// use rcalc::Value;
///
/// let band = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
/// assert_eq!(band.type_name(), "array");
/// assert!(band.is_truthy());
/// assert!(!Value::Float(0.0).is_truthy());
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// `null`
    Null,

    /// `true` / `false`
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Array of values; rasters are arrays of arrays
    Array(Vec<Value>),

    /// Object with ordered string keys
    Object(IndexMap<String, Value>),

    /// A callable: operator, higher-order function, host function, or a
    /// callable derived from one (`partial`, `itemgetter`, ...)
    Function(Callable),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            (Function(a), Function(b)) => a.same(b),
            _ => false,
        }
    }
}

impl Value {
    /// Truthiness used by `not`, `truth` and `where`
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Float(n) => *n != 0.0,
            Integer(n) => *n != 0,
            String(s) => !s.is_empty(),
            Array(arr) => !arr.is_empty(),
            Object(obj) => !obj.is_empty(),
            Function(_) => true,
        }
    }

    /// Get as float; booleans count as 0 and 1
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Get as integer. Floats only convert when they hold a whole number.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Boolean(b) => Some(*b as i64),
            Value::Float(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Human-readable type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Shape of a (possibly nested) array, numpy style. Scalars have an
    /// empty shape; ragged arrays report the shape of their first element.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = Vec::new();
        let mut current = self;
        while let Value::Array(items) = current {
            shape.push(items.len());
            match items.first() {
                Some(first) => current = first,
                None => break,
            }
        }
        shape
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}
