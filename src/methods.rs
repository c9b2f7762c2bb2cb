//! Methods and attributes of values, reached through `methodcaller` and
//! `attrgetter`.

use crate::{dtype::dtype_arg, error::EvalError, function::Args, value::Value};

fn no_attribute(object: &Value, name: &str) -> EvalError {
    EvalError::Attribute(format!(
        "'{}' object has no attribute '{}'",
        object.type_name(),
        name
    ))
}

/// Look up attribute `name`: object fields, plus `shape`, `ndim` and
/// `size` of arrays.
pub fn get_attribute(object: &Value, name: &str) -> Result<Value, EvalError> {
    match (object, name) {
        (Value::Object(map), _) => map.get(name).cloned().ok_or_else(|| no_attribute(object, name)),
        (Value::Array(_), "shape") => Ok(Value::from(
            object.shape().into_iter().map(|n| n as i64).collect::<Vec<_>>(),
        )),
        (Value::Array(_), "ndim") => Ok(Value::Integer(object.shape().len() as i64)),
        (Value::Array(_), "size") => Ok(Value::Integer(flatten(object).len() as i64)),
        _ => Err(no_attribute(object, name)),
    }
}

/// Dispatch method calls to their implementations
pub fn call_method(object: &Value, method: &str, args: &Args) -> Result<Value, EvalError> {
    match (object, method) {
        // Array methods
        (Value::Array(_), "sum") => method_sum(object, args),
        (Value::Array(_), "min") => method_extreme(object, args, "min"),
        (Value::Array(_), "max") => method_extreme(object, args, "max"),
        (Value::Array(_), "mean") => method_mean(object, args),
        (Value::Array(_), "any") => no_args(args, "any")
            .map(|_| Value::Boolean(flatten(object).iter().any(Value::is_truthy))),
        (Value::Array(_), "all") => no_args(args, "all")
            .map(|_| Value::Boolean(flatten(object).iter().all(Value::is_truthy))),
        (Value::Array(_), "flatten") => {
            no_args(args, "flatten").map(|_| Value::Array(flatten(object)))
        }
        (Value::Array(_), "tolist") => no_args(args, "tolist").map(|_| object.clone()),
        (_, "astype") => method_astype(object, args),
        // String methods
        (Value::String(s), "upper") => no_args(args, "upper").map(|_| Value::String(s.to_uppercase())),
        (Value::String(s), "lower") => no_args(args, "lower").map(|_| Value::String(s.to_lowercase())),
        (Value::String(s), "strip") => no_args(args, "strip").map(|_| Value::String(s.trim().to_string())),
        (Value::String(s), "split") => method_split(s, args),
        (Value::String(s), "startswith") => {
            string_arg(args, "startswith").map(|p| Value::Boolean(s.starts_with(p)))
        }
        (Value::String(s), "endswith") => {
            string_arg(args, "endswith").map(|p| Value::Boolean(s.ends_with(p)))
        }
        (Value::String(s), "replace") => method_replace(s, args),
        // Object methods
        (Value::Object(map), "keys") => no_args(args, "keys")
            .map(|_| Value::Array(map.keys().map(|k| Value::String(k.clone())).collect())),
        (Value::Object(map), "values") => {
            no_args(args, "values").map(|_| Value::Array(map.values().cloned().collect()))
        }
        (Value::Object(map), "get") => {
            args.reject_keywords("get")?;
            args.expect_count("get", 1, 2)?;
            let key = args.positional[0].as_str().ok_or_else(|| {
                EvalError::Type("get() key must be a string".to_string())
            })?;
            Ok(map
                .get(key)
                .cloned()
                .or_else(|| args.positional.get(1).cloned())
                .unwrap_or(Value::Null))
        }
        _ => Err(no_attribute(object, method)),
    }
}

fn no_args(args: &Args, name: &str) -> Result<(), EvalError> {
    args.reject_keywords(name)?;
    args.expect_count(name, 0, 0)
}

fn string_arg<'a>(args: &'a Args, name: &str) -> Result<&'a str, EvalError> {
    args.reject_keywords(name)?;
    args.expect_count(name, 1, 1)?;
    args.positional[0].as_str().ok_or_else(|| {
        EvalError::Type(format!(
            "{}() argument must be a string, not {}",
            name,
            args.positional[0].type_name()
        ))
    })
}

/// All scalars of a nested array, in row-major order
pub fn flatten(value: &Value) -> Vec<Value> {
    let mut out = Vec::new();
    fn walk(value: &Value, out: &mut Vec<Value>) {
        match value {
            Value::Array(items) => items.iter().for_each(|v| walk(v, out)),
            other => out.push(other.clone()),
        }
    }
    walk(value, &mut out);
    out
}

fn numeric_elements(object: &Value, name: &str) -> Result<Vec<Value>, EvalError> {
    let items = flatten(object);
    for item in &items {
        if item.as_float().is_none() {
            return Err(EvalError::Type(format!(
                "{}() requires numeric elements, found {}",
                name,
                item.type_name()
            )));
        }
    }
    Ok(items)
}

fn method_sum(object: &Value, args: &Args) -> Result<Value, EvalError> {
    no_args(args, "sum")?;
    let items = numeric_elements(object, "sum")?;

    if items.iter().any(|v| matches!(v, Value::Float(_))) {
        let total: f64 = items.iter().filter_map(Value::as_float).sum();
        Ok(Value::Float(total))
    } else {
        let total = items
            .iter()
            .filter_map(Value::as_int)
            .fold(0i64, i64::wrapping_add);
        Ok(Value::Integer(total))
    }
}

fn method_extreme(object: &Value, args: &Args, name: &str) -> Result<Value, EvalError> {
    no_args(args, name)?;
    let items = numeric_elements(object, name)?;

    let mut best: Option<&Value> = None;
    for item in &items {
        let replace = match best {
            None => true,
            Some(current) => {
                let (a, b) = (item.as_float(), current.as_float());
                if name == "min" { a < b } else { a > b }
            }
        };
        if replace {
            best = Some(item);
        }
    }

    best.cloned().ok_or_else(|| {
        EvalError::Value(format!(
            "zero-size array to reduction operation {} which has no identity",
            name
        ))
    })
}

fn method_mean(object: &Value, args: &Args) -> Result<Value, EvalError> {
    no_args(args, "mean")?;
    let items = numeric_elements(object, "mean")?;
    let total: f64 = items.iter().filter_map(Value::as_float).sum();
    Ok(Value::Float(total / items.len() as f64))
}

fn method_astype(object: &Value, args: &Args) -> Result<Value, EvalError> {
    let dtype = args
        .param("astype", 0, "dtype")?
        .ok_or_else(|| EvalError::arity("astype", "1", 0))?;
    args.allow_keywords("astype", &["dtype"])?;
    args.expect_count("astype", 0, 1)?;
    dtype_arg(dtype)?.cast(object)
}

fn method_split(s: &str, args: &Args) -> Result<Value, EvalError> {
    args.reject_keywords("split")?;
    args.expect_count("split", 0, 1)?;

    let parts: Vec<Value> = match args.positional.first() {
        None | Some(Value::Null) => s.split_whitespace().map(Value::from).collect(),
        Some(Value::String(sep)) if !sep.is_empty() => s.split(sep.as_str()).map(Value::from).collect(),
        Some(Value::String(_)) => return Err(EvalError::Value("empty separator".to_string())),
        Some(other) => {
            return Err(EvalError::Type(format!(
                "split() separator must be a string, not {}",
                other.type_name()
            )));
        }
    };
    Ok(Value::Array(parts))
}

fn method_replace(s: &str, args: &Args) -> Result<Value, EvalError> {
    args.reject_keywords("replace")?;
    args.expect_count("replace", 2, 2)?;
    match (&args.positional[0], &args.positional[1]) {
        (Value::String(from), Value::String(to)) => Ok(Value::String(s.replace(from.as_str(), to))),
        _ => Err(EvalError::Type(
            "replace() arguments must be strings".to_string(),
        )),
    }
}
