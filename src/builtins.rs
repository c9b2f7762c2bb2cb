//! Raster-calculator host functions.
//!
//! - `(read i)` evaluates to the i-th input (a dataset, i.e. an array of
//!   bands), `(read i j)` to its j-th band. An optional third argument or
//!   `:dtype` casts the result.
//! - `(take foo j)` evaluates to the j-th band of the input named `foo`.
//! - `(asarray a b c)` stacks arrays into one; it only takes one argument,
//!   the variadic form goes through the list fallback.
//! - `(list 1 2 3)` builds an array the same way.
//! - `where`, `sqrt`, `abs`, `minimum` and `maximum` work elementwise.

use crate::{
    context::Context,
    dtype::dtype_arg,
    error::EvalError,
    function::{Args, FunctionTable},
    ops::{broadcast, map_elements},
    value::Value,
};

pub fn register(table: &mut FunctionTable) {
    table.register("read", read);
    table.register("take", take);
    table.register("asarray", asarray);
    table.register("list", list);
    table.register("where", where_);
    table.register("sqrt", sqrt);
    table.register("abs", abs);
    table.register("minimum", minimum);
    table.register("maximum", maximum);
}

fn int_arg(value: &Value, func: &str, param: &str) -> Result<i64, EvalError> {
    match value {
        Value::Integer(n) => Ok(*n),
        other => Err(EvalError::Type(format!(
            "{}() argument '{}' must be an integer, not {}",
            func,
            param,
            other.type_name()
        ))),
    }
}

/// Drop `null` so that `(read 1 null 'uint8')` means "no subindex"
fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn read(ctx: &Context, args: &Args) -> Result<Value, EvalError> {
    args.expect_count("read", 0, 3)?;
    let ix = args
        .param("read", 0, "ix")?
        .ok_or_else(|| EvalError::arity("read", "1 to 3", 0))?;
    let subix = non_null(args.param("read", 1, "subix")?);
    let dtype = non_null(args.param("read", 2, "dtype")?);
    args.allow_keywords("read", &["ix", "subix", "dtype"])?;

    let ix = int_arg(ix, "read", "ix")?;
    let subix = subix.map(|v| int_arg(v, "read", "subix")).transpose()?;

    let value = ctx.lookup_by_position(ix, subix)?;
    match dtype {
        Some(dtype) => dtype_arg(dtype)?.cast(&value),
        None => Ok(value),
    }
}

fn take(_: &Context, args: &Args) -> Result<Value, EvalError> {
    args.reject_keywords("take")?;
    args.expect_count("take", 2, 2)?;

    let bands = args.positional[0].as_array().ok_or_else(|| {
        EvalError::Type(format!(
            "take() requires an array, got {}",
            args.positional[0].type_name()
        ))
    })?;
    let j = int_arg(&args.positional[1], "take", "j")?;

    usize::try_from(j)
        .ok()
        .and_then(|j| j.checked_sub(1))
        .and_then(|j| bands.get(j))
        .cloned()
        .ok_or_else(|| {
            EvalError::Index(format!("band {} out of range (1..={})", j, bands.len()))
        })
}

fn asarray(_: &Context, args: &Args) -> Result<Value, EvalError> {
    args.expect_count("asarray", 0, 2)?;
    let a = args
        .param("asarray", 0, "a")?
        .ok_or_else(|| EvalError::arity("asarray", "1 or 2", 0))?;
    let dtype = non_null(args.param("asarray", 1, "dtype")?);
    args.allow_keywords("asarray", &["a", "dtype"])?;

    match dtype {
        Some(dtype) => dtype_arg(dtype)?.cast(a),
        None => Ok(a.clone()),
    }
}

fn list(_: &Context, args: &Args) -> Result<Value, EvalError> {
    args.reject_keywords("list")?;
    args.expect_count("list", 1, 1)?;

    match &args.positional[0] {
        Value::Array(items) => Ok(Value::Array(items.clone())),
        Value::String(s) => Ok(Value::Array(
            s.chars().map(|c| Value::String(c.to_string())).collect(),
        )),
        other => Err(EvalError::Type(format!(
            "'{}' object is not iterable",
            other.type_name()
        ))),
    }
}

/// `(where cond x y)`: `x` where `cond` is truthy, else `y`, elementwise
fn where_(_: &Context, args: &Args) -> Result<Value, EvalError> {
    args.reject_keywords("where")?;
    args.expect_count("where", 3, 3)?;
    select(&args.positional[0], &args.positional[1], &args.positional[2])
}

fn select(cond: &Value, x: &Value, y: &Value) -> Result<Value, EvalError> {
    let lens: Vec<usize> = [cond, x, y]
        .iter()
        .filter_map(|v| v.as_array().map(<[Value]>::len))
        .collect();

    let Some(&len) = lens.first() else {
        return Ok(if cond.is_truthy() { x.clone() } else { y.clone() });
    };
    if lens.iter().any(|&l| l != len) {
        return Err(EvalError::Value(format!(
            "operands could not be broadcast together with shapes {:?} {:?} {:?}",
            cond.shape(),
            x.shape(),
            y.shape()
        )));
    }

    let pick = |v: &Value, i: usize| match v {
        Value::Array(items) => items[i].clone(),
        scalar => scalar.clone(),
    };
    (0..len)
        .map(|i| select(&pick(cond, i), &pick(x, i), &pick(y, i)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn unary_arg<'a>(args: &'a Args, name: &str) -> Result<&'a Value, EvalError> {
    args.reject_keywords(name)?;
    args.expect_count(name, 1, 1)?;
    Ok(&args.positional[0])
}

fn not_numeric(name: &str, v: &Value) -> EvalError {
    EvalError::Type(format!(
        "{}() requires numeric input, got {}",
        name,
        v.type_name()
    ))
}

fn sqrt(_: &Context, args: &Args) -> Result<Value, EvalError> {
    map_elements(unary_arg(args, "sqrt")?, &|v| {
        v.as_float()
            .map(|f| Value::Float(f.sqrt()))
            .ok_or_else(|| not_numeric("sqrt", v))
    })
}

fn abs(_: &Context, args: &Args) -> Result<Value, EvalError> {
    map_elements(unary_arg(args, "abs")?, &|v| match v {
        Value::Integer(n) => Ok(Value::Integer(n.wrapping_abs())),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        Value::Boolean(b) => Ok(Value::Boolean(*b)),
        other => Err(not_numeric("abs", other)),
    })
}

fn extreme(name: &str, args: &Args, take_left: fn(f64, f64) -> bool) -> Result<Value, EvalError> {
    args.reject_keywords(name)?;
    args.expect_count(name, 2, 2)?;
    broadcast(&args.positional[0], &args.positional[1], &|a, b| {
        match (a, b) {
            (Value::Integer(x), Value::Integer(y)) => {
                Ok(Value::Integer(if take_left(*x as f64, *y as f64) { *x } else { *y }))
            }
            _ => {
                let x = a.as_float().ok_or_else(|| not_numeric(name, a))?;
                let y = b.as_float().ok_or_else(|| not_numeric(name, b))?;
                if x.is_nan() || y.is_nan() {
                    return Ok(Value::Float(f64::NAN));
                }
                Ok(Value::Float(if take_left(x, y) { x } else { y }))
            }
        }
    })
}

fn minimum(_: &Context, args: &Args) -> Result<Value, EvalError> {
    extreme("minimum", args, |x, y| x <= y)
}

fn maximum(_: &Context, args: &Args) -> Result<Value, EvalError> {
    extreme("maximum", args, |x, y| x >= y)
}
