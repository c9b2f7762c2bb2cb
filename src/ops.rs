//! Operator semantics.
//!
//! Arithmetic, bitwise and comparison operators broadcast elementwise over
//! arrays: an array against a scalar applies the scalar to every element,
//! two arrays must have equal length and pair up element by element. Both
//! rules recurse, so bands and whole datasets work the same way.

use crate::{
    ast::Operator,
    error::EvalError,
    function::Args,
    value::Value,
};

/// Invoke `op` with already-evaluated arguments.
pub fn apply(op: Operator, args: &Args) -> Result<Value, EvalError> {
    let name = op.symbol();
    args.reject_keywords(name)?;

    if op.is_variadic() {
        let Some((first, rest)) = args.positional.split_first() else {
            return Err(EvalError::arity(name, "at least 1", 0));
        };
        let Some((second, rest)) = rest.split_first() else {
            return Ok(first.clone());
        };
        return rest
            .iter()
            .try_fold(binary(op, first, second)?, |acc, next| binary(op, &acc, next));
    }

    match op {
        Operator::Not => {
            args.expect_count(name, 1, 1)?;
            Ok(Value::Boolean(!args.positional[0].is_truthy()))
        }
        Operator::Truth => {
            args.expect_count(name, 1, 1)?;
            Ok(Value::Boolean(args.positional[0].is_truthy()))
        }
        Operator::Is => {
            args.expect_count(name, 2, 2)?;
            Ok(Value::Boolean(identical(&args.positional[0], &args.positional[1])))
        }
        _ => {
            args.expect_count(name, 2, 2)?;
            binary(op, &args.positional[0], &args.positional[1])
        }
    }
}

/// Apply a binary operator, broadcasting over arrays.
pub fn binary(op: Operator, left: &Value, right: &Value) -> Result<Value, EvalError> {
    broadcast(left, right, &|a, b| scalar(op, a, b))
}

/// Pair up `left` and `right` elementwise and apply `f` to the scalars.
pub fn broadcast<F>(left: &Value, right: &Value, f: &F) -> Result<Value, EvalError>
where
    F: Fn(&Value, &Value) -> Result<Value, EvalError>,
{
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return Err(EvalError::Value(format!(
                    "operands could not be broadcast together with shapes {:?} {:?}",
                    left.shape(),
                    right.shape()
                )));
            }
            a.iter()
                .zip(b)
                .map(|(x, y)| broadcast(x, y, f))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        (Value::Array(a), _) => a
            .iter()
            .map(|x| broadcast(x, right, f))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (_, Value::Array(b)) => b
            .iter()
            .map(|y| broadcast(left, y, f))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        _ => f(left, right),
    }
}

/// Apply `f` to every scalar of a (possibly nested) array.
pub fn map_elements<F>(value: &Value, f: &F) -> Result<Value, EvalError>
where
    F: Fn(&Value) -> Result<Value, EvalError>,
{
    match value {
        Value::Array(items) => items
            .iter()
            .map(|v| map_elements(v, f))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        _ => f(value),
    }
}

/// Scalar numbers with booleans counted as integers
#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

fn num(v: &Value) -> Option<Num> {
    match v {
        Value::Integer(n) => Some(Num::Int(*n)),
        Value::Boolean(b) => Some(Num::Int(*b as i64)),
        Value::Float(n) => Some(Num::Float(*n)),
        _ => None,
    }
}

fn numbers(left: &Value, right: &Value) -> Option<(Num, Num)> {
    Some((num(left)?, num(right)?))
}

fn as_f64(n: Num) -> f64 {
    match n {
        Num::Int(i) => i as f64,
        Num::Float(f) => f,
    }
}

fn unsupported(op: Operator, left: &Value, right: &Value) -> EvalError {
    EvalError::Type(format!(
        "unsupported operand types for {}: {} and {}",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

fn scalar(op: Operator, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        Operator::Add => match (left, right) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            _ => arithmetic(op, left, right, i64::wrapping_add, |a, b| a + b),
        },
        Operator::Subtract => arithmetic(op, left, right, i64::wrapping_sub, |a, b| a - b),
        Operator::Multiply => match (left, right) {
            (Value::String(s), Value::Integer(n)) | (Value::Integer(n), Value::String(s)) => {
                repeat(s, *n)
            }
            _ => arithmetic(op, left, right, i64::wrapping_mul, |a, b| a * b),
        },
        Operator::Divide => match numbers(left, right) {
            Some((a, b)) => Ok(Value::Float(as_f64(a) / as_f64(b))),
            None => Err(unsupported(op, left, right)),
        },
        Operator::BitAnd | Operator::BitOr => bitwise(op, left, right),
        Operator::Equal => Ok(Value::Boolean(equals(left, right))),
        Operator::NotEqual => Ok(Value::Boolean(!equals(left, right))),
        Operator::LessThan
        | Operator::LessEqual
        | Operator::GreaterEqual
        | Operator::GreaterThan => compare(op, left, right),
        Operator::Not | Operator::Truth | Operator::Is => Err(EvalError::Type(format!(
            "'{}' is not a binary operator",
            op.symbol()
        ))),
    }
}

/// Longest string `*` may build, in bytes
const MAX_REPEAT_LEN: usize = 1 << 28;

/// `'ab' * n`; a negative count gives the empty string
fn repeat(s: &str, n: i64) -> Result<Value, EvalError> {
    let count = usize::try_from(n).unwrap_or(0);
    match s.len().checked_mul(count) {
        Some(len) if len <= MAX_REPEAT_LEN => Ok(Value::String(s.repeat(count))),
        _ => Err(EvalError::Value(format!(
            "repeated string is too long ({} x {} bytes)",
            n,
            s.len()
        ))),
    }
}

fn arithmetic(
    op: Operator,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    match numbers(left, right) {
        Some((Num::Int(a), Num::Int(b))) => Ok(Value::Integer(int_op(a, b))),
        Some((a, b)) => Ok(Value::Float(float_op(as_f64(a), as_f64(b)))),
        None => Err(unsupported(op, left, right)),
    }
}

fn bitwise(op: Operator, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let and = op == Operator::BitAnd;
    match (left, right) {
        (Value::Boolean(a), Value::Boolean(b)) => {
            Ok(Value::Boolean(if and { *a && *b } else { *a || *b }))
        }
        _ => match numbers(left, right) {
            Some((Num::Int(a), Num::Int(b))) => Ok(Value::Integer(if and { a & b } else { a | b })),
            _ => Err(unsupported(op, left, right)),
        },
    }
}

/// Value equality with numeric coercion (`1 == 1.0`, `true == 1`)
pub fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| equals(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|w| equals(v, w)))
        }
        _ => match numbers(left, right) {
            Some((Num::Int(a), Num::Int(b))) => a == b,
            Some((a, b)) => as_f64(a) == as_f64(b),
            None => left == right,
        },
    }
}

fn compare(op: Operator, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let result = match (left, right) {
        (Value::String(a), Value::String(b)) => match op {
            Operator::LessThan => a < b,
            Operator::LessEqual => a <= b,
            Operator::GreaterEqual => a >= b,
            _ => a > b,
        },
        _ => match numbers(left, right) {
            Some((Num::Int(a), Num::Int(b))) => match op {
                Operator::LessThan => a < b,
                Operator::LessEqual => a <= b,
                Operator::GreaterEqual => a >= b,
                _ => a > b,
            },
            Some((a, b)) => {
                let (a, b) = (as_f64(a), as_f64(b));
                match op {
                    Operator::LessThan => a < b,
                    Operator::LessEqual => a <= b,
                    Operator::GreaterEqual => a >= b,
                    _ => a > b,
                }
            }
            None => {
                return Err(EvalError::Type(format!(
                    "'{}' not supported between {} and {}",
                    op.symbol(),
                    left.type_name(),
                    right.type_name()
                )));
            }
        },
    };
    Ok(Value::Boolean(result))
}

/// Strict identity: same variant and same value, with no numeric
/// coercion. Floats compare by bit pattern, so a NaN is identical to
/// itself; callables compare by identity.
pub fn identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| identical(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|w| identical(v, w)))
        }
        _ => left == right,
    }
}
