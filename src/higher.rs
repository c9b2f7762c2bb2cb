//! Higher-order functions: each takes a callable (or accessor
//! configuration) and produces a derived callable or a sequence.

use crate::{
    ast::HigherOrder,
    context::Context,
    error::EvalError,
    function::{Args, Callable},
    methods,
    value::Value,
};

pub fn apply(h: HigherOrder, ctx: &Context, args: &Args) -> Result<Value, EvalError> {
    match h {
        HigherOrder::Map => map(ctx, args),
        HigherOrder::Partial => partial(args),
        HigherOrder::Reduce => reduce(ctx, args),
        HigherOrder::AttrGetter => attrgetter(args),
        HigherOrder::MethodCaller => methodcaller(args),
        HigherOrder::ItemGetter => itemgetter(args),
    }
}

fn callable_arg(value: &Value, name: &str) -> Result<Callable, EvalError> {
    match value {
        Value::Function(c) => Ok(c.clone()),
        other => Err(EvalError::Type(format!(
            "{}() first argument must be callable, not {}",
            name,
            other.type_name()
        ))),
    }
}

fn sequence_arg<'a>(value: &'a Value, name: &str) -> Result<&'a [Value], EvalError> {
    value.as_array().ok_or_else(|| {
        EvalError::Type(format!(
            "{}() argument must be an array, not {}",
            name,
            value.type_name()
        ))
    })
}

/// `(map f xs ys ...)` calls `f` with the i-th element of every sequence,
/// stopping at the shortest.
fn map(ctx: &Context, args: &Args) -> Result<Value, EvalError> {
    args.reject_keywords("map")?;
    args.expect_count("map", 2, usize::MAX)?;

    let func = callable_arg(&args.positional[0], "map")?;
    let sequences = args.positional[1..]
        .iter()
        .map(|v| sequence_arg(v, "map"))
        .collect::<Result<Vec<_>, _>>()?;
    let len = sequences.iter().map(|s| s.len()).min().unwrap_or(0);

    let mut result = Vec::with_capacity(len);
    for i in 0..len {
        let items = sequences.iter().map(|s| s[i].clone()).collect();
        result.push(func.call(ctx, &Args::new(items))?);
    }
    Ok(Value::Array(result))
}

/// `(partial f a b :k v)` returns `f` with leading positional and keyword
/// arguments bound. Keywords given at call time override bound ones.
fn partial(args: &Args) -> Result<Value, EvalError> {
    let Some((func, bound)) = args.positional.split_first() else {
        return Err(EvalError::arity("partial", "at least 1", 0));
    };
    let func = callable_arg(func, "partial")?;
    let bound = bound.to_vec();
    let bound_keywords = args.keywords.clone();
    let name = format!("partial({})", func.name());

    Ok(Value::Function(Callable::native(name, move |ctx, call| {
        let mut positional = bound.clone();
        positional.extend(call.positional.iter().cloned());
        let mut keywords = bound_keywords.clone();
        keywords.extend(call.keywords.iter().map(|(k, v)| (k.clone(), v.clone())));
        func.call(ctx, &Args::with_keywords(positional, keywords))
    })))
}

/// `(reduce f xs [initial])` left-folds `f` over `xs`.
fn reduce(ctx: &Context, args: &Args) -> Result<Value, EvalError> {
    args.reject_keywords("reduce")?;
    args.expect_count("reduce", 2, 3)?;

    let func = callable_arg(&args.positional[0], "reduce")?;
    let items = sequence_arg(&args.positional[1], "reduce")?;

    let mut iter = items.iter().cloned();
    let initial = match args.positional.get(2) {
        Some(v) => v.clone(),
        None => iter.next().ok_or_else(|| {
            EvalError::Type("reduce() of empty sequence with no initial value".to_string())
        })?,
    };

    iter.try_fold(initial, |acc, item| func.call(ctx, &Args::new(vec![acc, item])))
}

fn string_args(args: &Args, name: &str) -> Result<Vec<String>, EvalError> {
    args.reject_keywords(name)?;
    args.expect_count(name, 1, usize::MAX)?;
    args.positional
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                EvalError::Type(format!(
                    "{}() names must be strings, not {}",
                    name,
                    v.type_name()
                ))
            })
        })
        .collect()
}

/// One result for a single accessor, an array of results for several
fn gather<F>(keys: usize, f: F) -> Result<Value, EvalError>
where
    F: Fn(usize) -> Result<Value, EvalError>,
{
    if keys == 1 {
        return f(0);
    }
    (0..keys)
        .map(f)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn single_target<'a>(call: &'a Args, name: &str) -> Result<&'a Value, EvalError> {
    call.reject_keywords(name)?;
    call.expect_count(name, 1, 1)?;
    Ok(&call.positional[0])
}

/// `(attrgetter 'a' 'b.c')` returns a callable fetching attributes;
/// dotted names walk nested objects.
fn attrgetter(args: &Args) -> Result<Value, EvalError> {
    let names = string_args(args, "attrgetter")?;
    let label = format!("attrgetter({})", names.join(", "));

    Ok(Value::Function(Callable::native(label, move |_, call| {
        let target = single_target(call, "attrgetter")?;
        gather(names.len(), |i| {
            names[i]
                .split('.')
                .try_fold(target.clone(), |v, part| methods::get_attribute(&v, part))
        })
    })))
}

/// `(methodcaller 'name' arg ... :k v)` returns a callable invoking the
/// named method on its argument.
fn methodcaller(args: &Args) -> Result<Value, EvalError> {
    args.expect_count("methodcaller", 1, usize::MAX)?;
    let method = args.positional[0]
        .as_str()
        .ok_or_else(|| EvalError::Type("methodcaller() method name must be a string".to_string()))?
        .to_string();
    let bound = Args::with_keywords(args.positional[1..].to_vec(), args.keywords.clone());
    let label = format!("methodcaller({})", method);

    Ok(Value::Function(Callable::native(label, move |_, call| {
        let target = single_target(call, "methodcaller")?;
        methods::call_method(target, &method, &bound)
    })))
}

/// `(itemgetter 0 -1)` returns a callable indexing arrays (negative
/// indices count from the end) or objects by key.
fn itemgetter(args: &Args) -> Result<Value, EvalError> {
    args.reject_keywords("itemgetter")?;
    args.expect_count("itemgetter", 1, usize::MAX)?;
    let keys = args.positional.clone();
    let label = format!("itemgetter/{}", keys.len());

    Ok(Value::Function(Callable::native(label, move |_, call| {
        let target = single_target(call, "itemgetter")?;
        gather(keys.len(), |i| get_item(target, &keys[i]))
    })))
}

pub fn get_item(target: &Value, key: &Value) -> Result<Value, EvalError> {
    match (target, key) {
        (Value::Array(items), Value::Integer(n)) => {
            let len = items.len() as i64;
            let index = if *n < 0 { len + n } else { *n };
            usize::try_from(index)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .ok_or_else(|| EvalError::Index(format!("index {} out of range for length {}", n, len)))
        }
        (Value::Object(map), Value::String(k)) => map
            .get(k)
            .cloned()
            .ok_or_else(|| EvalError::Key(format!("'{}'", k))),
        (Value::String(s), Value::Integer(n)) => {
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len() as i64;
            let index = if *n < 0 { len + n } else { *n };
            usize::try_from(index)
                .ok()
                .and_then(|i| chars.get(i))
                .map(|c| Value::String(c.to_string()))
                .ok_or_else(|| EvalError::Index(format!("string index {} out of range", n)))
        }
        _ => Err(EvalError::Type(format!(
            "cannot index {} with {}",
            target.type_name(),
            key.type_name()
        ))),
    }
}
