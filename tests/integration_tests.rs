use rcalc::{Args, Context, Error, ErrorKind, EvalError, Evaluator, Value};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

fn eval(source: &str) -> Result<Value, Error> {
    Evaluator::with_builtins().evaluate(source, Vec::<(&str, Value)>::new())
}

fn eval_with(source: &str, bindings: &[(&str, Value)]) -> Result<Value, Error> {
    Evaluator::with_builtins().evaluate(source, bindings.iter().cloned())
}

fn array(values: Vec<Value>) -> Value {
    Value::Array(values)
}

fn ints(values: &[i64]) -> Value {
    Value::from(values.to_vec())
}

fn floats(values: &[f64]) -> Value {
    Value::from(values.to_vec())
}

fn expression_error(result: Result<Value, Error>) -> rcalc::ExpressionError {
    match result {
        Err(Error::Expression(e)) => e,
        other => panic!("expected an expression error, got {:?}", other),
    }
}

fn eval_error(result: Result<Value, Error>) -> EvalError {
    match result {
        Err(Error::Evaluation(e)) => e,
        other => panic!("expected an evaluation error, got {:?}", other),
    }
}

/// `f(x, mode=None)` returning `[x, mode]`
fn register_f(evaluator: &mut Evaluator) {
    evaluator.register("f", |_, args| {
        let x = args
            .param("f", 0, "x")?
            .cloned()
            .ok_or_else(|| EvalError::arity("f", "1 or 2", 0))?;
        let mode = args.param("f", 1, "mode")?.cloned().unwrap_or(Value::Null);
        args.allow_keywords("f", &["x", "mode"])?;
        args.expect_count("f", 0, 2)?;
        Ok(array(vec![x, mode]))
    });
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_arithmetic_left_folds() {
    assert_eq!(eval("(- 10 2 3)").unwrap(), Value::Integer(5));
    assert_eq!(eval("(+ 1 2 3)").unwrap(), Value::Integer(6));
    assert_eq!(eval("(* 2 3 4)").unwrap(), Value::Integer(24));
    assert_eq!(eval("(/ 12 2 3)").unwrap(), Value::Float(2.0));
    assert_eq!(eval("(- 5)").unwrap(), Value::Integer(5));
}

#[test]
fn test_comparisons_return_booleans() {
    assert_eq!(eval("(< 1 2)").unwrap(), Value::Boolean(true));
    assert_eq!(eval("(== 1 1.0)").unwrap(), Value::Boolean(true));
    assert_eq!(eval("(!= 1 2)").unwrap(), Value::Boolean(true));
    assert_eq!(eval("(>= 2 2.5)").unwrap(), Value::Boolean(false));
    assert_eq!(eval("(> 'b' 'a')").unwrap(), Value::Boolean(true));
}

#[test]
fn test_comparison_arity_is_enforced() {
    assert!(matches!(
        eval_error(eval("(< 1 2 3)")),
        EvalError::Arity { .. }
    ));
}

#[test]
fn test_ordering_mixed_types() {
    assert!(eval("(< 1 'a')").is_err());
    assert_eq!(eval("(== 1 'a')").unwrap(), Value::Boolean(false));
}

#[test]
fn test_nested_forms() {
    assert_eq!(eval("(+ (* 2 3) (- 10 4))").unwrap(), Value::Integer(12));
}

#[test]
fn test_word_operators() {
    assert_eq!(eval("(not 0)").unwrap(), Value::Boolean(true));
    assert_eq!(eval("(truth 'x')").unwrap(), Value::Boolean(true));
    assert_eq!(eval("(is 1 1)").unwrap(), Value::Boolean(true));
    assert_eq!(eval("(is 1 1.0)").unwrap(), Value::Boolean(false));
}

#[test]
fn test_bitwise_and_strings() {
    assert_eq!(eval("(& true false)").unwrap(), Value::Boolean(false));
    assert_eq!(eval("(| 1 2)").unwrap(), Value::Integer(3));
    assert_eq!(eval("(+ 'ab' 'cd')").unwrap(), Value::from("abcd"));
}

#[test]
fn test_sign_in_function_position() {
    assert_eq!(eval("(+1 2)").unwrap(), Value::Integer(3));
    assert_eq!(eval("(-5 2)").unwrap(), Value::Integer(3));
    assert_eq!(eval("(- 10 -2)").unwrap(), Value::Integer(12));
}

#[test]
fn test_nan_is_itself() {
    let x = Value::Float(f64::NAN);
    assert_eq!(eval_with("(is x x)", &[("x", x.clone())]).unwrap(), Value::Boolean(true));
    assert_eq!(eval_with("(== x x)", &[("x", x)]).unwrap(), Value::Boolean(false));
}

#[test]
fn test_oversized_string_repeat() {
    assert_eq!(eval("(* 'ab' 3)").unwrap(), Value::from("ababab"));
    assert!(matches!(
        eval_error(eval("(* 'ab' 9223372036854775807)")),
        EvalError::Value(_)
    ));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(eval("(/ 1 0)").unwrap(), Value::Float(f64::INFINITY));
}

#[test]
fn test_broadcasting() {
    let a = array(vec![ints(&[1, 2]), ints(&[3, 4])]);
    assert_eq!(
        eval_with("(+ a 1)", &[("a", a.clone())]).unwrap(),
        array(vec![ints(&[2, 3]), ints(&[4, 5])])
    );
    assert_eq!(
        eval_with("(* a a)", &[("a", a)]).unwrap(),
        array(vec![ints(&[1, 4]), ints(&[9, 16])])
    );
    assert!(matches!(
        eval_error(eval_with("(+ a b)", &[("a", ints(&[1, 2])), ("b", ints(&[1, 2, 3]))])),
        EvalError::Value(_)
    ));
}

// ============================================================================
// Bindings and name resolution
// ============================================================================

#[test]
fn test_binding_lookup() {
    assert_eq!(
        eval_with("(+ a 1)", &[("a", Value::Integer(5))]).unwrap(),
        Value::Integer(6)
    );
}

#[test]
fn test_unbound_name_points_at_symbol() {
    let err = expression_error(eval_with("(+ b 1)", &[("a", Value::Integer(5))]));
    assert_eq!(err.kind, ErrorKind::Name);
    assert_eq!(err.offset, 4);
}

#[test]
fn test_unknown_function() {
    let err = expression_error(eval("(frobnicate 1 2)"));
    assert_eq!(err.kind, ErrorKind::Function);
    assert_eq!(err.offset, 2);
}

#[test]
fn test_top_level_variable() {
    assert_eq!(
        eval_with("a", &[("a", Value::from("hello"))]).unwrap(),
        Value::from("hello")
    );
}

// ============================================================================
// Argument binding
// ============================================================================

#[test]
fn test_keyword_arguments() {
    let mut evaluator = Evaluator::new();
    register_f(&mut evaluator);
    let no_bindings = Vec::<(&str, Value)>::new;

    assert_eq!(
        evaluator.evaluate("(f 1 :mode 'fast')", no_bindings()).unwrap(),
        array(vec![Value::Integer(1), Value::from("fast")])
    );
    assert_eq!(
        evaluator.evaluate("(f :x 2)", no_bindings()).unwrap(),
        array(vec![Value::Integer(2), Value::Null])
    );
    assert_eq!(
        evaluator.evaluate("(f :mode 'slow' :x 3)", no_bindings()).unwrap(),
        array(vec![Value::Integer(3), Value::from("slow")])
    );
}

#[test]
fn test_unknown_keyword_is_an_error() {
    let mut evaluator = Evaluator::new();
    register_f(&mut evaluator);
    let result = evaluator.evaluate("(f 1 :speed 2)", Vec::<(&str, Value)>::new());
    assert!(matches!(result, Err(Error::Evaluation(EvalError::Type(_)))));
}

#[test]
fn test_fallback_to_list() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut evaluator = Evaluator::new();
    evaluator.register("g", move |_, args| {
        counter.fetch_add(1, Ordering::SeqCst);
        match args.positional.as_slice() {
            [Value::Array(items)] => Ok(Value::Integer(items.iter().filter_map(Value::as_int).sum())),
            _ => Err(EvalError::Type("g() takes a single sequence".to_string())),
        }
    });

    let result = evaluator.evaluate("(g 1 2 3)", Vec::<(&str, Value)>::new());
    assert_eq!(result.unwrap(), Value::Integer(6));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_fallback_keeps_keywords() {
    let mut evaluator = Evaluator::new();
    evaluator.register("h", |_, args| {
        let scale = args.param("h", 99, "scale")?.cloned().unwrap_or(Value::Integer(1));
        match args.positional.as_slice() {
            [Value::Array(items)] => Ok(array(vec![Value::Integer(items.len() as i64), scale])),
            _ => Err(EvalError::arity("h", "1", args.len())),
        }
    });

    assert_eq!(
        evaluator
            .evaluate("(h 1 2 :scale 10)", Vec::<(&str, Value)>::new())
            .unwrap(),
        array(vec![Value::Integer(2), Value::Integer(10)])
    );
}

#[test]
fn test_rejected_call_leaves_arguments_intact() {
    let mut evaluator = Evaluator::new();
    evaluator.register("g", |_, args| match args.positional.as_slice() {
        [Value::Array(_)] => Ok(Value::Null),
        _ => Err(EvalError::Type("g() takes a single sequence".to_string())),
    });

    let g = evaluator.functions().resolve("g").unwrap();
    let args = Args::new(vec![Value::Integer(1), Value::Integer(2)]);
    assert!(g.call(&Context::new(), &args).is_err());
    assert_eq!(args.positional, vec![Value::Integer(1), Value::Integer(2)]);
}

#[test]
fn test_other_errors_are_not_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut evaluator = Evaluator::new();
    evaluator.register("bad", move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(EvalError::Value("bad input".to_string()))
    });

    let result = evaluator.evaluate("(bad 1 2)", Vec::<(&str, Value)>::new());
    assert_eq!(
        result.unwrap_err(),
        Error::Evaluation(EvalError::Value("bad input".to_string()))
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Context lifecycle and concurrency
// ============================================================================

#[test]
fn test_repeat_evaluation_is_stable() {
    let evaluator = Evaluator::with_builtins();
    let bindings = [("a", ints(&[1, 2, 3]))];

    let first = evaluator.evaluate("(* a 2)", bindings.clone()).unwrap();
    let second = evaluator.evaluate("(* a 2)", bindings).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, ints(&[2, 4, 6]));

    let err = expression_error(evaluator.evaluate("(+ a 1)", [("b", Value::Integer(1))]));
    assert_eq!(err.kind, ErrorKind::Name);
}

#[test]
fn test_no_leakage_after_error() {
    let evaluator = Evaluator::with_builtins();

    let result = evaluator.evaluate("(+ a (frobnicate))", [("a", Value::Integer(1))]);
    assert!(result.is_err());

    let result = evaluator.evaluate("(take a 1)", [("a", Value::Integer(1))]);
    assert!(matches!(result, Err(Error::Evaluation(_))));

    let err = expression_error(evaluator.evaluate("(+ a 1)", [("c", Value::Integer(1))]));
    assert_eq!(err.kind, ErrorKind::Name);
    assert_eq!(err.offset, 4);
}

#[test]
fn test_evaluate_in_existing_context() {
    let evaluator = Evaluator::with_builtins();
    let mut ctx = Context::new();
    ctx.add("x", Value::Integer(4));

    assert_eq!(evaluator.evaluate_in("(* x x)", &ctx).unwrap(), Value::Integer(16));
    ctx.clear();
    assert!(evaluator.evaluate_in("(* x x)", &ctx).is_err());
}

#[test]
fn test_free_evaluate_function() {
    assert_eq!(
        rcalc::evaluate("(- 10 2 3)", [("unused", Value::Null)]).unwrap(),
        Value::Integer(5)
    );
}

#[test]
fn test_evaluator_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Evaluator>();
}

#[test]
fn test_concurrent_evaluations() {
    let evaluator = Evaluator::with_builtins();

    std::thread::scope(|s| {
        for i in 0..8i64 {
            let evaluator = &evaluator;
            s.spawn(move || {
                for _ in 0..100 {
                    let result = evaluator
                        .evaluate("(+ (* x 2) (read 1))", [("x", Value::Integer(i))])
                        .unwrap();
                    assert_eq!(result, Value::Integer(i * 3));
                }
            });
        }
    });
}

#[test]
fn test_nesting_limit() {
    let evaluator = Evaluator::new().with_max_depth(3);
    let ok = evaluator.evaluate("(+ (+ (+ 1 1) 1) 1)", Vec::<(&str, Value)>::new());
    assert_eq!(ok.unwrap(), Value::Integer(4));

    let err = expression_error(
        evaluator.evaluate("(+ (+ (+ (+ 1 1) 1) 1) 1)", Vec::<(&str, Value)>::new()),
    );
    assert_eq!(err.kind, ErrorKind::Syntax);
}

// ============================================================================
// Higher-order functions
// ============================================================================

#[test]
fn test_map() {
    let bindings = [("xs", ints(&[1, 2, 3])), ("ys", ints(&[10, 20]))];
    assert_eq!(eval_with("(map + xs ys)", &bindings).unwrap(), ints(&[11, 22]));
    assert_eq!(
        eval_with("(map not xs)", &bindings).unwrap(),
        array(vec![Value::Boolean(false); 3])
    );
}

#[test]
fn test_map_with_derived_callable() {
    let words = Value::from(vec!["a", "b"]);
    assert_eq!(
        eval_with("(map (methodcaller 'upper') words)", &[("words", words)]).unwrap(),
        Value::from(vec!["A", "B"])
    );
}

#[test]
fn test_reduce() {
    let bindings = [("xs", ints(&[1, 2, 3])), ("empty", array(vec![]))];
    assert_eq!(eval_with("(reduce + xs)", &bindings).unwrap(), Value::Integer(6));
    assert_eq!(eval_with("(reduce * xs 10)", &bindings).unwrap(), Value::Integer(60));
    assert!(matches!(
        eval_with("(reduce + empty)", &bindings),
        Err(Error::Evaluation(_))
    ));
}

#[test]
fn test_partial() {
    assert_eq!(eval("((partial + 1) 2)").unwrap(), Value::Integer(3));
    assert_eq!(eval("((partial - 10) 2 3)").unwrap(), Value::Integer(5));

    let mut evaluator = Evaluator::new();
    register_f(&mut evaluator);
    assert_eq!(
        evaluator
            .evaluate("((partial f 1 :mode 'fast') :mode 'slow')", Vec::<(&str, Value)>::new())
            .unwrap(),
        array(vec![Value::Integer(1), Value::from("slow")])
    );
}

#[test]
fn test_itemgetter() {
    let bindings = [("xs", ints(&[1, 2, 3]))];
    assert_eq!(eval_with("((itemgetter 1) xs)", &bindings).unwrap(), Value::Integer(2));
    assert_eq!(eval_with("((itemgetter 0 -1) xs)", &bindings).unwrap(), ints(&[1, 3]));
    assert!(matches!(
        eval_error(eval_with("((itemgetter 5) xs)", &bindings)),
        EvalError::Index(_)
    ));
}

#[test]
fn test_attrgetter() {
    let a = array(vec![ints(&[1, 2, 3]), ints(&[4, 5, 6])]);
    assert_eq!(
        eval_with("((attrgetter 'shape') a)", &[("a", a.clone())]).unwrap(),
        ints(&[2, 3])
    );
    assert_eq!(
        eval_with("((attrgetter 'ndim' 'size') a)", &[("a", a)]).unwrap(),
        ints(&[2, 6])
    );
}

#[test]
fn test_methodcaller() {
    let a = array(vec![ints(&[1, 2, 3]), ints(&[4, 5, 6])]);
    assert_eq!(
        eval_with("((methodcaller 'sum') a)", &[("a", a.clone())]).unwrap(),
        Value::Integer(21)
    );
    assert_eq!(
        eval_with("((methodcaller 'max') a)", &[("a", a)]).unwrap(),
        Value::Integer(6)
    );
    assert_eq!(
        eval_with("((methodcaller 'astype' 'uint8') a)", &[("a", ints(&[256, 300]))]).unwrap(),
        ints(&[0, 44])
    );
}

#[test]
fn test_calling_a_non_callable() {
    let err = eval_error(eval_with("((map + xs) 1)", &[("xs", ints(&[1]))]));
    assert_eq!(err, EvalError::NotCallable("array".to_string()));
}

// ============================================================================
// Raster calculator functions
// ============================================================================

fn dataset() -> Value {
    array(vec![ints(&[10, 20]), ints(&[30, 300])])
}

#[test]
fn test_read() {
    let bindings = [("_i1", dataset()), ("_i2", Value::Integer(7))];
    assert_eq!(eval_with("(read 1)", &bindings).unwrap(), dataset());
    assert_eq!(eval_with("(read 1 2)", &bindings).unwrap(), ints(&[30, 300]));
    assert_eq!(eval_with("(read 2)", &bindings).unwrap(), Value::Integer(7));
    assert_eq!(
        eval_with("(read 1 2 'uint8')", &bindings).unwrap(),
        ints(&[30, 44])
    );
    assert_eq!(
        eval_with("(read 1 :dtype 'float32')", &bindings).unwrap(),
        array(vec![floats(&[10.0, 20.0]), floats(&[30.0, 300.0])])
    );
    assert_eq!(
        eval_with("(read :ix 1 :subix 1)", &bindings).unwrap(),
        ints(&[10, 20])
    );
}

#[test]
fn test_read_out_of_range() {
    let bindings = [("_i1", dataset())];
    assert!(matches!(
        eval_error(eval_with("(read 2)", &bindings)),
        EvalError::Index(_)
    ));
    assert!(matches!(
        eval_error(eval_with("(read 1 3)", &bindings)),
        EvalError::Index(_)
    ));
}

#[test]
fn test_take() {
    let bindings = [("a", dataset())];
    assert_eq!(eval_with("(take a 1)", &bindings).unwrap(), ints(&[10, 20]));
    assert!(matches!(
        eval_error(eval_with("(take a 0)", &bindings)),
        EvalError::Index(_)
    ));
}

#[test]
fn test_asarray_and_list_through_fallback() {
    assert_eq!(eval("(asarray 1 2 3)").unwrap(), ints(&[1, 2, 3]));
    assert_eq!(eval("(list 1 2 3)").unwrap(), ints(&[1, 2, 3]));
    assert_eq!(eval("(list 'ab')").unwrap(), Value::from(vec!["a", "b"]));
    assert_eq!(
        eval_with("(asarray (take a 1) (take a 2))", &[("a", dataset())]).unwrap(),
        dataset()
    );
}

#[test]
fn test_elementwise_functions() {
    let bindings = [("a", ints(&[1, 2, 3, 4]))];
    assert_eq!(
        eval_with("(where (> a 2) a 0)", &bindings).unwrap(),
        ints(&[0, 0, 3, 4])
    );
    assert_eq!(eval_with("(minimum a 2)", &bindings).unwrap(), ints(&[1, 2, 2, 2]));
    assert_eq!(eval_with("(maximum a 3)", &bindings).unwrap(), ints(&[3, 3, 3, 4]));
    assert_eq!(eval("(sqrt 16)").unwrap(), Value::Float(4.0));
    assert_eq!(eval("(abs -3)").unwrap(), Value::Integer(3));
}

#[test]
fn test_raster_expression() {
    let bindings = [("_i1", array(vec![ints(&[10, 20])]))];
    assert_eq!(
        eval_with("(+ 125 (* 0.1 (read 1)))", &bindings).unwrap(),
        array(vec![floats(&[126.0, 127.0])])
    );
}
