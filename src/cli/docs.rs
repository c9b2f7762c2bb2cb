//! Reference listing for the `functions` command

use crate::{
    Evaluator,
    ast::{HigherOrder, Operator},
};

fn operator_help(op: Operator) -> &'static str {
    match op {
        Operator::Add => "sum, left-folded over all arguments",
        Operator::Subtract => "difference, left-folded over all arguments",
        Operator::Multiply => "product, left-folded over all arguments",
        Operator::Divide => "true division, left-folded over all arguments",
        Operator::BitAnd => "bitwise/logical and, left-folded",
        Operator::BitOr => "bitwise/logical or, left-folded",
        Operator::LessThan => "a < b",
        Operator::LessEqual => "a <= b",
        Operator::Equal => "a == b",
        Operator::NotEqual => "a != b",
        Operator::GreaterEqual => "a >= b",
        Operator::GreaterThan => "a > b",
        Operator::Not => "logical negation of one value",
        Operator::Truth => "truthiness of one value",
        Operator::Is => "strict identity of two values",
    }
}

fn higher_help(h: HigherOrder) -> &'static str {
    match h {
        HigherOrder::Map => "(map f xs ...) apply f across sequences",
        HigherOrder::Partial => "(partial f a ...) bind leading arguments",
        HigherOrder::Reduce => "(reduce f xs [init]) left-fold f over xs",
        HigherOrder::AttrGetter => "(attrgetter 'name' ...) attribute accessor",
        HigherOrder::MethodCaller => "(methodcaller 'name' arg ...) method invoker",
        HigherOrder::ItemGetter => "(itemgetter key ...) item accessor",
    }
}

/// Operators, higher-order functions and the functions registered on
/// `evaluator`, one per line.
pub fn functions_overview(evaluator: &Evaluator) -> String {
    let mut out = String::from("Operators:\n");
    for op in Operator::ALL {
        out.push_str(&format!("  {:<14}{}\n", op.symbol(), operator_help(op)));
    }

    out.push_str("\nHigher-order functions:\n");
    for h in HigherOrder::ALL {
        out.push_str(&format!("  {:<14}{}\n", h.name(), higher_help(h)));
    }

    out.push_str("\nFunctions:\n");
    let names: Vec<&str> = evaluator.functions().names().collect();
    if names.is_empty() {
        out.push_str("  (none registered)\n");
    } else {
        out.push_str(&format!("  {}\n", names.join(" ")));
    }
    out
}
