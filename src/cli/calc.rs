//! Evaluate calc expressions against JSON inputs

use super::{CliError, json_to_value, value_to_json};
use crate::{Context, Evaluator, Value, dtype::DType};

/// Options for the calc command
#[derive(Debug, Clone, Default)]
pub struct CalcOptions {
    /// The expression to evaluate
    pub expression: String,
    /// Positional JSON inputs, bound as `_i<n>`
    pub inputs: Vec<String>,
    /// Named JSON inputs as `NAME=JSON`, bound before positional ones
    pub names: Vec<String>,
    /// Cast the result to this data type
    pub dtype: Option<String>,
    /// Only parse the expression, don't evaluate it
    pub syntax_only: bool,
    /// Override the nesting limit
    pub max_depth: Option<usize>,
}

/// Result of a calc operation
#[derive(Debug)]
pub enum CalcResult {
    /// Parsing succeeded
    SyntaxValid,
    /// Expression evaluated to this JSON value
    Success(serde_json::Value),
}

/// Split `NAME=JSON`. Names must be alphanumeric or underscores.
fn parse_named(spec: &str) -> Result<(String, &str), CliError> {
    let (name, json) = spec
        .split_once('=')
        .ok_or_else(|| CliError::InvalidName(spec.to_string()))?;
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if !valid {
        return Err(CliError::InvalidName(spec.to_string()));
    }
    Ok((name.to_string(), json))
}

/// Bind inputs in calc order: named first, then positional. Each input
/// at overall position n (1-based) without a name is bound as `_i<n>`.
pub fn build_context(options: &CalcOptions) -> Result<Context, CliError> {
    let mut ctx = Context::new();

    for spec in &options.names {
        let (name, json) = parse_named(spec)?;
        let value: serde_json::Value = serde_json::from_str(json)?;
        ctx.add(name, json_to_value(value));
    }

    for (i, json) in options.inputs.iter().enumerate() {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let name = format!("_i{}", options.names.len() + i + 1);
        ctx.add(name, json_to_value(value));
    }

    Ok(ctx)
}

/// Execute a calc operation
pub fn execute_calc(options: &CalcOptions) -> Result<CalcResult, CliError> {
    let mut evaluator = Evaluator::with_builtins();
    if let Some(depth) = options.max_depth {
        evaluator = evaluator.with_max_depth(depth);
    }

    let dtype = options
        .dtype
        .as_deref()
        .map(|d| d.parse::<DType>().map_err(|_| CliError::UnknownDtype(d.to_string())))
        .transpose()?;

    let ctx = build_context(options)?;

    if options.syntax_only {
        return evaluator
            .parse(&options.expression, &ctx)
            .map(|_| CalcResult::SyntaxValid)
            .map_err(|e| CliError::Calc(e.into()));
    }

    let result = evaluator
        .evaluate_in(&options.expression, &ctx)
        .map_err(CliError::Calc)?;

    let result: Value = match dtype {
        Some(dtype) => dtype
            .cast(&result)
            .map_err(|e| CliError::Calc(e.into()))?,
        None => result,
    };

    Ok(CalcResult::Success(value_to_json(result)))
}
