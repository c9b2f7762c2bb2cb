//! CLI support for rcalc
//!
//! Provides programmatic access to the calc command for embedding in other
//! tools.

mod calc;
mod convert;
mod docs;

pub use calc::{CalcOptions, CalcResult, build_context, execute_calc};
pub use convert::{json_to_value, value_to_json};
pub use docs::functions_overview;

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Parse or evaluation error
    Calc(crate::Error),
    /// JSON parsing error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// `--name` value not of the form NAME=JSON
    InvalidName(String),
    /// Unknown `--dtype`
    UnknownDtype(String),
}

/// The calc diagnostic: the source, a caret under the offending
/// character, then the message.
pub fn render_expression_error(e: &crate::ExpressionError) -> String {
    format!(
        "Expression Error:\n  {}\n {}^\n{}",
        e.source,
        " ".repeat(e.offset),
        e.message
    )
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Calc(crate::Error::Expression(e)) => {
                write!(f, "{}", render_expression_error(e))
            }
            CliError::Calc(crate::Error::Evaluation(e)) => write!(f, "Evaluation error: {}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::InvalidName(spec) => write!(
                f,
                "Invalid input name '{}': expected NAME=JSON with an alphanumeric NAME",
                spec
            ),
            CliError::UnknownDtype(d) => write!(f, "Unknown data type: '{}'", d),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Calc(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::Error> for CliError {
    fn from(e: crate::Error) -> Self {
        CliError::Calc(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
