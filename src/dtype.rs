//! Raster data types and `astype` casting.

use std::{fmt, str::FromStr};

use crate::{error::EvalError, ops::map_elements, value::Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Bool,
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl DType {
    pub const ALL: [DType; 10] = [
        DType::Bool,
        DType::UInt8,
        DType::Int8,
        DType::UInt16,
        DType::Int16,
        DType::UInt32,
        DType::Int32,
        DType::Int64,
        DType::Float32,
        DType::Float64,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::UInt8 => "uint8",
            DType::Int8 => "int8",
            DType::UInt16 => "uint16",
            DType::Int16 => "int16",
            DType::UInt32 => "uint32",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }

    /// Cast every scalar of `value`. Integer targets wrap like a C cast;
    /// floats convert to integers by truncation, saturating at the bounds.
    pub fn cast(self, value: &Value) -> Result<Value, EvalError> {
        map_elements(value, &|v| self.cast_scalar(v))
    }

    fn cast_scalar(self, value: &Value) -> Result<Value, EvalError> {
        let parsed;
        let value = match value {
            Value::String(s) => {
                parsed = parse_number(s)?;
                &parsed
            }
            other => other,
        };

        if self == DType::Bool {
            return match value {
                Value::Boolean(_) | Value::Integer(_) | Value::Float(_) => {
                    Ok(Value::Boolean(value.is_truthy()))
                }
                _ => Err(self.cannot_cast(value)),
            };
        }

        if matches!(self, DType::Float32 | DType::Float64) {
            let f = value.as_float().ok_or_else(|| self.cannot_cast(value))?;
            return Ok(Value::Float(match self {
                DType::Float32 => f as f32 as f64,
                _ => f,
            }));
        }

        let n = match value {
            Value::Integer(n) => self.wrap_int(*n),
            Value::Boolean(b) => *b as i64,
            Value::Float(f) => self.truncate_float(*f),
            _ => return Err(self.cannot_cast(value)),
        };
        Ok(Value::Integer(n))
    }

    fn wrap_int(self, n: i64) -> i64 {
        match self {
            DType::UInt8 => n as u8 as i64,
            DType::Int8 => n as i8 as i64,
            DType::UInt16 => n as u16 as i64,
            DType::Int16 => n as i16 as i64,
            DType::UInt32 => n as u32 as i64,
            DType::Int32 => n as i32 as i64,
            _ => n,
        }
    }

    fn truncate_float(self, f: f64) -> i64 {
        match self {
            DType::UInt8 => f as u8 as i64,
            DType::Int8 => f as i8 as i64,
            DType::UInt16 => f as u16 as i64,
            DType::Int16 => f as i16 as i64,
            DType::UInt32 => f as u32 as i64,
            DType::Int32 => f as i32 as i64,
            _ => f as i64,
        }
    }

    fn cannot_cast(self, value: &Value) -> EvalError {
        EvalError::Value(format!("cannot cast {} to {}", value.type_name(), self.name()))
    }
}

fn parse_number(s: &str) -> Result<Value, EvalError> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Ok(Value::Integer(n));
    }
    s.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| EvalError::Value(format!("could not convert string to number: '{}'", s)))
}

impl FromStr for DType {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s {
            "float" => "float64",
            "int" => "int64",
            "byte" | "ubyte" => "uint8",
            other => other,
        };
        DType::ALL
            .into_iter()
            .find(|d| d.name() == name)
            .ok_or_else(|| EvalError::Value(format!("data type '{}' not understood", s)))
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a dtype argument given as a string value.
pub fn dtype_arg(value: &Value) -> Result<DType, EvalError> {
    match value {
        Value::String(s) => s.parse(),
        other => Err(EvalError::Type(format!(
            "dtype must be a string, got {}",
            other.type_name()
        ))),
    }
}
