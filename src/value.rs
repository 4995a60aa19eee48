//! Dynamically typed call arguments and replies
//!
//! Remote callers pass arguments as JSON; each handler pulls the positional
//! values it expects through [`Args`], which turns count and type mismatches
//! into [`CallError::InvalidArgs`].

use periph_device::{EventArg, RgbColor};
use serde::{Deserialize, Serialize};

use crate::error::CallError;

/// Argument or reply value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<i64>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<[i64; 2]> for Value {
    fn from(v: [i64; 2]) -> Self {
        Self::List(v.to_vec())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Unit
    }
}

impl From<EventArg> for Value {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::Byte(v) => Self::Int(i64::from(v)),
            EventArg::Int(v) => Self::Int(v),
            EventArg::Float(v) => Self::Float(v),
            EventArg::Bool(v) => Self::Bool(v),
            EventArg::Absent => Self::Unit,
        }
    }
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Unit => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::List(_) => "list",
        }
    }
}

/// Parse call arguments from a JSON array (an empty string means no arguments)
pub fn parse_args(json: &str) -> Result<Vec<Value>, CallError> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(json).map_err(|e| CallError::InvalidArgs(format!("args: {e}")))
}

/// Positional view over call arguments
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fail unless exactly `count` arguments were passed
    pub fn expect(&self, count: usize) -> Result<Self, CallError> {
        if self.values.len() == count {
            Ok(*self)
        } else {
            Err(CallError::InvalidArgs(format!(
                "expected {count} argument(s), got {}",
                self.values.len()
            )))
        }
    }

    fn get(&self, pos: usize) -> Result<&'a Value, CallError> {
        self.values
            .get(pos)
            .ok_or_else(|| CallError::InvalidArgs(format!("missing argument {pos}")))
    }

    fn mismatch(&self, pos: usize, expected: &str) -> CallError {
        let found = self.values.get(pos).map_or("nothing", Value::type_name);
        CallError::InvalidArgs(format!("argument {pos}: expected {expected}, got {found}"))
    }

    pub fn int(&self, pos: usize) -> Result<i64, CallError> {
        match self.get(pos)? {
            Value::Int(v) => Ok(*v),
            _ => Err(self.mismatch(pos, "int")),
        }
    }

    pub fn byte(&self, pos: usize) -> Result<u8, CallError> {
        let v = self.int(pos)?;
        u8::try_from(v).map_err(|_| CallError::InvalidArgs(format!("argument {pos}: {v} is not a byte")))
    }

    pub fn u16(&self, pos: usize) -> Result<u16, CallError> {
        let v = self.int(pos)?;
        u16::try_from(v).map_err(|_| CallError::InvalidArgs(format!("argument {pos}: {v} out of range")))
    }

    /// Float argument; integers are accepted as well
    pub fn float(&self, pos: usize) -> Result<f64, CallError> {
        match self.get(pos)? {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            _ => Err(self.mismatch(pos, "float")),
        }
    }

    pub fn bool(&self, pos: usize) -> Result<bool, CallError> {
        match self.get(pos)? {
            Value::Bool(v) => Ok(*v),
            _ => Err(self.mismatch(pos, "bool")),
        }
    }

    /// Three byte arguments `r, g, b` starting at `pos`
    pub fn colour(&self, pos: usize) -> Result<RgbColor, CallError> {
        Ok(RgbColor::new(self.byte(pos)?, self.byte(pos + 1)?, self.byte(pos + 2)?))
    }

    /// Byte array argument
    pub fn bytes(&self, pos: usize) -> Result<Vec<u8>, CallError> {
        match self.get(pos)? {
            Value::List(items) => items
                .iter()
                .map(|&v| {
                    u8::try_from(v).map_err(|_| {
                        CallError::InvalidArgs(format!("argument {pos}: {v} is not a byte"))
                    })
                })
                .collect(),
            _ => Err(self.mismatch(pos, "byte list")),
        }
    }
}
