//! Member values - Literal values attached to properties, parameters and constants
//!
//! `null`, `true` and `false` carry no state and are shared: the builder hands
//! out one [`Rc`] per kind for the whole session. Numeric and scalar values
//! carry their raw source text and are always freshly allocated.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::str::FromStr;

/// Type tag of a literal as reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Integer literal (`42`, `0x2A`)
    Integer,
    /// Floating point literal (`4.2`, `1e3`)
    Float,
    /// Quoted string literal
    String,
    /// Bare constant name or magic constant
    Constant,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Constant => "constant",
        }
    }

    pub fn all() -> &'static [ValueType] {
        &[
            ValueType::Integer,
            ValueType::Float,
            ValueType::String,
            ValueType::Constant,
        ]
    }

    /// Check if values of this type are numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Float)
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "integer" | "int" | "lnumber" => Ok(ValueType::Integer),
            "float" | "double" | "real" | "dnumber" => Ok(ValueType::Float),
            "string" | "str" | "constant_encapsed_string" => Ok(ValueType::String),
            "constant" | "const" | "magic_constant" => Ok(ValueType::Constant),
            _ => Err(Error::UnknownValueType(s.to_string())),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A numeric literal with an explicit sign flag.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericValue {
    pub value_type: ValueType,
    /// Literal text without the sign
    pub raw: String,
    pub negative: bool,
}

impl NumericValue {
    /// Compute the signed value of the literal.
    ///
    /// Integer literals may use `0x`, `0b` or leading-zero octal notation.
    /// Returns `None` when the raw text is not a number.
    pub fn value(&self) -> Option<f64> {
        let raw = self.raw.trim();
        let magnitude = match self.value_type {
            ValueType::Integer => parse_integer(raw).map(|v| v as f64),
            _ => raw.parse::<f64>().ok(),
        }?;
        Some(if self.negative { -magnitude } else { magnitude })
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    let lower = raw.to_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        i64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

/// A non-numeric literal (string or constant), kept as source text.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarValue {
    pub value_type: ValueType,
    pub raw: Option<String>,
}

/// Any literal value a member can be initialized with.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberValue {
    Null,
    True,
    False,
    Numeric(NumericValue),
    Scalar(ScalarValue),
}

impl MemberValue {
    /// Check if this kind is handed out as a shared instance
    pub fn is_flyweight(&self) -> bool {
        matches!(self, MemberValue::Null | MemberValue::True | MemberValue::False)
    }

    /// Render the value roughly the way it appeared in source
    pub fn display_text(&self) -> String {
        match self {
            MemberValue::Null => "null".to_string(),
            MemberValue::True => "true".to_string(),
            MemberValue::False => "false".to_string(),
            MemberValue::Numeric(n) if n.negative => format!("-{}", n.raw),
            MemberValue::Numeric(n) => n.raw.clone(),
            MemberValue::Scalar(s) => s.raw.clone().unwrap_or_default(),
        }
    }
}

/// Session-scoped holder of the shared literal instances.
#[derive(Debug)]
pub struct ValueCache {
    null: Rc<MemberValue>,
    true_value: Rc<MemberValue>,
    false_value: Rc<MemberValue>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self {
            null: Rc::new(MemberValue::Null),
            true_value: Rc::new(MemberValue::True),
            false_value: Rc::new(MemberValue::False),
        }
    }

    pub fn null(&self) -> Rc<MemberValue> {
        Rc::clone(&self.null)
    }

    pub fn true_value(&self) -> Rc<MemberValue> {
        Rc::clone(&self.true_value)
    }

    pub fn false_value(&self) -> Rc<MemberValue> {
        Rc::clone(&self.false_value)
    }

    /// Allocate a new numeric value; never shared
    pub fn numeric(&self, value_type: ValueType, raw: impl Into<String>, negative: bool) -> Rc<MemberValue> {
        Rc::new(MemberValue::Numeric(NumericValue {
            value_type,
            raw: raw.into(),
            negative,
        }))
    }

    /// Allocate a new scalar value; never shared
    pub fn scalar(&self, value_type: ValueType, raw: Option<String>) -> Rc<MemberValue> {
        Rc::new(MemberValue::Scalar(ScalarValue { value_type, raw }))
    }
}

impl Default for ValueCache {
    fn default() -> Self {
        Self::new()
    }
}
