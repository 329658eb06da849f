//! Operator parameter schemas and argument values.
//!
//! A parameterized operator declares an ordered list of `ParamSpec`s. A
//! request carries a matching list of `ParamValue`s, which are checked
//! against the schema before the operator's transformation ever sees them.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Scalar type of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Int,
    Float,
    Str,
}

/// Declaration of one operator parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Display name (prompt text).
    pub name: String,

    /// Scalar type.
    #[serde(rename = "type")]
    pub kind: ParamKind,

    /// Inclusive lower bound for numeric kinds.
    pub min: Option<f64>,

    /// Inclusive upper bound for numeric kinds.
    pub max: Option<f64>,
}

impl ParamSpec {
    /// Declare an integer parameter.
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Int)
    }

    /// Declare a float parameter.
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Float)
    }

    /// Declare a string parameter.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Str)
    }

    fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            min: None,
            max: None,
        }
    }

    /// Set inclusive numeric bounds.
    #[must_use]
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Check a single argument against this declaration.
    pub fn check(&self, value: &ParamValue) -> Result<(), String> {
        let number = match (self.kind, value) {
            (ParamKind::Int, ParamValue::Int(n)) => *n as f64,
            (ParamKind::Float, ParamValue::Int(n)) => *n as f64,
            (ParamKind::Float, ParamValue::Float(x)) => *x,
            (ParamKind::Str, ParamValue::Str(_)) => return Ok(()),
            (kind, other) => {
                return Err(format!(
                    "{} expects {:?}, got {}",
                    self.name,
                    kind,
                    other.kind_name()
                ))
            }
        };

        if !number.is_finite() {
            return Err(format!("{} must be a finite number", self.name));
        }
        if let Some(min) = self.min {
            if number < min {
                return Err(format!("{} must be at least {}", self.name, min));
            }
        }
        if let Some(max) = self.max {
            if number > max {
                return Err(format!("{} must be at most {}", self.name, max));
            }
        }
        Ok(())
    }
}

/// A scalar argument supplied with an operator request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Integer value, if this is an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value, widening integers.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(x) => Some(*x),
            Self::Str(_) => None,
        }
    }

    /// String value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
        }
    }
}

/// Argument list of one request. Most operators take at most a few.
pub type Args = SmallVec<[ParamValue; 4]>;

/// Check an argument list against a parameter schema.
///
/// The argument count must match exactly; the first failing argument
/// determines the reason.
pub fn validate_args(schema: &[ParamSpec], args: &[ParamValue]) -> Result<(), String> {
    if schema.len() != args.len() {
        return Err(format!(
            "expected {} argument(s), got {}",
            schema.len(),
            args.len()
        ));
    }
    schema
        .iter()
        .zip(args)
        .try_for_each(|(spec, value)| spec.check(value))
}
