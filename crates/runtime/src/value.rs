//! Runtime values for Glyph
//!
//! Value: What the language talks about
//!
//! A Value owns its payload outright: a Text owns its character buffer, an
//! Array owns its element stack and, transitively, every element in it.
//! There is no shared ownership anywhere in the model, so duplicating a
//! value is always a full structural copy and mutating one value can never
//! be observed through another.

use crate::stack::Stack;
use std::fmt;

/// A tagged runtime value.
///
/// `Clone` performs a deep copy: an Array clones every contained element
/// recursively, never just the outer buffer. This is what the `:` and `Ag`
/// instructions rely on for their independence guarantee.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer value
    Int(i64),

    /// Floating-point value (IEEE 754 double precision)
    Float(f64),

    /// Text value; also the program form executed by `?` and `@`
    Text(String),

    /// Array value: an owned stack of values
    Array(Stack),
}

impl Value {
    /// Truthiness as used by the control-flow instructions.
    ///
    /// Numbers are truthy when nonzero, Text when non-empty, Arrays when
    /// non-empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
        }
    }

    /// Unwrap a Text payload. Callers validate the variant first.
    pub(crate) fn into_text(self) -> String {
        match self {
            Value::Text(s) => s,
            other => panic!("into_text: expected Text, got {:?}", other),
        }
    }

    /// Borrow the element stack of an Array. Callers validate the variant
    /// first.
    pub(crate) fn array_mut(&mut self) -> &mut Stack {
        match self {
            Value::Array(items) => items,
            other => panic!("array_mut: expected Array, got {:?}", other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_finite() => write!(f, "{:.6}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
