//! Fault model
//!
//! Every error the language can produce is fatal: the run aborts, a
//! diagnostic report is rendered, and nothing is recoverable from inside
//! a program. Internally faults travel as ordinary `Result` errors so the
//! host (and tests) can observe them before deciding how to die.
//!
//! A [`Fault`] carries its kind plus the program text and character
//! offset of the offending instruction — for an error inside a quotation
//! that is the quotation's own text, which is what the report snippet is
//! cut from.

use std::fmt;

/// Which of the two machine stacks an operation ran out of items on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackId {
    Primary,
    Secondary,
}

/// Position of an operand relative to the top of the stack, as named in
/// fault messages ("the first item…" is the top).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordinal {
    First,
    Second,
    Third,
}

/// The variant an operand was required to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Number,
    Integer,
    Float,
    IntegerOrFloat,
    Text,
    Array,
}

/// The error taxonomy of the language.
#[derive(Debug, Clone, PartialEq)]
pub enum FaultKind {
    /// An operation needed more items than the stack holds.
    StackUnderflow(StackId),
    /// An operand is not the required variant.
    TypeMismatch { ordinal: Ordinal, expected: Expected },
    /// Array index outside `[0, len)`.
    IndexOutOfBounds,
    /// Substring start index outside `[0, len)`.
    StartIndexOutOfBounds,
    /// Substring end index outside `[0, len)`.
    EndIndexOutOfBounds,
    /// Substring end index smaller than the start index.
    InvertedRange,
    /// Integer division or remainder by an Integer zero.
    DivisionByZero,
    /// A text literal was still open at the end of the program.
    UnterminatedLiteral,
    /// A character that is no instruction, or an unrecognized
    /// sub-instruction after a namespace prefix.
    InvalidInstruction(char),
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::StackUnderflow(StackId::Primary) => {
                write!(f, "the primary stack does not contain enough items")
            }
            FaultKind::StackUnderflow(StackId::Secondary) => {
                write!(f, "the secondary stack does not contain enough items")
            }
            FaultKind::TypeMismatch { ordinal, expected } => {
                let ordinal = match ordinal {
                    Ordinal::First => "first",
                    Ordinal::Second => "second",
                    Ordinal::Third => "third",
                };
                let expected = match expected {
                    Expected::Number => "a number",
                    Expected::Integer => "an integer",
                    Expected::Float => "a float",
                    Expected::IntegerOrFloat => "an integer or float",
                    Expected::Text => "a string",
                    Expected::Array => "an array",
                };
                write!(f, "the {} item is not {}", ordinal, expected)
            }
            FaultKind::IndexOutOfBounds => write!(f, "the index is out of bounds"),
            FaultKind::StartIndexOutOfBounds => {
                write!(f, "the start index is out of bounds")
            }
            FaultKind::EndIndexOutOfBounds => write!(f, "the end index is out of bounds"),
            FaultKind::InvertedRange => {
                write!(f, "the end index is smaller than the start index")
            }
            FaultKind::DivisionByZero => write!(f, "integer division by zero"),
            FaultKind::UnterminatedLiteral => write!(f, "unclosed string literal"),
            FaultKind::InvalidInstruction(c) => {
                write!(f, "'{}' is not a valid instruction!", c)
            }
        }
    }
}

/// A fatal error, located within the program text it occurred in.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub kind: FaultKind,
    /// The innermost program text that was executing — the quotation's
    /// own content when the fault happened inside one.
    pub program: String,
    /// Character offset of the offending instruction within `program`.
    /// One past the end for faults detected at end of program.
    pub position: usize,
}

impl Fault {
    pub fn at(kind: FaultKind, program: &str, position: usize) -> Self {
        Fault {
            kind,
            program: program.to_string(),
            position,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for Fault {}
