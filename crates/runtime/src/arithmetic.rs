//! Arithmetic, comparison, and logical instructions
//!
//! All ten binary instructions (`+ - * / % < > = & |`) share one operand
//! contract: both operands must be numbers, and if either is a Float the
//! operation is carried out in floating point. Arithmetic results keep the
//! promoted type; comparisons and the logical connectives always push an
//! Int 1 or 0.
//!
//! # Overflow Behavior
//!
//! Integer arithmetic uses **wrapping semantics** for predictable, defined
//! behavior: `i64::MAX + 1` wraps to `i64::MIN`, and `i64::MIN / -1` wraps
//! back to `i64::MIN`.

use crate::fault::{Expected, FaultKind, Ordinal, StackId};
use crate::stack::Stack;
use crate::value::Value;

/// The binary instruction being dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    Eq,
    And,
    Or,
}

/// A validated numeric operand, read off the stack before anything is
/// popped so a fault leaves the stacks untouched for the report.
#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

fn operand(stack: &Stack, index: usize, ordinal: Ordinal) -> Result<Num, FaultKind> {
    match stack.get(index) {
        Value::Int(i) => Ok(Num::Int(*i)),
        Value::Float(f) => Ok(Num::Float(*f)),
        _ => Err(FaultKind::TypeMismatch {
            ordinal,
            expected: Expected::Number,
        }),
    }
}

/// Apply a binary instruction to the top two items.
///
/// Stack effect: ( a b -- a∘b )
pub(crate) fn apply(primary: &mut Stack, op: BinOp) -> Result<(), FaultKind> {
    if primary.len() < 2 {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    let b = operand(primary, primary.len() - 1, Ordinal::First)?;
    let a = operand(primary, primary.len() - 2, Ordinal::Second)?;

    // An Integer zero divisor is fatal even when the other operand is a
    // Float; float division/remainder by a Float zero follows IEEE 754.
    if matches!(op, BinOp::Div | BinOp::Rem) && matches!(b, Num::Int(0)) {
        return Err(FaultKind::DivisionByZero);
    }

    let result = match (a, b) {
        (Num::Int(x), Num::Int(y)) => eval_int(op, x, y),
        _ => eval_float(op, a.as_f64(), b.as_f64()),
    };
    primary.pop();
    primary.pop();
    primary.push(result);
    Ok(())
}

fn eval_int(op: BinOp, x: i64, y: i64) -> Value {
    match op {
        BinOp::Add => Value::Int(x.wrapping_add(y)),
        BinOp::Sub => Value::Int(x.wrapping_sub(y)),
        BinOp::Mul => Value::Int(x.wrapping_mul(y)),
        BinOp::Div => Value::Int(x.wrapping_div(y)),
        BinOp::Rem => Value::Int(x.wrapping_rem(y)),
        BinOp::Lt => Value::Int(i64::from(x < y)),
        BinOp::Gt => Value::Int(i64::from(x > y)),
        BinOp::Eq => Value::Int(i64::from(x == y)),
        BinOp::And => Value::Int(i64::from(x != 0 && y != 0)),
        BinOp::Or => Value::Int(i64::from(x != 0 || y != 0)),
    }
}

fn eval_float(op: BinOp, x: f64, y: f64) -> Value {
    match op {
        BinOp::Add => Value::Float(x + y),
        BinOp::Sub => Value::Float(x - y),
        BinOp::Mul => Value::Float(x * y),
        BinOp::Div => Value::Float(x / y),
        BinOp::Rem => Value::Float(x % y),
        BinOp::Lt => Value::Int(i64::from(x < y)),
        BinOp::Gt => Value::Int(i64::from(x > y)),
        BinOp::Eq => Value::Int(i64::from(x == y)),
        BinOp::And => Value::Int(i64::from(x != 0.0 && y != 0.0)),
        BinOp::Or => Value::Int(i64::from(x != 0.0 || y != 0.0)),
    }
}
