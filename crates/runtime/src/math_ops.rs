//! Math instructions (`M` group)
//!
//! Constants, a uniform random draw, rounding between the numeric tags,
//! and the usual unary float functions. Apart from `Mp` all of these work
//! in place on the top of the primary stack; the rounding instructions
//! change the value's tag from Float to Int.

use crate::fault::{Expected, FaultKind, Ordinal, StackId};
use crate::stack::Stack;
use crate::value::Value;
use rand::Rng;

fn float_at(stack: &Stack, index: usize, ordinal: Ordinal) -> Result<f64, FaultKind> {
    match stack.get(index) {
        Value::Float(f) => Ok(*f),
        _ => Err(FaultKind::TypeMismatch {
            ordinal,
            expected: Expected::Float,
        }),
    }
}

/// Push a named constant (π, τ, e).
///
/// Stack effect: ( -- Float )
pub(crate) fn constant(primary: &mut Stack, value: f64) {
    primary.push(Value::Float(value));
}

/// `MR` — push a uniform random Float in `[0, 1)`.
///
/// Stack effect: ( -- Float )
pub(crate) fn random<G: Rng>(primary: &mut Stack, rng: &mut G) {
    primary.push(Value::Float(rng.gen_range(0.0..1.0)));
}

/// `Mf` — retag the Int on top as a Float, in place.
///
/// Stack effect: ( Int -- Float )
pub(crate) fn to_float(primary: &mut Stack) -> Result<(), FaultKind> {
    if primary.is_empty() {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    let top = primary.len() - 1;
    match primary.get(top) {
        Value::Int(i) => {
            let value = *i as f64;
            primary.set(top, Value::Float(value));
            Ok(())
        }
        _ => Err(FaultKind::TypeMismatch {
            ordinal: Ordinal::First,
            expected: Expected::Integer,
        }),
    }
}

/// `Mu` / `Md` / `Mn` — round the Float on top to an Int, in place.
/// `mode` is one of `f64::ceil`, `f64::floor`, `f64::round`.
///
/// Stack effect: ( Float -- Int )
pub(crate) fn round(primary: &mut Stack, mode: fn(f64) -> f64) -> Result<(), FaultKind> {
    if primary.is_empty() {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    let top = primary.len() - 1;
    let value = float_at(primary, top, Ordinal::First)?;
    primary.set(top, Value::Int(mode(value) as i64));
    Ok(())
}

/// `Ms` / `Mc` / `Mt` / `Mr` — apply a unary float function to the Float
/// on top, in place.
///
/// Stack effect: ( Float -- Float )
pub(crate) fn map(primary: &mut Stack, f: fn(f64) -> f64) -> Result<(), FaultKind> {
    if primary.is_empty() {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    let top = primary.len() - 1;
    let value = float_at(primary, top, Ordinal::First)?;
    primary.set(top, Value::Float(f(value)));
    Ok(())
}

/// `Ma` — absolute value of the Int or Float on top, in place.
///
/// Stack effect: ( n -- |n| )
pub(crate) fn absolute(primary: &mut Stack) -> Result<(), FaultKind> {
    if primary.is_empty() {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    let top = primary.len() - 1;
    match primary.get(top) {
        Value::Int(i) => {
            let value = i.wrapping_abs();
            primary.set(top, Value::Int(value));
            Ok(())
        }
        Value::Float(f) => {
            let value = f.abs();
            primary.set(top, Value::Float(value));
            Ok(())
        }
        _ => Err(FaultKind::TypeMismatch {
            ordinal: Ordinal::First,
            expected: Expected::IntegerOrFloat,
        }),
    }
}

/// `Mp` — pop the exponent and raise the Float below it to that power,
/// in place.
///
/// Stack effect: ( x n -- x^n )
pub(crate) fn power(primary: &mut Stack) -> Result<(), FaultKind> {
    if primary.len() < 2 {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    let exponent = float_at(primary, primary.len() - 1, Ordinal::First)?;
    let base = float_at(primary, primary.len() - 2, Ordinal::Second)?;
    primary.pop();
    let top = primary.len() - 1;
    primary.set(top, Value::Float(base.powf(exponent)));
    Ok(())
}
