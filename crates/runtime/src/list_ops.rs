//! Array instructions (`A` group)
//!
//! Arrays are ordinary values holding an owned stack of elements. The
//! instructions below mutate the array in place on the primary stack;
//! only `Ag` copies anything out, and what it copies is a full deep copy,
//! so the extracted element never aliases the array's own storage.

use crate::fault::{Expected, FaultKind, Ordinal, StackId};
use crate::stack::Stack;
use crate::value::Value;

fn int_at(stack: &Stack, index: usize, ordinal: Ordinal) -> Result<i64, FaultKind> {
    match stack.get(index) {
        Value::Int(i) => Ok(*i),
        _ => Err(FaultKind::TypeMismatch {
            ordinal,
            expected: Expected::Integer,
        }),
    }
}

fn array_at<'a>(stack: &'a Stack, index: usize, ordinal: Ordinal) -> Result<&'a Stack, FaultKind> {
    match stack.get(index) {
        Value::Array(items) => Ok(items),
        _ => Err(FaultKind::TypeMismatch {
            ordinal,
            expected: Expected::Array,
        }),
    }
}

fn checked_index(index: i64, len: usize) -> Result<usize, FaultKind> {
    if index < 0 || index as usize >= len {
        return Err(FaultKind::IndexOutOfBounds);
    }
    Ok(index as usize)
}

/// `Ac` — push a new empty array.
///
/// Stack effect: ( -- arr )
pub(crate) fn create(primary: &mut Stack) {
    primary.push(Value::Array(Stack::new()));
}

/// `Ap` — append the top value to the array below it.
///
/// Stack effect: ( arr v -- arr )
pub(crate) fn push(primary: &mut Stack) -> Result<(), FaultKind> {
    if primary.len() < 2 {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    array_at(primary, primary.len() - 2, Ordinal::Second)?;
    let value = primary.pop();
    let top = primary.len() - 1;
    primary.get_mut(top).array_mut().push(value);
    Ok(())
}

/// `Ag` — push a deep copy of the element at the given index. The array
/// itself is untouched.
///
/// Stack effect: ( arr i -- arr elem )
pub(crate) fn get(primary: &mut Stack) -> Result<(), FaultKind> {
    if primary.len() < 2 {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    let index = int_at(primary, primary.len() - 1, Ordinal::First)?;
    let items = array_at(primary, primary.len() - 2, Ordinal::Second)?;
    let index = checked_index(index, items.len())?;
    let element = items.get(index).clone();
    primary.pop();
    primary.push(element);
    Ok(())
}

/// `As` — overwrite the element at the given index, releasing the value
/// previously stored there.
///
/// Stack effect: ( arr i v -- arr )
pub(crate) fn set(primary: &mut Stack) -> Result<(), FaultKind> {
    if primary.len() < 3 {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    let index = int_at(primary, primary.len() - 2, Ordinal::Second)?;
    let items = array_at(primary, primary.len() - 3, Ordinal::Third)?;
    let index = checked_index(index, items.len())?;
    let value = primary.pop();
    primary.pop();
    let top = primary.len() - 1;
    primary.get_mut(top).array_mut().set(index, value);
    Ok(())
}

/// `Ar` — remove the element at the given index, shifting the elements
/// above it down one position.
///
/// Stack effect: ( arr i -- arr )
pub(crate) fn remove(primary: &mut Stack) -> Result<(), FaultKind> {
    if primary.len() < 2 {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    let index = int_at(primary, primary.len() - 1, Ordinal::First)?;
    let items = array_at(primary, primary.len() - 2, Ordinal::Second)?;
    let index = checked_index(index, items.len())?;
    primary.pop();
    let top = primary.len() - 1;
    primary.get_mut(top).array_mut().remove(index);
    Ok(())
}

/// `Al` — push the element count of the array on top, which stays put.
///
/// Stack effect: ( arr -- arr len )
pub(crate) fn length(primary: &mut Stack) -> Result<(), FaultKind> {
    if primary.is_empty() {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    let count = array_at(primary, primary.len() - 1, Ordinal::First)?.len() as i64;
    primary.push(Value::Int(count));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array_with(values: &[i64]) -> Stack {
        let mut items = Stack::new();
        for v in values {
            items.push(Value::Int(*v));
        }
        let mut primary = Stack::new();
        primary.push(Value::Array(items));
        primary
    }

    #[test]
    fn test_create_and_push() {
        let mut primary = Stack::new();
        create(&mut primary);
        primary.push(Value::Int(7));
        push(&mut primary).unwrap();
        assert_eq!(primary.len(), 1);
        match primary.get(0) {
            Value::Array(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items.get(0), &Value::Int(7));
            }
            other => panic!("expected Array, got {:?}", other),
        }
    }

    #[test]
    fn test_get_copies_without_shrinking() {
        let mut primary = array_with(&[1, 2]);
        primary.push(Value::Int(0));
        get(&mut primary).unwrap();
        assert_eq!(primary.pop(), Value::Int(1));
        match primary.pop() {
            Value::Array(items) => assert_eq!(items.len(), 2),
            other => panic!("expected Array, got {:?}", other),
        }
    }

    #[test]
    fn test_get_bounds() {
        let mut primary = array_with(&[1, 2]);
        primary.push(Value::Int(2));
        assert_eq!(get(&mut primary), Err(FaultKind::IndexOutOfBounds));
        // Nothing consumed on a fault.
        assert_eq!(primary.len(), 2);

        let mut primary = array_with(&[1, 2]);
        primary.push(Value::Int(-1));
        assert_eq!(get(&mut primary), Err(FaultKind::IndexOutOfBounds));
    }

    #[test]
    fn test_set_overwrites() {
        let mut primary = array_with(&[1, 2, 3]);
        primary.push(Value::Int(1));
        primary.push(Value::Text("new".to_string()));
        set(&mut primary).unwrap();
        match primary.pop() {
            Value::Array(items) => {
                assert_eq!(items.get(1), &Value::Text("new".to_string()));
                assert_eq!(items.len(), 3);
            }
            other => panic!("expected Array, got {:?}", other),
        }
    }

    #[test]
    fn test_remove_shifts() {
        let mut primary = array_with(&[10, 20, 30]);
        primary.push(Value::Int(0));
        remove(&mut primary).unwrap();
        match primary.pop() {
            Value::Array(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items.get(0), &Value::Int(20));
                assert_eq!(items.get(1), &Value::Int(30));
            }
            other => panic!("expected Array, got {:?}", other),
        }
    }

    #[test]
    fn test_length_peeks() {
        let mut primary = array_with(&[1, 2, 3]);
        length(&mut primary).unwrap();
        assert_eq!(primary.pop(), Value::Int(3));
        assert_eq!(primary.len(), 1);
    }

    #[test]
    fn test_push_requires_array_below() {
        let mut primary = Stack::new();
        primary.push(Value::Int(1));
        primary.push(Value::Int(2));
        assert_eq!(
            push(&mut primary),
            Err(FaultKind::TypeMismatch {
                ordinal: Ordinal::Second,
                expected: Expected::Array,
            })
        );
    }
}
