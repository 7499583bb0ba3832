//! I/O instructions
//!
//! The interpreter does not touch stdin/stdout directly: it reads lines
//! from a generic `BufRead` provider and writes to a generic `Write`
//! sink, so the CLI wires up the real streams and tests use in-memory
//! buffers. Write errors on the sink are ignored, matching the
//! fire-and-forget console semantics of the language.

use crate::fault::{Expected, FaultKind, Ordinal, StackId};
use crate::stack::Stack;
use crate::value::Value;
use std::io::{BufRead, Write};

/// `,` — read one line of input and push it as Text.
///
/// The line terminator is stripped (`\r\n` is normalized like `\n`).
/// End of input yields an empty Text; this instruction never faults.
///
/// Stack effect: ( -- Text )
pub(crate) fn read_line<R: BufRead>(input: &mut R, primary: &mut Stack) {
    let mut line = String::new();
    let _ = input.read_line(&mut line);
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    primary.push(Value::Text(line));
}

/// `!` — pop the top value and print it followed by a newline.
///
/// Stack effect: ( v -- )
pub(crate) fn print<W: Write>(output: &mut W, primary: &mut Stack) -> Result<(), FaultKind> {
    if primary.is_empty() {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    let value = primary.pop();
    let _ = writeln!(output, "{}", value);
    Ok(())
}

/// `Ip` — pop a Text and write it verbatim, no trailing newline.
///
/// Flushes the sink so prompt-style output is visible before a blocking
/// read.
///
/// Stack effect: ( Text -- )
pub(crate) fn print_raw<W: Write>(output: &mut W, primary: &mut Stack) -> Result<(), FaultKind> {
    if primary.is_empty() {
        return Err(FaultKind::StackUnderflow(StackId::Primary));
    }
    match primary.get(primary.len() - 1) {
        Value::Text(_) => {}
        _ => {
            return Err(FaultKind::TypeMismatch {
                ordinal: Ordinal::First,
                expected: Expected::Text,
            });
        }
    }
    let text = primary.pop().into_text();
    let _ = write!(output, "{}", text);
    let _ = output.flush();
    Ok(())
}

/// `Id` — write both stacks to the sink, top to bottom.
pub(crate) fn debug_dump<W: Write>(output: &mut W, primary: &Stack, secondary: &Stack) {
    let _ = write!(output, "[Stack]");
    dump_one(output, "primary", primary);
    dump_one(output, "secondary", secondary);
    let _ = writeln!(output);
}

fn dump_one<W: Write>(output: &mut W, name: &str, stack: &Stack) {
    let _ = write!(output, "\n{}:", name);
    if stack.is_empty() {
        let _ = write!(output, " <empty>");
        return;
    }
    for index in (0..stack.len()).rev() {
        let _ = write!(output, " [{}] {}", index, stack.get(index));
    }
}
