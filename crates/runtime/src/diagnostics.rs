//! Failure reports
//!
//! When a run dies, the host renders one fixed-format report: the
//! reason, a one-line snippet of the program text with a caret under the
//! offending character (up to three characters of context on each side),
//! and a top-to-bottom listing of both stacks. The snippet is cut from
//! the program text the fault occurred in — for a fault inside a
//! quotation, that is the quotation's own content.

use crate::fault::Fault;
use crate::stack::Stack;
use std::fmt::Write;

/// Render the diagnostic report for a fault.
pub fn render_report(fault: &Fault, primary: &Stack, secondary: &Stack) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[Error] {}", fault.kind);
    let _ = writeln!(out, "[Instruction]");

    let chars: Vec<char> = fault.program.chars().collect();
    let position = fault.position.min(chars.len());
    let before = position.min(3);
    let end = (position + 4).min(chars.len());
    let snippet: String = chars[position - before..end].iter().collect();
    let _ = writeln!(out, "  {}", snippet);
    let _ = writeln!(out, "{}^", " ".repeat(2 + before));

    let _ = writeln!(out, "[Stack]");
    render_stack(&mut out, "primary", primary);
    render_stack(&mut out, "secondary", secondary);
    out
}

fn render_stack(out: &mut String, name: &str, stack: &Stack) {
    let _ = writeln!(out, "  {}:", name);
    if stack.is_empty() {
        let _ = writeln!(out, "    <empty>");
        return;
    }
    for index in (0..stack.len()).rev() {
        let _ = writeln!(out, "  | {}: {}", index, stack.get(index));
    }
}
