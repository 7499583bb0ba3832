//! Glyph runtime: a tiny dynamically-typed stack language, executed
//! straight from its program text.
//!
//! Key design principles:
//! - Value: what the language talks about (Int, Float, Text, Array),
//!   with full deep-copy duplication — no shared ownership anywhere.
//! - Stack: a growable sequence of values; the machine owns two (primary
//!   and secondary), and every Array value owns one of its own.
//! - Interpreter: a character-dispatch loop over the program text. Text
//!   values double as executable quotations for `?` and `@`.
//! - Faults are fatal: the first error aborts the run, and
//!   [`render_report`] formats the diagnostic the host prints before
//!   dying.
//!
//! ```
//! use glyph_runtime::Interpreter;
//! use std::io::Cursor;
//!
//! let mut machine = Interpreter::with_seed(Cursor::new(Vec::new()), Vec::new(), 0);
//! machine.run("2 3 + !").unwrap();
//! assert_eq!(machine.into_output(), b"5\n");
//! ```

mod arithmetic;
mod diagnostics;
mod fault;
mod interpreter;
mod io;
mod list_ops;
mod math_ops;
mod stack;
mod string_ops;
mod value;

pub use diagnostics::render_report;
pub use fault::{Expected, Fault, FaultKind, Ordinal, StackId};
pub use interpreter::Interpreter;
pub use stack::Stack;
pub use value::Value;
