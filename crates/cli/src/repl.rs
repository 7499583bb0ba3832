//! Interactive session
//!
//! Reads a line at a time and executes it against the session's two
//! persistent stacks, so values carry over between lines. A fault prints
//! the usual diagnostic report but keeps the session (and the stacks as
//! the fault left them) alive instead of killing the process.

use glyph_runtime::{Interpreter, render_report};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io;
use std::process;

pub fn run() {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("error: cannot start line editor: {}", e);
            process::exit(1);
        }
    };
    let mut machine = Interpreter::new(io::stdin().lock(), io::stdout());

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                if let Err(fault) = machine.run(&line) {
                    let report = render_report(&fault, &machine.primary, &machine.secondary);
                    print!("{}", report);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
    }
}
