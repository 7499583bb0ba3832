//! Glyph CLI
//!
//! Command-line interface for running Glyph programs: from a file, from
//! an inline expression, or interactively. With no subcommand it starts
//! the interactive session.

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use glyph_runtime::{Interpreter, render_report};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;

mod repl;

#[derive(ClapParser)]
#[command(name = "glyph")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Glyph interpreter - run stack programs of single-character instructions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Glyph program from a file
    Run {
        /// Input source file
        input: PathBuf,
    },

    /// Evaluate a program given on the command line
    Eval {
        /// The program text
        program: String,
    },

    /// Start an interactive session (the default)
    Repl,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { input }) => {
            debug!(path = %input.display(), "running program file");
            let program = match load_program(&input) {
                Ok(program) => program,
                Err(e) => {
                    eprintln!("error: cannot read {}: {}", input.display(), e);
                    process::exit(1);
                }
            };
            execute(&program);
        }
        Some(Commands::Eval { program }) => execute(&program),
        Some(Commands::Repl) | None => repl::run(),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }
}

fn load_program(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Run one program against fresh stacks. On a fault, print the
/// diagnostic report and terminate with a non-zero status.
fn execute(program: &str) {
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let mut machine = Interpreter::new(stdin, stdout);
    if let Err(fault) = machine.run(program) {
        let report = render_report(&fault, &machine.primary, &machine.secondary);
        let _ = write!(machine.output_mut(), "{}", report);
        let _ = machine.output_mut().flush();
        process::exit(1);
    }
}
